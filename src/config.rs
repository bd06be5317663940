use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use once_cell::sync::Lazy; // Use Lazy for thread-safe static initialization
use std::sync::Mutex;

use crate::number_words::Language;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppSettings {
    #[serde(default = "default_language")]
    pub language: Language,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default)]
    pub columns: ColumnSettings,
    #[serde(default)]
    pub id_matching: IdMatchSettings,
    #[serde(default)]
    pub name_matching: NameMatchSettings,
    #[serde(default)]
    pub whisper: WhisperSettings,
}

/// Which sheet columns hold what; indices are zero-based.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSettings {
    #[serde(default = "default_id_column")]
    pub id_column: usize,
    #[serde(default = "default_name_column")]
    pub name_column: usize,
    #[serde(default = "default_grade_column")]
    pub grade_column: usize,
    /// First data row; rows above it are headers and never matched.
    #[serde(default = "default_start_row")]
    pub start_row: usize,
}

/// Fuzzy identifier fallback. Threshold is `max(query_len, cell_len / cell_length_divisor)`,
/// optionally capped by `max_distance`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdMatchSettings {
    #[serde(default = "default_fuzzy_enabled")]
    pub fuzzy_enabled: bool,
    #[serde(default = "default_cell_length_divisor")]
    pub cell_length_divisor: usize,
    #[serde(default)]
    pub max_distance: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NameMatchMode {
    /// Compare against the whole name cell.
    #[default]
    Full,
    /// Compare against the first word of the name cell.
    Surname,
}

/// Name fuzzy matching. Max distance is `clamp(ceil(len * distance_ratio), min, max)`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct NameMatchSettings {
    #[serde(default)]
    pub mode: NameMatchMode,
    #[serde(default = "default_distance_ratio")]
    pub distance_ratio: f32,
    #[serde(default = "default_min_name_distance")]
    pub min_distance: usize,
    #[serde(default = "default_max_name_distance")]
    pub max_distance: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WhisperSettings {
    #[serde(default = "default_whisper_binary")]
    pub binary_path: PathBuf,
    #[serde(default = "default_whisper_model")]
    pub model_path: PathBuf,
    #[serde(default)]
    pub grammar_path: Option<PathBuf>,
    #[serde(default = "default_grammar_penalty")]
    pub grammar_penalty: u32,
}

fn default_language() -> Language {
    Language::Greek
}

fn default_history_capacity() -> usize {
    50
}

fn default_id_column() -> usize {
    0
}

fn default_name_column() -> usize {
    1
}

fn default_grade_column() -> usize {
    7
}

fn default_start_row() -> usize {
    1 // Row 0 is the header
}

fn default_fuzzy_enabled() -> bool {
    true
}

fn default_cell_length_divisor() -> usize {
    2
}

fn default_distance_ratio() -> f32 {
    0.5
}

fn default_min_name_distance() -> usize {
    1
}

fn default_max_name_distance() -> usize {
    6
}

fn default_whisper_binary() -> PathBuf {
    if cfg!(target_os = "windows") {
        PathBuf::from("whisper.exe")
    } else {
        PathBuf::from("whisper-cli")
    }
}

fn default_whisper_model() -> PathBuf {
    PathBuf::from("models/ggml-base.bin")
}

fn default_grammar_penalty() -> u32 {
    100
}

impl Default for ColumnSettings {
    fn default() -> Self {
        Self {
            id_column: default_id_column(),
            name_column: default_name_column(),
            grade_column: default_grade_column(),
            start_row: default_start_row(),
        }
    }
}

impl Default for IdMatchSettings {
    fn default() -> Self {
        Self {
            fuzzy_enabled: default_fuzzy_enabled(),
            cell_length_divisor: default_cell_length_divisor(),
            max_distance: None,
        }
    }
}

impl IdMatchSettings {
    /// Largest accepted edit distance between a cleaned query and a cleaned cell.
    pub fn threshold(&self, query_len: usize, cell_len: usize) -> usize {
        let scaled = query_len.max(cell_len / self.cell_length_divisor.max(1));
        match self.max_distance {
            Some(cap) => scaled.min(cap),
            None => scaled,
        }
    }
}

impl Default for NameMatchSettings {
    fn default() -> Self {
        Self {
            mode: NameMatchMode::default(),
            distance_ratio: default_distance_ratio(),
            min_distance: default_min_name_distance(),
            max_distance: default_max_name_distance(),
        }
    }
}

impl NameMatchSettings {
    /// Scales with the cleaned query length, saturating at `max_distance`.
    pub fn dynamic_max_distance(&self, query_len: usize) -> usize {
        let scaled = (query_len as f32 * self.distance_ratio).ceil().max(0.0) as usize;
        let upper = self.max_distance.max(self.min_distance);
        scaled.clamp(self.min_distance, upper)
    }
}

impl Default for WhisperSettings {
    fn default() -> Self {
        Self {
            binary_path: default_whisper_binary(),
            model_path: default_whisper_model(),
            grammar_path: None,
            grammar_penalty: default_grammar_penalty(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            language: default_language(),
            history_capacity: default_history_capacity(),
            columns: ColumnSettings::default(),
            id_matching: IdMatchSettings::default(),
            name_matching: NameMatchSettings::default(),
            whisper: WhisperSettings::default(),
        }
    }
}

// Use Lazy<Mutex<AppSettings>> for thread-safe static config
pub static SETTINGS: Lazy<Mutex<AppSettings>> = Lazy::new(|| {
    Mutex::new(load_settings())
});

// Helper function to get project directories
fn get_project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "speak2sheet", "Speak2Sheet")
}

// Helper function to get the config file path
fn get_config_path() -> Option<PathBuf> {
    get_project_dirs().map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

// Load settings from the platform config file, writing defaults when it is missing
fn load_settings() -> AppSettings {
    match get_config_path() {
        Some(config_path) => AppSettings::load_or_create(&config_path),
        None => {
            log::error!("[Config] Could not determine project directories. Using default settings.");
            AppSettings::default()
        }
    }
}

impl AppSettings {
    /// Read settings from `path`. A missing file gets the defaults written to it;
    /// an unreadable or unparsable file falls back to defaults.
    pub fn load_or_create(path: &Path) -> AppSettings {
        log::info!("[Config] Trying to load settings from: {}", path.display());
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<AppSettings>(&contents) {
                Ok(settings) => {
                    log::info!(
                        "[Config] Settings loaded: lang={:?}, id_col={}, name_col={}, grade_col={}",
                        settings.language,
                        settings.columns.id_column,
                        settings.columns.name_column,
                        settings.columns.grade_column
                    );
                    return settings;
                }
                Err(e) => {
                    log::error!("[Config] Failed to parse config file '{}': {}", path.display(), e);
                    return AppSettings::default();
                }
            },
            Err(ref e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("[Config] Config file not found. Creating default.");
            }
            Err(e) => {
                log::error!("[Config] Failed to read config file '{}': {}", path.display(), e);
                return AppSettings::default();
            }
        }

        let default_settings = AppSettings::default();
        if let Err(e) = default_settings.save_to(path) {
            log::error!("[Config] Failed to write default config file: {}", e);
        }
        default_settings
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), String> {
        log::info!("[Config] Saving settings to: {}", config_path.display());

        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir).map_err(|e| format!("Failed to create config dir: {}", e))?;
        }

        let config_content = toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize: {}", e))?;
        fs::write(config_path, config_content).map_err(|e| format!("Failed to write config: {}", e))?;
        Ok(())
    }
}
