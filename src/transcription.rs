// src/transcription.rs
//
// Speech-to-text through the whisper command-line binary. One call per
// recording; the child process dies with its future.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;

use crate::config::WhisperSettings;
use crate::error::TranscriptionError;
use crate::number_words::Language;

static SEGMENT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[\d{2}:\d{2}:\d{2}\.\d+\s*-->\s*\d{2}:\d{2}:\d{2}\.\d+\]\s*(.+)$").unwrap()
});

#[derive(Debug, Clone)]
pub struct WhisperCli {
    binary_path: PathBuf,
    model_path: PathBuf,
    grammar_path: Option<PathBuf>,
    grammar_penalty: u32,
    language: Language,
}

impl WhisperCli {
    pub fn new(settings: &WhisperSettings, language: Language) -> Self {
        Self {
            binary_path: settings.binary_path.clone(),
            model_path: settings.model_path.clone(),
            grammar_path: settings.grammar_path.clone(),
            grammar_penalty: settings.grammar_penalty,
            language,
        }
    }

    fn build_args(&self, audio_path: &Path) -> Vec<String> {
        let mut args = vec!["-m".to_string(), self.model_path.display().to_string()];
        if let Some(grammar) = &self.grammar_path {
            args.push("--grammar".to_string());
            args.push(grammar.display().to_string());
            args.push("--grammar-penalty".to_string());
            args.push(self.grammar_penalty.to_string());
        }
        args.push("-f".to_string());
        args.push(audio_path.display().to_string());
        args.push("-l".to_string());
        args.push(self.language.code().to_string());
        args
    }

    /// Transcribe one audio file. Returns the joined segment text, which may be
    /// empty when whisper heard nothing.
    pub async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError> {
        if !self.model_path.exists() {
            log::error!("[Transcription] Model file not found at: {}", self.model_path.display());
            return Err(TranscriptionError::MissingModel(self.model_path.clone()));
        }

        let args = self.build_args(audio_path);
        log::debug!("[Transcription] Running {} {}", self.binary_path.display(), args.join(" "));
        let start_time = Instant::now();

        let output = Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscriptionError::MissingBinary(self.binary_path.clone())
                } else {
                    TranscriptionError::Spawn(e)
                }
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::info!(
            "[Transcription] Whisper finished in {:.2}s with status: {}",
            start_time.elapsed().as_secs_f32(),
            output.status
        );

        if !output.status.success() {
            return Err(TranscriptionError::ExitStatus {
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        let combined = format!("{}\n{}", stdout, stderr);
        let text = parse_whisper_output(&combined);
        if text.is_empty() {
            log::warn!("[Transcription] Whisper produced no segments for {}", audio_path.display());
        } else {
            log::info!("[Transcription] Transcript ({} chars): '{}'", text.chars().count(), text);
        }
        Ok(text)
    }

    /// Like [`transcribe`](Self::transcribe), but gives up as soon as `cancel`
    /// completes. The whisper child is killed when its future is dropped.
    pub async fn transcribe_until<F>(&self, audio_path: &Path, cancel: F) -> Result<String, TranscriptionError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                log::info!("[Transcription] Cancelled while transcribing {}", audio_path.display());
                Err(TranscriptionError::Cancelled)
            }
            result = self.transcribe(audio_path) => result,
        }
    }
}

/// Text of every `[hh:mm:ss.mmm --> hh:mm:ss.mmm] text` line, space-joined.
/// Everything else whisper prints is dropped.
pub fn parse_whisper_output(output: &str) -> String {
    output
        .lines()
        .filter_map(|line| SEGMENT_LINE.captures(line.trim()))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
