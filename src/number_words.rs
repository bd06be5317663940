// src/number_words.rs
//
// Spoken number-word vocabulary used when turning transcripts into digits.
// The tables are hand-curated: supporting a new language or a new
// mis-transcription is a content change here, not a logic change elsewhere.

use std::collections::HashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::normalizer::normalize_key;

/// Canonical decimal separator every spoken separator word maps to.
pub const DECIMAL_SEPARATOR: &str = ".";

/// Language of the spoken vocabulary (and of user-facing status messages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "el")]
    Greek,
    #[serde(rename = "en")]
    English,
}

impl Language {
    /// Code passed to the speech-to-text binary.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Greek => "el",
            Language::English => "en",
        }
    }
}

/// What a recognized token stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberWord {
    /// A plain value, always a digit string such as "7" or "40".
    Value(String),
    /// A spoken decimal separator ("κόμμα", "point", ...).
    Separator,
}

const SEPARATOR: &str = ",";

// Greek entries, including unaccented spellings and the "δουδεκα" mishearing.
const GREEK_WORDS: &[(&str, &str)] = &[
    ("μηδέν", "0"), ("μηδεν", "0"),
    ("ένα", "1"), ("ενα", "1"),
    ("δύο", "2"), ("δυο", "2"),
    ("τρία", "3"), ("τρια", "3"),
    ("τέσσερα", "4"), ("τεσσερα", "4"),
    ("πέντε", "5"), ("πεντε", "5"),
    ("έξι", "6"), ("εξι", "6"),
    ("εφτά", "7"), ("επτά", "7"), ("εφτα", "7"), ("επτα", "7"),
    ("οκτώ", "8"), ("οκτω", "8"), ("οχτώ", "8"), ("οχτω", "8"),
    ("εννέα", "9"), ("εννεα", "9"), ("εννιά", "9"), ("εννια", "9"),
    ("δέκα", "10"), ("δεκα", "10"),
    ("έντεκα", "11"), ("εντεκα", "11"),
    ("δώδεκα", "12"), ("δωδεκα", "12"), ("δουδεκα", "12"),
    ("δεκατρία", "13"), ("δεκατρια", "13"),
    ("δεκατέσσερα", "14"), ("δεκατεσσερα", "14"),
    ("δεκαπέντε", "15"), ("δεκαπεντε", "15"),
    ("δεκαέξι", "16"), ("δεκαεξι", "16"),
    ("δεκαεπτά", "17"), ("δεκαεφτά", "17"), ("δεκαεπτα", "17"), ("δεκαεφτα", "17"),
    ("δεκαοκτώ", "18"), ("δεκαοχτώ", "18"), ("δεκαοκτω", "18"), ("δεκαοχτω", "18"),
    ("δεκαεννιά", "19"), ("δεκαεννέα", "19"), ("δεκαεννια", "19"), ("δεκαεννεα", "19"),
    ("είκοσι", "20"), ("εικοσι", "20"),
    ("τριάντα", "30"), ("τριαντα", "30"),
    ("σαράντα", "40"), ("σαραντα", "40"),
    ("πενήντα", "50"), ("πενηντα", "50"),
    ("εξήντα", "60"), ("εξηντα", "60"),
    ("εβδομήντα", "70"), ("εβδομηντα", "70"),
    ("ογδόντα", "80"), ("ογδοντα", "80"),
    ("ενενήντα", "90"), ("ενενηντα", "90"),
    ("κόμμα", SEPARATOR), ("κομμα", SEPARATOR),
    ("τελεία", SEPARATOR), ("τελεια", SEPARATOR),
    ("υποδιαστολή", SEPARATOR), ("υποδιαστολη", SEPARATOR),
];

const ENGLISH_WORDS: &[(&str, &str)] = &[
    ("zero", "0"),
    ("one", "1"), ("two", "2"), ("three", "3"), ("four", "4"), ("five", "5"),
    ("six", "6"), ("seven", "7"), ("eight", "8"), ("nine", "9"), ("ten", "10"),
    ("eleven", "11"), ("twelve", "12"), ("thirteen", "13"), ("fourteen", "14"),
    ("fifteen", "15"), ("sixteen", "16"), ("seventeen", "17"), ("eighteen", "18"),
    ("nineteen", "19"), ("twenty", "20"), ("thirty", "30"), ("forty", "40"),
    ("fifty", "50"), ("sixty", "60"), ("seventy", "70"), ("eighty", "80"),
    ("ninety", "90"),
    ("point", SEPARATOR), ("comma", SEPARATOR), ("dot", SEPARATOR),
];

// Bare digit keys so "3 κόμμα 2" resolves on both sides of the separator.
const DIGIT_KEYS: &[&str] = &[
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13",
    "14", "15", "16", "17", "18", "19", "20", "30", "40", "50", "60", "70", "80", "90",
];

static GREEK_TABLE: Lazy<NumberWordTable> = Lazy::new(|| {
    NumberWordTable::builtin_from(GREEK_WORDS)
});

static ENGLISH_TABLE: Lazy<NumberWordTable> = Lazy::new(|| {
    NumberWordTable::builtin_from(ENGLISH_WORDS)
});

/// Normalized-key dictionary from spoken words to digit strings or separators.
#[derive(Debug, Clone, Default)]
pub struct NumberWordTable {
    entries: HashMap<String, NumberWord>,
    separators: Vec<String>,
}

impl NumberWordTable {
    /// Shared built-in vocabulary for a language.
    pub fn builtin(language: Language) -> &'static NumberWordTable {
        match language {
            Language::Greek => &GREEK_TABLE,
            Language::English => &ENGLISH_TABLE,
        }
    }

    /// Build a table from `(word, value)` pairs. A value of `","` or `"."` marks a
    /// separator word. Fails when two words collide after normalization with
    /// different meanings.
    pub fn from_entries<'a, I>(pairs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut table = NumberWordTable::default();
        for digit in DIGIT_KEYS {
            table.entries.insert(digit.to_string(), NumberWord::Value(digit.to_string()));
        }

        for (word, value) in pairs {
            let key = normalize_key(word);
            if key.is_empty() {
                return Err(format!("Number word '{}' is empty after normalization", word));
            }
            let meaning = match value {
                "," | "." => NumberWord::Separator,
                digits if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
                    NumberWord::Value(digits.to_string())
                }
                other => return Err(format!("Number word '{}' maps to non-digit value '{}'", word, other)),
            };

            match table.entries.get(&key) {
                Some(existing) if *existing != meaning => {
                    return Err(format!("Number word '{}' collides with an existing entry for key '{}'", word, key));
                }
                Some(_) => continue,
                None => {
                    if meaning == NumberWord::Separator {
                        table.separators.push(key.clone());
                    }
                    table.entries.insert(key, meaning);
                }
            }
        }

        // Longest first so glued-token splitting prefers "ΥΠΟΔΙΑΣΤΟΛΗ" over shorter words.
        table.separators.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        Ok(table)
    }

    fn builtin_from(pairs: &[(&'static str, &'static str)]) -> Self {
        match Self::from_entries(pairs.iter().copied()) {
            Ok(table) => table,
            Err(e) => {
                log::error!("[NumberWords] Built-in vocabulary is inconsistent: {}", e);
                NumberWordTable::default()
            }
        }
    }

    /// Look up a token that has already been normalized.
    pub fn lookup(&self, normalized_token: &str) -> Option<&NumberWord> {
        self.entries.get(normalized_token)
    }

    /// Digit value of a normalized token, ignoring separator words.
    pub fn value_of(&self, normalized_token: &str) -> Option<&str> {
        match self.lookup(normalized_token) {
            Some(NumberWord::Value(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    /// True for separator words and for the bare "," / "." symbols.
    pub fn is_separator(&self, normalized_token: &str) -> bool {
        normalized_token == "," || normalized_token == "." ||
            matches!(self.lookup(normalized_token), Some(NumberWord::Separator))
    }

    /// Normalized separator words, longest first.
    pub fn separator_words(&self) -> &[String] {
        &self.separators
    }
}
