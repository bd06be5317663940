//! Voice-driven grade entry: resolve a spoken identifier or name to a row of a
//! roster sheet, then write the spoken grade into that row.

pub mod candidates;
pub mod config;
pub mod edit_history;
pub mod error;
pub mod grade_extractor;
pub mod grade_table;
pub mod id_resolver;
pub mod name_resolver;
pub mod normalizer;
pub mod number_words;
pub mod session;
pub mod transcription;

pub use candidates::{MatchCandidate, MatchKind};
pub use config::{AppSettings, SETTINGS};
pub use error::{SessionError, TableError, TranscriptionError};
pub use grade_extractor::extract_grade;
pub use grade_table::{GradeTable, JsonSheet};
pub use number_words::{Language, NumberWordTable};
pub use session::{GradingSession, Mode, SessionEvent};
pub use transcription::WhisperCli;
