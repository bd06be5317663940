// src/error.rs
//
// Failure taxonomy for a grading session. Everything here is recoverable at
// the process level; the session decides which state survives each failure.

use std::path::PathBuf;
use thiserror::Error;

use crate::number_words::Language;

/// Failures of the sheet collaborator.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to access sheet file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse sheet: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sheet is malformed: {0}")]
    Malformed(String),
}

/// Failures of the speech-to-text collaborator.
#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("transcription was cancelled")]
    Cancelled,
    #[error("whisper binary not found at {0}")]
    MissingBinary(PathBuf),
    #[error("whisper model not found at {0}")]
    MissingModel(PathBuf),
    #[error("failed to run whisper: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("whisper exited with {status}: {stderr}")]
    ExitStatus { status: String, stderr: String },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no entries found for \"{query}\"")]
    NoCandidatesFound { query: String },
    #[error("could not parse a grade from \"{transcript}\"")]
    GradeParseFailure { transcript: String },
    #[error("transcription failed: {0}")]
    TranscriptionFailure(#[from] TranscriptionError),
    #[error("grade was not saved: {0}")]
    PersistWriteFailure(#[from] TableError),
    #[error("row {0} was not among the presented candidates")]
    UnknownCandidate(usize),
    #[error("no row is selected")]
    NoSelection,
}

impl SessionError {
    /// Short status line for the user, in the session language.
    pub fn status_message(&self, language: Language) -> String {
        match (self, language) {
            (SessionError::NoCandidatesFound { query }, Language::Greek) => {
                format!("Δεν βρέθηκαν εγγραφές για «{}»", query)
            }
            (SessionError::NoCandidatesFound { query }, Language::English) => {
                format!("No entries found for “{}”", query)
            }
            (SessionError::GradeParseFailure { transcript }, Language::Greek) => {
                format!("Δεν αναγνωρίστηκε βαθμός στο «{}», δοκιμάστε ξανά", transcript)
            }
            (SessionError::GradeParseFailure { transcript }, Language::English) => {
                format!("Could not parse grade from '{}', please try again", transcript)
            }
            (SessionError::TranscriptionFailure(TranscriptionError::Cancelled), Language::Greek) => {
                "Ακυρώθηκε".to_string()
            }
            (SessionError::TranscriptionFailure(TranscriptionError::Cancelled), Language::English) => {
                "Canceled".to_string()
            }
            (SessionError::TranscriptionFailure(e), Language::Greek) => {
                format!("Η μεταγραφή απέτυχε: {}", e)
            }
            (SessionError::TranscriptionFailure(e), Language::English) => {
                format!("Transcription failed: {}", e)
            }
            (SessionError::PersistWriteFailure(e), Language::Greek) => {
                format!("Ο βαθμός δεν αποθηκεύτηκε: {}", e)
            }
            (SessionError::PersistWriteFailure(e), Language::English) => {
                format!("Grade not saved: {}", e)
            }
            (SessionError::UnknownCandidate(_), Language::Greek) => "Μη έγκυρη επιλογή".to_string(),
            (SessionError::UnknownCandidate(_), Language::English) => "Invalid selection".to_string(),
            (SessionError::NoSelection, Language::Greek) => "Δεν έχει επιλεγεί εγγραφή".to_string(),
            (SessionError::NoSelection, Language::English) => "No entry selected".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages_follow_language() {
        let err = SessionError::NoCandidatesFound { query: "123".to_string() };
        assert_eq!(err.status_message(Language::English), "No entries found for “123”");
        assert!(err.status_message(Language::Greek).contains("123"));

        let cancelled = SessionError::from(TranscriptionError::Cancelled);
        assert_eq!(cancelled.status_message(Language::English), "Canceled");
    }

    #[test]
    fn test_table_error_converts_to_persist_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: SessionError = TableError::from(io).into();
        assert!(matches!(err, SessionError::PersistWriteFailure(TableError::Io(_))));
        assert!(err.to_string().contains("read-only"));
    }
}
