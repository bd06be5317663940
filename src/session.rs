// src/session.rs
//
// Two-state grading controller. A transcript first resolves to candidate rows;
// once the caller selects one, the next transcripts are read as a grade for
// that row until one parses and is written.

use crate::candidates::MatchCandidate;
use crate::config::{AppSettings, ColumnSettings, IdMatchSettings, NameMatchMode, NameMatchSettings};
use crate::edit_history::{EditHistory, GradeEdit};
use crate::error::{SessionError, TranscriptionError};
use crate::grade_extractor::extract_grade;
use crate::grade_table::GradeTable;
use crate::id_resolver::resolve_id;
use crate::name_resolver::{resolve_by_name, resolve_by_surname};
use crate::normalizer::{clean_for_substring, extract_spoken_digits, normalize};
use crate::number_words::{Language, NumberWordTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    SelectingEntry,
    RecordingGrade,
}

/// Successful outcome of one transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Rows to present; the session waits for [`GradingSession::select`].
    CandidatesFound(Vec<MatchCandidate>),
    /// The grade was written and the session is selecting again.
    GradeWritten { row: usize, grade: String },
}

pub struct GradingSession {
    mode: Mode,
    selected_row: Option<usize>,
    presented: Vec<usize>,
    language: Language,
    columns: ColumnSettings,
    id_matching: IdMatchSettings,
    name_matching: NameMatchSettings,
    history: EditHistory,
}

impl GradingSession {
    pub fn new(settings: &AppSettings) -> Self {
        Self {
            mode: Mode::SelectingEntry,
            selected_row: None,
            presented: Vec::new(),
            language: settings.language,
            columns: settings.columns,
            id_matching: settings.id_matching,
            name_matching: settings.name_matching,
            history: EditHistory::new(settings.history_capacity),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.selected_row
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn columns(&self) -> &ColumnSettings {
        &self.columns
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    fn number_words(&self) -> &'static NumberWordTable {
        NumberWordTable::builtin(self.language)
    }

    /// Route one transcript according to the current mode.
    pub fn handle_transcript<T>(&mut self, transcript: &str, table: &mut T) -> Result<SessionEvent, SessionError>
    where
        T: GradeTable + ?Sized,
    {
        match self.mode {
            Mode::SelectingEntry => self.handle_selection_transcript(transcript, table),
            Mode::RecordingGrade => self.handle_grade_transcript(transcript, table),
        }
    }

    /// Candidate rows for a transcript: a spoken identifier when it carries any
    /// digits, otherwise a name fragment. Never touches session state.
    pub fn find_candidates<T>(&self, transcript: &str, table: &T) -> (String, Vec<MatchCandidate>)
    where
        T: GradeTable + ?Sized,
    {
        let tokens = normalize(transcript);
        let digits = extract_spoken_digits(&tokens, self.number_words());
        let columns = &self.columns;

        if !digits.is_empty() {
            let candidates = resolve_id(&digits, table, columns.id_column, columns.start_row, &self.id_matching);
            return (digits, candidates);
        }

        let fragment = clean_for_substring(transcript);
        let candidates = match self.name_matching.mode {
            NameMatchMode::Full => {
                resolve_by_name(&fragment, table, columns.name_column, columns.start_row, &self.name_matching)
            }
            NameMatchMode::Surname => {
                resolve_by_surname(&fragment, table, columns.name_column, columns.start_row, &self.name_matching)
            }
        };
        (fragment, candidates)
    }

    fn handle_selection_transcript<T>(&mut self, transcript: &str, table: &T) -> Result<SessionEvent, SessionError>
    where
        T: GradeTable + ?Sized,
    {
        let (query, candidates) = self.find_candidates(transcript, table);
        if candidates.is_empty() {
            log::warn!("[Session] No entries found for '{}'", query);
            return Err(SessionError::NoCandidatesFound { query });
        }

        log::info!("[Session] Found {} candidate rows for '{}'", candidates.len(), query);
        self.presented = candidates.iter().map(|c| c.row).collect();
        Ok(SessionEvent::CandidatesFound(candidates))
    }

    /// Externally triggered choice of one presented row. Moves to `RecordingGrade`;
    /// the caller starts the next recording. While a grade is pending another
    /// presented row may be chosen instead; an unknown row leaves that choice alone.
    pub fn select(&mut self, row: usize) -> Result<(), SessionError> {
        if !self.presented.contains(&row) {
            if self.mode == Mode::RecordingGrade {
                log::warn!("[Session] Row {} was not presented, still waiting for row {:?}", row, self.selected_row);
            } else {
                log::error!("[Session] Row {} was not presented for selection, resetting", row);
                self.abort();
            }
            return Err(SessionError::UnknownCandidate(row));
        }

        self.selected_row = Some(row);
        self.mode = Mode::RecordingGrade;
        log::info!("[Session] Selected row {}, waiting for grade", row);
        Ok(())
    }

    fn handle_grade_transcript<T>(&mut self, transcript: &str, table: &mut T) -> Result<SessionEvent, SessionError>
    where
        T: GradeTable + ?Sized,
    {
        let Some(row) = self.selected_row else {
            log::error!("[Session] Recording a grade with no selected row, resetting");
            self.abort();
            return Err(SessionError::NoSelection);
        };
        if row >= table.row_count() {
            log::error!("[Session] Selected row {} is outside the sheet ({} rows), resetting", row, table.row_count());
            self.abort();
            return Err(SessionError::UnknownCandidate(row));
        }

        let Some(grade) = extract_grade(transcript, self.number_words()) else {
            log::warn!("[Session] Could not parse grade from '{}'", transcript);
            return Err(SessionError::GradeParseFailure { transcript: transcript.to_string() });
        };

        let column = self.columns.grade_column;
        let previous = table.cell(row, column);
        table.write_cell(row, column, &grade)?;

        self.history.record(GradeEdit::new(row, column, previous, grade.clone()));
        self.selected_row = None;
        self.presented.clear();
        self.mode = Mode::SelectingEntry;
        log::info!("[Session] Set grade for row {} to {}", row, grade);
        Ok(SessionEvent::GradeWritten { row, grade })
    }

    /// Report a failed or cancelled transcription. State is left untouched so the
    /// same step can be retried.
    pub fn transcription_failed(&self, error: TranscriptionError) -> SessionError {
        log::warn!("[Session] Transcription failed in {:?}: {}", self.mode, error);
        SessionError::TranscriptionFailure(error)
    }

    /// Drop any selection and go back to selecting.
    pub fn abort(&mut self) {
        self.selected_row = None;
        self.presented.clear();
        self.mode = Mode::SelectingEntry;
    }

    /// Revert the most recent grade write.
    pub fn undo<T>(&mut self, table: &mut T) -> Result<Option<GradeEdit>, SessionError>
    where
        T: GradeTable + ?Sized,
    {
        let Some(edit) = self.history.pop_undo() else {
            return Ok(None);
        };

        if let Err(e) = table.write_cell(edit.row, edit.column, &edit.previous) {
            self.history.push_undo(edit);
            return Err(e.into());
        }

        log::info!("[Session] Undid grade '{}' on row {}", edit.value, edit.row);
        self.history.push_redo(edit.clone());
        Ok(Some(edit))
    }

    /// Re-apply the most recently undone grade write.
    pub fn redo<T>(&mut self, table: &mut T) -> Result<Option<GradeEdit>, SessionError>
    where
        T: GradeTable + ?Sized,
    {
        let Some(edit) = self.history.pop_redo() else {
            return Ok(None);
        };

        if let Err(e) = table.write_cell(edit.row, edit.column, &edit.value) {
            self.history.push_redo(edit);
            return Err(e.into());
        }

        log::info!("[Session] Redid grade '{}' on row {}", edit.value, edit.row);
        self.history.push_undo(edit.clone());
        Ok(Some(edit))
    }
}
