// src/grade_table.rs
//
// The row/column table the session reads candidates from and writes grades to.
// Resolvers only ever read through `GradeTable::cell`; the single mutation
// path is `write_cell`, which also persists.

use std::fs;
use std::path::{Path, PathBuf};
use serde_json::{Number, Value};

use crate::error::TableError;
use crate::normalizer::is_numeric_literal;

/// Row/column addressable sheet.
pub trait GradeTable {
    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize;

    /// Text of a cell; out-of-range addresses read as an empty string.
    fn cell(&self, row: usize, column: usize) -> String;

    /// Store `value` and persist it. On error the previous value is kept.
    fn write_cell(&mut self, row: usize, column: usize, value: &str) -> Result<(), TableError>;
}

/// Sheet stored as a JSON array of rows, each an array of scalar cells.
#[derive(Debug, Clone, Default)]
pub struct JsonSheet {
    rows: Vec<Vec<Value>>,
    path: Option<PathBuf>,
}

impl JsonSheet {
    /// Sheet that lives only in memory; writes never touch the disk.
    pub fn in_memory<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| Value::String(cell.into())).collect())
            .collect();
        Self { rows, path: None }
    }

    /// Load a sheet file. An empty file is an empty sheet.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let data = fs::read_to_string(path)?;
        let rows: Vec<Vec<Value>> = if data.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&data)?
        };

        for (r, row) in rows.iter().enumerate() {
            if let Some(c) = row.iter().position(|v| v.is_array() || v.is_object()) {
                return Err(TableError::Malformed(format!(
                    "cell ({}, {}) is not a scalar value", r, c
                )));
            }
        }

        log::info!("[GradeTable] Loaded {} rows from {}", rows.len(), path.display());
        Ok(Self { rows, path: Some(path.to_path_buf()) })
    }

    /// Attach a file so later writes are persisted there.
    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.to_path_buf());
        self
    }

    /// Write the whole sheet to its file, if it has one.
    pub fn save(&self) -> Result<(), TableError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let data = serde_json::to_string_pretty(&self.rows)?;
        fs::write(path, data)?;
        log::debug!("[GradeTable] Saved {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }

    fn set(&mut self, row: usize, column: usize, value: Value) -> Value {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= column {
            cells.resize(column + 1, Value::Null);
        }
        std::mem::replace(&mut cells[column], value)
    }
}

impl GradeTable for JsonSheet {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn cell(&self, row: usize, column: usize) -> String {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(render_cell)
            .unwrap_or_default()
    }

    fn write_cell(&mut self, row: usize, column: usize, value: &str) -> Result<(), TableError> {
        let previous = self.set(row, column, typed_cell(value));

        if let Err(e) = self.save() {
            log::error!("[GradeTable] Failed to persist cell ({}, {}): {}", row, column, e);
            self.set(row, column, previous);
            return Err(e);
        }

        log::info!("[GradeTable] Cell ({}, {}) => {}", row, column, value);
        Ok(())
    }
}

/// Numeric-looking values become JSON numbers, but only when the number prints
/// back as the same text. "0123", "3.10" and over-long literals stay text.
fn typed_cell(value: &str) -> Value {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }

    if is_numeric_literal(trimmed) {
        if let Some(number) = lossless_number(trimmed) {
            return Value::Number(number);
        }
    }

    Value::String(value.to_string())
}

fn lossless_number(literal: &str) -> Option<Number> {
    let number = match literal.parse::<i64>() {
        Ok(int) => Number::from(int),
        Err(_) => literal.parse::<f64>().ok().and_then(Number::from_f64)?,
    };
    (number.to_string() == literal).then_some(number)
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_sheet() -> JsonSheet {
        JsonSheet::in_memory(vec![
            vec!["AM", "Name", "Grade"],
            vec!["00123", "Παπαδόπουλος Γιάννης", ""],
        ])
    }

    #[test]
    fn test_out_of_range_reads_empty() {
        let sheet = sample_sheet();
        assert_eq!(sheet.cell(1, 0), "00123");
        assert_eq!(sheet.cell(1, 9), "");
        assert_eq!(sheet.cell(42, 0), "");
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.column_count(), 3);
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let mut sheet = sample_sheet();
        sheet.write_cell(1, 2, "3.2").unwrap();
        assert_eq!(sheet.cell(1, 2), "3.2");

        sheet.write_cell(1, 2, "3.10").unwrap();
        assert_eq!(sheet.cell(1, 2), "3.10");

        sheet.write_cell(1, 2, "12345678901234567890").unwrap();
        assert_eq!(sheet.cell(1, 2), "12345678901234567890");

        sheet.write_cell(1, 2, "0.5").unwrap();
        assert_eq!(sheet.cell(1, 2), "0.5");

        sheet.write_cell(4, 5, "7").unwrap();
        assert_eq!(sheet.cell(4, 5), "7");
        assert_eq!(sheet.row_count(), 5);
    }

    #[test]
    fn test_numeric_typing() {
        assert_eq!(typed_cell("7"), Value::from(7));
        assert!(typed_cell("3.2").is_f64());
        assert_eq!(typed_cell("00123"), Value::String("00123".to_string()));
        assert!(typed_cell("0.5").is_f64());
        assert_eq!(typed_cell("3.10"), Value::String("3.10".to_string()));
        assert_eq!(typed_cell("12345678901234567890"), Value::String("12345678901234567890".to_string()));
        assert_eq!(typed_cell("absent"), Value::String("absent".to_string()));
        assert_eq!(typed_cell("  "), Value::Null);
    }

    #[test]
    fn test_persisted_write_survives_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grades.json");
        sample_sheet().with_path(&path).save().unwrap();

        let mut sheet = JsonSheet::load(&path).unwrap();
        sheet.write_cell(1, 2, "8.5").unwrap();

        let reloaded = JsonSheet::load(&path).unwrap();
        assert_eq!(reloaded.cell(1, 2), "8.5");
        assert_eq!(reloaded.cell(1, 0), "00123");
    }

    #[test]
    fn test_failed_save_keeps_previous_value() {
        let dir = tempdir().unwrap();
        // a directory in place of the file makes the write fail
        let path = dir.path().join("blocked");
        fs::create_dir(&path).unwrap();

        let mut sheet = sample_sheet().with_path(&path);
        let result = sheet.write_cell(1, 2, "9");
        assert!(result.is_err());
        assert_eq!(sheet.cell(1, 2), "");
    }

    #[test]
    fn test_malformed_sheet_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"[["1", {"nested": true}]]"#).unwrap();
        assert!(matches!(JsonSheet::load(&path), Err(TableError::Malformed(_))));
    }

    #[test]
    fn test_empty_file_is_empty_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, "").unwrap();
        let sheet = JsonSheet::load(&path).unwrap();
        assert_eq!(sheet.row_count(), 0);
    }
}
