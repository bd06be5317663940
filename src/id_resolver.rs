// src/id_resolver.rs
//
// Resolve a spoken identifier against the id column.
// Direct containment is tried first; the fuzzy fallback recovers dropped
// leading zeros and single mis-heard digits.

use crate::candidates::{edit_distance, order_candidates, MatchCandidate};
use crate::config::IdMatchSettings;
use crate::grade_table::GradeTable;
use crate::normalizer::digits_only;

/// Rows whose id cell contains or ends with `query` (byte-exact), in row order.
pub fn resolve_by_id<T>(query: &str, table: &T, id_column: usize, start_row: usize) -> Vec<MatchCandidate>
where
    T: GradeTable + ?Sized,
{
    if query.is_empty() {
        return Vec::new();
    }

    let matches: Vec<MatchCandidate> = (start_row..table.row_count())
        .filter(|&row| {
            let cell = table.cell(row, id_column);
            !cell.is_empty() && (cell.ends_with(query) || cell.contains(query))
        })
        .map(MatchCandidate::exact)
        .collect();

    log::debug!("[IdResolver] Direct match for '{}' found {} rows", query, matches.len());
    matches
}

/// Rows whose digits are within the edit-distance threshold of the query's
/// digits, closest first.
pub fn resolve_by_fuzzy_id<T>(
    query: &str,
    table: &T,
    id_column: usize,
    start_row: usize,
    settings: &IdMatchSettings,
) -> Vec<MatchCandidate>
where
    T: GradeTable + ?Sized,
{
    let clean_query = digits_only(query);
    if clean_query.is_empty() {
        return Vec::new();
    }
    let query_len = clean_query.chars().count();

    let mut fuzzy = Vec::new();
    for row in start_row..table.row_count() {
        let clean_cell = digits_only(&table.cell(row, id_column));
        if clean_cell.is_empty() {
            continue;
        }

        let distance = edit_distance(&clean_cell, &clean_query);
        let threshold = settings.threshold(query_len, clean_cell.chars().count());
        if distance <= threshold {
            fuzzy.push(MatchCandidate::fuzzy(row, distance));
        }
    }

    log::debug!("[IdResolver] Fuzzy match for '{}' found {} rows", clean_query, fuzzy.len());
    order_candidates(Vec::new(), fuzzy)
}

/// Direct match, falling back to fuzzy matching only when nothing matched.
pub fn resolve_id<T>(
    query: &str,
    table: &T,
    id_column: usize,
    start_row: usize,
    settings: &IdMatchSettings,
) -> Vec<MatchCandidate>
where
    T: GradeTable + ?Sized,
{
    let direct = resolve_by_id(query, table, id_column, start_row);
    if !direct.is_empty() || !settings.fuzzy_enabled {
        return direct;
    }

    log::info!("[IdResolver] No direct match for '{}', trying fuzzy fallback", query);
    resolve_by_fuzzy_id(query, table, id_column, start_row, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::{candidate_rows, MatchKind};
    use crate::grade_table::JsonSheet;

    fn roster() -> JsonSheet {
        JsonSheet::in_memory(vec![
            vec!["AM", "Name"],
            vec!["4410", "Ανδρεάδης Νίκος"],
            vec!["98765", "Γεωργίου Μαρία"],
            vec!["00123", "Παπαδόπουλος Γιάννης"],
            vec!["", "Κενός"],
            vec!["51230", "Ιωάννου Ελένη"],
        ])
    }

    #[test]
    fn test_direct_suffix_and_substring_match() {
        let sheet = roster();
        let rows = candidate_rows(&resolve_by_id("123", &sheet, 0, 1));
        assert_eq!(rows, vec![3, 5]);

        let rows = candidate_rows(&resolve_by_id("8765", &sheet, 0, 1));
        assert_eq!(rows, vec![2]);
    }

    #[test]
    fn test_direct_match_has_no_false_positives() {
        let sheet = roster();
        for query in ["1", "12", "44", "765", "0", "999"] {
            for candidate in resolve_by_id(query, &sheet, 0, 1) {
                let cell = sheet.cell(candidate.row, 0);
                assert!(cell.contains(query) || cell.ends_with(query));
                assert_eq!(candidate.kind, MatchKind::Exact);
            }
        }
    }

    #[test]
    fn test_header_row_is_skipped() {
        let sheet = JsonSheet::in_memory(vec![vec!["123"], vec!["123"]]);
        assert_eq!(candidate_rows(&resolve_by_id("123", &sheet, 0, 1)), vec![1]);
        assert_eq!(candidate_rows(&resolve_by_id("123", &sheet, 0, 0)), vec![0, 1]);
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let sheet = roster();
        assert!(resolve_by_id("", &sheet, 0, 1).is_empty());
        assert!(resolve_by_fuzzy_id("abc", &sheet, 0, 1, &IdMatchSettings::default()).is_empty());
    }

    #[test]
    fn test_fuzzy_fallback_recovers_extra_digit() {
        let sheet = JsonSheet::in_memory(vec![
            vec!["AM"],
            vec!["777777777"],
            vec!["555"],
            vec!["00123"],
        ]);
        let settings = IdMatchSettings::default();

        assert!(resolve_by_id("1234", &sheet, 0, 1).is_empty());
        let candidates = resolve_id("1234", &sheet, 0, 1, &settings);
        assert!(candidate_rows(&candidates).contains(&3));
        assert_eq!(candidates[0].row, 3);
        assert_eq!(candidates[0].distance, edit_distance("00123", "1234"));
    }

    #[test]
    fn test_fuzzy_results_within_threshold_and_sorted() {
        let sheet = roster();
        let settings = IdMatchSettings::default();
        let query = "4411";
        let candidates = resolve_by_fuzzy_id(query, &sheet, 0, 1, &settings);

        assert!(!candidates.is_empty());
        for candidate in &candidates {
            let cell = digits_only(&sheet.cell(candidate.row, 0));
            let bound = query.len().max(cell.len() / 2);
            assert!(edit_distance(&cell, query) <= bound);
            assert_eq!(candidate.kind, MatchKind::Fuzzy);
        }
        assert!(candidates.windows(2).all(|w| w[0].distance <= w[1].distance));
        // empty id cell is never a candidate
        assert!(!candidate_rows(&candidates).contains(&4));
    }

    #[test]
    fn test_fuzzy_disabled_returns_direct_only() {
        let sheet = roster();
        let settings = IdMatchSettings { fuzzy_enabled: false, ..Default::default() };
        assert!(resolve_id("1234", &sheet, 0, 1, &settings).is_empty());
    }

    #[test]
    fn test_fuzzy_cap_limits_threshold() {
        let sheet = roster();
        let capped = IdMatchSettings { max_distance: Some(1), ..Default::default() };
        let rows = candidate_rows(&resolve_by_fuzzy_id("4411", &sheet, 0, 1, &capped));
        assert_eq!(rows, vec![1]);
    }
}
