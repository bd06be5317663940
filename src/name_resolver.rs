// src/name_resolver.rs
//
// Resolve a spoken name fragment against the name column.
// Substring hits come first in row order, then fuzzy hits closest first.

use crate::candidates::{edit_distance, order_candidates, MatchCandidate};
use crate::config::{NameMatchMode, NameMatchSettings};
use crate::grade_table::GradeTable;
use crate::normalizer::clean_for_substring;

/// Match against the whole cleaned name cell.
pub fn resolve_by_name<T>(
    fragment: &str,
    table: &T,
    name_column: usize,
    start_row: usize,
    settings: &NameMatchSettings,
) -> Vec<MatchCandidate>
where
    T: GradeTable + ?Sized,
{
    resolve(fragment, table, name_column, start_row, settings, NameMatchMode::Full)
}

/// Match against the first word of the name cell only.
pub fn resolve_by_surname<T>(
    fragment: &str,
    table: &T,
    name_column: usize,
    start_row: usize,
    settings: &NameMatchSettings,
) -> Vec<MatchCandidate>
where
    T: GradeTable + ?Sized,
{
    resolve(fragment, table, name_column, start_row, settings, NameMatchMode::Surname)
}

fn resolve<T>(
    fragment: &str,
    table: &T,
    name_column: usize,
    start_row: usize,
    settings: &NameMatchSettings,
    mode: NameMatchMode,
) -> Vec<MatchCandidate>
where
    T: GradeTable + ?Sized,
{
    let clean_fragment = clean_for_substring(fragment);
    if clean_fragment.is_empty() {
        return Vec::new();
    }

    let max_distance = settings.dynamic_max_distance(clean_fragment.chars().count());
    let mut exact = Vec::new();
    let mut fuzzy = Vec::new();

    for row in start_row..table.row_count() {
        let clean_cell = clean_for_substring(&table.cell(row, name_column));
        let compared = match mode {
            NameMatchMode::Full => clean_cell.as_str(),
            NameMatchMode::Surname => clean_cell.split(' ').next().unwrap_or(""),
        };
        if compared.is_empty() {
            continue;
        }

        if compared.contains(&clean_fragment) {
            exact.push(MatchCandidate::exact(row));
            continue;
        }

        let distance = edit_distance(compared, &clean_fragment);
        if distance <= max_distance {
            fuzzy.push(MatchCandidate::fuzzy(row, distance));
        }
    }

    log::debug!(
        "[NameResolver] '{}' ({:?}, max_dist={}): {} substring, {} fuzzy",
        clean_fragment, mode, max_distance, exact.len(), fuzzy.len()
    );
    order_candidates(exact, fuzzy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::{candidate_rows, MatchKind};
    use crate::grade_table::JsonSheet;

    fn roster() -> JsonSheet {
        JsonSheet::in_memory(vec![
            vec!["AM", "Ονοματεπώνυμο"],
            vec!["4410", "Ανδρεάδης Νίκος"],
            vec!["98765", "ΠΑΠΑΔΟΠΟΥΛΟΣ ΓΙΑΝΝΗΣ"],
            vec!["00123", "Παπαδάκης Γιώργος"],
            vec!["51230", "Ιωάννου Ελένη"],
            vec!["51231", ""],
        ])
    }

    #[test]
    fn test_surname_prefix_is_substring_hit() {
        let sheet = roster();
        let settings = NameMatchSettings::default();
        let candidates = resolve_by_surname("παπαδοπουλο", &sheet, 1, 1, &settings);

        assert_eq!(candidates[0], MatchCandidate::exact(2));
        assert!(candidates[1..].iter().all(|c| c.kind == MatchKind::Fuzzy));
    }

    #[test]
    fn test_accents_and_punctuation_ignored() {
        let sheet = roster();
        let settings = NameMatchSettings::default();
        let rows = candidate_rows(&resolve_by_name("Ανδρεαδης!", &sheet, 1, 1, &settings));
        assert_eq!(rows.first(), Some(&1));
    }

    #[test]
    fn test_exact_hits_precede_fuzzy_sorted_by_distance() {
        let sheet = roster();
        let settings = NameMatchSettings::default();
        for fragment in ["ΠΑΠΑΔ", "Ιωανου", "γιαννης", "Παπαδακη Γιωργο"] {
            let candidates = resolve_by_name(fragment, &sheet, 1, 1, &settings);
            let first_fuzzy = candidates
                .iter()
                .position(|c| c.kind == MatchKind::Fuzzy)
                .unwrap_or(candidates.len());
            assert!(candidates[..first_fuzzy].iter().all(|c| c.kind == MatchKind::Exact));
            assert!(candidates[first_fuzzy..].iter().all(|c| c.kind == MatchKind::Fuzzy));
            assert!(candidates[first_fuzzy..].windows(2).all(|w| w[0].distance <= w[1].distance));
        }
    }

    #[test]
    fn test_substring_hits_keep_row_order() {
        let sheet = roster();
        let settings = NameMatchSettings::default();
        let rows = candidate_rows(&resolve_by_name("ΠΑΠΑΔ", &sheet, 1, 1, &settings));
        assert_eq!(&rows[..2], &[2, 3]);
    }

    #[test]
    fn test_fuzzy_hit_within_dynamic_distance() {
        let sheet = roster();
        let settings = NameMatchSettings::default();
        // one substitution away from the surname
        let candidates = resolve_by_surname("Ιωαννοy", &sheet, 1, 1, &settings);
        assert_eq!(candidates.first(), Some(&MatchCandidate::fuzzy(4, 1)));
    }

    #[test]
    fn test_dynamic_distance_formula() {
        let settings = NameMatchSettings::default();
        assert_eq!(settings.dynamic_max_distance(0), 1);
        assert_eq!(settings.dynamic_max_distance(1), 1);
        assert_eq!(settings.dynamic_max_distance(3), 2);
        assert_eq!(settings.dynamic_max_distance(8), 4);
        assert_eq!(settings.dynamic_max_distance(12), 6);
        assert_eq!(settings.dynamic_max_distance(30), 6);
    }

    #[test]
    fn test_empty_fragment_and_cells() {
        let sheet = roster();
        let settings = NameMatchSettings::default();
        assert!(resolve_by_name("  !! ", &sheet, 1, 1, &settings).is_empty());
        let rows = candidate_rows(&resolve_by_name("Ε", &sheet, 1, 1, &settings));
        assert!(!rows.contains(&5));
    }
}
