// src/candidates.rs
//
// Candidate rows produced by the identifier and name resolvers.

/// How a candidate row was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The query was contained in (or was a suffix of) the cell.
    Exact,
    /// Accepted because the edit distance was within the threshold.
    Fuzzy,
}

/// One matching row. Exact hits always carry distance 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCandidate {
    pub row: usize,
    pub distance: usize,
    pub kind: MatchKind,
}

impl MatchCandidate {
    pub fn exact(row: usize) -> Self {
        Self { row, distance: 0, kind: MatchKind::Exact }
    }

    pub fn fuzzy(row: usize, distance: usize) -> Self {
        Self { row, distance, kind: MatchKind::Fuzzy }
    }
}

/// Levenshtein distance over Unicode code points; unit costs, no transpositions.
pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Exact hits in row order, then fuzzy hits by ascending distance.
/// Ties keep their row order (the sort is stable).
pub fn order_candidates(exact: Vec<MatchCandidate>, mut fuzzy: Vec<MatchCandidate>) -> Vec<MatchCandidate> {
    fuzzy.sort_by_key(|c| c.distance);

    let mut ordered = exact;
    ordered.extend(fuzzy);
    ordered
}

/// Row indices of a candidate list, in order.
pub fn candidate_rows(candidates: &[MatchCandidate]) -> Vec<usize> {
    candidates.iter().map(|c| c.row).collect()
}
