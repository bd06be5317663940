// src/normalizer.rs
//
// Transcript normalization: accent stripping, punctuation removal, case folding
// and tokenization. Every resolver and the grade extractor start from here.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::number_words::NumberWordTable;

static NON_SPACING_MARKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\p{Mn}+").unwrap()
});

static PUNCTUATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\p{L}\p{N}\.\s]+").unwrap()
});

static PUNCTUATION_KEEP_COMMA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\p{L}\p{N}\.,\s]+").unwrap()
});

static TOKEN_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\p{L}\p{N}\.]+").unwrap()
});

static TOKEN_BOUNDARY_KEEP_COMMA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\p{L}\p{N}\.,]+").unwrap()
});

static NON_ALPHANUMERIC_OR_SPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\p{L}\p{N}\s]+").unwrap()
});

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").unwrap()
});

static NUMERIC_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]+(\.[0-9]+)?$").unwrap()
});

/// Decompose and drop non-spacing marks, so "τρία" and "τρια" compare equal.
pub fn strip_accents(text: &str) -> String {
    let decomposed: String = text.nfd().collect();
    NON_SPACING_MARKS.replace_all(&decomposed, "").nfc().collect()
}

/// Canonical form of a single dictionary word: no accents, upper case, trimmed.
pub fn normalize_key(word: &str) -> String {
    strip_accents(word.trim()).to_uppercase()
}

/// Split a raw transcript into canonical tokens.
///
/// Tokens hold only letters, digits and at most one dot, are upper-cased and carry no
/// accents. Normalizing the space-joined output again yields the same tokens.
pub fn normalize(text: &str) -> Vec<String> {
    tokenize(text, false)
}

/// Same as [`normalize`] but commas survive as token characters, for callers
/// that treat a comma as a decimal separator.
pub fn normalize_keep_comma(text: &str) -> Vec<String> {
    tokenize(text, true)
}

fn tokenize(text: &str, keep_comma: bool) -> Vec<String> {
    let unaccented = strip_accents(text);

    let (punctuation, boundary) = if keep_comma {
        (&*PUNCTUATION_KEEP_COMMA, &*TOKEN_BOUNDARY_KEEP_COMMA)
    } else {
        (&*PUNCTUATION, &*TOKEN_BOUNDARY)
    };

    let spaced = punctuation.replace_all(&unaccented, " ");
    let upper = spaced.to_uppercase();

    boundary
        .split(&upper)
        .filter(|t| !t.is_empty())
        .flat_map(split_extra_dots)
        .collect()
}

/// Keep at most one dot per token: "1.2.3" becomes "1.2", "3".
fn split_extra_dots(token: &str) -> Vec<String> {
    if token.matches('.').count() <= 1 {
        return vec![token.to_string()];
    }

    let mut parts = token.split('.');
    let head = format!("{}.{}", parts.next().unwrap_or(""), parts.next().unwrap_or(""));
    std::iter::once(head)
        .chain(parts.map(str::to_string))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Lighter cleaning used for name comparison: no accents, upper case, only
/// letters/digits/single spaces, trimmed.
pub fn clean_for_substring(text: &str) -> String {
    let unaccented = strip_accents(text).to_uppercase();
    let stripped = NON_ALPHANUMERIC_OR_SPACE.replace_all(&unaccented, "");
    WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}

/// True for a bare integer or decimal literal such as "7" or "7.3".
pub fn is_numeric_literal(token: &str) -> bool {
    NUMERIC_LITERAL.is_match(token)
}

/// Only the ASCII digits of `text`, in order.
pub fn digits_only(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Concatenate the digits a speaker said, in order.
///
/// Number words contribute their table value, numeric literals their digits
/// (dots dropped), and mixed tokens such as "Α12" their embedded digits.
/// Separator words and unrecognized words contribute nothing.
pub fn extract_spoken_digits(tokens: &[String], table: &NumberWordTable) -> String {
    let mut digits = String::new();

    for token in tokens {
        if let Some(value) = table.value_of(token) {
            digits.push_str(value);
        } else if token.chars().any(|c| c.is_ascii_digit()) {
            digits.push_str(&digits_only(token));
        }
    }

    digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number_words::Language;

    #[test]
    fn test_strip_accents() {
        assert_eq!(strip_accents("τρία"), "τρια");
        assert_eq!(strip_accents("Ανδρεάδης"), "Ανδρεαδης");
        assert_eq!(strip_accents("crème brûlée"), "creme brulee");
        assert_eq!(strip_accents("plain"), "plain");
    }

    #[test]
    fn test_normalize_splits_and_upper_cases() {
        assert_eq!(normalize("τρία, κόμμα δύο!"), vec!["ΤΡΙΑ", "ΚΟΜΜΑ", "ΔΥΟ"]);
        assert_eq!(normalize("  grade: 7.5 "), vec!["GRADE", "7.5"]);
        assert_eq!(normalize("3,2"), vec!["3", "2"]);
        assert!(normalize("").is_empty());
        assert!(normalize("?!, ;").is_empty());
    }

    #[test]
    fn test_tokens_carry_at_most_one_dot() {
        assert_eq!(normalize("1.2.3"), vec!["1.2", "3"]);
        assert_eq!(normalize("v1..2"), vec!["V1.", "2"]);
        assert_eq!(normalize("7.5"), vec!["7.5"]);
        for token in normalize("a.b.c.d 3... 4.5.6") {
            assert!(token.matches('.').count() <= 1, "token '{}' has more than one dot", token);
        }
    }

    #[test]
    fn test_normalize_keep_comma() {
        assert_eq!(normalize_keep_comma("3,2 τρία, δύο"), vec!["3,2", "ΤΡΙΑ,", "ΔΥΟ"]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "Ο μαθητής 00123 πήρε τρία κόμμα δύο.",
            "Papadopoulos, Giannis -- 7.5!!",
            "ΠΑΠΑΔΌΠΟΥΛΟΣ   γιάννης",
            "ΑΜ 1.2.3 και 4..5",
        ];
        for input in inputs {
            let once = normalize(input);
            let twice = normalize(&once.join(" "));
            assert_eq!(once, twice, "normalizing '{}' twice changed the tokens", input);
        }
    }

    #[test]
    fn test_clean_for_substring() {
        assert_eq!(clean_for_substring("  Παπαδόπουλος,   Γιάννης! "), "ΠΑΠΑΔΟΠΟΥΛΟΣ ΓΙΑΝΝΗΣ");
        assert_eq!(clean_for_substring("O'Brien-Smith"), "OBRIENSMITH");
        assert_eq!(clean_for_substring("a.b"), "AB");
        assert_eq!(clean_for_substring(""), "");
    }

    #[test]
    fn test_numeric_literal() {
        assert!(is_numeric_literal("7"));
        assert!(is_numeric_literal("7.35"));
        assert!(!is_numeric_literal("7."));
        assert!(!is_numeric_literal(".5"));
        assert!(!is_numeric_literal("A7"));
    }

    #[test]
    fn test_extract_spoken_digits() {
        let table = NumberWordTable::builtin(Language::Greek);

        let tokens = normalize("μηδέν ένα δύο τρία");
        assert_eq!(extract_spoken_digits(&tokens, table), "0123");

        let tokens = normalize("ΑΜ 20 εννιά");
        assert_eq!(extract_spoken_digits(&tokens, table), "209");

        let tokens = normalize("Α12Β3 κόμμα 4.5");
        assert_eq!(extract_spoken_digits(&tokens, table), "12345");

        let tokens = normalize("Παπαδόπουλος");
        assert_eq!(extract_spoken_digits(&tokens, table), "");
    }
}
