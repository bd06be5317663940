// src/grade_extractor.rs
//
// Pull a decimal grade out of a noisy transcript. Rules are tried in a fixed
// order and the first one that matches wins:
//   1. digits, '.' or ',', digits in the raw text ("3,2")
//   2. two number words joined by '.' or ',' in the raw text ("τρία, δύο")
//   3. number, separator word, number after normalization ("τρία κόμμα δύο")
//   4. the first token that is a number word or a numeric literal
// Spoken decimals are checked before single tokens so "three point two" is
// never truncated to "three".

use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalizer::{is_numeric_literal, normalize_keep_comma, normalize_key, strip_accents};
use crate::number_words::{NumberWordTable, DECIMAL_SEPARATOR};

static DIGIT_DECIMAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]+)[.,]([0-9]+)").unwrap()
});

static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\p{L}+").unwrap()
});

/// Canonical decimal string ("3.2", "7") for the grade spoken in `transcript`,
/// or `None` when nothing in it reads as a number.
pub fn extract_grade(transcript: &str, table: &NumberWordTable) -> Option<String> {
    if transcript.trim().is_empty() {
        return None;
    }

    if let Some(grade) = digit_decimal(transcript) {
        log::debug!("[GradeExtractor] Digit decimal '{}' in '{}'", grade, transcript);
        return Some(grade);
    }

    if let Some(grade) = punctuated_word_decimal(transcript, table) {
        log::debug!("[GradeExtractor] Punctuated word decimal '{}' in '{}'", grade, transcript);
        return Some(grade);
    }

    let tokens = grade_tokens(transcript, table);

    if let Some(grade) = spoken_decimal(&tokens, table) {
        log::debug!("[GradeExtractor] Spoken decimal '{}' from {:?}", grade, tokens);
        return Some(grade);
    }

    let grade = first_number(&tokens, table);
    if grade.is_none() {
        log::debug!("[GradeExtractor] No grade in tokens {:?}", tokens);
    }
    grade
}

fn join_decimal(int_part: &str, dec_part: &str) -> String {
    format!("{}{}{}", int_part, DECIMAL_SEPARATOR, dec_part)
}

fn digit_decimal(transcript: &str) -> Option<String> {
    DIGIT_DECIMAL_PATTERN
        .captures(transcript)
        .map(|caps| join_decimal(&caps[1], &caps[2]))
}

fn punctuated_word_decimal(transcript: &str, table: &NumberWordTable) -> Option<String> {
    let unaccented = strip_accents(transcript);
    let words: Vec<regex::Match> = WORD_PATTERN.find_iter(&unaccented).collect();

    for pair in words.windows(2) {
        let gap = unaccented[pair[0].end()..pair[1].start()].trim();
        if gap != "." && gap != "," {
            continue;
        }

        let int_part = table.value_of(&normalize_key(pair[0].as_str()));
        let dec_part = table.value_of(&normalize_key(pair[1].as_str()));
        if let (Some(int_part), Some(dec_part)) = (int_part, dec_part) {
            return Some(join_decimal(int_part, dec_part));
        }
    }

    None
}

/// Comma-preserving tokens with separator symbols and glued separator words
/// ("ΚΟΜΜΑΔΥΟ") split into tokens of their own. A run of separators (a pause
/// comma next to a spoken "κόμμα") collapses to its first member.
fn grade_tokens(transcript: &str, table: &NumberWordTable) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();

    let pieces = normalize_keep_comma(transcript)
        .into_iter()
        .flat_map(|token| split_symbols(&token))
        .flat_map(|token| split_glued_separator(token, table));

    for piece in pieces {
        if table.is_separator(&piece) && tokens.last().is_some_and(|prev| table.is_separator(prev)) {
            continue;
        }
        tokens.push(piece);
    }

    tokens
}

fn split_symbols(token: &str) -> Vec<String> {
    if is_numeric_literal(token) {
        return vec![token.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in token.chars() {
        if ch == '.' || ch == ',' {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            pieces.push(ch.to_string());
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

fn split_glued_separator(token: String, table: &NumberWordTable) -> Vec<String> {
    if table.lookup(&token).is_some() || !token.chars().any(char::is_alphabetic) {
        return vec![token];
    }

    for separator in table.separator_words() {
        if let Some(start) = token.find(separator.as_str()) {
            let end = start + separator.len();
            let pieces = [&token[..start], separator.as_str(), &token[end..]];
            return pieces
                .iter()
                .filter(|p| !p.is_empty())
                .map(|p| p.to_string())
                .collect();
        }
    }

    vec![token]
}

fn number_value<'a>(token: &'a str, table: &'a NumberWordTable) -> Option<&'a str> {
    table
        .value_of(token)
        .or_else(|| (!token.is_empty() && token.chars().all(|c| c.is_ascii_digit())).then_some(token))
}

fn spoken_decimal(tokens: &[String], table: &NumberWordTable) -> Option<String> {
    tokens.windows(3).find_map(|window| {
        if !table.is_separator(&window[1]) {
            return None;
        }
        let int_part = number_value(&window[0], table)?;
        let dec_part = number_value(&window[2], table)?;
        Some(join_decimal(int_part, dec_part))
    })
}

fn first_number(tokens: &[String], table: &NumberWordTable) -> Option<String> {
    tokens.iter().find_map(|token| {
        let candidate = token.trim_matches(|c: char| !c.is_alphanumeric());
        if let Some(value) = table.value_of(candidate) {
            return Some(value.to_string());
        }
        is_numeric_literal(candidate).then(|| candidate.to_string())
    })
}
