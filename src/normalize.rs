use std::collections::BTreeSet;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_general_category::{get_general_category, GeneralCategory};
use unicode_normalization::UnicodeNormalization;

pub const STOP_WORDS: &[&str] = &["oi", "ola", "bom dia", "boa tarde", "boa noite", "ok", "sim", "nao"];

// Anything that is not a word char, whitespace, hyphen, underscore, period or comma
static RE_DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\w\s\-_.,]+").unwrap()
});

static RE_NUMERIC_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\d\s\-.,]*$").unwrap()
});

/// Sorted, unique, normalized lines ready for clustering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    lines: Vec<String>,
}

impl Candidates {
    /// Wrap lines that were normalized elsewhere. Duplicates are dropped and order is pinned.
    pub fn from_normalized<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = lines.into_iter().map(Into::into).collect();
        Self { lines: set.into_iter().collect() }
    }

    pub fn len(&self) -> usize { self.lines.len() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }
    pub fn as_slice(&self) -> &[String] { &self.lines }
    pub fn into_lines(self) -> Vec<String> { self.lines }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepareStats {
    pub raw_lines: usize,
    pub blank: usize,
    pub duplicates: usize,
    pub stop_words: usize,
    /// Invalid UTF-8 sequences replaced with U+FFFD while decoding.
    pub invalid_utf8: usize,
}

/// Clean a single line. Returns `None` when nothing worth clustering is left.
pub fn normalize_line(raw: &str) -> Option<String> {
    let lowered = raw.to_lowercase();
    let trimmed = lowered.trim();
    if trimmed.is_empty() {
        return None;
    }
    let stripped = RE_DISALLOWED.replace_all(trimmed, "");
    if RE_NUMERIC_ONLY.is_match(&stripped) {
        return None;
    }
    let folded = fold_diacritics(&stripped);
    if folded.is_empty() { None } else { Some(folded) }
}

/// Drop nonspacing marks after canonical decomposition. Spacing and enclosing marks stay.
pub fn fold_diacritics(text: &str) -> String {
    text.nfd()
        .filter(|c| get_general_category(*c) != GeneralCategory::NonspacingMark)
        .nfc()
        .collect()
}

pub fn is_stop_word(line: &str, extra: &[String]) -> bool {
    STOP_WORDS.contains(&line) || extra.iter().any(|w| w == line)
}

/// Split raw text on newlines and turn it into a candidate set.
pub fn prepare_text(text: &str, extra_stop_words: &[String]) -> (Candidates, PrepareStats) {
    prepare_lines(text.split('\n'), extra_stop_words)
}

/// Decode raw input lossily and prepare it. Invalid UTF-8 never rejects the input;
/// each bad sequence becomes U+FFFD, which normalization then strips.
pub fn prepare_bytes(bytes: &[u8], extra_stop_words: &[String]) -> (Candidates, PrepareStats) {
    let invalid = count_invalid_utf8(bytes);
    let text = String::from_utf8_lossy(bytes);
    let (candidates, mut stats) = prepare_text(&text, extra_stop_words);
    stats.invalid_utf8 = invalid;
    (candidates, stats)
}

/// Number of sequences `String::from_utf8_lossy` replaces.
pub fn count_invalid_utf8(mut bytes: &[u8]) -> usize {
    let mut count = 0;
    while let Err(e) = std::str::from_utf8(bytes) {
        count += 1;
        match e.error_len() {
            Some(len) => bytes = &bytes[e.valid_up_to() + len..],
            // truncated sequence at the end
            None => break,
        }
    }
    count
}

pub fn prepare_lines<'a, I>(raw: I, extra_stop_words: &[String]) -> (Candidates, PrepareStats)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut stats = PrepareStats::default();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    for line in raw {
        stats.raw_lines += 1;
        let Some(clean) = normalize_line(line) else {
            stats.blank += 1;
            continue;
        };
        if seen.contains(&clean) {
            stats.duplicates += 1;
            continue;
        }
        if is_stop_word(&clean, extra_stop_words) {
            stats.stop_words += 1;
            continue;
        }
        seen.insert(clean);
    }
    log::debug!(
        "prepared {} candidates from {} raw lines (blank={}, duplicates={}, stop_words={})",
        seen.len(), stats.raw_lines, stats.blank, stats.duplicates, stats.stop_words
    );
    (Candidates { lines: seen.into_iter().collect() }, stats)
}
