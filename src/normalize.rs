use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static RE_GLYPH_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:NT\$?|[¥￥$€£₹₩])$").unwrap());
static RE_DIGITS_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d[\d,]*$").unwrap());
static RE_GLYPH_PREFIXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:NT\$|[¥￥$€£₹₩])").unwrap());

/// Tidies corrected text before extraction: trims lines, drops blanks,
/// removes case-insensitive duplicate lines (first occurrence wins), and
/// re-joins currency glyphs that OCR split from their digits onto an
/// adjacent line.
pub fn clean_and_merge(text: &str) -> String {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique: Vec<&str> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if seen.insert(line.to_lowercase()) {
            unique.push(line);
        }
    }

    let mut merged: Vec<String> = Vec::new();
    let mut i = 0;
    while i < unique.len() {
        if i + 1 < unique.len() {
            let cur = unique[i];
            let next = unique[i + 1];
            if RE_GLYPH_ONLY.is_match(cur) && RE_DIGITS_ONLY.is_match(next) {
                merged.push(format!("{cur}{next}"));
                i += 2;
                continue;
            }
            // Digits first, glyph-led line second: the glyph belongs in front.
            if RE_DIGITS_ONLY.is_match(cur) && RE_GLYPH_PREFIXED.is_match(next) {
                merged.push(format!("{next}{cur}"));
                i += 2;
                continue;
            }
        }
        merged.push(unique[i].to_string());
        i += 1;
    }
    merged.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_and_duplicates_removed() {
        let text = "Smart Glasses\n\n  SMART GLASSES  \nearly bird";
        assert_eq!(clean_and_merge(text), "Smart Glasses\nearly bird");
    }

    #[test]
    fn lone_glyph_joins_following_digits() {
        assert_eq!(clean_and_merge("¥\n64,800"), "¥64,800");
        assert_eq!(clean_and_merge("NT$\n3,200"), "NT$3,200");
    }

    #[test]
    fn digits_join_following_glyph_line() {
        // The glyph-led line moves in front of the orphaned digits.
        assert_eq!(clean_and_merge("64,800\n¥ early bird"), "¥ early bird64,800");
    }

    #[test]
    fn unrelated_lines_untouched() {
        let text = "title line\n64,800\nanother line";
        assert_eq!(clean_and_merge(text), text);
    }
}
