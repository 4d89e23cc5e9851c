use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateKind {
    Start,
    End,
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateSpan {
    /// The date exactly as it appeared, untouched.
    pub raw: String,
    #[serde(rename = "type")]
    pub kind: DateKind,
    pub context: String,
}

const MONTHS: &str = "January|February|March|April|May|June|July|August|September|October|\
                      November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec";

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\b(\d{1,2})[./-](\d{1,2})[./-](\d{4})\b").unwrap(),
        Regex::new(r"\b(\d{4})[./-](\d{1,2})[./-](\d{1,2})\b").unwrap(),
        Regex::new(&format!(r"(?i)\b(\d{{1,2}})\s+(?:{MONTHS})\s+(\d{{4}})\b")).unwrap(),
        Regex::new(&format!(r"(?i)\b(?:{MONTHS})\s+(\d{{1,2}}),?\s+(\d{{4}})\b")).unwrap(),
    ]
});

const START_WORDS: &[&str] = &["start", "launch", "began", "開始", "开始"];
const END_WORDS: &[&str] = &["end", "deadline", "close", "結束", "结束", "finish"];

const CONTEXT_RADIUS: usize = 15;

/// Finds date expressions and labels each as a campaign start, end, or
/// unknown from nearby keywords. Spans keep document order within each
/// pattern; nothing is deduplicated.
pub fn extract_dates(text: &str) -> Vec<DateSpan> {
    let mut spans: Vec<DateSpan> = Vec::new();
    for re in DATE_PATTERNS.iter() {
        for found in re.find_iter(text) {
            let context = context_window(text, found.start(), found.end()).to_lowercase();
            let kind = if START_WORDS.iter().any(|w| context.contains(w)) {
                DateKind::Start
            } else if END_WORDS.iter().any(|w| context.contains(w)) {
                DateKind::End
            } else {
                DateKind::Unknown
            };
            spans.push(DateSpan {
                raw: found.as_str().to_string(),
                kind,
                context,
            });
        }
    }
    spans
}

fn context_window(text: &str, start: usize, end: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(CONTEXT_RADIUS)
        .last()
        .map_or(start, |(i, _)| i);
    let to = text[end..]
        .char_indices()
        .take(CONTEXT_RADIUS)
        .last()
        .map_or(end, |(i, c)| end + i + c.len_utf8());
    &text[from..to]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_formats_found() {
        let spans = extract_dates("runs 3/15/2026 through 2026-04-30");
        let raws: Vec<&str> = spans.iter().map(|s| s.raw.as_str()).collect();
        assert_eq!(raws, vec!["3/15/2026", "2026-04-30"]);
    }

    #[test]
    fn month_name_formats_found() {
        let spans = extract_dates("from 15 March 2026 until April 30, 2026");
        let raws: Vec<&str> = spans.iter().map(|s| s.raw.as_str()).collect();
        assert_eq!(raws, vec!["15 March 2026", "April 30, 2026"]);
    }

    #[test]
    fn keywords_classify_kind() {
        let spans = extract_dates("starts 3/15/2026, deadline 4/30/2026");
        assert_eq!(spans[0].kind, DateKind::Start);
        assert_eq!(spans[1].kind, DateKind::End);
    }

    #[test]
    fn unlabeled_date_is_unknown() {
        let spans = extract_dates("ships 3/15/2026");
        assert_eq!(spans[0].kind, DateKind::Unknown);
    }

    #[test]
    fn bare_numbers_ignored() {
        assert!(extract_dates("¥64,800 and 124,896 supporters").is_empty());
    }
}
