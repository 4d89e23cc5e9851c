use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::correction;

/// Returned when no candidate survives correction.
pub const NO_TEXT_SENTINEL: &str = "No text detected";

// Engine tags such as "[PARAGRAPH]" prefix lines in some OCR outputs.
static RE_METHOD_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\[[A-Z]+\]\s*").unwrap());

/// Merges raw OCR candidates into one corrected text block. Candidates are
/// corrected individually, deduplicated, ordered longest first, then the
/// joined block is corrected once more so cross-candidate duplicates and
/// noise introduced by the join are cleaned up too.
pub fn aggregate_candidates(candidates: &[String]) -> String {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<String> = Vec::new();
    for raw in candidates {
        let stripped = RE_METHOD_TAG.replace_all(raw.trim(), "");
        let corrected = correction::correct(&stripped);
        if corrected.chars().count() <= 1 {
            continue;
        }
        if seen.insert(corrected.clone()) {
            merged.push(corrected);
        }
    }
    if merged.is_empty() {
        return NO_TEXT_SENTINEL.to_string();
    }
    merged.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    correction::correct(&merged.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn empty_input_yields_sentinel() {
        assert_eq!(aggregate_candidates(&[]), NO_TEXT_SENTINEL);
        assert_eq!(aggregate_candidates(&candidates(&["", " ", "7"])), NO_TEXT_SENTINEL);
    }

    #[test]
    fn method_tags_stripped() {
        let merged = aggregate_candidates(&candidates(&["[CURRENCY] Half 64,800"]));
        assert_eq!(merged, "¥64,800");
    }

    #[test]
    fn duplicates_collapse_after_correction() {
        // Both candidates correct to the same text, so only one survives.
        let merged = aggregate_candidates(&candidates(&["Half 64,800", "¥64,800"]));
        assert_eq!(merged, "¥64,800");
    }

    #[test]
    fn longest_candidate_leads() {
        let merged = aggregate_candidates(&candidates(&[
            "short line",
            "a much longer candidate line",
        ]));
        assert_eq!(merged, "a much longer candidate line\nshort line");
    }

    #[test]
    fn cross_candidate_amount_duplicates_dropped() {
        let merged = aggregate_candidates(&candidates(&[
            "ASUS AirVision M1 Smart Glasses\n¥64,800",
            "[CURRENCY] Half 64,800",
        ]));
        assert_eq!(merged, "ASUS AirVision M1 Smart Glasses\n¥64,800");
    }
}
