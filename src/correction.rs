use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Literal substitutions applied before any pattern rewrites. Order matters:
/// noise tokens are removed before the brand fixes that depend on them.
const LITERAL_FIXES: &[(&str, &str)] = &[
    ("[5", "ASUS"),
    ("After red", "ASUS"),
    ("After n", ""),
    ("Airyision", "AirVision"),
    ("NI+", "M1"),
    ("M+", "M1"),
    ("11+.420", "111,420"),
    ("10S,800", "103,800"),
    ("1OS,800", "103,800"),
    ("64.80o", "64,800"),
    (".8oo", ",800"),
    ("Air Vision", "AirVision"),
    ("Air vision", "AirVision"),
];

// "Half" and its shorter misreads stand in for a mangled yen sign in front of
// a price. Longer alternatives come first so "Half" never matches as "Hal".
static RE_YEN_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:Half|Halt|Hali|Haf|Hal)\s*(\d)").unwrap());

// Stray whitespace between a yen sign and its digits.
static RE_YEN_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"¥\s+(\d)").unwrap());

// Ungrouped yen amounts get thousands separators re-inserted.
static RE_GROUP_FIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"¥(\d{2})(\d{3})\b").unwrap());
static RE_GROUP_SIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"¥(\d{3})(\d{3})\b").unwrap());

// "48 OFF" or "489 OFF" lost the percent sign.
static RE_LOST_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2})\d?\s*OFF\b").unwrap());

// A leading "6" is a common misread of "¥". The left guard keeps an amount
// that legitimately starts with 6 (as in ¥612,345) from being split again.
static RE_SIX_AS_YEN_COMMA6: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[^0-9¥])6(\d{3},\d{3})\b").unwrap());
static RE_SIX_AS_YEN_COMMA5: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[^0-9¥])6(\d{2},\d{3})\b").unwrap());
static RE_SIX_AS_YEN_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[^0-9¥])6(\d{3})(\d{3})\b").unwrap());

// Periods misread where a thousands comma belongs.
static RE_DOT_AFTER_YEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"¥(\d+)\.(\d{3})").unwrap());
static RE_DOT_BEFORE_YEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d{3})(\s*¥)").unwrap());
static RE_DOT_AT_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\.(\d{3})$").unwrap());

static RE_RED_BRAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bRed\s+(AirVision)\b").unwrap());

static RE_NEGATIVE_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-\d+$").unwrap());
static RE_SHORT_DIGIT_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,3}$").unwrap());
static RE_GROUPED_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"¥(\d{1,3}(?:,\d{3})*)").unwrap());

static RE_MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"  +").unwrap());
static RE_MULTI_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());
static RE_GLUED_YEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"¥(\d+,\d+)¥").unwrap());

// Standalone digit lines that carry meaning (a discount, a full achievement
// rate) and survive the short-line filter.
const KEPT_DIGIT_LINES: &[&str] = &["48", "100"];

/// Repairs recurring OCR misreads in price-heavy text. Total: never fails,
/// never panics, and running it on its own output changes nothing.
pub fn correct(text: &str) -> String {
    let text = apply_literal_fixes(text);
    let text = apply_pattern_fixes(&text);
    let text = filter_lines(&text);
    collapse_whitespace(&text).trim().to_string()
}

fn apply_literal_fixes(text: &str) -> String {
    let mut out = text.to_string();
    for (from, to) in LITERAL_FIXES {
        out = out.replace(from, to);
    }
    out
}

fn apply_pattern_fixes(text: &str) -> String {
    let text = RE_YEN_SPACE.replace_all(text, "¥${1}");
    let text = RE_YEN_WORD.replace_all(&text, "¥${1}");
    let text = RE_GROUP_FIVE.replace_all(&text, "¥${1},${2}");
    let text = RE_GROUP_SIX.replace_all(&text, "¥${1},${2}");
    let text = RE_LOST_PERCENT.replace_all(&text, "${1}% OFF");
    let text = RE_SIX_AS_YEN_COMMA6.replace_all(&text, "${1}¥${2}");
    let text = RE_SIX_AS_YEN_COMMA5.replace_all(&text, "${1}¥${2}");
    let text = RE_DOT_AFTER_YEN.replace_all(&text, "¥${1},${2}");
    let text = RE_DOT_BEFORE_YEN.replace_all(&text, "${1},${2}${3}");
    let text = RE_DOT_AT_END.replace_all(&text, "${1},${2}");
    let text = RE_SIX_AS_YEN_BARE.replace_all(&text, "${1}¥${2},${3}");
    RE_RED_BRAND.replace_all(&text, "ASUS ${1}").into_owned()
}

/// Drops OCR noise lines and duplicate price lines. The first line carrying a
/// given yen amount wins; later lines with the same value are echoes of it.
fn filter_lines(text: &str) -> String {
    let mut seen_amounts: HashSet<u64> = HashSet::new();
    let mut kept: Vec<&str> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || RE_NEGATIVE_LINE.is_match(line) {
            continue;
        }
        if RE_SHORT_DIGIT_LINE.is_match(line) && !KEPT_DIGIT_LINES.contains(&line) {
            continue;
        }
        if line.contains('¥') {
            let value = RE_GROUPED_AMOUNT
                .captures(line)
                .and_then(|caps| caps[1].replace(',', "").parse::<u64>().ok());
            match value {
                Some(value) if seen_amounts.insert(value) => kept.push(line),
                _ => {}
            }
            continue;
        }
        kept.push(line);
    }
    kept.join("\n")
}

fn collapse_whitespace(text: &str) -> String {
    let text = RE_MULTI_SPACE.replace_all(text, " ");
    let text = RE_MULTI_NEWLINE.replace_all(&text, "\n");
    RE_GLUED_YEN.replace_all(&text, "¥${1} ¥").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_word_becomes_yen_sign() {
        assert_eq!(correct("Half 64,800"), "¥64,800");
        assert_eq!(correct("Halt64,800"), "¥64,800");
    }

    #[test]
    fn thousands_separator_reinserted() {
        assert_eq!(correct("¥64800"), "¥64,800");
        assert_eq!(correct("¥124896"), "¥124,896");
    }

    #[test]
    fn lost_percent_sign_restored() {
        assert_eq!(correct("48 OFF"), "48% OFF");
        assert_eq!(correct("489 OFF"), "48% OFF");
    }

    #[test]
    fn leading_six_reread_as_yen() {
        assert_eq!(correct("price 6124,896 today"), "price ¥124,896 today");
        assert_eq!(correct("price 6124896 today"), "price ¥124,896 today");
    }

    #[test]
    fn yen_amount_starting_with_six_survives() {
        assert_eq!(correct("¥612,345"), "¥612,345");
    }

    #[test]
    fn period_as_thousands_comma() {
        assert_eq!(correct("¥64.800"), "¥64,800");
        assert_eq!(correct("64.800"), "64,800");
    }

    #[test]
    fn space_between_yen_and_digits_removed() {
        assert_eq!(correct("¥ 64,800"), "¥64,800");
    }

    #[test]
    fn noise_lines_dropped() {
        let input = "ASUS AirVision M1\n-12489\n7\n48\n100";
        assert_eq!(correct(input), "ASUS AirVision M1\n48\n100");
    }

    #[test]
    fn duplicate_price_lines_deduplicated() {
        let input = "Half 64,800\nearly bird price\n¥64,800\n¥124,896";
        assert_eq!(correct(input), "¥64,800\nearly bird price\n¥124,896");
    }

    #[test]
    fn glued_yen_amounts_split() {
        assert_eq!(correct("launch ¥64,800¥124,896 deal"), "launch ¥64,800 ¥124,896 deal");
    }

    #[test]
    fn correction_is_idempotent() {
        let inputs = [
            "Half 64,800",
            "price Half 64,800 today",
            "¥ 64,800",
            "Half 64,800\nearly bird price\n¥64,800\n¥124,896",
            "price 6124896 today",
            "¥612,345",
            "48 OFF and 6111,420 later",
            "launch ¥64,800¥124,896 deal",
            "Red Air Vision on sale",
        ];
        for input in inputs {
            let once = correct(input);
            assert_eq!(correct(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn brand_misreads_repaired() {
        assert_eq!(correct("Red Air Vision glasses"), "ASUS AirVision glasses");
        assert_eq!(correct("Airyision M+ headset"), "AirVision M1 headset");
    }
}
