use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Role an amount plays in the listing, inferred from its surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountKind {
    Goal,
    Current,
    Price,
    Discount,
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
pub struct Amount {
    /// Numeric value with separators stripped.
    pub value: u64,
    /// The matched text, separators and currency marks included.
    pub formatted: String,
    #[serde(rename = "type")]
    pub kind: AmountKind,
    /// ISO-style code, or empty when nothing identified one.
    pub currency: String,
    /// Up to twenty characters of surrounding text on each side.
    pub context: String,
}

/// Candidate patterns in priority order. Keyword-anchored forms run before
/// plain currency forms so a "goal: ¥500,000" is seen with its keyword
/// context intact; the bare catch-all runs last. A pattern may carry a
/// currency hint used when nothing in the match or context decides it.
static AMOUNT_PATTERNS: LazyLock<Vec<(Regex, Option<&'static str>)>> = LazyLock::new(|| {
    let pat = |re: &str, hint: Option<&'static str>| (Regex::new(re).unwrap(), hint);
    vec![
        pat(
            r"(?i)(?:funding goal|goal|target|目標|目标)[:\s]*((?:NT\$|[¥￥$€£₹₩Y])?\d[\d,]*)",
            None,
        ),
        pat(
            r"(?i)(?:raised|funded|current|現在|现在)[:\s]*((?:NT\$|[¥￥$€£₹₩Y])?\d[\d,]*)",
            None,
        ),
        pat(r"(?i)([¥￥Y]\d[\d,]*)", Some("JPY")),
        pat(r"(?i)(\d[\d,]*)\s*(?:yen|円)", Some("JPY")),
        pat(r"(NT\$\d[\d,]*)", Some("TWD")),
        pat(r"(\$\d[\d,]*)", Some("USD")),
        pat(r"(€\d[\d,]*)", Some("EUR")),
        pat(r"(£\d[\d,]*)", Some("GBP")),
        pat(r"(₹\d[\d,]*)", Some("INR")),
        pat(r"(₩\d[\d,]*)", Some("KRW")),
        pat(r"((?:CNY|HKD|SGD)\s?\d[\d,]*)", None),
        pat(r"(?i)(\d[\d,]*)\s*(?:dollars?|usd)", Some("USD")),
        pat(r"(?i)(\d[\d,]*)\s*(?:euros?|eur)", Some("EUR")),
        pat(r"(?i)(\d[\d,]*)\s*(?:pounds?|gbp)", Some("GBP")),
        pat(r"(?i)(\d[\d,]*)\s*(?:rupees?|inr)", Some("INR")),
        pat(r"(?i)(\d[\d,]*)\s*(?:won|krw)", Some("KRW")),
        pat(r"(?i)(\d+)%\s*(?:off|discount)", None),
        pat(r"(?i)(?:off|discount)[:\s]*(\d+)%", None),
        pat(r"([¥￥$€£₹₩]?\d[\d,]*)", None),
    ]
});

static RE_DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d[\d,]*").unwrap());

const GOAL_WORDS: &[&str] = &["goal", "target", "目標", "目标"];
const CURRENT_WORDS: &[&str] = &["raised", "funded", "current", "現在", "现在"];
const PRICE_WORDS: &[&str] = &["price", "cost", "value", "価格", "値段"];
const DISCOUNT_WORDS: &[&str] = &["off", "discount", "割引"];

const CONTEXT_RADIUS: usize = 20;

/// Extracts monetary amounts from text. Results are unique by value and
/// sorted largest first; ties in pattern priority go to the earlier match.
pub fn extract_amounts(text: &str) -> Vec<Amount> {
    let mut amounts: Vec<Amount> = Vec::new();
    for (re, hint) in AMOUNT_PATTERNS.iter() {
        for caps in re.captures_iter(text) {
            let matched = match caps.get(1) {
                Some(m) => m,
                None => continue,
            };
            let formatted = matched.as_str();
            let value = match parse_value(formatted) {
                Some(v) => v,
                None => continue,
            };
            // Single digits are nearly always bullet numbering or noise.
            if value < 10 {
                continue;
            }
            let context = context_window(text, matched.start(), matched.end()).to_lowercase();
            let kind = classify(&context);
            let currency = infer_currency(formatted, &context, *hint);
            if looks_like_product_code(formatted, &currency, value) {
                continue;
            }
            amounts.push(Amount {
                value,
                formatted: formatted.to_string(),
                kind,
                currency,
                context,
            });
        }
    }
    amounts.sort_by(|a, b| b.value.cmp(&a.value));
    let mut seen: HashSet<u64> = HashSet::new();
    amounts.retain(|a| seen.insert(a.value));
    amounts
}

fn parse_value(formatted: &str) -> Option<u64> {
    let run = RE_DIGIT_RUN.find(formatted)?;
    run.as_str().replace(',', "").parse().ok()
}

fn classify(context: &str) -> AmountKind {
    let has = |words: &[&str]| words.iter().any(|w| context.contains(w));
    if has(GOAL_WORDS) {
        AmountKind::Goal
    } else if has(CURRENT_WORDS) {
        AmountKind::Current
    } else if has(PRICE_WORDS) {
        AmountKind::Price
    } else if has(DISCOUNT_WORDS) {
        AmountKind::Discount
    } else {
        AmountKind::Unknown
    }
}

fn infer_currency(formatted: &str, context: &str, hint: Option<&'static str>) -> String {
    if let Some(code) = hint {
        return code.to_string();
    }
    let ctx_has = |words: &[&str]| words.iter().any(|w| context.contains(w));
    let code = if formatted.contains('¥')
        || formatted.contains('￥')
        || ctx_has(&["yen", "円", "jpy"])
        || yen_spelled_with_y(formatted)
    {
        "JPY"
    } else if formatted.contains("NT$") {
        "TWD"
    } else if formatted.contains('$') || ctx_has(&["dollar", "usd"]) {
        "USD"
    } else if formatted.contains('€') || ctx_has(&["euro", "eur"]) {
        "EUR"
    } else if formatted.contains('£') || ctx_has(&["pound", "gbp"]) {
        "GBP"
    } else if formatted.contains('₹') || ctx_has(&["rupee", "inr"]) {
        "INR"
    } else if formatted.contains('₩') || ctx_has(&["krw"]) {
        "KRW"
    } else if formatted.starts_with("CNY") || ctx_has(&["cny", "yuan", "rmb"]) {
        "CNY"
    } else if formatted.starts_with("HKD") || ctx_has(&["hkd", "hong kong"]) {
        "HKD"
    } else if formatted.starts_with("SGD") || ctx_has(&["sgd", "singapore"]) {
        "SGD"
    } else {
        ""
    };
    code.to_string()
}

// "Y64,800" is a misread yen sign, not a code.
fn yen_spelled_with_y(formatted: &str) -> bool {
    let mut chars = formatted.chars();
    matches!(chars.next(), Some('Y') | Some('y'))
        && chars.clone().next().is_some()
        && chars.all(|c| c.is_ascii_digit() || c == ',')
}

/// Bare five-to-seven digit numbers under a million with no currency
/// evidence are model or item numbers, not prices.
fn looks_like_product_code(formatted: &str, currency: &str, value: u64) -> bool {
    currency.is_empty()
        && !formatted.chars().any(|c| "¥￥$€£₹₩".contains(c))
        && value < 1_000_000
        && (5..=7).contains(&value.to_string().len())
}

/// Character-aligned window of up to twenty characters on each side of a
/// match, safe on multi-byte text.
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
