use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::aggregate::NO_TEXT_SENTINEL;
use crate::amounts::{self, Amount, AmountKind};
use crate::dates::{self, DateKind};
use crate::entities::{EntityLabel, EntitySpan};
use crate::normalize;

/// Per-rule contributions to the extraction confidence score. The sum is
/// clamped to 1.0 before reporting.
pub mod confidence {
    pub const PLATFORM: f64 = 0.2;
    pub const TITLE: f64 = 0.15;
    pub const AMOUNTS: f64 = 0.3;
    pub const DISCOUNT: f64 = 0.15;
    pub const ACHIEVEMENT: f64 = 0.2;
    pub const PRODUCT_CODE: f64 = 0.1;
    pub const SUPPORTERS: f64 = 0.15;
    pub const DATES: f64 = 0.1;
    pub const LOCATION: f64 = 0.1;
    pub const URL: f64 = 0.1;
    pub const OWNER: f64 = 0.1;
    pub const STATUS: f64 = 0.1;
}

/// Everything the aggregation and translation stages learned about the text,
/// handed to the record builder in one piece.
#[derive(Debug, Clone, Default)]
pub struct OcrBundle {
    pub original_text: String,
    pub english_text: Option<String>,
    pub detected_languages: Vec<String>,
    pub translation_confidence: f64,
    pub total_results_found: usize,
}

/// Site-specific knobs for ambiguous extraction decisions.
#[derive(Debug, Clone)]
pub struct ExtractionPolicy {
    /// With two price-typed amounts, treat the larger as the original price
    /// and the smaller as the sale price.
    pub larger_price_is_original: bool,
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self {
            larger_price_is_original: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionRecord {
    pub target_site: Option<String>,
    pub market: Option<String>,
    pub status: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub project_owner: Option<String>,
    pub owner_website: Option<String>,
    pub owner_sns: Option<String>,
    pub owner_country: Option<String>,
    pub contact_info: Option<String>,
    pub achievement_rate: Option<String>,
    pub discount_rate: Option<String>,
    pub supporters: Option<String>,
    pub amount: Option<String>,
    pub support_amount: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub crowdfund_start_date: Option<String>,
    pub crowdfund_end_date: Option<String>,
    pub current_or_completed_project: String,
    pub currency: Option<String>,
    pub product_code: Option<String>,
    pub detected_languages: Vec<String>,
    pub translation_confidence: f64,
    pub original_text_available: bool,
    pub extraction_confidence: f64,
    pub raw_text_length: usize,
    pub total_ocr_results: usize,
}

impl ExtractionRecord {
    fn empty(bundle: &OcrBundle, text_length: usize, original_available: bool) -> Self {
        Self {
            target_site: None,
            market: None,
            status: "Live".to_string(),
            url: None,
            image_url: None,
            title: None,
            original_title: None,
            project_owner: None,
            owner_website: None,
            owner_sns: None,
            owner_country: None,
            contact_info: None,
            achievement_rate: None,
            discount_rate: None,
            supporters: None,
            amount: None,
            support_amount: None,
            start_date: None,
            end_date: None,
            crowdfund_start_date: None,
            crowdfund_end_date: None,
            current_or_completed_project: "Current".to_string(),
            currency: None,
            product_code: None,
            detected_languages: bundle.detected_languages.clone(),
            translation_confidence: bundle.translation_confidence,
            original_text_available: original_available,
            extraction_confidence: 0.0,
            raw_text_length: text_length,
            total_ocr_results: bundle.total_results_found,
        }
    }
}

const PLATFORMS: &[(&[&str], &str)] = &[
    (&["indiegogo"], "Indiegogo"),
    (&["kickstarter"], "Kickstarter"),
    (&["gofundme", "go fund me"], "Gofundme"),
    (&["fundrazr"], "Fundrazr"),
    (&["crowdfunding"], "Crowdfunding"),
    (&["patreon"], "Patreon"),
    (&["wefunder"], "Wefunder"),
    (&["seedinvest"], "Seedinvest"),
];

static RE_SYMBOLS_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s$%,./\-¥￥Y\[\]]+$").unwrap());
static RE_BRACKET_LEAD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[.*\]").unwrap());
static RE_DISCOUNT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\d+%\s*off$").unwrap());

const TITLE_CROWDFUND_WORDS: &[&str] = &["project", "campaign", "fund", "help", "support"];
const TITLE_PRODUCT_WORDS: &[&str] = &["airvision", "teus", "mi", "pro", "max", "mini"];
const TITLE_CJK_WORDS: &[&str] = &["早割", "価格", "商品", "製品"];

enum PercentKind {
    Discount,
    Achievement,
}

static PERCENT_PATTERNS: LazyLock<Vec<(Regex, PercentKind)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)(\d+(?:\.\d+)?)%\s*(?:off|discount)").unwrap(),
            PercentKind::Discount,
        ),
        (
            Regex::new(r"(?i)(?:off|discount)[:\s]*(\d+(?:\.\d+)?)%").unwrap(),
            PercentKind::Discount,
        ),
        (
            Regex::new(r"(\d+(?:\.\d+)?)%").unwrap(),
            PercentKind::Achievement,
        ),
        (
            Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*percent").unwrap(),
            PercentKind::Achievement,
        ),
        (
            Regex::new(r"(?i)funded\s*[:.\-]?\s*(\d+(?:\.\d+)?)%").unwrap(),
            PercentKind::Achievement,
        ),
    ]
});

static CODE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\b(\d{5,8})\b").unwrap(),
        Regex::new(r"\b([A-Z]{2,4}\d{3,6})\b").unwrap(),
        Regex::new(r"(?i)\b(Item\s*[:#]?\s*[\w-]+)").unwrap(),
        Regex::new(r"(?i)\b(Model\s*[:#]?\s*[\w-]+)").unwrap(),
    ]
});

static SUPPORTER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)(\d+(?:,\d{3})*)\s*(?:supporters?|backers?|funders?)").unwrap(),
        Regex::new(r"(?i)(?:supporters?|backers?)[:\s]*(\d+(?:,\d{3})*)").unwrap(),
        Regex::new(r"(\d+(?:,\d{3})*)\s*人(?:が|の)").unwrap(),
        Regex::new(r"(\d+(?:,\d{3})*)\s*人(?:支持|支援)").unwrap(),
    ]
});

static RE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).unwrap());
static RE_WWW_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"www\.[^\s<>"{}|\\^`\[\]]+"#).unwrap());

const STATUS_RULES: &[(&str, &[&str])] = &[
    ("Funded", &["funded", "successful", "completed", "達成", "成功"]),
    ("Cancelled", &["cancelled", "canceled", "failed", "unsuccessful", "中止"]),
    ("Live", &["live", "active", "ongoing", "in progress", "進行中"]),
];

/// True when the caller either asked for everything or named one of the
/// record fields this rule can fill.
fn wants(fields: Option<&[String]>, names: &[&str]) -> bool {
    match fields {
        None => true,
        Some(list) => list.iter().any(|f| names.iter().any(|n| f == n)),
    }
}

/// Builds an extraction record from aggregated (and possibly translated)
/// OCR text. Extraction prefers the English rendition when one exists, and
/// every rule only fills fields that are still unset.
pub fn build_record(
    bundle: &OcrBundle,
    entities: &[EntitySpan],
    policy: &ExtractionPolicy,
    fields: Option<&[String]>,
) -> ExtractionRecord {
    let raw_text = bundle
        .english_text
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(&bundle.original_text);
    let original_available = bundle
        .english_text
        .as_deref()
        .is_some_and(|e| e != bundle.original_text);
    let text = normalize::clean_and_merge(raw_text);
    let mut record = ExtractionRecord::empty(bundle, text.chars().count(), original_available);
    if text.is_empty() || text == NO_TEXT_SENTINEL {
        return record;
    }
    let lower = text.to_lowercase();
    let mut score = 0.0f64;

    if wants(fields, &["target_site", "market"]) {
        extract_platform(&lower, &mut record, &mut score);
    }
    if wants(fields, &["title", "original_title"]) {
        extract_title(&text, &mut record, &mut score);
    }
    let extracted = if wants(fields, &["amount", "support_amount", "currency", "product_code"]) {
        amounts::extract_amounts(&text)
    } else {
        Vec::new()
    };
    if wants(fields, &["amount", "support_amount", "currency"]) {
        assign_amounts(&extracted, policy, &mut record, &mut score);
    }
    if wants(fields, &["discount_rate", "achievement_rate"]) {
        extract_percentages(&text, &mut record, &mut score);
    }
    if wants(fields, &["product_code"]) {
        extract_product_code(&text, &extracted, &mut record, &mut score);
    }
    if wants(fields, &["supporters"]) {
        extract_supporters(&text, &mut record, &mut score);
    }
    if wants(fields, &["start_date", "end_date", "crowdfund_start_date", "crowdfund_end_date"]) {
        extract_dates(&text, &mut record, &mut score);
    }
    if wants(fields, &["owner_country"]) {
        if let Some(place) = entities.iter().find(|e| e.label == EntityLabel::Place) {
            record.owner_country = Some(place.text.clone());
            score += confidence::LOCATION;
        }
    }
    if wants(fields, &["url"]) {
        extract_url(&text, &mut record, &mut score);
    }
    if wants(fields, &["project_owner"]) {
        if let Some(person) = entities.iter().find(|e| e.label == EntityLabel::Person) {
            record.project_owner = Some(person.text.clone());
            score += confidence::OWNER;
        }
    }
    if wants(fields, &["status"]) {
        extract_status(&lower, &mut record, &mut score);
    }

    record.extraction_confidence = round2(score.min(1.0));
    record
}

fn extract_platform(lower: &str, record: &mut ExtractionRecord, score: &mut f64) {
    for (keywords, name) in PLATFORMS {
        if keywords.iter().any(|k| lower.contains(k)) {
            record.target_site = Some(name.to_string());
            record.market = Some(name.to_string());
            *score += confidence::PLATFORM;
            return;
        }
    }
}

/// Scores the first eight plausible lines and picks the best as the title.
/// Longer, earlier lines win; product and campaign vocabulary adds weight.
fn extract_title(text: &str, record: &mut ExtractionRecord, score: &mut f64) {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| l.chars().count() > 1)
        .collect();
    let mut candidates: Vec<(f64, &str)> = Vec::new();
    for (i, line) in lines.iter().take(8).enumerate() {
        if RE_SYMBOLS_ONLY.is_match(line)
            || RE_BRACKET_LEAD.is_match(line)
            || RE_DISCOUNT_LINE.is_match(line)
        {
            continue;
        }
        let chars = line.chars().count();
        if chars < 3 {
            continue;
        }
        let lower = line.to_lowercase();
        let mut weight = 0.1 * chars as f64 + 0.2 * (8 - i) as f64;
        if TITLE_CROWDFUND_WORDS.iter().any(|w| lower.contains(w)) {
            weight += 0.5;
        }
        if TITLE_PRODUCT_WORDS.iter().any(|w| lower.contains(w)) {
            weight += 0.3;
        }
        if TITLE_CJK_WORDS.iter().any(|w| line.contains(w)) {
            weight += 0.4;
        }
        let single_short_lower =
            !line.contains(' ') && chars < 6 && !line.chars().next().is_some_and(char::is_uppercase);
        if single_short_lower {
            weight -= 0.3;
        }
        candidates.push((weight, line));
    }
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
    let Some(best) = candidates.first() else {
        return;
    };
    let mut title = best.1.to_string();
    if title.starts_with('[') || title.chars().count() < 8 {
        if let Some(alt) = candidates
            .iter()
            .skip(1)
            .find(|c| c.0 > 0.3 && !c.1.starts_with('[') && c.1.chars().count() > 8)
        {
            title = alt.1.to_string();
        }
        if title.starts_with('[') {
            let has_price_line = text.lines().any(|l| l.contains('¥') || l.contains('￥'));
            title = if has_price_line { "Product Listing" } else { "Item" }.to_string();
        }
    }
    record.title = Some(title.clone());
    record.original_title = Some(title);
    *score += confidence::TITLE;
}

/// Maps typed amounts onto the goal/raised/price fields. Keyword-typed
/// amounts are authoritative; untyped ones fill remaining gaps, largest
/// first, with the original/sale split decided by policy.
fn assign_amounts(
    extracted: &[Amount],
    policy: &ExtractionPolicy,
    record: &mut ExtractionRecord,
    score: &mut f64,
) {
    if extracted.is_empty() {
        return;
    }
    *score += confidence::AMOUNTS;
    let of_kind = |kind: AmountKind| -> Vec<&Amount> {
        extracted.iter().filter(|a| a.kind == kind).collect()
    };
    let goals = of_kind(AmountKind::Goal);
    let currents = of_kind(AmountKind::Current);
    let prices = of_kind(AmountKind::Price);
    let unknowns = of_kind(AmountKind::Unknown);

    if record.support_amount.is_none() {
        if let Some(goal) = goals.first() {
            record.support_amount = Some(goal.formatted.clone());
        } else if extracted.len() >= 2 && prices.is_empty() {
            record.support_amount = Some(extracted[0].formatted.clone());
        }
    }
    if record.amount.is_none() {
        if let Some(current) = currents.first() {
            record.amount = Some(current.formatted.clone());
        } else if extracted.len() >= 2 && prices.is_empty() {
            record.amount = Some(extracted[1].formatted.clone());
        }
    }
    if !prices.is_empty() {
        if prices.len() >= 2 {
            // Sorted largest first, so the split is between the endpoints.
            let (original, sale) = if policy.larger_price_is_original {
                (prices[0], prices[prices.len() - 1])
            } else {
                (prices[prices.len() - 1], prices[0])
            };
            record
                .support_amount
                .get_or_insert_with(|| original.formatted.clone());
            record.amount.get_or_insert_with(|| sale.formatted.clone());
        } else {
            record
                .amount
                .get_or_insert_with(|| prices[0].formatted.clone());
        }
    } else if !unknowns.is_empty() && goals.is_empty() && currents.is_empty() {
        if unknowns.len() >= 2 {
            let (larger, smaller) = if policy.larger_price_is_original {
                (unknowns[0], unknowns[unknowns.len() - 1])
            } else {
                (unknowns[unknowns.len() - 1], unknowns[0])
            };
            record
                .support_amount
                .get_or_insert_with(|| larger.formatted.clone());
            record.amount.get_or_insert_with(|| smaller.formatted.clone());
        } else {
            record
                .amount
                .get_or_insert_with(|| unknowns[0].formatted.clone());
        }
    }
    if record.currency.is_none() && !extracted[0].currency.is_empty() {
        record.currency = Some(extracted[0].currency.clone());
    }
}

/// At most one percentage lands on the record: a discount-flavored match
/// becomes the discount rate, otherwise a plausible achievement rate wins.
/// The digits are kept as matched, so "48% OFF" yields "48%" not "48.0%".
fn extract_percentages(text: &str, record: &mut ExtractionRecord, score: &mut f64) {
    for (re, kind) in PERCENT_PATTERNS.iter() {
        for caps in re.captures_iter(text) {
            let digits = &caps[1];
            let Ok(value) = digits.parse::<f64>() else {
                continue;
            };
            match kind {
                PercentKind::Discount if (0.0..=100.0).contains(&value) => {
                    record.discount_rate = Some(format!("{digits}%"));
                    *score += confidence::DISCOUNT;
                    return;
                }
                PercentKind::Achievement if (0.0..=1000.0).contains(&value) => {
                    record.achievement_rate = Some(format!("{digits}%"));
                    *score += confidence::ACHIEVEMENT;
                    return;
                }
                _ => {}
            }
        }
    }
}

fn extract_product_code(
    text: &str,
    extracted: &[Amount],
    record: &mut ExtractionRecord,
    score: &mut f64,
) {
    let amount_values: HashSet<String> =
        extracted.iter().map(|a| a.value.to_string()).collect();
    for re in CODE_PATTERNS.iter() {
        for caps in re.captures_iter(text) {
            let code = caps[1].trim();
            if amount_values.contains(code) {
                continue;
            }
            if code.chars().any(|c| "¥￥$%.".contains(c)) {
                continue;
            }
            if let Ok(n) = code.parse::<u64>() {
                if n < 100 {
                    continue;
                }
            }
            record.product_code = Some(code.to_string());
            *score += confidence::PRODUCT_CODE;
            return;
        }
    }
}

fn extract_supporters(text: &str, record: &mut ExtractionRecord, score: &mut f64) {
    for re in SUPPORTER_PATTERNS.iter() {
        if let Some(caps) = re.captures(text) {
            let digits = &caps[1];
            let Ok(count) = digits.replace(',', "").parse::<u64>() else {
                continue;
            };
            if count > 0 {
                record.supporters = Some(digits.to_string());
                *score += confidence::SUPPORTERS;
                return;
            }
        }
    }
}

/// A keyword-typed date lands in its slot directly; otherwise the first
/// found date is read as the end and the second as the start, since listing
/// pages lead with the deadline.
fn extract_dates(text: &str, record: &mut ExtractionRecord, score: &mut f64) {
    let spans = dates::extract_dates(text);
    if spans.is_empty() {
        return;
    }
    let start = spans.iter().find(|s| s.kind == DateKind::Start);
    let end = spans.iter().find(|s| s.kind == DateKind::End);
    if let Some(span) = start {
        record.start_date = Some(span.raw.clone());
        record.crowdfund_start_date = Some(span.raw.clone());
    } else if spans.len() >= 2 {
        record.start_date = Some(spans[1].raw.clone());
        record.crowdfund_start_date = Some(spans[1].raw.clone());
    }
    if let Some(span) = end {
        record.end_date = Some(span.raw.clone());
        record.crowdfund_end_date = Some(span.raw.clone());
    } else {
        record.end_date = Some(spans[0].raw.clone());
        record.crowdfund_end_date = Some(spans[0].raw.clone());
    }
    if record.start_date.is_some() || record.end_date.is_some() {
        *score += confidence::DATES;
    }
}

fn extract_url(text: &str, record: &mut ExtractionRecord, score: &mut f64) {
    let found = RE_URL.find(text).or_else(|| RE_WWW_URL.find(text));
    if let Some(url) = found {
        record.url = Some(url.as_str().to_string());
        *score += confidence::URL;
    }
}

fn extract_status(lower: &str, record: &mut ExtractionRecord, score: &mut f64) {
    for (name, keywords) in STATUS_RULES {
        if keywords.iter().any(|k| lower.contains(k)) {
            record.status = name.to_string();
            *score += confidence::STATUS;
            return;
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
