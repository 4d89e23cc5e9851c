use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use crate::languages;

const TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const WEB_TRANSLATION_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone)]
pub struct Translation {
    pub original_text: String,
    pub english_text: String,
    pub detected_language: String,
    pub confidence: f64,
}

pub type TranslateFuture = Pin<Box<dyn Future<Output = Result<Translation>> + Send>>;

pub trait Translate: Send + Sync {
    fn translate(&self, text: &str) -> TranslateFuture;
}

/// Translator backed by the public Google web endpoint. Unofficial but
/// keyless, hence the fixed sub-1.0 confidence on every result.
#[derive(Clone)]
pub struct GoogleWebTranslator {
    client: reqwest::Client,
}

impl GoogleWebTranslator {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for GoogleWebTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translate for GoogleWebTranslator {
    fn translate(&self, text: &str) -> TranslateFuture {
        let client = self.client.clone();
        let text = text.to_string();
        Box::pin(async move {
            let detected_language = languages::detect_language(&text).to_string();
            let response = client
                .get(TRANSLATE_ENDPOINT)
                .query(&[
                    ("client", "gtx"),
                    ("sl", "auto"),
                    ("tl", "en"),
                    ("dt", "t"),
                    ("q", text.as_str()),
                ])
                .send()
                .await
                .context("translation request failed")?
                .error_for_status()
                .context("translation request rejected")?;
            let payload: Value = response
                .json()
                .await
                .context("translation response was not JSON")?;
            // The payload is a nested array; segment texts sit at [0][i][0].
            let english_text: String = payload
                .get(0)
                .and_then(Value::as_array)
                .map(|segments| {
                    segments
                        .iter()
                        .filter_map(|seg| seg.get(0).and_then(Value::as_str))
                        .collect()
                })
                .unwrap_or_default();
            if english_text.trim().is_empty() {
                return Err(anyhow!("translation response carried no text"));
            }
            Ok(Translation {
                original_text: text,
                english_text,
                detected_language,
                confidence: WEB_TRANSLATION_CONFIDENCE,
            })
        })
    }
}

/// Outcome of translating a text block line by line.
#[derive(Debug, Clone)]
pub struct SegmentTranslation {
    pub original_text: String,
    pub english_text: String,
    /// Languages seen across lines, in first-seen order, no duplicates.
    pub detected_languages: Vec<String>,
    /// Mean per-line confidence: 1.0 for passthrough lines, the translator's
    /// own figure for translated ones, 0.0 for lines that failed.
    pub translation_confidence: f64,
}

/// Translates a block line by line. Lines without CJK text pass through
/// untouched at full confidence; a failed translation degrades that line to
/// its original text rather than failing the whole block.
pub async fn translate_segments<T: Translate + ?Sized>(
    translator: &T,
    text: &str,
) -> SegmentTranslation {
    let mut original_lines: Vec<String> = Vec::new();
    let mut english_lines: Vec<String> = Vec::new();
    let mut detected_languages: Vec<String> = Vec::new();
    let mut confidence_total = 0.0f64;
    let mut line_count = 0usize;
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            original_lines.push(String::new());
            english_lines.push(String::new());
            continue;
        }
        let (original, english, language, confidence) = if !languages::has_cjk(line) {
            let language = languages::detect_language(line).to_string();
            (line.to_string(), line.to_string(), language, 1.0)
        } else {
            match translator.translate(line).await {
                Ok(t) => (t.original_text, t.english_text, t.detected_language, t.confidence),
                Err(err) => {
                    tracing::warn!("line translation failed, keeping original: {err:#}");
                    let language = languages::detect_language(line).to_string();
                    (line.to_string(), line.to_string(), language, 0.0)
                }
            }
        };
        if !detected_languages.contains(&language) {
            detected_languages.push(language);
        }
        confidence_total += confidence;
        line_count += 1;
        original_lines.push(original);
        english_lines.push(english);
    }
    let translation_confidence = if line_count > 0 {
        confidence_total / line_count as f64
    } else {
        0.0
    };
    SegmentTranslation {
        original_text: original_lines.join("\n"),
        english_text: english_lines.join("\n"),
        detected_languages,
        translation_confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTranslator {
        english: &'static str,
    }

    impl Translate for FixedTranslator {
        fn translate(&self, text: &str) -> TranslateFuture {
            let original = text.to_string();
            let english = self.english.to_string();
            Box::pin(async move {
                Ok(Translation {
                    detected_language: languages::detect_language(&original).to_string(),
                    original_text: original,
                    english_text: english,
                    confidence: 0.8,
                })
            })
        }
    }

    struct FailingTranslator;

    impl Translate for FailingTranslator {
        fn translate(&self, _text: &str) -> TranslateFuture {
            Box::pin(async { Err(anyhow!("backend unavailable")) })
        }
    }

    #[tokio::test]
    async fn ascii_lines_pass_through() {
        let out = translate_segments(&FailingTranslator, "Early bird 48% OFF").await;
        assert_eq!(out.english_text, "Early bird 48% OFF");
        assert_eq!(out.translation_confidence, 1.0);
        assert_eq!(out.detected_languages, vec!["en"]);
    }

    #[tokio::test]
    async fn cjk_lines_translated() {
        let translator = FixedTranslator {
            english: "early bird price",
        };
        let out = translate_segments(&translator, "早割価格\nEarly bird").await;
        assert_eq!(out.english_text, "early bird price\nEarly bird");
        assert_eq!(out.original_text, "早割価格\nEarly bird");
        assert_eq!(out.detected_languages, vec!["zh", "en"]);
        assert!((out.translation_confidence - 0.9).abs() < 1e-9);
    }

    #[tokio::test]
    async fn failed_translation_degrades_to_original() {
        let out = translate_segments(&FailingTranslator, "早割価格").await;
        assert_eq!(out.english_text, "早割価格");
        assert_eq!(out.translation_confidence, 0.0);
    }

    #[tokio::test]
    async fn blank_lines_preserved() {
        let out = translate_segments(&FailingTranslator, "one\n\ntwo").await;
        assert_eq!(out.english_text, "one\n\ntwo");
    }
}
