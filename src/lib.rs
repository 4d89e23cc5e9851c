pub mod aggregate;
pub mod amounts;
pub mod correction;
pub mod dates;
pub mod entities;
pub mod languages;
pub mod logging;
pub mod normalize;
pub mod record;
pub mod settings;
pub mod translate;

use std::path::Path;

use anyhow::{Result, anyhow};

pub use amounts::{Amount, AmountKind};
pub use dates::{DateKind, DateSpan};
pub use entities::{EntityLabel, EntitySpan, RecognizeEntities};
pub use record::{ExtractionPolicy, ExtractionRecord, OcrBundle};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub settings_path: Option<String>,
    pub no_translate: bool,
    pub pretty: bool,
    /// Record fields to extract; empty means all of them.
    pub fields: Vec<String>,
}

/// Runs the whole pipeline on raw OCR candidates and returns the extraction
/// record as JSON.
pub async fn run(config: Config, candidates: Vec<String>) -> Result<String> {
    run_with(config, candidates, None).await
}

/// Same as [`run`] but with an optional entity recognizer supplying project
/// owner and country spans.
pub async fn run_with(
    config: Config,
    candidates: Vec<String>,
    recognizer: Option<&dyn RecognizeEntities>,
) -> Result<String> {
    if candidates.is_empty() {
        return Err(anyhow!("no text candidates provided"));
    }
    let settings = settings::load_settings(config.settings_path.as_deref().map(Path::new))?;
    let merged = aggregate::aggregate_candidates(&candidates);
    tracing::debug!(characters = merged.chars().count(), "aggregated candidate text");

    let translate_wanted = settings.translate
        && !config.no_translate
        && merged != aggregate::NO_TEXT_SENTINEL
        && languages::has_cjk(&merged);
    let bundle = if translate_wanted {
        let translator = translate::GoogleWebTranslator::new();
        let segments = translate::translate_segments(&translator, &merged).await;
        // Translation can reintroduce artifacts the correction pass knows
        // how to fix, so both renditions go through it again.
        record::OcrBundle {
            original_text: correction::correct(&segments.original_text),
            english_text: Some(correction::correct(&segments.english_text)),
            detected_languages: segments.detected_languages,
            translation_confidence: segments.translation_confidence,
            total_results_found: candidates.len(),
        }
    } else {
        let language = languages::detect_language(&merged).to_string();
        record::OcrBundle {
            original_text: merged.clone(),
            english_text: Some(merged),
            detected_languages: vec![language],
            translation_confidence: 1.0,
            total_results_found: candidates.len(),
        }
    };

    let entities = match recognizer {
        Some(recognizer) => {
            let text = bundle
                .english_text
                .as_deref()
                .unwrap_or(&bundle.original_text);
            recognizer.recognize(text).unwrap_or_else(|err| {
                tracing::warn!("entity recognition failed: {err:#}");
                Vec::new()
            })
        }
        None => Vec::new(),
    };

    let fields = if config.fields.is_empty() {
        None
    } else {
        Some(config.fields.as_slice())
    };
    let extraction = record::build_record(&bundle, &entities, &settings.policy(), fields);
    let json = if config.pretty {
        serde_json::to_string_pretty(&extraction)?
    } else {
        serde_json::to_string(&extraction)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_candidate_list_is_an_error() {
        let result = run(Config::default(), Vec::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn ascii_pipeline_produces_record_json() {
        let config = Config {
            no_translate: true,
            ..Config::default()
        };
        let candidates = vec!["Regular price ¥124,896\nSale price Half 64,800".to_string()];
        let json = run(config, candidates).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["amount"], "¥64,800");
        assert_eq!(value["support_amount"], "¥124,896");
        assert_eq!(value["currency"], "JPY");
        assert_eq!(value["total_ocr_results"], 1);
    }

    #[tokio::test]
    async fn recognizer_hook_is_optional() {
        let config = Config {
            no_translate: true,
            ..Config::default()
        };
        let json = run_with(
            config,
            vec!["ASUS AirVision M1 Smart Glasses".to_string()],
            Some(&entities::NoRecognizer),
        )
        .await
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["project_owner"], serde_json::Value::Null);
        assert_eq!(value["title"], "ASUS AirVision M1 Smart Glasses");
    }

    #[tokio::test]
    async fn noise_only_candidates_yield_empty_record() {
        let config = Config {
            no_translate: true,
            ..Config::default()
        };
        let json = run(config, vec!["7".to_string()]).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["extraction_confidence"], 0.0);
        assert_eq!(value["title"], serde_json::Value::Null);
    }
}
