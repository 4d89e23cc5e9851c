use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityLabel {
    Person,
    Place,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntitySpan {
    pub text: String,
    pub label: EntityLabel,
}

/// Named-entity recognition is pluggable; the record builder only consumes
/// plain spans and works fine with none at all.
pub trait RecognizeEntities: Send + Sync {
    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>>;
}

/// Recognizer that finds nothing, for pipelines without an NER backend.
pub struct NoRecognizer;

impl RecognizeEntities for NoRecognizer {
    fn recognize(&self, _text: &str) -> Result<Vec<EntitySpan>> {
        Ok(Vec::new())
    }
}
