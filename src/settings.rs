use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::record::ExtractionPolicy;

/// Resolved settings after all layers merged.
#[derive(Debug, Clone)]
pub struct Settings {
    pub larger_price_is_original: bool,
    pub translate: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            larger_price_is_original: true,
            translate: true,
        }
    }
}

impl Settings {
    pub fn policy(&self) -> ExtractionPolicy {
        ExtractionPolicy {
            larger_price_is_original: self.larger_price_is_original,
        }
    }

    fn merge(&mut self, file: SettingsFile) {
        if let Some(extraction) = file.extraction {
            if let Some(v) = extraction.larger_price_is_original {
                self.larger_price_is_original = v;
            }
        }
        if let Some(translate) = file.translate {
            if let Some(v) = translate.enabled {
                self.translate = v;
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    extraction: Option<ExtractionSection>,
    translate: Option<TranslateSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ExtractionSection {
    larger_price_is_original: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct TranslateSection {
    enabled: Option<bool>,
}

/// Loads settings.toml then settings.local.toml from the working directory
/// when present, then an explicitly named file, which must exist. Later
/// layers override earlier ones key by key.
pub fn load_settings(extra: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    for name in ["settings.toml", "settings.local.toml"] {
        let path = Path::new(name);
        if path.is_file() {
            settings.merge(read_settings_file(path)?);
        }
    }
    if let Some(path) = extra {
        settings.merge(read_settings_file(path)?);
    }
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<SettingsFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert!(settings.larger_price_is_original);
        assert!(settings.translate);
    }

    #[test]
    fn merge_overrides_only_named_keys() {
        let mut settings = Settings::default();
        let file: SettingsFile =
            toml::from_str("[extraction]\nlarger_price_is_original = false\n").unwrap();
        settings.merge(file);
        assert!(!settings.larger_price_is_original);
        assert!(settings.translate);
    }

    #[test]
    fn later_layers_win() {
        let mut settings = Settings::default();
        let base: SettingsFile =
            toml::from_str("[translate]\nenabled = false\n").unwrap();
        let local: SettingsFile =
            toml::from_str("[translate]\nenabled = true\n").unwrap();
        settings.merge(base);
        settings.merge(local);
        assert!(settings.translate);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(load_settings(Some(Path::new("does-not-exist.toml"))).is_err());
    }

    #[test]
    fn policy_mirrors_settings() {
        let mut settings = Settings::default();
        settings.larger_price_is_original = false;
        assert!(!settings.policy().larger_price_is_original);
    }
}
