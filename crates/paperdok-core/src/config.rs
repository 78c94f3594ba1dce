//! `paperdok.toml`
//!
//! ```toml
//! [service]
//! url = "https://pdf.example.org"
//! timeout_secs = 30
//! enabled = true
//! max_retries = 3
//! backoff_factor = 0.5
//!
//! [pdf]
//! font_paths = ["fonts/TimesNewRoman.ttf"]
//! ```
//!
//! Every key is optional. Service settings are then overridden by the
//! environment (see [`ServiceConfig::apply_env`]).

use std::path::{Path, PathBuf};

use paperdok_service::ServiceConfig;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

/// Conventional configuration file name
pub const CONFIG_FILE: &str = "paperdok.toml";

/// Top-level settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperdokConfig {
    pub service: ServiceConfig,
    pub pdf: PdfSettings,
}

/// Local PDF conversion settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfSettings {
    /// Font files loaded by the Typst compiler
    pub font_paths: Vec<PathBuf>,
}

impl PaperdokConfig {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Read a config file; relative font paths resolve against its directory
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            GenerationError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml_str(&text)
            .map_err(|e| GenerationError::Config(format!("{}: {}", path.display(), e)))?;

        if let Some(dir) = path.parent() {
            for font in &mut config.pdf.font_paths {
                if font.is_relative() {
                    *font = dir.join(&*font);
                }
            }
        }
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides
    pub fn with_env(mut self) -> Self {
        self.service.apply_env();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_default() {
        let config = PaperdokConfig::from_toml_str("").unwrap();
        assert_eq!(config, PaperdokConfig::default());
        assert!(config.service.enabled);
    }

    #[test]
    fn test_partial_tables() {
        let config = PaperdokConfig::from_toml_str(
            r#"
[service]
url = "http://pdf:5000"
enabled = false

[pdf]
font_paths = ["a.ttf"]
"#,
        )
        .unwrap();
        assert_eq!(config.service.url, "http://pdf:5000");
        assert!(!config.service.enabled);
        assert_eq!(config.service.timeout_secs, 30);
        assert_eq!(config.pdf.font_paths, vec![PathBuf::from("a.ttf")]);
    }

    #[test]
    fn test_wrong_type_rejected() {
        assert!(PaperdokConfig::from_toml_str("[service]\ntimeout_secs = \"soon\"").is_err());
    }

    #[test]
    fn test_load_resolves_fonts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[pdf]\nfont_paths = [\"fonts/serif.ttf\", \"/abs.ttf\"]\n").unwrap();

        let config = PaperdokConfig::load(&path).unwrap();
        assert_eq!(config.pdf.font_paths[0], dir.path().join("fonts/serif.ttf"));
        assert_eq!(config.pdf.font_paths[1], PathBuf::from("/abs.ttf"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = PaperdokConfig::load(Path::new("/nonexistent/paperdok.toml")).unwrap_err();
        assert!(matches!(err, GenerationError::Config(_)));
    }
}
