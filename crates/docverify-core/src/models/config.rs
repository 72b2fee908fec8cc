//! Configuration structures for the verification pipeline.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{Result, VerifyError};

/// Environment variable overriding `input.input_dir`.
pub const INPUT_DIR_ENV: &str = "INPUT_DIR";

/// Main configuration for a verification run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Input layout configuration.
    pub input: InputConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Model file configuration.
    pub models: ModelConfig,

    /// PDF rasterization configuration.
    pub pdf: PdfConfig,

    /// Field matching configuration.
    pub matching: MatchingConfig,

    /// Report output configuration.
    pub report: ReportConfig,
}

/// Where documents are read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Root directory holding documents or one subdirectory per batch.
    pub input_dir: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input_docs"),
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Document language (ISO 639-1 code).
    pub language: String,

    /// Keep `[UNK]` glyph markers in recognized text.
    pub keep_unknown_glyphs: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "pt".to_string(),
            keep_unknown_glyphs: false,
        }
    }
}

impl OcrConfig {
    /// Recognition script family for the configured language.
    pub fn script(&self) -> &'static str {
        match self.language.trim().to_lowercase().as_str() {
            "pt" | "en" | "es" | "fr" | "de" | "it" | "nl" | "pl" | "ro" | "ca" | "sv" | "da"
            | "no" | "fi" | "cs" | "hu" | "tr" | "latin" => "latin",
            "ru" | "uk" | "bg" | "be" | "sr" | "mn" | "cyrillic" => "cyrillic",
            "ar" | "fa" | "ur" | "ug" | "arabic" => "arabic",
            "hi" | "mr" | "ne" | "devanagari" => "devanagari",
            other => {
                warn!("No recognition script known for language '{}', using latin", other);
                "latin"
            }
        }
    }
}

/// Model file names and location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Recognition model file name (default: `<script>_rec.onnx`).
    pub recognition_model: Option<String>,

    /// Character dictionary file name (default: `<script>_dict.txt`).
    pub dictionary: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: None,
            dictionary: None,
        }
    }
}

/// Resolved model file paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub detection: PathBuf,
    pub recognition: PathBuf,
    pub dictionary: PathBuf,
}

impl ModelConfig {
    /// Resolve model paths for a recognition script.
    pub fn resolve(&self, script: &str) -> ModelPaths {
        let recognition = self
            .recognition_model
            .clone()
            .unwrap_or_else(|| format!("{}_rec.onnx", script));
        let dictionary = self
            .dictionary
            .clone()
            .unwrap_or_else(|| format!("{}_dict.txt", script));

        ModelPaths {
            detection: self.model_dir.join(&self.detection_model),
            recognition: self.model_dir.join(recognition),
            dictionary: self.model_dir.join(dictionary),
        }
    }
}

/// PDF rasterization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// DPI for rendering PDF pages to images.
    pub render_dpi: u32,

    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            render_dpi: 300,
            max_pages: 0,
        }
    }
}

/// Field matching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum token-sort similarity (0 - 100) for a text field to match.
    pub name_match_threshold: f64,

    /// Maximum absolute difference for a numeric field to match.
    pub value_tolerance: f64,

    /// Field keys compared numerically.
    pub numeric_fields: Vec<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            name_match_threshold: 80.0,
            value_tolerance: 0.01,
            numeric_fields: [
                "valor",
                "valor_total",
                "value",
                "amount",
                "total",
                "quantidade",
                "quantity",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl MatchingConfig {
    /// Tolerance as a decimal, using its shortest textual form.
    pub fn tolerance(&self) -> Result<Decimal> {
        if !self.value_tolerance.is_finite() || self.value_tolerance < 0.0 {
            return Err(VerifyError::Config(format!(
                "value_tolerance must be a non-negative number, got {}",
                self.value_tolerance
            )));
        }

        Decimal::from_str(&self.value_tolerance.to_string())
            .or_else(|_| Decimal::from_scientific(&format!("{:e}", self.value_tolerance)))
            .map_err(|e| VerifyError::Config(format!("value_tolerance: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.name_match_threshold) {
            return Err(VerifyError::Config(format!(
                "name_match_threshold must be within 0-100, got {}",
                self.name_match_threshold
            )));
        }
        self.tolerance().map(|_| ())
    }
}

/// Report output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Embed each document's fragments in the JSON report.
    pub include_fragments: bool,
}

impl VerifyConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| VerifyError::Config(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| VerifyError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply environment overrides.
    pub fn apply_env(mut self) -> Self {
        if let Some(dir) = std::env::var_os(INPUT_DIR_ENV) {
            debug!("Input directory overridden by {}", INPUT_DIR_ENV);
            self.input.input_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.matching.validate()
    }

    /// Model paths for the configured language.
    pub fn model_paths(&self) -> ModelPaths {
        self.models.resolve(self.ocr.script())
    }
}
