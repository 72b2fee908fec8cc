//! Subcommands.

pub mod check;
pub mod config;
pub mod run;

use std::path::{Path, PathBuf};

use docverify_core::VerifyConfig;
use docverify_core::ocr::PureOcrEngine;
use tracing::debug;

/// Location of the user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docverify")
        .join("config.json")
}

/// Load the explicit config file, else the user config if present, else
/// defaults. Environment overrides are applied last.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<VerifyConfig> {
    let config = match config_path {
        Some(path) => VerifyConfig::from_file(Path::new(path))?,
        None => {
            let user = default_config_path();
            if user.exists() {
                VerifyConfig::from_file(&user)?
            } else {
                debug!("No config file, using defaults");
                VerifyConfig::default()
            }
        }
    };

    Ok(config.apply_env())
}

/// Load the OCR engine; failure aborts the command.
pub fn load_engine(config: &VerifyConfig) -> anyhow::Result<PureOcrEngine> {
    let paths = config.model_paths();
    debug!("Loading models from {}", config.models.model_dir.display());

    PureOcrEngine::load(&paths, &config.ocr)
        .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))
}
