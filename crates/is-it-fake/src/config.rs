use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_MODEL_PATH: &str = "model_artifacts/job_pipeline.bin";

/// Service configuration loaded from environment variables (and `.env` when present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub model_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `RUST_LOG` alone, so commands that never bind a socket ignore the rest.
    #[must_use]
    pub fn log_level() -> String {
        dotenvy::dotenv().ok();
        log_level_from(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            model_path: lookup("MODEL_PATH")
                .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string())
                .into(),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: log_level_from(&lookup),
        })
    }
}

fn log_level_from(lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup("RUST_LOG").unwrap_or_else(|| "info".to_string())
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_path: DEFAULT_MODEL_PATH.into(),
            host: "0.0.0.0".to_string(),
            port: 5000,
            rust_log: "info".to_string(),
        }
    }
}
