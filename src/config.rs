use std::path::PathBuf;

use crate::pipeline::structuring::StructuringError;

/// Application-level constants
pub const APP_NAME: &str = "ScholarScout";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the reasoning service API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_VAR: &str = "SCHOLARSCOUT_LLM_BASE_URL";
pub const MODEL_VAR: &str = "SCHOLARSCOUT_MODEL";
pub const TIMEOUT_VAR: &str = "SCHOLARSCOUT_LLM_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,scholarscout_lib=info,rmcp=warn,reqwest=warn"
}

/// Connection settings for the reasoning service.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl ServiceSettings {
    /// Read settings from the process environment.
    ///
    /// The API key is mandatory; every other value has a default.
    pub fn from_env() -> Result<Self, StructuringError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (tests inject a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StructuringError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(StructuringError::MissingCredential(API_KEY_VAR))?;

        let base_url = lookup(BASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let model = lookup(MODEL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout_secs = lookup(TIMEOUT_VAR)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            api_key,
            base_url,
            model,
            timeout_secs,
        })
    }
}

/// How to launch the academic search tool-provider.
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl McpServerConfig {
    /// Google Scholar server run through `uv` from a local project directory.
    pub fn scholar_default(server_dir: PathBuf) -> Self {
        Self {
            name: "scholar".to_string(),
            command: "uv".to_string(),
            args: vec![
                "--directory".to_string(),
                server_dir.to_string_lossy().into_owned(),
                "run".to_string(),
                "google_scholar_server.py".to_string(),
            ],
            env: Vec::new(),
        }
    }
}
