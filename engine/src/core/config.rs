use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::extract::ExtractConfig;
use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_GEN_AI_SYSTEM, DEFAULT_PAYLOAD_LIMIT_BYTES,
};

#[derive(Debug, Default, Deserialize)]
pub struct ExtractFileConfig {
    pub gen_ai: Option<bool>,
    pub payload_limit_bytes: Option<usize>,
    pub gen_ai_system: Option<String>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub extract: Option<ExtractFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(extract) = other.extract {
            let current = self.extract.get_or_insert_with(ExtractFileConfig::default);
            if extract.gen_ai.is_some() {
                tracing::trace!(gen_ai = ?extract.gen_ai, "Merging extract.gen_ai");
                current.gen_ai = extract.gen_ai;
            }
            if extract.payload_limit_bytes.is_some() {
                tracing::trace!(
                    payload_limit_bytes = ?extract.payload_limit_bytes,
                    "Merging extract.payload_limit_bytes"
                );
                current.payload_limit_bytes = extract.payload_limit_bytes;
            }
            if extract.gen_ai_system.is_some() {
                tracing::trace!(
                    gen_ai_system = ?extract.gen_ai_system,
                    "Merging extract.gen_ai_system"
                );
                current.gen_ai_system = extract.gen_ai_system;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub extract: ExtractConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.fieldscope/fieldscope.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::layer(file_config, cli);
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then file values, then CLI/env overrides
    fn layer(file_config: FileConfig, cli: &CliConfig) -> Self {
        let file_extract = file_config.extract.unwrap_or_default();

        let gen_ai = cli.gen_ai.or(file_extract.gen_ai).unwrap_or(true);

        let payload_limit_bytes = cli
            .payload_limit
            .or(file_extract.payload_limit_bytes)
            .unwrap_or(DEFAULT_PAYLOAD_LIMIT_BYTES);

        // An empty name turns the attribute off
        let gen_ai_system = cli
            .gen_ai_system
            .clone()
            .or(file_extract.gen_ai_system)
            .unwrap_or_else(|| DEFAULT_GEN_AI_SYSTEM.to_string());
        let gen_ai_system = (!gen_ai_system.trim().is_empty()).then_some(gen_ai_system);

        Self {
            extract: ExtractConfig {
                gen_ai,
                payload_limit_bytes,
                gen_ai_system,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.extract.payload_limit_bytes == 0 {
            anyhow::bail!("extract.payload_limit_bytes must be greater than zero");
        }
        Ok(())
    }
}

/// Get the profile config path (~/.fieldscope/fieldscope.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}
