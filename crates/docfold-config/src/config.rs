//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub chunking: ChunkingConfig,

    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub extract: ExtractConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &PathBuf) -> ConfigResult<()> {
        let default_config = Self::default_config_string();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, default_config)?;
        Ok(())
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.chunking.budget_chars == 0 {
            return Err(ConfigError::Invalid(
                "chunking.budget_chars must be greater than zero".to_string(),
            ));
        }
        if self.extract.encodings.is_empty() {
            return Err(ConfigError::Invalid(
                "extract.encodings must list at least one candidate".to_string(),
            ));
        }
        if self.pipeline.workers == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.workers must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Docfold Configuration
# Document ingestion and chunking pipeline

[general]
# Data directory for the database (defaults to the platform data dir)
# data_dir = "~/.local/share/docfold"

[chunking]
# Maximum chunk size in characters. A single unit longer than the budget
# is never split; it becomes its own oversized chunk.
budget_chars = 1000

[queue]
# How many times a failed item may be returned to the queue
max_retries = 3

# Items stuck in 'processing' longer than this are returned to 'pending'
# by the startup sweep
stale_after_seconds = 3600

[extract]
# Candidate encodings for text files, tried in order. The first one that
# decodes the whole file wins.
encodings = ["utf-8", "shift_jis", "euc-jp", "windows-1252"]

[pipeline]
# Number of worker threads for the processing loop
workers = 2
"#
        .to_string()
    }
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub data_dir: Option<String>,
}

/// Chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Chunk size budget in characters.
    pub budget_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { budget_chars: 1000 }
    }
}

/// Queue behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub max_retries: i32,
    pub stale_after_seconds: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            stale_after_seconds: 3600,
        }
    }
}

/// Extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Candidate encodings for text files, tried in order.
    pub encodings: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            encodings: vec![
                "utf-8".to_string(),
                "shift_jis".to_string(),
                "euc-jp".to_string(),
                "windows-1252".to_string(),
            ],
        }
    }
}

/// Pipeline worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { workers: 2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.chunking.budget_chars, 1000);
        assert_eq!(config.queue.max_retries, 3);
        assert_eq!(config.extract.encodings[0], "utf-8");
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config.chunking.budget_chars, deserialized.chunking.budget_chars);
        assert_eq!(config.extract.encodings, deserialized.extract.encodings);
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
            [chunking]
            budget_chars = 512
            "#
        )
        .unwrap();

        let path = temp_file.path().to_path_buf();
        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.chunking.budget_chars, 512);
        // Defaults should still apply
        assert_eq!(config.queue.max_retries, 3);
    }

    #[test]
    fn test_rejects_zero_budget() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
            [chunking]
            budget_chars = 0
            "#
        )
        .unwrap();

        let path = temp_file.path().to_path_buf();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_default_config_string_parses() {
        let config: Config = toml::from_str(&Config::default_config_string()).unwrap();
        assert_eq!(config.pipeline.workers, 2);
    }
}
