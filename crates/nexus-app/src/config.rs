// Configuration loading and parsing (config/nexus.toml).

use std::path::{Path, PathBuf};

use nexus_draft::{DraftFormat, ModelOptions, ScheduleBlock};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

const CONFIG_DIR: &str = "config";
const DEFAULTS_DIR: &str = "defaults";
const CONFIG_FILE: &str = "nexus.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub corpus: CorpusConfig,
    pub model: ModelConfig,
    /// Expanded schedule; the standard format when `[draft]` lists no blocks.
    pub draft_format: DraftFormat,
    pub roster: Vec<String>,
    pub default_limit: usize,
    pub db_path: String,
}

impl Config {
    pub fn model_options(&self) -> ModelOptions {
        ModelOptions {
            min_occurrences: self.model.min_occurrences,
            roster: self.roster.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// nexus.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire nexus.toml file.
#[derive(Debug, Clone, Deserialize)]
struct NexusFile {
    corpus: CorpusConfig,
    #[serde(default)]
    model: ModelConfig,
    #[serde(default)]
    draft: DraftSection,
    #[serde(default)]
    roster: RosterSection,
    #[serde(default)]
    recommendations: RecommendationsSection,
    database: DatabaseSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorpusFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorpusConfig {
    pub path: String,
    #[serde(default)]
    pub format: CorpusFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub min_occurrences: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            min_occurrences: nexus_draft::graph::DEFAULT_MIN_OCCURRENCES,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DraftSection {
    #[serde(default)]
    blocks: Vec<ScheduleBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RosterSection {
    #[serde(default)]
    champions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RecommendationsSection {
    default_limit: usize,
}

impl Default for RecommendationsSection {
    fn default() -> Self {
        RecommendationsSection { default_limit: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/nexus.toml` relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join(CONFIG_DIR).join(CONFIG_FILE);
    let text = read_file(&path)?;
    let file: NexusFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let draft_format = if file.draft.blocks.is_empty() {
        DraftFormat::standard()
    } else {
        DraftFormat::from_blocks(file.draft.blocks).map_err(|e| {
            ConfigError::ValidationError {
                field: "draft.blocks".into(),
                message: e.to_string(),
            }
        })?
    };

    let config = Config {
        corpus: file.corpus,
        model: file.model,
        draft_format,
        roster: file.roster.champions,
        default_limit: file.recommendations.default_limit,
        db_path: file.database.path,
    };

    validate(&config)?;
    Ok(config)
}

/// Seed `config/nexus.toml` from `defaults/nexus.toml` on first run.
///
/// Returns the created path, or `None` when a config file already exists
/// (it is never overwritten).
pub fn seed_config(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join(CONFIG_DIR).join(CONFIG_FILE);
    if target.is_file() {
        return Ok(None);
    }

    let source = base_dir.join(DEFAULTS_DIR).join(CONFIG_FILE);
    if !source.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "no {CONFIG_DIR}/{CONFIG_FILE} and no {DEFAULTS_DIR}/{CONFIG_FILE} in {}",
                base_dir.display()
            ),
        });
    }

    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", dir.display()),
        })?;
    }
    std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!(
            "failed to copy {} to {}: {e}",
            source.display(),
            target.display()
        ),
    })?;

    info!("Created {} from shipped defaults", target.display());
    Ok(Some(target))
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    seed_config(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.corpus.path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "corpus.path".into(),
            message: "must not be empty".into(),
        });
    }

    if config.model.min_occurrences == 0 {
        return Err(ConfigError::ValidationError {
            field: "model.min_occurrences".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.default_limit == 0 {
        return Err(ConfigError::ValidationError {
            field: "recommendations.default_limit".into(),
            message: "must be greater than 0".into(),
        });
    }

    if let Some(blank) = config.roster.iter().position(|c| c.trim().is_empty()) {
        return Err(ConfigError::ValidationError {
            field: "roster.champions".into(),
            message: format!("entry {blank} is blank"),
        });
    }

    if config.db_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
