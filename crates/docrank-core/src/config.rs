//! Layered configuration and path helpers.
//!
//! Figment merges built-in defaults, `config.toml`, `config.<env>.toml` and
//! `APP_*` env vars (`APP_SEARCH__MAX_TOP_K=50` sets `search.max_top_k`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::chunking::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::Weights;

/// Ranking knobs read from the `search` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_top_k: usize,
    pub max_top_k: usize,
    /// Each side retrieves `top_k * candidate_multiplier` candidates.
    pub candidate_multiplier: usize,
    pub default_vector_weight: f32,
    pub default_lexical_weight: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let weights = Weights::default();
        Self {
            default_top_k: 5,
            max_top_k: 100,
            candidate_multiplier: 3,
            default_vector_weight: weights.vector,
            default_lexical_weight: weights.lexical,
        }
    }
}

impl SearchConfig {
    pub fn default_weights(&self) -> Weights {
        Weights::new(self.default_vector_weight, self.default_lexical_weight)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { dimension: 384 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub raw_txt_dir: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { raw_txt_dir: "data/txt".to_string() }
    }
}

/// Typed view over every table the engine reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chunking: ChunkingConfig,
    pub search: SearchConfig,
    pub embedding: EmbeddingConfig,
    pub data: DataConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        let c = &self.chunking;
        let targets = [
            ("chunking.meeting_target_tokens", c.meeting_target_tokens),
            ("chunking.progress_target_tokens", c.progress_target_tokens),
            ("chunking.research_target_tokens", c.research_target_tokens),
            ("chunking.general_target_tokens", c.general_target_tokens),
        ];
        if let Some((key, _)) = targets.iter().find(|(_, v)| *v == 0) {
            return Err(Error::InvalidConfig(format!("{key} must be positive")));
        }
        if !(0.0..1.0).contains(&c.research_overlap_percent) {
            return Err(Error::InvalidConfig(format!(
                "chunking.research_overlap_percent must be in [0, 1), got {}",
                c.research_overlap_percent
            )));
        }
        let s = &self.search;
        if s.default_top_k == 0 || s.default_top_k > s.max_top_k {
            return Err(Error::InvalidConfig(format!(
                "search.default_top_k must be in 1..={}, got {}",
                s.max_top_k, s.default_top_k
            )));
        }
        if s.candidate_multiplier == 0 {
            return Err(Error::InvalidConfig("search.candidate_multiplier must be positive".into()));
        }
        if !s.default_weights().is_valid() {
            return Err(Error::InvalidConfig("search weights must be finite and non-negative".into()));
        }
        if self.embedding.dimension == 0 {
            return Err(Error::InvalidConfig("embedding.dimension must be positive".into()));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate_for_env(&env_name)?;
        Ok(config)
    }

    /// Defaults overlaid with a TOML document. No files or env vars are read.
    pub fn from_toml_str(toml: &str) -> Self {
        let figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string(toml));
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Extracts and validates the full `Settings`.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        match env {
            // Profile files are optional in dev/test; prod fails fast.
            "prod" | "production" => {
                self.settings()?;
            }
            "dev" | "development" | "test" | "testing" => {}
            other => tracing::debug!(env = other, "unrecognised RUST_ENV; no profile file merged"),
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
