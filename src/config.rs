//! Configuration loader — merges defaults, config.toml, .env and env vars.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use decision_engine::{EngineConfig, FullBlockPolicy, EXPLORATION_ALPHA};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub artifact: ArtifactConfig,
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Explicit artifact path; wins over `search_paths`.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Tried in order when `path` is unset.
    #[serde(default = "default_search_paths")]
    pub search_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSection {
    #[serde(default = "default_exploration_alpha")]
    pub exploration_alpha: f64,
    #[serde(default)]
    pub full_block_policy: FullBlockPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Cap on items listed by `pricewise items`.
    #[serde(default = "default_max_listed_items")]
    pub max_listed_items: usize,
}

fn default_search_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("artifacts_m5/m5_price_artifacts.json"),
        PathBuf::from("m5_price_artifacts.json"),
    ]
}

fn default_exploration_alpha() -> f64 {
    EXPLORATION_ALPHA
}

fn default_max_listed_items() -> usize {
    1500
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            path: None,
            search_paths: default_search_paths(),
        }
    }
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            exploration_alpha: default_exploration_alpha(),
            full_block_policy: FullBlockPolicy::default(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_listed_items: default_max_listed_items(),
        }
    }
}

impl AppConfig {
    /// Load configuration. A missing default `config.toml` is fine; a missing
    /// explicit `--config` path is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("No .env file loaded: {}", e);
        }

        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new("config.toml").exists() => Self::from_file(Path::new("config.toml"))?,
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// `PRICEWISE_ARTIFACT` wins over the legacy `M5_ARTIFACT`.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let from_env = ["PRICEWISE_ARTIFACT", "M5_ARTIFACT"]
            .iter()
            .filter_map(|key| lookup(key))
            .map(|raw| raw.trim().to_string())
            .find(|raw| !raw.is_empty());
        if let Some(path) = from_env {
            self.artifact.path = Some(PathBuf::from(path));
        }
    }

    fn validate(&self) -> Result<()> {
        let alpha = self.engine.exploration_alpha;
        if !alpha.is_finite() || alpha < 0.0 {
            bail!("engine.exploration_alpha must be finite and >= 0, got {}", alpha);
        }
        if self.catalog.max_listed_items == 0 {
            bail!("catalog.max_listed_items must be > 0");
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            exploration_alpha: self.engine.exploration_alpha,
            full_block_policy: self.engine.full_block_policy,
        }
    }

    /// First existing artifact location.
    pub fn resolve_artifact_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.artifact.path {
            if path.exists() {
                return Ok(path.clone());
            }
            bail!("Model artifact not found at {}", path.display());
        }

        if let Some(found) = self.artifact.search_paths.iter().find(|p| p.exists()) {
            return Ok(found.clone());
        }

        let cwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "<unknown>".into());
        let looked: Vec<String> = self
            .artifact
            .search_paths
            .iter()
            .map(|p| format!(" - {}", p.display()))
            .collect();
        bail!(
            "Could not find model artifact.\nLooked for:\n{}\nWorking dir: {}",
            looked.join("\n"),
            cwd
        )
    }
}
