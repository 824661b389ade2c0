//! Configuration loaded from `config.toml`
//!
//! Everything environment specific lives here: API access, list ids, the
//! field map, the people roster and the profile/category enumerations.

pub mod fields;
pub mod people;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::{CacheConfig, DEFAULT_BASE_URL};
use crate::services::enrich::DEFAULT_PAGE_SIZE;
pub use fields::{FieldMap, FieldRoles, FieldsConfig};
pub use people::{PersonConfig, PersonDirectory};

/// Environment variable that overrides `api.api_key`
pub const ENV_API_KEY: &str = "AFFINITY_API_KEY";

/// Commented starter config written by `config init`
pub const TEMPLATE: &str = include_str!("../../config.example.toml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    pub lists: ListsConfig,
    pub fields: FieldsConfig,
    #[serde(default)]
    pub people: Vec<PersonConfig>,
    /// Person whose id marks a deal as passed
    #[serde(default = "default_pass_person")]
    pub pass_person: String,
    #[serde(default)]
    pub profiles: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// No timeout unless set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListsConfig {
    /// The list being triaged
    pub deals: i64,
    /// The list tracked deals are copied into
    pub tracking: i64,
}

fn default_pass_person() -> String {
    "Pass".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_ttl_secs() -> u64 {
    60 * 60
}

fn default_max_entries() -> u64 {
    1024
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            page_size: default_page_size(),
            timeout_secs: None,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

impl Config {
    /// `<config dir>/affinity-cli/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not determine the config directory")?;
        Ok(dir.join("affinity-cli").join("config.toml"))
    }

    /// Read and parse a config file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "Config file not found: {}. Run 'affinity-cli config init' to create one.",
                path.display()
            );
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.apply_env();
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            if !key.trim().is_empty() {
                self.api.api_key = Some(key.trim().to_string());
            }
        }
    }

    pub fn api_key(&self) -> Result<&str> {
        match self.api.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => bail!("No API key configured. Set api.api_key or {}.", ENV_API_KEY),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.api.timeout_secs.map(Duration::from_secs)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(self.cache.ttl_secs),
            max_entries: self.cache.max_entries,
        }
    }

    pub fn field_map(&self) -> FieldMap {
        FieldMap::from(self.fields.map.as_slice())
    }

    /// Structural checks that do not need network access
    pub fn validate(&self) -> Result<()> {
        if self.api.page_size == 0 {
            bail!("api.page_size must be greater than zero");
        }
        if !self.people.iter().any(|p| p.name == self.pass_person) {
            bail!(
                "pass_person \"{}\" must be listed in [[people]]",
                self.pass_person
            );
        }
        self.fields.roles(&self.field_map())?;
        PersonDirectory::new(&self.people)?;
        Ok(())
    }

    /// Copy safe to print, with the API key masked
    pub fn masked(&self) -> Self {
        let mut copy = self.clone();
        if let Some(key) = copy.api.api_key.as_mut() {
            let chars: Vec<char> = key.chars().collect();
            let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
            *key = format!("****{}", tail);
        }
        copy
    }
}
