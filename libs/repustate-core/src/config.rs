use crate::{CoreError, Result};
use directories::{BaseDirs, ProjectDirs};
use repustate_protocol::DEMO_BASE_PATH;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "repustate.toml";
pub const PROFILE_FILENAME: &str = ".repustate";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Prefix the endpoints live under, relative to `server_url`.
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Overrides `~/.repustate`.
    #[serde(default)]
    pub profile_file: Option<PathBuf>,

    #[serde(default)]
    pub default_lang: Option<String>,

    #[serde(default)]
    pub wildcard_classifications: bool,

    #[serde(default = "default_color")]
    pub color: bool,

    #[serde(default = "default_max_query_terms")]
    pub max_query_terms: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            base_path: default_base_path(),
            profile_file: None,
            default_lang: None,
            wildcard_classifications: false,
            color: default_color(),
            max_query_terms: default_max_query_terms(),
        }
    }
}

fn default_server_url() -> String {
    "http://try.repustate.com:9000".to_string()
}

fn default_base_path() -> String {
    DEMO_BASE_PATH.to_string()
}

fn default_color() -> bool {
    true
}

fn default_max_query_terms() -> usize {
    3
}

impl Config {
    /// Reads `./repustate.toml`, then the per-user config file, falling back
    /// to defaults when neither exists.
    pub fn load() -> Result<Self> {
        if Path::new(CONFIG_FILE).exists() {
            return Self::load_from(Path::new(CONFIG_FILE));
        }
        match Self::user_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| CoreError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "repustate", "repustate")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Parsed base URL with a trailing slash so endpoint paths join beneath it.
    pub fn server_url(&self) -> Result<Url> {
        let mut url =
            Url::parse(&self.server_url).map_err(|e| CoreError::BadServerUrl(e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(CoreError::BadServerUrl(self.server_url.clone()));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn profile_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.profile_file {
            return Ok(path.clone());
        }
        BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(PROFILE_FILENAME))
            .ok_or_else(|| CoreError::Config("cannot locate home directory".to_string()))
    }
}
