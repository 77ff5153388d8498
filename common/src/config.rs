use serde::Deserialize;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".into());
    Config::from_path(path).expect("failed to load config file")
});

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: Api,
    pub catalog: Catalog,
    pub search: Search,
    pub loki: Option<Loki>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Api {
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
    pub debounce_ms: u64,
    pub per_page: u32,
    pub max_suggestions: usize,
}

#[derive(Debug, Deserialize)]
pub struct Loki {
    pub url: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

impl Config {
    /// Reads the YAML file at `path`. Only a file that does not exist yields
    /// the defaults; any other read failure or a file that does not parse is
    /// an error.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(config_file) => Ok(Self::from_yaml(&config_file)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_yaml(config_file: &str) -> Result<Self, serde_yaml::Error> {
        if config_file.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(config_file)
    }
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            url: "https://api-colombia.com/api/v1/City/".to_string(),
        }
    }
}

impl Default for Search {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            per_page: 12,
            max_suggestions: 6,
        }
    }
}
