use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const REA_DIR: &str = ".rea";
const REA_HOME_ENV: &str = "REA_HOME";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            max_results: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub provider: Option<String>,
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub max_turns: usize,
    pub request_timeout_secs: u64,
    /// Overrides the provider's own answer when set.
    pub supports_system_role: Option<bool>,
    /// Persona ahead of the protocol. Unset means the admissions advisor,
    /// an empty string means none.
    pub preamble: Option<String>,
    pub history_file: Option<PathBuf>,
    pub search: SearchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: Some("openrouter".to_string()),
            api_key: String::new(),
            base_url: None,
            model: "deepseek/deepseek-r1-0528-qwen3-8b:free".to_string(),
            temperature: 0.0,
            max_turns: crate::agent::DEFAULT_MAX_TURNS,
            request_timeout_secs: 120,
            supports_system_role: None,
            preamble: None,
            history_file: None,
            search: SearchConfig::default(),
        }
    }
}

pub fn get_rea_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(REA_HOME_ENV)
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(REA_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_rea_dir().join("config.toml")
}

pub fn ensure_rea_dir() -> Result<PathBuf> {
    let rea_dir = get_rea_dir();

    if !rea_dir.exists() {
        std::fs::create_dir_all(&rea_dir).with_context(|| {
            format!("Failed to create rea directory at {}", rea_dir.display())
        })?;
    }

    Ok(rea_dir)
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        if config_exists() {
            load_config()
        } else {
            Ok(Config::default())
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.as_deref().unwrap_or("openrouter")
    }

    pub fn preamble(&self) -> &str {
        self.preamble
            .as_deref()
            .unwrap_or(crate::agent::ADVISOR_PREAMBLE)
    }
}

pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path())
}

pub fn load_config_from(config_path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(config_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::anyhow!("Config file not found. Run 'rea onboard' to set up your configuration.")
        } else {
            anyhow::anyhow!("Failed to read config from {}: {}", config_path.display(), e)
        }
    })?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", config_path.display()))
}

pub fn save_config(config: &Config) -> Result<()> {
    ensure_rea_dir()?;
    save_config_to(config, &get_config_path())
}

pub fn save_config_to(config: &Config, config_path: &Path) -> Result<()> {
    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config to TOML")?;

    std::fs::write(config_path, content)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(())
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}
