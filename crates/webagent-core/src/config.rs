//! Configuration management for webagent.toml

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::openai::GenerationOptions;

const CONFIG_FILE: &str = "webagent.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub agent: AgentSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable holding the bearer token
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Optional generation parameters forwarded to every completion call
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationConfig {
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentSettings {
    /// Directory under which per-run workspaces are created
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,
    /// Interpreter used by the RUN action
    #[serde(default = "default_python")]
    pub python: String,
    /// Seconds to wait for a launched server before capturing its output
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from("./workspace")
}

fn default_python() -> String {
    "python3".to_string()
}

fn default_settle_secs() -> u64 {
    5
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            workspace_root: default_workspace_root(),
            python: default_python(),
            settle_secs: default_settle_secs(),
        }
    }
}

impl GenerationConfig {
    /// Generation options, or None when nothing is configured
    pub fn options(&self) -> Option<GenerationOptions> {
        if self.max_tokens.is_none() && self.top_p.is_none() && self.temperature.is_none() {
            return None;
        }
        Some(GenerationOptions {
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            temperature: self.temperature,
        })
    }
}

impl Config {
    /// Load webagent.toml if one is found, defaults otherwise
    pub fn load() -> Result<Self> {
        match Self::find_config_path() {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read {}", path.as_ref().display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.as_ref().display()))
    }

    /// Find webagent.toml by searching current directory and parents
    pub fn find_config_path() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        for _ in 0..10 {
            let candidate = current.join(CONFIG_FILE);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                break;
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[backend]
base_url = "http://127.0.0.1:11434/v1"
api_key_env = "LOCAL_KEY"

[generation]
temperature = 0.2

[agent]
workspace_root = "/tmp/runs"
settle_secs = 2
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:11434/v1");
        assert_eq!(config.backend.api_key_env, "LOCAL_KEY");
        assert_eq!(config.backend.timeout_secs, 120);
        assert_eq!(config.agent.workspace_root, PathBuf::from("/tmp/runs"));
        assert_eq!(config.agent.python, "python3");
        assert_eq!(config.agent.settle_secs, 2);

        let options = config.generation.options().unwrap();
        assert_eq!(options.temperature, Some(0.2));
        assert!(options.max_tokens.is_none());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.backend.base_url, "https://api.openai.com/v1");
        assert_eq!(config.agent.workspace_root, PathBuf::from("./workspace"));
        assert_eq!(config.agent.settle_secs, 5);
        assert!(config.generation.options().is_none());
    }

    #[test]
    fn test_load_from_reports_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[agent\nbroken").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
