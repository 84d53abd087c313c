//! Layered configuration
//!
//! Resolution order, later layers winning:
//! 1. Embedded defaults (compiled into the binary)
//! 2. An explicit config file, or `~/.config/tally/config.toml` if it exists
//! 3. Environment variables (`AI_BACKEND`, `OLLAMA_HOST`, ...)

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::commit::DEFAULT_PALETTE;
use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Which AI backend serves the summarizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Ollama,
    OpenAICompatible,
    Mock,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAICompatible => "openai_compatible",
            Self::Mock => "mock",
        }
    }

    /// Parse a backend name; unknown names fall back to Ollama
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "ollama" => Self::Ollama,
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                Self::OpenAICompatible
            }
            "mock" => Self::Mock,
            _ => {
                warn!(backend = %name, "Unknown AI backend, falling back to ollama");
                Self::Ollama
            }
        }
    }
}

/// AI summarizer settings
#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub backend: BackendKind,
    pub ollama_host: Option<String>,
    pub ollama_model: String,
    pub openai_host: Option<String>,
    pub openai_model: String,
    pub openai_api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Ollama,
            ollama_host: None,
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            openai_host: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Full application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub ai: AiConfig,
    /// Colors for categories created during import
    pub palette: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ai: AiConfig::default(),
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Config {
    /// Load config from the usual places, then apply environment overrides.
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_toml(DEFAULT_CONFIG)?;

        let file = match explicit {
            Some(path) if !path.exists() => {
                return Err(Error::NotFound(format!(
                    "Config file {}",
                    path.display()
                )));
            }
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        if let Some(path) = file {
            debug!(path = %path.display(), "Loading config override");
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            config.merge_toml(&content)?;
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a complete config from TOML, starting from built-in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config = Self::default();
        config.merge_toml(content)?;
        Ok(config)
    }

    /// Overlay the values present in `content`
    pub fn merge_toml(&mut self, content: &str) -> Result<()> {
        let raw: RawConfig = toml::from_str(content)?;

        if let Some(ai) = raw.ai {
            if let Some(backend) = ai.backend {
                self.ai.backend = BackendKind::parse(&backend);
            }
            if let Some(secs) = ai.timeout_secs {
                self.ai.timeout = Duration::from_secs(secs);
            }
            if let Some(ollama) = ai.ollama {
                if ollama.host.is_some() {
                    self.ai.ollama_host = ollama.host;
                }
                if let Some(model) = ollama.model {
                    self.ai.ollama_model = model;
                }
            }
            if let Some(openai) = ai.openai_compatible {
                if openai.host.is_some() {
                    self.ai.openai_host = openai.host;
                }
                if let Some(model) = openai.model {
                    self.ai.openai_model = model;
                }
                if openai.api_key.is_some() {
                    self.ai.openai_api_key = openai.api_key;
                }
            }
        }

        if let Some(palette) = raw.categories.and_then(|c| c.palette) {
            if palette.is_empty() {
                return Err(Error::Config("categories.palette must not be empty".into()));
            }
            self.palette = palette;
        }

        Ok(())
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(backend) = var("AI_BACKEND") {
            self.ai.backend = BackendKind::parse(&backend);
        }
        if let Some(host) = var("OLLAMA_HOST") {
            self.ai.ollama_host = Some(host);
        }
        if let Some(model) = var("OLLAMA_MODEL") {
            self.ai.ollama_model = model;
        }
        if let Some(host) = var("OPENAI_COMPATIBLE_HOST") {
            self.ai.openai_host = Some(host);
        }
        if let Some(model) = var("OPENAI_COMPATIBLE_MODEL") {
            self.ai.openai_model = model;
        }
        if let Some(key) = var("OPENAI_COMPATIBLE_API_KEY") {
            self.ai.openai_api_key = Some(key);
        }
        if let Some(secs) = var("TALLY_AI_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) => self.ai.timeout = Duration::from_secs(secs),
                Err(_) => warn!(value = %secs, "Ignoring invalid TALLY_AI_TIMEOUT_SECS"),
            }
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tally").join("config.toml"))
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    ai: Option<RawAi>,
    categories: Option<RawCategories>,
}

#[derive(Debug, Deserialize)]
struct RawAi {
    backend: Option<String>,
    timeout_secs: Option<u64>,
    ollama: Option<RawHost>,
    openai_compatible: Option<RawHost>,
}

#[derive(Debug, Deserialize)]
struct RawHost {
    host: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCategories {
    palette: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_embedded_defaults_parse() {
        let config = Config::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_merge_overrides_only_present_keys() {
        let mut config = Config::default();
        config
            .merge_toml(
                r##"
[ai]
backend = "openai"

[ai.openai_compatible]
host = "http://gpu-box:8000"

[categories]
palette = ["#000000"]
"##,
            )
            .unwrap();

        assert_eq!(config.ai.backend, BackendKind::OpenAICompatible);
        assert_eq!(config.ai.openai_host.as_deref(), Some("http://gpu-box:8000"));
        assert_eq!(config.ai.openai_model, DEFAULT_OPENAI_MODEL);
        assert_eq!(config.ai.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.palette, vec!["#000000"]);
    }

    #[test]
    fn test_empty_palette_rejected() {
        let err = Config::from_toml("[categories]\npalette = []\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Config::from_toml("[ai\nbackend ="),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn test_env_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("AI_BACKEND", "mock"),
            ("OLLAMA_HOST", "http://localhost:11434"),
            ("OLLAMA_MODEL", "gemma3"),
            ("OPENAI_COMPATIBLE_API_KEY", ""),
            ("TALLY_AI_TIMEOUT_SECS", "5"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.ai.backend, BackendKind::Mock);
        assert_eq!(config.ai.ollama_host.as_deref(), Some("http://localhost:11434"));
        assert_eq!(config.ai.ollama_model, "gemma3");
        // blank values are ignored
        assert_eq!(config.ai.openai_api_key, None);
        assert_eq!(config.ai.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_timeout_env_ignored() {
        let mut config = Config::default();
        config.apply_env(|k| (k == "TALLY_AI_TIMEOUT_SECS").then(|| "soon".to_string()));
        assert_eq!(config.ai.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_backend_aliases() {
        assert_eq!(BackendKind::parse("vLLM"), BackendKind::OpenAICompatible);
        assert_eq!(BackendKind::parse("mock"), BackendKind::Mock);
        assert_eq!(BackendKind::parse("whatever"), BackendKind::Ollama);
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/tally.toml"))).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
