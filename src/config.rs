// ABOUTME: Settings - the already-loaded configuration subagents read from.
// ABOUTME: JSON file loading, discovery in ./.subtask and ~/.subtask, env overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::llm::{OLLAMA_BASE_URL, OLLAMA_DEFAULT_MODEL};

/// Directory holding the settings file, relative to the project or home dir.
pub const SETTINGS_DIR: &str = ".subtask";

/// Settings file name inside [`SETTINGS_DIR`].
pub const SETTINGS_FILE: &str = "settings.json";

/// Default bound on a single model invocation.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Model backend settings. Every field has a default, so a partial file
/// (or no file at all) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root URL of the Ollama server, without `/api/chat`.
    pub base_url: String,

    /// Model used when a task does not override it.
    pub model: String,

    /// Stream replies from the backend by default.
    pub stream: bool,

    /// Ask the backend for a reasoning trace by default.
    pub think: bool,

    /// Upper bound for one model invocation, in seconds.
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: OLLAMA_BASE_URL.to_string(),
            model: OLLAMA_DEFAULT_MODEL.to_string(),
            stream: false,
            think: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Find the settings file: `./.subtask/settings.json`, then
    /// `~/.subtask/settings.json`.
    pub fn find() -> Option<PathBuf> {
        let local = PathBuf::from(SETTINGS_DIR).join(SETTINGS_FILE);
        if local.exists() {
            return Some(local);
        }

        if let Some(home) = dirs::home_dir() {
            let global = home.join(SETTINGS_DIR).join(SETTINGS_FILE);
            if global.exists() {
                return Some(global);
            }
        }

        None
    }

    /// Load the discovered settings file, or defaults if there is none.
    pub fn discover() -> Result<Self, ConfigError> {
        match Self::find() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading settings");
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Overlay `SUBTASK_BASE_URL`, `SUBTASK_MODEL` and `SUBTASK_TIMEOUT_SECS`.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(base_url) = var("SUBTASK_BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(model) = var("SUBTASK_MODEL") {
            self.model = model;
        }
        if let Some(secs) = var("SUBTASK_TIMEOUT_SECS") {
            self.timeout_secs = secs.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("SUBTASK_TIMEOUT_SECS is not a number: {}", secs))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject values no invocation could succeed with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url is empty".into()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model is empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// The invocation bound as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the default streaming flag.
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Set the default reasoning flag.
    pub fn with_think(mut self, think: bool) -> Self {
        self.think = think;
        self
    }

    /// Set the invocation bound.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }
}
