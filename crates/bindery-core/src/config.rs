#![forbid(unsafe_code)]

//! Per-cell binding configuration.
//!
//! [`BindingConfig`] controls how a binding reports diagnostics. Resolution
//! itself is never configurable.
//!
//! With the `policy-config` feature the config derives `serde` traits and can
//! be loaded from TOML or JSON:
//!
//! ```toml
//! mode_switch = "silent"
//! trace_setter_calls = true
//! label = "search-box"
//! ```
//!
//! The `BINDERY_MODE_SWITCH` environment variable (`warn` | `silent`) overrides
//! the file value through [`BindingConfig::with_env_overrides`].

use std::env;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "policy-config")]
use std::path::{Path, PathBuf};

/// Environment variable consulted by [`BindingConfig::with_env_overrides`].
pub const MODE_SWITCH_ENV: &str = "BINDERY_MODE_SWITCH";

/// Errors from parsing or loading a [`BindingConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A mode-switch policy name was not recognized.
    #[error("unknown mode-switch policy `{0}` (expected `warn` or `silent`)")]
    UnknownPolicy(String),
    /// TOML input failed to parse.
    #[cfg(feature = "policy-config")]
    #[error("invalid TOML binding config: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON input failed to parse.
    #[cfg(feature = "policy-config")]
    #[error("invalid JSON binding config: {0}")]
    Json(#[from] serde_json::Error),
    /// The config file could not be read.
    #[cfg(feature = "policy-config")]
    #[error("failed to read binding config {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The config file extension is neither `.toml` nor `.json`.
    #[cfg(feature = "policy-config")]
    #[error("unsupported binding config format: {0} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),
}

/// What to do when a binding switches between controlled and uncontrolled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "policy-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ModeSwitchPolicy {
    /// Report through the cell's diagnostic sink.
    #[default]
    Warn,
    /// Track the switch but report nothing.
    Silent,
}

impl ModeSwitchPolicy {
    /// Lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Silent => "silent",
        }
    }
}

impl fmt::Display for ModeSwitchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeSwitchPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" | "warning" => Ok(Self::Warn),
            "silent" | "off" | "none" => Ok(Self::Silent),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Diagnostic settings for one binding cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "policy-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct BindingConfig {
    /// Mode-switch reporting policy.
    pub mode_switch: ModeSwitchPolicy,
    /// Emit `trace!` events for seeding and every setter call.
    pub trace_setter_calls: bool,
    /// Label attached to diagnostics and trace events.
    pub label: Option<String>,
}

impl BindingConfig {
    /// Default configuration: warn on mode switches, no setter tracing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mode-switch policy.
    #[must_use]
    pub fn with_mode_switch(mut self, policy: ModeSwitchPolicy) -> Self {
        self.mode_switch = policy;
        self
    }

    /// Enable or disable setter tracing.
    #[must_use]
    pub fn with_setter_tracing(mut self, enabled: bool) -> Self {
        self.trace_setter_calls = enabled;
        self
    }

    /// Attach a diagnostic label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether mode switches should reach the sink.
    #[must_use]
    pub fn reports_mode_switches(&self) -> bool {
        self.mode_switch == ModeSwitchPolicy::Warn
    }

    /// Apply `BINDERY_MODE_SWITCH` from the process environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownPolicy`] if the variable holds an unknown name.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        let raw = env::var(MODE_SWITCH_ENV).ok();
        self.with_env_overrides_from(raw.as_deref())
    }

    /// Apply a `BINDERY_MODE_SWITCH` value (pure helper for testing).
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownPolicy`] if `mode_switch` is not a known name.
    pub fn with_env_overrides_from(
        mut self,
        mode_switch: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if let Some(raw) = mode_switch.filter(|s| !s.trim().is_empty()) {
            self.mode_switch = raw.parse()?;
        }
        Ok(self)
    }
}

#[cfg(feature = "policy-config")]
impl BindingConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Toml`] on malformed input.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Json`] on malformed input.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load from a `.toml` or `.json` file, chosen by extension.
    ///
    /// # Errors
    ///
    /// I/O, parse, or [`ConfigError::UnsupportedFormat`] errors.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let read = || {
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        };
        match ext.as_deref() {
            Some("toml") => Self::from_toml_str(&read()?),
            Some("json") => Self::from_json_str(&read()?),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}
