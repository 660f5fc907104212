//! TOML Configuration File Support
//!
//! Optional configuration at `~/.config/gitpet/gitpet.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (applied through [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! - `$XDG_CONFIG_HOME/gitpet/gitpet.toml` (typically `~/.config/gitpet/gitpet.toml`)
//! - Personality files default to `$XDG_CONFIG_HOME/gitpet/personalities/`
//!
//! # Example Configuration
//!
//! ```toml
//! [store]
//! dir = ".gitpet"
//!
//! [identity]
//! name = "Gitpet"
//! email = "gitpet@users.noreply.invalid"
//!
//! [personality]
//! default = "default"
//! preset_dir = "/home/me/.config/gitpet/personalities"
//!
//! [auto_commit]
//! enabled = true
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `GITPET_STORE_DIR` | `store.dir` |
//! | `GITPET_IDENTITY_NAME` | `identity.name` |
//! | `GITPET_IDENTITY_EMAIL` | `identity.email` |
//! | `GITPET_DEFAULT_PERSONALITY` | `personality.default` |
//! | `GITPET_PRESET_DIR` | `personality.preset_dir` |
//! | `GITPET_AUTO_COMMIT` | `auto_commit.enabled` (`0`/`false` disable) |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::SystemIdentity;
use crate::personality::{PresetLibrary, DEFAULT_PERSONALITY};

/// Store directory used when nothing else is configured, relative to the
/// work tree
pub const DEFAULT_STORE_DIR: &str = ".gitpet";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {}: {source}", path.display())]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Store section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreToml {
    /// Store directory, relative to the work tree unless absolute
    pub dir: Option<PathBuf>,
}

/// Identity section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityToml {
    /// Display name on automatic commits
    pub name: Option<String>,

    /// Reserved email on automatic commits
    pub email: Option<String>,
}

/// Personality section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityToml {
    /// Preset used by `adopt` when none is given
    pub default: Option<String>,

    /// Directory of `<name>.toml` preset files
    pub preset_dir: Option<PathBuf>,
}

/// Auto-commit section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoCommitToml {
    /// Whether state changes are committed
    pub enabled: Option<bool>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitpetToml {
    /// Store section
    pub store: StoreToml,

    /// Identity section
    pub identity: IdentityToml,

    /// Personality section
    pub personality: PersonalityToml,

    /// Auto-commit section
    pub auto_commit: AutoCommitToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved configuration for one invocation
#[derive(Clone, Debug)]
pub struct GitpetConfig {
    /// Store directory, relative to the work tree unless absolute
    pub store_dir: PathBuf,

    /// Identity for automatic commits; its commits never feed a pet
    pub identity: SystemIdentity,

    /// Preset used when `adopt` is not given one
    pub default_personality: String,

    /// Directory of preset files
    pub preset_dir: Option<PathBuf>,

    /// Whether state changes are committed
    pub auto_commit: bool,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for GitpetConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            identity: SystemIdentity::default(),
            default_personality: DEFAULT_PERSONALITY.to_string(),
            preset_dir: default_preset_dir(),
            auto_commit: true,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl GitpetConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Store root for a repository work tree
    #[must_use]
    pub fn store_root(&self, workdir: &Path) -> PathBuf {
        if self.store_dir.is_absolute() {
            self.store_dir.clone()
        } else {
            workdir.join(&self.store_dir)
        }
    }

    /// Preset library for the configured directory
    #[must_use]
    pub fn preset_library(&self) -> PresetLibrary {
        PresetLibrary::new(self.preset_dir.clone())
    }

    /// Check values that would otherwise fail much later
    ///
    /// # Errors
    ///
    /// `ValidationError` naming the offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "store directory must not be empty".to_string(),
            ));
        }
        if !self.identity.email.contains('@') {
            return Err(ConfigError::ValidationError(format!(
                "identity email '{}' is not an email address",
                self.identity.email
            )));
        }
        if self.identity.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "identity name must not be empty".to_string(),
            ));
        }
        if self.default_personality.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "default personality must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/gitpet/gitpet.toml` or
/// `~/.config/gitpet/gitpet.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("gitpet").join("gitpet.toml"))
}

/// Default directory searched for personality files
#[must_use]
pub fn default_preset_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("gitpet").join("personalities"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<GitpetConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<GitpetConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration, reading environment variables through `env`
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<GitpetConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = GitpetConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: GitpetToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut GitpetConfig, toml: &GitpetToml) {
    if let Some(ref dir) = toml.store.dir {
        config.store_dir = dir.clone();
    }

    if let Some(ref name) = toml.identity.name {
        config.identity.name = name.clone();
    }
    if let Some(ref email) = toml.identity.email {
        config.identity.email = email.clone();
    }

    if let Some(ref preset) = toml.personality.default {
        config.default_personality = preset.clone();
    }
    if toml.personality.preset_dir.is_some() {
        config.preset_dir = toml.personality.preset_dir.clone();
    }

    if let Some(enabled) = toml.auto_commit.enabled {
        config.auto_commit = enabled;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut GitpetConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = env("GITPET_STORE_DIR") {
        config.store_dir = PathBuf::from(dir);
        config.source = ConfigSource::Env;
    }
    if let Some(name) = env("GITPET_IDENTITY_NAME") {
        config.identity.name = name;
        config.source = ConfigSource::Env;
    }
    if let Some(email) = env("GITPET_IDENTITY_EMAIL") {
        config.identity.email = email;
        config.source = ConfigSource::Env;
    }
    if let Some(preset) = env("GITPET_DEFAULT_PERSONALITY") {
        config.default_personality = preset;
        config.source = ConfigSource::Env;
    }
    if let Some(dir) = env("GITPET_PRESET_DIR") {
        config.preset_dir = Some(PathBuf::from(dir));
        config.source = ConfigSource::Env;
    }
    if let Some(enabled) = env("GITPET_AUTO_COMMIT") {
        config.auto_commit = enabled != "0" && enabled.to_lowercase() != "false";
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Store directory override
    pub store_dir: Option<PathBuf>,

    /// Default personality override
    pub default_personality: Option<String>,

    /// Preset directory override
    pub preset_dir: Option<PathBuf>,

    /// Auto-commit override
    pub auto_commit: Option<bool>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set store directory override
    #[must_use]
    pub fn with_store_dir(mut self, dir: PathBuf) -> Self {
        self.store_dir = Some(dir);
        self
    }

    /// Set default personality override
    #[must_use]
    pub fn with_default_personality(mut self, preset: String) -> Self {
        self.default_personality = Some(preset);
        self
    }

    /// Set preset directory override
    #[must_use]
    pub fn with_preset_dir(mut self, dir: PathBuf) -> Self {
        self.preset_dir = Some(dir);
        self
    }

    /// Set auto-commit override
    #[must_use]
    pub fn with_auto_commit(mut self, enabled: bool) -> Self {
        self.auto_commit = Some(enabled);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut GitpetConfig) {
        if self.store_dir.is_some()
            || self.default_personality.is_some()
            || self.preset_dir.is_some()
            || self.auto_commit.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref dir) = self.store_dir {
            config.store_dir = dir.clone();
        }
        if let Some(ref preset) = self.default_personality {
            config.default_personality = preset.clone();
        }
        if let Some(ref dir) = self.preset_dir {
            config.preset_dir = Some(dir.clone());
        }
        if let Some(enabled) = self.auto_commit {
            config.auto_commit = enabled;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
