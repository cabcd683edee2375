use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::env::EnvOverrides;
use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_API_URL: &str = "https://api.probectl.dev";

const APP_DIR_NAME: &str = "probectl";

/// Read access to persisted preferences.
pub trait PreferenceStore {
    /// Persisted telemetry choice, `None` when the user never chose.
    fn telemetry_enabled(&self) -> Option<bool>;

    /// Organization identifier of the active context.
    fn org_id(&self) -> Option<String>;
}

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl Preferences {
    /// Effective API base URL: environment, then file, then built-in default.
    #[must_use]
    pub fn api_url(&self, env: &EnvOverrides) -> String {
        env.api_url
            .clone()
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }
}

impl PreferenceStore for Preferences {
    fn telemetry_enabled(&self) -> Option<bool> {
        self.telemetry
    }

    fn org_id(&self) -> Option<String> {
        self.org_id.clone().filter(|id| !id.is_empty())
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Env,
    Config,
    Default,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env => write!(f, "env"),
            Self::Config => write!(f, "config"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Resolve whether telemetry is on.
///
/// A recognised environment override wins; an unrecognised one is ignored.
/// Then the persisted preference applies. With neither, telemetry is off.
pub fn resolve_telemetry<P: PreferenceStore + ?Sized>(
    env: &EnvOverrides,
    prefs: &P,
) -> (bool, ValueSource) {
    if let Some(enabled) = env.telemetry_override() {
        return (enabled, ValueSource::Env);
    }
    if let Some(enabled) = prefs.telemetry_enabled() {
        return (enabled, ValueSource::Config);
    }
    (false, ValueSource::Default)
}

/// Handle on the on-disk preferences file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceFile {
    path: PathBuf,
}

impl PreferenceFile {
    /// Preferences file at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Locate the preferences file: `PROBECTL_CONFIG_DIR`, else the platform
    /// config directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] when neither is available.
    pub fn discover(env: &EnvOverrides) -> Result<Self, ConfigError> {
        let dir = match &env.config_dir {
            Some(dir) => dir.clone(),
            None => dirs::config_dir()
                .ok_or(ConfigError::NoConfigDir)?
                .join(APP_DIR_NAME),
        };
        Ok(Self::at(dir.join(CONFIG_FILE_NAME)))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load preferences. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Preferences, ConfigError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no preferences file, using defaults");
                return Ok(Preferences::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Save preferences via temp file + fsync + rename in the same directory.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem step fails.
    pub fn save(&self, prefs: &Preferences) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(prefs)?;
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(write_err)?;

        let mut temp_file = NamedTempFile::new_in(dir).map_err(write_err)?;
        temp_file.write_all(content.as_bytes()).map_err(write_err)?;
        temp_file.as_file().sync_all().map_err(write_err)?;
        temp_file
            .persist(&self.path)
            .map_err(|err| write_err(err.error))?;

        tracing::debug!(path = %self.path.display(), "saved preferences");
        Ok(())
    }
}
