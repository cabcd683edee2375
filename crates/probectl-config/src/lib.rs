//! Configuration for probectl.
//!
//! Two sources feed the lifecycle core:
//!
//! - [`EnvOverrides`]: `PROBECTL_*` environment variables, captured once
//! - [`Preferences`]: the persisted `config.toml` in the user config directory
//!
//! Environment overrides always win over persisted preferences. Resolution
//! helpers such as [`resolve_telemetry`] report which source decided a value.

mod env;
mod error;
mod preferences;

pub use env::{
    API_URL_ENV, CONFIG_DIR_ENV, DEBUG_ENV, EnvOverrides, TELEMETRY_ENDPOINT_ENV, TELEMETRY_ENV,
    parse_bool_override,
};
pub use error::ConfigError;
pub use preferences::{
    CONFIG_FILE_NAME, DEFAULT_API_URL, PreferenceFile, PreferenceStore, Preferences,
    ValueSource, resolve_telemetry,
};
