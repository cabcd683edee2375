use std::path::PathBuf;

/// Force-enable or force-disable telemetry.
pub const TELEMETRY_ENV: &str = "PROBECTL_TELEMETRY";
/// Print classification diagnostics before error messages.
pub const DEBUG_ENV: &str = "PROBECTL_DEBUG";
/// Override the telemetry collection endpoint.
pub const TELEMETRY_ENDPOINT_ENV: &str = "PROBECTL_TELEMETRY_ENDPOINT";
/// Override the API base URL.
pub const API_URL_ENV: &str = "PROBECTL_API_URL";
/// Override the directory holding `config.toml`.
pub const CONFIG_DIR_ENV: &str = "PROBECTL_CONFIG_DIR";

/// Parse a boolean override value.
///
/// Recognised values are case-insensitive: `0`, `false`, `no`, `off` disable
/// and `1`, `true`, `yes`, `on` enable. Anything else is not an override and
/// yields `None`, so the caller falls through to the next source.
#[must_use]
pub fn parse_bool_override(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "0" | "false" | "no" | "off" => Some(false),
        "1" | "true" | "yes" | "on" => Some(true),
        _ => None,
    }
}

/// Snapshot of the `PROBECTL_*` environment variables.
///
/// Captured once at startup. Tests build it with [`EnvOverrides::from_lookup`]
/// or struct literals instead of mutating the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub telemetry: Option<String>,
    pub debug: Option<String>,
    pub telemetry_endpoint: Option<String>,
    pub api_url: Option<String>,
    pub config_dir: Option<PathBuf>,
}

impl EnvOverrides {
    /// Capture overrides from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Capture overrides through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            telemetry: non_empty(TELEMETRY_ENV),
            debug: non_empty(DEBUG_ENV),
            telemetry_endpoint: non_empty(TELEMETRY_ENDPOINT_ENV),
            api_url: non_empty(API_URL_ENV),
            config_dir: non_empty(CONFIG_DIR_ENV).map(PathBuf::from),
        }
    }

    /// Telemetry override, if one was set to a recognised value.
    #[must_use]
    pub fn telemetry_override(&self) -> Option<bool> {
        self.telemetry.as_deref().and_then(parse_bool_override)
    }

    /// Whether debug diagnostics are on.
    ///
    /// Any non-empty value turns debug on unless it is a recognised false value.
    #[must_use]
    pub fn debug_enabled(&self) -> bool {
        self.debug
            .as_deref()
            .is_some_and(|value| parse_bool_override(value) != Some(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_bool_override_recognised_values() {
        for value in ["0", "false", "FALSE", "No", "off", " off "] {
            assert_eq!(parse_bool_override(value), Some(false), "{value}");
        }
        for value in ["1", "true", "True", "YES", "on"] {
            assert_eq!(parse_bool_override(value), Some(true), "{value}");
        }
    }

    #[test]
    fn test_parse_bool_override_ignores_unknown() {
        assert_eq!(parse_bool_override("maybe"), None);
        assert_eq!(parse_bool_override(""), None);
        assert_eq!(parse_bool_override("2"), None);
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        let env = EnvOverrides::from_lookup(lookup_from(&[
            (TELEMETRY_ENV, "off"),
            (DEBUG_ENV, "1"),
            (TELEMETRY_ENDPOINT_ENV, "http://127.0.0.1:9/events"),
            (API_URL_ENV, "http://localhost:8080"),
            (CONFIG_DIR_ENV, "/tmp/probectl"),
        ]));

        assert_eq!(env.telemetry_override(), Some(false));
        assert!(env.debug_enabled());
        assert_eq!(
            env.telemetry_endpoint.as_deref(),
            Some("http://127.0.0.1:9/events")
        );
        assert_eq!(env.api_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(env.config_dir, Some(PathBuf::from("/tmp/probectl")));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let env = EnvOverrides::from_lookup(lookup_from(&[(TELEMETRY_ENV, ""), (DEBUG_ENV, "  ")]));
        assert_eq!(env, EnvOverrides::default());
    }

    #[test]
    fn test_debug_enabled_by_arbitrary_value() {
        let env = EnvOverrides {
            debug: Some("verbose".to_string()),
            ..EnvOverrides::default()
        };
        assert!(env.debug_enabled());

        let env = EnvOverrides {
            debug: Some("off".to_string()),
            ..EnvOverrides::default()
        };
        assert!(!env.debug_enabled());
    }

    #[test]
    fn test_unrecognised_telemetry_value_is_not_an_override() {
        let env = EnvOverrides {
            telemetry: Some("sometimes".to_string()),
            ..EnvOverrides::default()
        };
        assert_eq!(env.telemetry_override(), None);
    }
}
