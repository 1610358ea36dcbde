//! Consumed filter configuration surface
//!
//! The core does not load or watch configuration files; it accepts an
//! already-deserialized mapping from `"[Provider:]Category.Prefix"` keys to
//! level names and turns it into filter rules. The special `"Default"` key
//! sets the fallback minimum level.

use super::error::{DispatchError, Result};
use super::filter::FilterRule;
use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A level-switch mapping, e.g. deserialized from a `logging.json` section:
///
/// ```json
/// {
///     "Default": "Trace",
///     "Vendor": "Warning",
///     "App.Startup": "Debug",
///     "console:App": "Information"
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterConfig {
    switches: BTreeMap<String, String>,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a switch. The key is a category prefix, optionally preceded by
    /// `"provider:"`; the special key `"Default"` sets the fallback level.
    #[must_use = "builder methods return a new value"]
    pub fn with_switch(mut self, key: impl Into<String>, level: impl Into<String>) -> Self {
        self.switches.insert(key.into(), level.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }

    /// Convert the mapping into filter rules plus an optional default level.
    ///
    /// A level name that fails to parse is a configuration error; the caller
    /// (the dispatcher) keeps its previous rules when this returns `Err`.
    /// Provider existence is validated at apply time by the dispatcher,
    /// which owns the registry.
    pub fn to_rules(&self) -> Result<(Vec<FilterRule>, Option<LogLevel>)> {
        let mut rules = Vec::new();
        let mut default_level = None;

        for (key, value) in &self.switches {
            let level: LogLevel = value
                .parse()
                .map_err(|message: String| DispatchError::config("FilterConfig", message))?;

            if key.eq_ignore_ascii_case("default") {
                default_level = Some(level);
                continue;
            }

            let rule = match key.split_once(':') {
                Some((provider, category)) => {
                    if provider.is_empty() {
                        return Err(DispatchError::config(
                            "FilterConfig",
                            format!("empty provider name in switch '{}'", key),
                        ));
                    }
                    FilterRule::for_provider(provider, category, level)
                }
                None => FilterRule::new(key.clone(), level),
            };
            rules.push(rule);
        }

        Ok((rules, default_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_from_json() {
        let json = r#"{
            "Default": "Trace",
            "Vendor": "Warning",
            "App.Startup": "Debug"
        }"#;
        let config: FilterConfig = serde_json::from_str(json).unwrap();
        let (rules, default_level) = config.to_rules().unwrap();

        assert_eq!(default_level, Some(LogLevel::Trace));
        assert_eq!(rules.len(), 2);
        assert!(rules.iter().any(|r| r.category == "Vendor" && r.min_level == LogLevel::Warn));
    }

    #[test]
    fn test_provider_qualified_switch() {
        let config = FilterConfig::new().with_switch("console:App", "Debug");
        let (rules, _) = config.to_rules().unwrap();
        assert_eq!(rules[0].provider.as_deref(), Some("console"));
        assert_eq!(rules[0].category, "App");
    }

    #[test]
    fn test_bad_level_is_config_error() {
        let config = FilterConfig::new().with_switch("App", "verbose");
        let err = config.to_rules().unwrap_err();
        assert!(matches!(err, DispatchError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_empty_provider_is_config_error() {
        let config = FilterConfig::new().with_switch(":App", "Debug");
        assert!(config.to_rules().is_err());
    }

    #[test]
    fn test_default_key_is_case_insensitive() {
        let config = FilterConfig::new().with_switch("default", "Warning");
        let (rules, default_level) = config.to_rules().unwrap();
        assert!(rules.is_empty());
        assert_eq!(default_level, Some(LogLevel::Warn));
    }
}
