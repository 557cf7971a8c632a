//! Runtime configuration.
//!
//! Set once when the context is built and read-only afterwards. The JSON
//! shape is:
//!
//! ```json
//! {
//!   "debug": true,
//!   "load": { "path": "src/", "target": "head" },
//!   "components": [{ "name": "refs", "file": "loki.refs.js" }]
//! }
//! ```
//!
//! Every field is optional and falls back to [`LokiConfig::default`].

use std::path::Path;

use loki_host::InjectionPoint;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

/// The environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "LOKI_CONFIG";

/// Default root path prepended to every component source.
pub const DEFAULT_BASE_PATH: &str = "src/";

/// Where components are loaded from and attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadTarget {
    /// Prefix joined verbatim with each component's source.
    #[serde(default = "default_base_path", alias = "path")]
    pub base_path: String,
    /// Container new scripts are appended to.
    #[serde(default, alias = "target")]
    pub injection_point: InjectionPoint,
}

impl Default for LoadTarget {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            injection_point: InjectionPoint::Head,
        }
    }
}

impl LoadTarget {
    /// Resolve a component source against the base path.
    ///
    /// This is plain concatenation; the base path is expected to carry its
    /// own trailing separator.
    #[must_use]
    pub fn resolve(&self, source: &str) -> String {
        format!("{}{}", self.base_path, source)
    }
}

/// One statically declared component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEntry {
    /// Registry key.
    pub name: String,
    /// Source location relative to [`LoadTarget::base_path`].
    #[serde(alias = "source")]
    pub file: String,
}

impl ComponentEntry {
    /// Declare a component.
    #[must_use]
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
        }
    }
}

/// Process-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LokiConfig {
    /// Gates verbose logging, such as the "has loaded" line.
    #[serde(default = "default_debug")]
    pub debug: bool,
    /// Base path and injection point.
    #[serde(default)]
    pub load: LoadTarget,
    /// Components in declaration order, which is also load order.
    #[serde(default = "default_components")]
    pub components: Vec<ComponentEntry>,
}

impl Default for LokiConfig {
    fn default() -> Self {
        Self {
            debug: default_debug(),
            load: LoadTarget::default(),
            components: default_components(),
        }
    }
}

impl LokiConfig {
    /// Load the file named by [`CONFIG_ENV`], or the defaults if it is unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the named file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_path(path),
            None => {
                info!("no {CONFIG_ENV} set, using default configuration");
                Ok(Self::default())
            }
        }
    }

    /// Read configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] or [`ConfigError::Parse`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loading configuration");
        Self::from_json_str(&text)
    }

    /// Parse configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the JSON does not match.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Override the debug flag.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Override the base path.
    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.load.base_path = base_path.into();
        self
    }

    /// Override the injection point.
    #[must_use]
    pub fn with_injection_point(mut self, point: InjectionPoint) -> Self {
        self.load.injection_point = point;
        self
    }

    /// Replace the component table.
    #[must_use]
    pub fn with_components(mut self, components: impl IntoIterator<Item = ComponentEntry>) -> Self {
        self.components = components.into_iter().collect();
        self
    }
}

fn default_debug() -> bool {
    true
}

fn default_base_path() -> String {
    DEFAULT_BASE_PATH.to_string()
}

fn default_components() -> Vec<ComponentEntry> {
    vec![
        ComponentEntry::new("refs", "loki.refs.js"),
        ComponentEntry::new("utils", "loki.utils.js"),
        ComponentEntry::new("apps", "loki.apps.js"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LokiConfig::default();
        assert!(config.debug);
        assert_eq!(config.load.base_path, "src/");
        assert_eq!(config.load.injection_point, InjectionPoint::Head);
        let names: Vec<_> = config.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["refs", "utils", "apps"]);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = LokiConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LokiConfig::default());
    }

    #[test]
    fn test_parse_with_aliases() {
        let config = LokiConfig::from_json_str(
            r#"{
                "debug": false,
                "load": { "path": "lib/", "target": "body" },
                "components": [{ "name": "core", "file": "core.js" }]
            }"#,
        )
        .unwrap();
        assert!(!config.debug);
        assert_eq!(config.load.base_path, "lib/");
        assert_eq!(config.load.injection_point, InjectionPoint::Body);
        assert_eq!(config.components, vec![ComponentEntry::new("core", "core.js")]);
    }

    #[test]
    fn test_parse_rejects_bad_target() {
        let err = LokiConfig::from_json_str(r#"{ "load": { "target": "footer" } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = LokiConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_resolve_concatenates() {
        let target = LoadTarget::default();
        assert_eq!(target.resolve("loki.refs.js"), "src/loki.refs.js");
    }

    #[test]
    fn test_builders() {
        let config = LokiConfig::default()
            .with_debug(false)
            .with_base_path("/static/")
            .with_injection_point(InjectionPoint::Body)
            .with_components([ComponentEntry::new("a", "a.js")]);
        assert!(!config.debug);
        assert_eq!(config.load.resolve("a.js"), "/static/a.js");
        assert_eq!(config.load.injection_point, InjectionPoint::Body);
        assert_eq!(config.components.len(), 1);
    }
}
