//! Script elements and the document they are attached to.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// MIME type set on every injected script.
pub const SCRIPT_TYPE: &str = "text/javascript";

/// The container a new script element is appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjectionPoint {
    /// The document `<head>`.
    #[default]
    Head,
    /// The document `<body>`.
    Body,
}

impl InjectionPoint {
    /// Tag name used to look the container up in the document.
    #[must_use]
    pub const fn tag_name(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Body => "body",
        }
    }
}

impl fmt::Display for InjectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_name())
    }
}

/// An injectable script reference.
///
/// Carries the component name alongside the resolved source so a host can
/// report which component a script belongs to. The element itself has no
/// behaviour; executing it is entirely up to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptElement {
    /// Registry key of the component this script provides.
    pub component: String,
    /// Resolved location (`base_path + source`).
    pub src: String,
    /// MIME type, always [`SCRIPT_TYPE`] for loader-created scripts.
    pub script_type: String,
}

impl ScriptElement {
    /// Create a JavaScript element for `component` pointing at `src`.
    #[must_use]
    pub fn javascript(component: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            src: src.into(),
            script_type: SCRIPT_TYPE.to_string(),
        }
    }
}

/// The single active host document.
///
/// Attaching is fire-and-forget: implementations queue or start the script
/// and return without waiting for it to execute.
pub trait HostDocument {
    /// Append `script` to the container named by `target`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::MissingContainer`] if the document has no such
    /// container, or [`HostError::EmptySource`] for a script without a source.
    fn attach_script(&mut self, script: ScriptElement, target: InjectionPoint)
    -> Result<(), HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_names() {
        assert_eq!(InjectionPoint::Head.tag_name(), "head");
        assert_eq!(InjectionPoint::Body.to_string(), "body");
    }

    #[test]
    fn test_injection_point_deserialises_lowercase() {
        let point: InjectionPoint = serde_json::from_str("\"body\"").unwrap();
        assert_eq!(point, InjectionPoint::Body);
    }

    #[test]
    fn test_javascript_element() {
        let script = ScriptElement::javascript("refs", "src/loki.refs.js");
        assert_eq!(script.component, "refs");
        assert_eq!(script.src, "src/loki.refs.js");
        assert_eq!(script.script_type, SCRIPT_TYPE);
    }
}
