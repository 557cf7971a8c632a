//! Readiness mechanisms.
//!
//! A host can tell the runtime it is ready in several ways. The scheduler
//! binds to exactly one of them, chosen once from [`ReadinessMechanism::PREFERENCE`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// A way the host can signal that the document is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessMechanism {
    /// The document content has been parsed.
    ContentLoaded,
    /// The window and all its resources have loaded.
    WindowLoad,
    /// Attach-style `onload` handler of older hosts.
    LegacyAttachOnload,
    /// No event mechanism; ready as soon as the scheduler binds.
    Immediate,
}

impl ReadinessMechanism {
    /// Mechanisms in descending order of preference.
    pub const PREFERENCE: [Self; 4] = [
        Self::ContentLoaded,
        Self::WindowLoad,
        Self::LegacyAttachOnload,
        Self::Immediate,
    ];

    /// Returns `true` if this mechanism needs an event from the host.
    #[must_use]
    pub const fn is_event(self) -> bool {
        !matches!(self, Self::Immediate)
    }

    /// Pick the most preferred mechanism `env` supports.
    ///
    /// Falls back to [`ReadinessMechanism::Immediate`] when the host offers
    /// no event mechanism at all.
    #[must_use]
    pub fn select<E: HostEnvironment + ?Sized>(env: &E) -> Self {
        Self::PREFERENCE
            .into_iter()
            .filter(|m| m.is_event())
            .find(|&m| env.supports(m))
            .unwrap_or(Self::Immediate)
    }
}

impl fmt::Display for ReadinessMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ContentLoaded => "content-loaded",
            Self::WindowLoad => "window-load",
            Self::LegacyAttachOnload => "legacy-onload",
            Self::Immediate => "immediate",
        };
        f.write_str(name)
    }
}

/// Capabilities the host environment advertises.
pub trait HostEnvironment {
    /// Returns `true` if the host can deliver `mechanism`.
    fn supports(&self, mechanism: ReadinessMechanism) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Supports(&'static [ReadinessMechanism]);

    impl HostEnvironment for Supports {
        fn supports(&self, mechanism: ReadinessMechanism) -> bool {
            self.0.contains(&mechanism)
        }
    }

    #[test]
    fn test_select_prefers_content_loaded() {
        let env = Supports(&[
            ReadinessMechanism::WindowLoad,
            ReadinessMechanism::ContentLoaded,
        ]);
        assert_eq!(
            ReadinessMechanism::select(&env),
            ReadinessMechanism::ContentLoaded
        );
    }

    #[test]
    fn test_select_falls_through_to_legacy() {
        let env = Supports(&[ReadinessMechanism::LegacyAttachOnload]);
        assert_eq!(
            ReadinessMechanism::select(&env),
            ReadinessMechanism::LegacyAttachOnload
        );
    }

    #[test]
    fn test_select_immediate_without_events() {
        let env = Supports(&[]);
        assert_eq!(
            ReadinessMechanism::select(&env),
            ReadinessMechanism::Immediate
        );
    }
}
