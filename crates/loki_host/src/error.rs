//! Host-layer error types.

use crate::document::InjectionPoint;

/// Errors a host can report when the loader touches the document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The document has no element for the requested container tag.
    #[error("no `{0}` container in the host document")]
    MissingContainer(InjectionPoint),

    /// The script element has an empty source location.
    #[error("script element has an empty source")]
    EmptySource,
}
