//! # loki_host
//!
//! Host environment layer for the Loki bootstrap runtime.
//!
//! This crate provides:
//!
//! - [`document`] — script elements, injection points, and the [`HostDocument`] trait.
//! - [`readiness`] — readiness mechanisms and the [`HostEnvironment`] capability trait.
//! - [`headless`] — an in-memory host used by the binary and by tests.
//! - [`error`] — host-layer error types.

pub mod document;
pub mod error;
pub mod headless;
pub mod readiness;

pub use document::{HostDocument, InjectionPoint, ScriptElement};
pub use error::HostError;
pub use headless::HeadlessDocument;
pub use readiness::{HostEnvironment, ReadinessMechanism};
