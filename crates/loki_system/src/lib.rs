//! # loki_system
//!
//! Core of the Loki bootstrap runtime.
//!
//! Two independent pieces share one logging collaborator:
//!
//! 1. The component [`Loader`] resolves declared components against the
//!    configured base path and injects them into the host document, then
//!    records each one as available when it announces itself.
//! 2. The [`ReadyQueue`] buffers deferred tasks until the host signals
//!    readiness, drains them once in FIFO order, and runs anything enqueued
//!    later immediately. A failing task never stops its siblings.
//!
//! ## Usage
//!
//! ```rust
//! use loki_host::{HeadlessDocument, ReadinessMechanism};
//! use loki_system::{LokiConfig, LokiContext};
//!
//! let mut ctx = LokiContext::new(LokiConfig::default(), HeadlessDocument::new()).unwrap();
//! ctx.ready().enqueue(|| {
//!     println!("document ready");
//!     Ok(())
//! });
//! let mechanism = ctx.start();
//! assert_eq!(mechanism, ReadinessMechanism::ContentLoaded);
//! ctx.ready().signal(mechanism);
//! assert!(ctx.ready().is_fired());
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod loader;
pub mod log;
pub mod ready;
pub mod registry;

pub use config::{ComponentEntry, LoadTarget, LokiConfig};
pub use context::LokiContext;
pub use error::{ConfigError, RegistryError};
pub use loader::{LoadRequest, Loader, SubscriptionId};
pub use log::{LogBook, LogSink, Logger, Severity, TracingSink};
pub use ready::{DeferredTask, ReadyQueue};
pub use registry::{ComponentDescriptor, ComponentRegistry, LoadState};
