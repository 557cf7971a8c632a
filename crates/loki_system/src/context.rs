//! The process-wide runtime context.
//!
//! Owns the loader, the ready-queue and the shared logger. Built once at
//! startup and kept for the life of the process; everything that needs the
//! runtime is handed a reference to it.

use loki_host::{HostDocument, HostEnvironment, ReadinessMechanism};
use tracing::info;

use crate::config::LokiConfig;
use crate::error::ConfigError;
use crate::loader::Loader;
use crate::log::{Logger, NAMESPACE, VERSION};
use crate::ready::ReadyQueue;
use crate::registry::ComponentRegistry;

/// Runtime state for one host document.
#[derive(Debug)]
pub struct LokiContext<D> {
    config: LokiConfig,
    logger: Logger,
    loader: Loader<D>,
    ready: ReadyQueue,
}

impl<D: HostDocument + HostEnvironment> LokiContext<D> {
    /// Build a context logging through `tracing`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Registry`] if the component table has empty or
    /// duplicate names.
    pub fn new(config: LokiConfig, document: D) -> Result<Self, ConfigError> {
        Self::with_logger(config, document, Logger::new())
    }

    /// Build a context around an existing logger.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Registry`] if the component table has empty or
    /// duplicate names.
    pub fn with_logger(
        config: LokiConfig,
        document: D,
        logger: Logger,
    ) -> Result<Self, ConfigError> {
        let registry = ComponentRegistry::from_entries(&config.components)?;
        let loader = Loader::new(
            registry,
            config.load.clone(),
            config.debug,
            document,
            logger.clone(),
        );
        let ready = ReadyQueue::new(logger.clone());
        info!(
            namespace = NAMESPACE,
            version = VERSION,
            components = config.components.len(),
            debug = config.debug,
            "context created"
        );
        Ok(Self {
            config,
            logger,
            loader,
            ready,
        })
    }

    /// Start the runtime: request every component, then bind the
    /// ready-queue to the host's preferred readiness mechanism.
    ///
    /// Returns the bound mechanism. For [`ReadinessMechanism::Immediate`] the
    /// queue has already drained when this returns.
    pub fn start(&mut self) -> ReadinessMechanism {
        self.loader.initialize_all();
        self.ready.bind(self.loader.document())
    }

    /// The configuration this context was built from.
    #[must_use]
    pub fn config(&self) -> &LokiConfig {
        &self.config
    }

    /// The shared logger.
    #[must_use]
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// The component loader.
    #[must_use]
    pub fn loader(&self) -> &Loader<D> {
        &self.loader
    }

    /// Mutable access to the component loader.
    pub fn loader_mut(&mut self) -> &mut Loader<D> {
        &mut self.loader
    }

    /// The ready-queue. Clone it to hand it to tasks.
    #[must_use]
    pub fn ready(&self) -> &ReadyQueue {
        &self.ready
    }
}
