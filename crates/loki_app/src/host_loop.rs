//! Headless host event loop.
//!
//! Plays the part of the browser around a [`LokiContext`]:
//!
//! 1. Start the context (inject every component, bind readiness).
//! 2. Execute injected scripts on later turns of the loop. A script whose
//!    source resolves announces its component; one that does not is a
//!    failed load and stays pending.
//! 3. Deliver every readiness event the host supports, in order. Only the
//!    bound one drains the ready-queue.

use loki_host::{HeadlessDocument, HostEnvironment, ReadinessMechanism};
use loki_system::LokiContext;
use tracing::{debug, info, warn};

/// Decides whether a script source can be fetched and run.
pub trait ScriptResolver {
    /// Returns `true` if the script at `src` exists.
    fn resolves(&self, src: &str) -> bool;
}

impl<F: Fn(&str) -> bool> ScriptResolver for F {
    fn resolves(&self, src: &str) -> bool {
        self(src)
    }
}

/// Summary of one run of the loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopReport {
    /// The mechanism the ready-queue was bound to.
    pub mechanism: Option<ReadinessMechanism>,
    /// Components that announced themselves.
    pub loaded: Vec<String>,
    /// Components injected but never announced.
    pub stuck: Vec<String>,
    /// Whether the ready-queue drained.
    pub fired: bool,
}

/// Drives a context over a [`HeadlessDocument`].
#[derive(Debug)]
pub struct HostLoop<R> {
    ctx: LokiContext<HeadlessDocument>,
    resolver: R,
}

impl<R: ScriptResolver> HostLoop<R> {
    /// Create a loop for `ctx`, resolving scripts with `resolver`.
    #[must_use]
    pub fn new(ctx: LokiContext<HeadlessDocument>, resolver: R) -> Self {
        Self { ctx, resolver }
    }

    /// The driven context.
    #[must_use]
    pub fn context(&self) -> &LokiContext<HeadlessDocument> {
        &self.ctx
    }

    /// Run until no injected script is left to execute and readiness has
    /// been delivered.
    pub async fn run(&mut self) -> LoopReport {
        let mechanism = self.ctx.start();
        info!(%mechanism, "host loop started");

        // Scripts run asynchronously relative to their injection.
        loop {
            let scripts = self.ctx.loader_mut().document_mut().take_unexecuted();
            if scripts.is_empty() {
                break;
            }
            for script in scripts {
                tokio::task::yield_now().await;
                if self.resolver.resolves(&script.src) {
                    debug!(component = script.component, src = script.src, "executing script");
                    self.ctx.loader_mut().notify_available(&script.component);
                } else {
                    warn!(component = script.component, src = script.src, "script failed to load");
                }
            }
        }

        tokio::task::yield_now().await;
        for event in ReadinessMechanism::PREFERENCE {
            if event.is_event() && self.ctx.loader().document().supports(event) {
                let drained = self.ctx.ready().signal(event);
                debug!(%event, drained, "readiness event delivered");
            }
        }

        let loader = self.ctx.loader();
        let report = LoopReport {
            mechanism: self.ctx.ready().mechanism(),
            loaded: loader
                .registry()
                .iter()
                .filter(|c| c.is_loaded())
                .map(|c| c.name().to_string())
                .collect(),
            stuck: loader.pending_loads(),
            fired: self.ctx.ready().is_fired(),
        };
        if !report.stuck.is_empty() {
            warn!(stuck = ?report.stuck, "components never announced themselves");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use loki_system::{ComponentEntry, Logger, LokiConfig, Severity};

    use super::*;

    fn make_ctx(document: HeadlessDocument) -> LokiContext<HeadlessDocument> {
        LokiContext::with_logger(LokiConfig::default(), document, Logger::buffered()).unwrap()
    }

    #[tokio::test]
    async fn test_loads_resolvable_scripts() {
        let ctx = make_ctx(HeadlessDocument::new());
        let mut host = HostLoop::new(ctx, |src: &str| !src.ends_with("apps.js"));
        let report = host.run().await;

        assert_eq!(report.loaded, ["refs", "utils"]);
        assert_eq!(report.stuck, ["apps"]);
        assert_eq!(report.mechanism, Some(ReadinessMechanism::ContentLoaded));
        assert!(report.fired);
    }

    #[tokio::test]
    async fn test_deferred_tasks_run_once_across_events() {
        let ctx = make_ctx(HeadlessDocument::new());
        let runs = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&runs);
        ctx.ready().enqueue(move || {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        let mut host = HostLoop::new(ctx, |_: &str| true);
        host.run().await;
        // Content-loaded, window-load and legacy onload were all delivered.
        assert_eq!(*runs.borrow(), 1);
    }

    #[tokio::test]
    async fn test_immediate_host_drains_before_scripts() {
        let ctx = make_ctx(HeadlessDocument::new().with_mechanisms(Vec::<ReadinessMechanism>::new()));
        let order = Rc::new(RefCell::new(Vec::new()));

        let seen = Rc::clone(&order);
        ctx.ready().enqueue(move || {
            seen.borrow_mut().push("task".to_string());
            Ok(())
        });
        let mut ctx = ctx;
        let seen = Rc::clone(&order);
        ctx.loader_mut()
            .set_listener(move |name| seen.borrow_mut().push(name.to_string()));

        let mut host = HostLoop::new(ctx, |_: &str| true);
        let report = host.run().await;
        assert_eq!(report.mechanism, Some(ReadinessMechanism::Immediate));
        assert_eq!(*order.borrow(), ["task", "refs", "utils", "apps"]);
    }

    #[tokio::test]
    async fn test_failed_task_logged_during_run() {
        let config = LokiConfig::default()
            .with_debug(false)
            .with_components([ComponentEntry::new("only", "only.js")]);
        let logger = Logger::buffered();
        let ctx = LokiContext::with_logger(config, HeadlessDocument::new(), logger.clone()).unwrap();
        ctx.ready().enqueue(|| anyhow::bail!("bad task"));

        let mut host = HostLoop::new(ctx, |_: &str| true);
        let report = host.run().await;
        assert!(report.stuck.is_empty());
        assert_eq!(logger.count(Severity::Error), 1);
        assert_eq!(logger.count(Severity::Info), 0);
    }
}
