//! # loki_app — headless bootstrap
//!
//! Boots a Loki runtime against an in-memory host document and drives it
//! through one page lifecycle.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (`--config`, else `LOKI_CONFIG`, else defaults).
//! 2. Inject every declared component. Scripts are resolved against
//!    `--root` on disk; a missing file is a failed load.
//! 3. Deliver readiness and drain the deferred tasks.
//! 4. Report components that never announced themselves.

mod host_loop;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use loki_host::{HeadlessDocument, InjectionPoint};
use loki_system::{LokiConfig, LokiContext, Severity};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use host_loop::HostLoop;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "loki_app", about = "Run the Loki bootstrap against a headless document")]
struct Args {
    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory component sources are resolved against.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Force verbose component logging on.
    #[arg(long, conflicts_with = "quiet")]
    debug: bool,

    /// Force verbose component logging off.
    #[arg(long)]
    quiet: bool,

    /// Inject into `<body>` instead of the configured container.
    #[arg(long)]
    body: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("loki_app=info".parse()?)
                .add_directive("loki=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => LokiConfig::from_path(path)?,
        None => LokiConfig::load()?,
    };
    if args.debug {
        config = config.with_debug(true);
    } else if args.quiet {
        config = config.with_debug(false);
    }
    if args.body {
        config = config.with_injection_point(InjectionPoint::Body);
    }

    let ctx = LokiContext::new(config, HeadlessDocument::new())?;
    ctx.ready().enqueue(|| {
        info!("document ready");
        Ok(())
    });

    let root = args.root.clone();
    let mut host = HostLoop::new(ctx, move |src: &str| root.join(src).is_file());
    let report = host.run().await;

    let logger = host.context().logger();
    info!(
        loaded = report.loaded.len(),
        stuck = report.stuck.len(),
        fired = report.fired,
        errors = logger.count(Severity::Error),
        "bootstrap finished"
    );
    if !report.fired {
        warn!("ready-queue never fired");
    }

    Ok(())
}
