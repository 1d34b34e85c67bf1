//! `timeline-ingest` — replay a saved user timeline through the ingest
//! pipeline once.
//!
//! Bookmarks go to stdout; logs go to stderr (`RUST_LOG=debug` for the
//! per-poll trace).  The final cursor is logged so the next run can pass it
//! back with `--since`.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use timeline_ingest::config::Args;
use timeline_ingest::pipeline;

fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let summary = pipeline::replay(args, &mut out)?;
    out.flush()?;

    tracing::info!(
        profile = %args.profile,
        key = %summary.metadata_key,
        delivered = summary.delivered,
        written = summary.written,
        cursor = summary.cursor,
        "replay finished"
    );
    Ok(())
}
