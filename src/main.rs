//! Replays a recorded touch trace through the visualizer and logs the result.

use anyhow::Context;
use std::path::PathBuf;
use touch_visualizer::replay::{run_trace, ReplayTrace};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    touch_visualizer::init_tracing();

    let path: PathBuf = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: touch-replay <trace.json>")?;

    let trace = ReplayTrace::load(&path)
        .with_context(|| format!("Failed to load trace {}", path.display()))?;

    tracing::info!("Touch replay v{} ({})", env!("CARGO_PKG_VERSION"), path.display());

    let summary = run_trace(&trace, touch_visualizer::shared()).await?;

    println!(
        "events={} markers={} remaining={}",
        summary.events_delivered, summary.markers_created, summary.touches_remaining
    );
    Ok(())
}
