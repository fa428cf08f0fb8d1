//! Vote aggregation pipeline — binary entrypoint.
//!
//! Runs one aggregation pass over both chambers and exits. The single
//! optional positional argument selects the mode: `full` backfills from
//! the historical start date, `update` resumes from the last persisted
//! window, anything else (or nothing) runs the rolling live window.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use capitol_votes::{pipeline, Mode, PipelineConfig};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("capitol_votes=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = PipelineConfig::load_default()?;
    let mode = Mode::from_arg(std::env::args().nth(1).as_deref());

    pipeline::run(mode, &cfg).await
}
