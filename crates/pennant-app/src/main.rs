// Pennant sync entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr)
// 2. Load config (copying defaults on first run)
// 3. Build the stats source
// 4. Run one sync and exit

use anyhow::Context;
use pennant_app::config;
use pennant_app::source::StatsSource;
use pennant_app::sync;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("pennant sync starting");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: season {}, {:?} source, {} known teams",
        config.season.year,
        config.source.mode,
        config.teams.len()
    );

    let source = StatsSource::from_config(&config).context("failed to build stats source")?;

    let today = chrono::Local::now().date_naive();
    if let Err(e) = sync::run_sync(&config, &source, today).await {
        error!("sync failed: {e:#}");
        return Err(e);
    }

    info!("pennant sync finished");
    Ok(())
}

/// Initialize tracing to stderr, filtered by `RUST_LOG`.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pennant_app=info,pennant_core=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
