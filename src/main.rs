use anyhow::Result;
use floodnorm::{adapter::SourceRegistry, config::RunConfig, pipeline};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configure dirs ───────────────────────────────────────────
    let config = RunConfig::from_env();
    info!(
        source_dir = %config.source_dir.display(),
        results_dir = %config.results_dir.display(),
        "configured"
    );

    // ─── 3) run every source ─────────────────────────────────────────
    let registry = SourceRegistry::new();
    let outcomes = pipeline::run_all(&registry, &config)?;

    // ─── 4) report ───────────────────────────────────────────────────
    for o in &outcomes {
        match (&o.error, &o.artifact) {
            (Some(e), _) => error!(source = %o.source, "failed: {}", e),
            (None, Some(path)) => info!(
                source = %o.source,
                records = o.records,
                warnings = o.warnings.len(),
                "wrote {}",
                path.display()
            ),
            (None, None) => warn!(source = %o.source, "no incident records"),
        }
    }
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    info!("done: {} sources, {} failed", outcomes.len(), failed);
    Ok(())
}
