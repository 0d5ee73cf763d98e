use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zonecheck::{Checker, LiveResolver, RunOptions, ZoneConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args();
    let program_name = args.next().unwrap_or_else(|| "zonecheck".to_string());

    let mut options = RunOptions::default();
    let mut zone_file = None;
    for arg in args {
        match arg.as_str() {
            "--debug" => options.debug = true,
            _ => zone_file = Some(arg),
        }
    }
    let Some(zone_file) = zone_file else {
        return Err(anyhow!("usage: {program_name} /path/to/zone.json [--debug]"));
    };

    tracing_init(options.debug);

    let config = ZoneConfig::try_from_file(&zone_file)?;
    tracing::debug!("loaded zone config from {zone_file}");

    let resolver = LiveResolver::open();
    let mut checker = Checker::new(&resolver, options);
    let report = checker.run(&config).await;

    tracing::info!(
        "{} record groups checked, {} failed",
        report.total,
        report.failed
    );
    if !report.passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn tracing_init(debug: bool) {
    let default_filter = if debug {
        "zonecheck=debug,trust_dns_resolver=debug"
    } else {
        "zonecheck=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
