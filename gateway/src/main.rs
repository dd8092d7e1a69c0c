use clap::Parser;
use gateway::config::{Config, MetricsConfig};
use metrics_exporter_statsd::StatsdBuilder;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "JSON gateway for search-interest trends data")]
struct Cli {
    /// Path to the YAML config file; built-in defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Config error: {e}");
                process::exit(1);
            }
        },
        None => Config::default(),
    };

    if let Err(e) = config.apply_env() {
        eprintln!("Config error: {e}");
        process::exit(1);
    }
    if let Err(e) = config.validate() {
        eprintln!("Config error: {e}");
        process::exit(1);
    }

    if let Some(metrics_config) = &config.metrics {
        if let Err(e) = init_metrics(metrics_config) {
            eprintln!("Metrics error: {e}");
            process::exit(1);
        }
    }
    log_metric_defs();

    if let Err(e) = gateway::run(config).await {
        eprintln!("Gateway error: {e}");
        process::exit(1);
    }
}

fn init_metrics(config: &MetricsConfig) -> Result<(), String> {
    let recorder = StatsdBuilder::from(config.statsd_host.as_str(), config.statsd_port)
        .with_queue_size(5000)
        .with_buffer_size(1024)
        .build(Some("trends_gateway"))
        .map_err(|e| e.to_string())?;
    metrics::set_global_recorder(recorder).map_err(|e| e.to_string())?;
    Ok(())
}

fn log_metric_defs() {
    let all = trends::metrics_defs::ALL_METRICS
        .iter()
        .chain(gateway::metrics_defs::ALL_METRICS);
    for def in all {
        tracing::debug!(
            name = def.name,
            r#type = def.metric_type.as_str(),
            description = def.description,
            "metric registered"
        );
    }
}
