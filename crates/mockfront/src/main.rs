use anyhow::Context;
use clap::Parser;
use mockfront::config::load_rules;
use mockfront::metrics;
use mockfront::route::{compile, log_warnings, Dispatcher};
use mockfront::server::{serve_metrics, MockServer};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Serve canned JSON responses described by a rule document
#[derive(Parser, Debug)]
#[command(name = "mockfront")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Rule document (JSON, or YAML with a .yaml/.yml extension)
    #[arg(short = 'f', long = "file", env = "MOCKFRONT_FILE")]
    file: PathBuf,

    /// Port for the mock listener
    #[arg(short, long, env = "MOCKFRONT_PORT", default_value = "9292")]
    port: u16,

    /// Address to bind
    #[arg(long, env = "MOCKFRONT_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Serve Prometheus metrics at /metrics on this port
    #[arg(long, env = "MOCKFRONT_METRICS_PORT")]
    metrics_port: Option<u16>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "MOCKFRONT_LOG", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let rules = load_rules(&args.file)
        .with_context(|| format!("cannot load rules from {}", args.file.display()))?;
    let table = compile(rules).context("cannot compile rules")?;

    let warnings = log_warnings(&table);
    if warnings > 0 {
        info!("{} rule warning(s) found", warnings);
    }
    for (route, rules) in table.routes() {
        info!("{} ({} rule(s))", route, rules.len());
    }
    info!(
        "Loaded {} rule(s) on {} route(s)",
        table.rule_count(),
        table.route_count()
    );
    metrics::set_rules_loaded(table.rule_count());

    if let Some(metrics_port) = args.metrics_port {
        let addr = SocketAddr::new(args.host, metrics_port);
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind metrics listener on {addr}"))?;
        info!("Metrics available at http://{}/metrics", addr);
        tokio::spawn(serve_metrics(listener, std::future::pending()));
    }

    let dispatcher = Arc::new(Dispatcher::new(table));
    let server = MockServer::new(SocketAddr::new(args.host, args.port), dispatcher);
    server
        .run_until(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Received Ctrl-C");
        })
        .await
}
