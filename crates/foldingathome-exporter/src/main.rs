mod handlers;
mod state;

use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use foldingathome_core::client::{ClientConfig, DEFAULT_ADDRESS, TcpConnector};
use foldingathome_core::collector::Collector;
use foldingathome_core::metrics::MetricDescriptors;

use state::AppState;

// ============================================================
// CLI
// ============================================================

#[derive(Parser)]
#[command(
    name = "foldingathome-exporter",
    about = "Prometheus exporter for the Folding@home client",
    version = foldingathome_core::VERSION
)]
struct Args {
    /// Address of the FAHClient command server.
    #[arg(
        long = "fahclient.address",
        default_value = DEFAULT_ADDRESS,
        env = "FAH_EXPORTER_FAHCLIENT_ADDRESS"
    )]
    fahclient_address: String,

    /// Connect and read timeout for FAHClient queries, in seconds.
    #[arg(
        long = "fahclient.timeout",
        default_value = "10",
        env = "FAH_EXPORTER_FAHCLIENT_TIMEOUT"
    )]
    fahclient_timeout: u64,

    /// Address to listen on. A bare ":PORT" listens on all interfaces.
    #[arg(
        long = "web.listen-address",
        default_value = ":9737",
        env = "FAH_EXPORTER_LISTEN_ADDRESS"
    )]
    listen_address: String,

    /// Path under which to expose metrics.
    #[arg(
        long = "web.telemetry-path",
        default_value = "/metrics",
        env = "FAH_EXPORTER_TELEMETRY_PATH"
    )]
    telemetry_path: String,

    /// Log level for the exporter (error, warn, info, debug, trace).
    #[arg(long = "log.level", default_value = "info", env = "FAH_EXPORTER_LOG_LEVEL")]
    log_level: Level,

    /// Output format of log lines.
    #[arg(
        long = "log.format",
        value_enum,
        default_value = "logfmt",
        env = "FAH_EXPORTER_LOG_FORMAT"
    )]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    /// Human-readable `key=value` lines.
    Logfmt,
    /// One JSON object per line.
    Json,
}

// ============================================================
// Main
// ============================================================

fn main() {
    let args = Args::parse();
    init_logging(args.log_level, args.log_format);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            process::exit(1);
        }
    };
    runtime.block_on(async_main(args));
}

async fn async_main(args: Args) {
    info!(version = foldingathome_core::VERSION, "starting foldingathome-exporter");

    let config = ClientConfig::new(args.fahclient_address)
        .with_timeout(Duration::from_secs(args.fahclient_timeout));
    info!(
        address = %config.address,
        timeout_secs = args.fahclient_timeout,
        "FAHClient target"
    );

    let collector = Collector::new(
        TcpConnector::new(config),
        Arc::new(MetricDescriptors::new()),
    );
    let metrics_path = normalize_path(&args.telemetry_path);
    let app = handlers::router(Arc::new(AppState {
        collector,
        metrics_path: metrics_path.clone(),
    }));

    let addr = listen_address(&args.listen_address);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind listen address");
            process::exit(1);
        }
    };
    info!(%addr, path = %metrics_path, "listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "server error");
        process::exit(1);
    }
    info!("shut down");
}

fn init_logging(level: Level, format: LogFormat) {
    let level = level.as_str().to_ascii_lowercase();
    let mut filter = EnvFilter::from_default_env();
    for target in ["foldingathome_exporter", "foldingathome_core"] {
        match format!("{target}={level}").parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("invalid log directive for {target}: {e}"),
        }
    }

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    match format {
        LogFormat::Logfmt => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("received shutdown signal");
}

/// Expands the ":PORT" shorthand to an all-interfaces address.
fn listen_address(address: &str) -> String {
    if address.starts_with(':') {
        format!("0.0.0.0{address}")
    } else {
        address.to_string()
    }
}

/// Ensures the telemetry path is absolute.
fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_address() {
        assert_eq!(listen_address(":9737"), "0.0.0.0:9737");
        assert_eq!(listen_address("127.0.0.1:9737"), "127.0.0.1:9737");
        assert_eq!(listen_address("[::1]:9737"), "[::1]:9737");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/metrics"), "/metrics");
        assert_eq!(normalize_path("metrics"), "/metrics");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["foldingathome-exporter"]).unwrap();
        assert_eq!(args.fahclient_address, "localhost:36330");
        assert_eq!(args.fahclient_timeout, 10);
        assert_eq!(args.listen_address, ":9737");
        assert_eq!(args.telemetry_path, "/metrics");
        assert_eq!(args.log_level, Level::INFO);
        assert_eq!(args.log_format, LogFormat::Logfmt);
    }

    #[test]
    fn test_default_address_matches_client() {
        let args = Args::try_parse_from(["foldingathome-exporter"]).unwrap();
        assert_eq!(
            args.fahclient_address,
            foldingathome_core::client::ClientConfig::default().address
        );
    }

    #[test]
    fn test_log_format() {
        let args =
            Args::try_parse_from(["foldingathome-exporter", "--log.format", "json"]).unwrap();
        assert_eq!(args.log_format, LogFormat::Json);
        assert!(
            Args::try_parse_from(["foldingathome-exporter", "--log.format", "xml"]).is_err()
        );
    }

    #[test]
    fn test_args_dotted_flags() {
        let args = Args::try_parse_from([
            "foldingathome-exporter",
            "--fahclient.address",
            "10.0.0.5:36330",
            "--fahclient.timeout",
            "3",
            "--web.listen-address",
            "127.0.0.1:9000",
            "--web.telemetry-path",
            "/fah",
            "--log.level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.fahclient_address, "10.0.0.5:36330");
        assert_eq!(args.fahclient_timeout, 3);
        assert_eq!(args.listen_address, "127.0.0.1:9000");
        assert_eq!(args.telemetry_path, "/fah");
        assert_eq!(args.log_level, Level::DEBUG);
    }
}
