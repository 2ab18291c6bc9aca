use std::{env, fs::OpenOptions, net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use fintrack_rs::{AppState, PageConfig, build_router, graceful_shutdown, logging_middleware};

/// The REST API server for fintrack_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// File path to a directory containing an SSL certificate `cert.pem` and key `key.pem`.
    #[arg(long)]
    cert_path: String,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The local timezone as a canonical timezone name.
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let tls_config = RustlsConfig::from_pem_file(
        PathBuf::from(&args.cert_path).join("cert.pem"),
        PathBuf::from(&args.cert_path).join("key.pem"),
    )
    .await
    .expect("Could not open TLS certificates.");

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    let connection = Connection::open(&args.db_path).expect("Could not open database file.");
    let state = AppState::new(connection, &secret, &args.timezone, PageConfig::default())
        .expect("Could not initialize the application database.");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    // Request spans record the matched route template alongside the
    // concrete URI. 5xx logging is left to our own error handling.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request| {
            let matched_path = request
                .extensions()
                .get::<MatchedPath>()
                .map(MatchedPath::as_str);

            tracing::debug_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                matched_path
            )
        })
        .on_failure(());

    let router = build_router(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(trace_layer);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTPS server listening on {}", addr);
    axum_server::bind_rustls(addr, tls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Server stopped unexpectedly.");
}

/// Pretty logs on stdout (level set by `RUST_LOG`, info by default) plus a
/// debug-level `debug.log` file that persists across restarts.
fn setup_logging() {
    let stdout_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().pretty().with_filter(stdout_filter))
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(Arc::new(log_file))
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}
