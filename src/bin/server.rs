use std::{env, fs::OpenOptions, net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use finance_tracker::{
    AppState, BcryptPasswordEncoder, build_router, graceful_shutdown, logging_middleware,
};

/// The web server for the finance tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// File path to a directory with an SSL certificate `cert.pem` and key `key.pem`.
    #[arg(long)]
    cert_path: String,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the timezone to display dates in, e.g. "Pacific/Auckland".
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

    let conn = Connection::open(&args.db_path).expect("Could not open the database");
    let app_state = AppState::new(
        conn,
        &secret,
        &args.timezone,
        BcryptPasswordEncoder::default(),
    )
    .expect("Could not initialize the database");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(app_state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTPS server listening on {}", addr);
    axum_server::bind_rustls(addr, tls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Server exited with an error");
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_ansi(false)
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are handled.
        .on_failure(());

    router.layer(tracing_layer)
}
