use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use sapo_saver::{AppConfig, AppState, DisplayConfig, build_router, graceful_shutdown, logging_middleware};

/// The web server for Sapo Saver.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The address to listen on.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// How many minutes an upload is kept after the last request of its session.
    #[arg(long, default_value_t = 30)]
    session_ttl_minutes: u64,

    /// The largest file that can be uploaded, in megabytes.
    #[arg(long, default_value_t = 10)]
    max_upload_mb: usize,

    /// The locale used to format amounts in charts.
    #[arg(long, default_value = "pt-BR")]
    locale: String,

    /// The ISO 4217 code of the currency used in charts.
    #[arg(long, default_value = "BRL")]
    currency: String,

    /// The symbol shown in front of amounts.
    #[arg(long, default_value = "R$")]
    currency_symbol: String,
}

impl Args {
    fn app_config(&self) -> AppConfig {
        let mut config = AppConfig {
            display: DisplayConfig {
                locale: self.locale.clone(),
                currency_code: self.currency.clone(),
                currency_symbol: self.currency_symbol.clone(),
            },
            max_upload_bytes: self.max_upload_mb.saturating_mul(1024 * 1024),
            ..AppConfig::default()
        };
        config.session.ttl = Duration::from_secs(self.session_ttl_minutes.saturating_mul(60));

        config
    }
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::new(args.host, args.port);
    let app_state = AppState::new(args.app_config());

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Could not start the server");
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_log)
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
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router
        .layer(middleware::from_fn(logging_middleware))
        .layer(tracing_layer)
}
