use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use rukiga_dict::{DEFAULT_ASSET_NAME, LoadMode};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use rukiga_translator::rate_limit::{DEFAULT_CLIENT_HEADER, RateLimiterLayer};
use rukiga_translator::{AppState, Translator, router};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_RATE_LIMIT_RPS: u32 = 5;
const DEFAULT_RATE_LIMIT_BURST: u32 = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config();
    info!("binding to {}:{}", config.host, config.port);
    info!(
        "using dictionary at {} (mode: {:?})",
        config.dictionary_path.display(),
        config.load_mode
    );
    if config.disable_cache {
        info!("cache headers disabled");
    }
    info!(
        "rate limit: {} req/s (burst {}, keyed by {})",
        config.rate_limit_rps, config.rate_limit_burst, config.rate_limit_header
    );

    let translator = Arc::new(Translator::from_path(
        &config.dictionary_path,
        config.load_mode,
    ));
    if config.preload {
        // Detached: a failure is logged and the first query retries the load.
        let _ = translator.preload();
    }

    let state = AppState {
        translator,
        disable_cache: config.disable_cache,
    };

    let rate_limiter = RateLimiterLayer::new(config.rate_limit_rps, config.rate_limit_burst)
        .with_client_header(&config.rate_limit_header);
    let app = router(state)
        .layer(rate_limiter)
        .layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("invalid listen address");
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: u16,
    dictionary_path: PathBuf,
    load_mode: LoadMode,
    disable_cache: bool,
    preload: bool,
    rate_limit_rps: u32,
    rate_limit_burst: u32,
    rate_limit_header: String,
}

fn load_config() -> Config {
    let mut disable_cache = false;
    let mut preload = true;
    let mut cli_dictionary: Option<PathBuf> = None;
    let mut cli_load_mode: Option<LoadMode> = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--no-cache" => disable_cache = true,
            "--no-preload" => preload = false,
            "--dictionary" => {
                if let Some(path) = args.next() {
                    cli_dictionary = Some(PathBuf::from(path));
                }
            }
            _ => {
                if let Some(path) = arg.strip_prefix("--dictionary=") {
                    cli_dictionary = Some(PathBuf::from(path));
                } else if let Some(mode) = arg.strip_prefix("--load-mode=") {
                    cli_load_mode = LoadMode::from_name(mode);
                }
            }
        }
    }

    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let dictionary_path = cli_dictionary
        .or_else(|| env::var("DICTIONARY_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSET_NAME));
    let load_mode = cli_load_mode
        .or_else(|| {
            env::var("DICTIONARY_LOAD_MODE")
                .ok()
                .as_deref()
                .and_then(LoadMode::from_name)
        })
        .unwrap_or_default();
    let rate_limit_rps = env::var("RATE_LIMIT_RPS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RATE_LIMIT_RPS);
    let rate_limit_burst = env::var("RATE_LIMIT_BURST")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RATE_LIMIT_BURST);
    let rate_limit_header = env::var("RATE_LIMIT_HEADER")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CLIENT_HEADER.to_string());

    Config {
        host,
        port,
        dictionary_path,
        load_mode,
        disable_cache,
        preload,
        rate_limit_rps,
        rate_limit_burst,
        rate_limit_header,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
