mod http;
mod scheduler;

use musebox_core::config::Config;
use musebox_core::library::MediaLibrary;
use musebox_core::poem::PoemClient;
use musebox_core::refresh::Refresher;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,musebox_daemon=debug")),
        )
        .init();

    let config = Config::load()?;
    info!("Config loaded from: {:?}", Config::config_path());
    config.ensure_dirs()?;

    let api_key = config.api_key();
    if api_key.is_none() {
        warn!(
            "{} is not set; daily poems will fall back to the stock line",
            config.ai.api_key_env
        );
    }
    let poem_client = PoemClient::new(config.ai.clone(), api_key)?;
    let refresher = Arc::new(Refresher::new(config.clone(), poem_client));
    let library = Arc::new(MediaLibrary::new(config.paths.music_dir.clone()));

    // Refresh once right away so the page has content before the first
    // scheduled run. A failure here (e.g. empty photo directory) is not
    // fatal; the scheduler keeps trying.
    let startup_date = chrono::Local::now().date_naive();
    let startup_ok = match refresher.run_once().await {
        Ok(state) => {
            info!("Startup refresh complete: photo={}", state.photo_path);
            true
        }
        Err(e) => {
            warn!("Startup refresh failed: {e}");
            false
        }
    };

    let scheduler_handle = scheduler::spawn(
        refresher.clone(),
        config.refresh.clone(),
        startup_ok.then_some(startup_date),
    );

    if config.http.enabled {
        let state = http::HttpState {
            library,
            refresher,
            state_file: config.paths.state_file.clone(),
        };
        let http_handle = http::start_server(
            config.http.bind_address.clone(),
            config.http.port,
            state,
            config.paths.photo_dir.clone(),
            config.paths.music_dir.clone(),
        );
        http_handle.await?;
    } else {
        info!("HTTP API disabled, running refresh schedule only");
        scheduler_handle.await?;
    }

    Ok(())
}
