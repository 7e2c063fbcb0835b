use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mvcblog::app::{self, AppState};
use mvcblog::config::Config;
use mvcblog::store::Db;
use mvcblog::{Routes, Server};

#[tokio::main]
async fn main() -> Result<(), mvcblog::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mvcblog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = std::env::var_os("MVCBLOG_CONFIG")
        .map_or_else(|| PathBuf::from("mvcblog.toml"), PathBuf::from);
    let config = Config::load(&path)?;
    tracing::info!(config = %path.display(), "mvcblog v{} starting", env!("CARGO_PKG_VERSION"));

    let db = Db::connect(&config.database.url).await?;
    let state = AppState::new(db, config.i18n.default_language)?;

    let mut rest = app::rest_routes();
    if let Some(cors) = config.cors.to_cors() {
        rest = rest.with_cors(cors);
    }
    let routes = Routes::new(state, rest, app::page_routes())
        .with_rest_prefix(&config.server.rest_prefix);

    Server::from_config(&config)?.serve(routes).await
}
