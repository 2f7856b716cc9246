use std::net::SocketAddr;
use std::sync::Arc;

use buddyup_backend::{
    config::{get_config, init_config, StorageBackend},
    database::{
        pool::{create_pool, run_migrations},
        MemoryStore, PgStore, Store,
    },
    error::Error,
    routes, AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let store: Arc<dyn Store> = match config.storage_backend {
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| Error::Config("DATABASE_URL is required".into()))?;
            let pool = create_pool(url).await?;
            run_migrations(&pool).await?;
            info!("Using postgres store");
            Arc::new(PgStore::new(pool))
        }
        StorageBackend::Memory => {
            info!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let app_state = AppState::new(store, config.jwt_secret.as_str());
    let app = routes::router(app_state, config.api_rps);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
