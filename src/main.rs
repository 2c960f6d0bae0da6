use std::sync::Arc;

use tambalin::config::{Config, EnvCredentials};
use tambalin::db::{MemoryStore, PgStore, ShopStore};
use tambalin::engine::Engine;
use tambalin::error::Error;
use tambalin::external::google_maps::RoutesClient;
use tambalin::ranking::Ranker;
use tambalin::rate_limit::RateLimiter;
use tambalin::server::serve;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let store: Arc<dyn ShopStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("using postgres shop catalog");
            Arc::new(PgStore::new(url, config.database_max_connections).await?)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory demo catalog");
            Arc::new(MemoryStore::seeded())
        }
    };

    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_window,
        config.rate_limit_max_requests,
    ));
    tracing::info!(
        window_secs = limiter.window().as_secs(),
        max_requests = limiter.max_requests(),
        "emergency rate limit configured"
    );
    let sweeper = limiter.spawn_sweeper();

    let routes = RoutesClient::new(config.routes_api_base.clone(), config.routes_timeout)?;
    let ranker = Ranker::new(limiter, routes, Arc::new(EnvCredentials::default()));

    let engine = Engine::new(store, ranker);

    let result = serve(engine, config.listen_addr).await;
    sweeper.stop();

    result
}
