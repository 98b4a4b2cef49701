use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use skystats::airlines::AirlineDirectory;
use skystats::config::Config;
use skystats::countries::HexRangeClassifier;
use skystats::db::{create_pool, run_migrations};
use skystats::sightings_repo::SightingsRepository;
use skystats::stats_cache::StatsCache;
use skystats::stats_service::StatsService;
use skystats::web::{AppState, start_web_server};

pub async fn handle_web(config: Config) -> Result<()> {
    sentry::configure_scope(|scope| {
        scope.set_tag("operation", "web");
    });

    skystats::metrics::init_metrics()?;
    skystats::metrics::initialize_web_metrics();
    tokio::spawn(skystats::metrics::process_metrics_task());

    let pool = create_pool(config.database_url()?, config.database_pool_size)?;
    run_migrations(&pool).await?;

    let airlines = Arc::new(AirlineDirectory::from_path(&config.airlines_path));
    AirlineDirectory::preload(&airlines).await?;
    let service = StatsService::new(
        Arc::new(SightingsRepository::new(pool)),
        airlines,
        Arc::new(HexRangeClassifier::default()),
    );
    info!(
        "Caching statistics for {}s, airlines from {:?}",
        config.cache_ttl_secs, config.airlines_path
    );
    let stats = StatsCache::new(service, config.cache_ttl());

    start_web_server(config.web_interface, config.web_port, AppState { stats }).await
}
