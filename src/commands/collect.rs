use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

use skystats::airlines::AirlineDirectory;
use skystats::collector::{Collector, FeedClient};
use skystats::config::Config;
use skystats::countries::HexRangeClassifier;
use skystats::db::{create_pool, run_migrations};
use skystats::sightings::Enricher;
use skystats::sightings_repo::SightingsRepository;

pub async fn handle_collect(config: Config) -> Result<()> {
    sentry::configure_scope(|scope| {
        scope.set_tag("operation", "collect");
    });

    skystats::metrics::init_metrics()?;
    skystats::metrics::initialize_collector_metrics();
    tokio::spawn(skystats::metrics::process_metrics_task());

    let pool = create_pool(config.database_url()?, config.database_pool_size)?;
    run_migrations(&pool).await?;

    let airlines = Arc::new(AirlineDirectory::from_path(&config.airlines_path));
    AirlineDirectory::preload(&airlines).await?;
    let enricher = Enricher::new(Arc::new(HexRangeClassifier::default()), airlines);
    let collector = Collector::new(
        FeedClient::new(config.feeder_url())?,
        enricher,
        Arc::new(SightingsRepository::new(pool)),
        config.poll_interval(),
        config.data_retention_days,
    );

    collector
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    info!("Collector stopped");
    Ok(())
}
