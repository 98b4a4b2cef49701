use anyhow::Result;
use chrono::Utc;
use tracing::info;

use skystats::collector::prune_sightings;
use skystats::config::{Config, validate_retention_days};
use skystats::db::{create_pool, run_migrations};
use skystats::sightings_repo::SightingsRepository;

pub async fn handle_prune(config: Config, days: i64) -> Result<()> {
    sentry::configure_scope(|scope| {
        scope.set_tag("operation", "prune");
    });

    validate_retention_days(days)?;

    let pool = create_pool(config.database_url()?, config.database_pool_size)?;
    run_migrations(&pool).await?;

    let store = SightingsRepository::new(pool);
    let deleted = prune_sightings(&store, days, Utc::now()).await?;
    info!("Prune complete: {} sightings removed", deleted);
    Ok(())
}
