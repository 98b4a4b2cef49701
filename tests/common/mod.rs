//! Shared fixtures for integration tests
//!
//! Most tests run the full service stack over [`InMemorySightingStore`] with a
//! fixed clock. Tests against PostgreSQL use [`TestDatabase`], which creates a
//! throwaway database from `TEST_DATABASE_URL` and drops it afterwards.

#![allow(dead_code)]

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use skystats::airlines::{AirlineDirectory, AirlineEntry};
use skystats::countries::HexRangeClassifier;
use skystats::db::{PgPool, create_pool, run_migrations};
use skystats::sightings::NewSighting;
use skystats::sightings_repo::{InMemorySightingStore, SightingStore};
use skystats::stats_cache::StatsCache;
use skystats::stats_service::StatsService;
use skystats::web::AppState;

/// Fixed "now" for every windowed query in the tests
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10, 12, 30, 0).unwrap()
}

/// A bare sighting of `hex`, `minutes_ago` before [`now`]
pub fn sighting(hex: &str, minutes_ago: i64) -> NewSighting {
    NewSighting {
        id: Uuid::now_v7(),
        hex: hex.to_string(),
        flight: None,
        registration: None,
        aircraft_type: None,
        airline: None,
        airline_code: None,
        country: None,
        country_code: None,
        altitude: None,
        ground_speed: None,
        track: None,
        distance: None,
        rssi: None,
        lat: None,
        lon: None,
        squawk: None,
        seen_at: now() - Duration::minutes(minutes_ago),
    }
}

pub fn with_country(sighting: NewSighting, country: &str, code: &str) -> NewSighting {
    NewSighting {
        country: Some(country.to_string()),
        country_code: Some(code.to_string()),
        ..sighting
    }
}

pub fn airlines() -> AirlineDirectory {
    let mas = AirlineEntry {
        id: 329,
        name: "Malaysia Airlines".to_string(),
        alias: String::new(),
        iata: "MH".to_string(),
        icao: "MAS".to_string(),
        callsign: "MALAYSIAN".to_string(),
        country: "Malaysia".to_string(),
        active: true,
    };
    AirlineDirectory::from_entries([("MH".to_string(), mas.clone()), ("MAS".to_string(), mas)])
}

pub fn service(store: Arc<dyn SightingStore>) -> StatsService {
    StatsService::new(
        store,
        Arc::new(airlines()),
        Arc::new(HexRangeClassifier::default()),
    )
    .with_clock(now)
}

pub async fn seeded_store(sightings: Vec<NewSighting>) -> Arc<InMemorySightingStore> {
    let store = Arc::new(InMemorySightingStore::new());
    store.insert_many(sightings).await.unwrap();
    store
}

pub fn app_state(store: Arc<dyn SightingStore>) -> AppState {
    AppState {
        stats: StatsCache::new(service(store), std::time::Duration::from_secs(60)),
    }
}

/// Isolated PostgreSQL database, dropped with `WITH (FORCE)` when the value is
/// dropped. Requires PostgreSQL 13+.
pub struct TestDatabase {
    db_name: String,
    pool: PgPool,
    admin_url: String,
}

impl TestDatabase {
    /// Creates `skystats_test_<random>` next to the database named in
    /// `TEST_DATABASE_URL` and applies the embedded migrations
    pub async fn new() -> Result<Self> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/skystats_test".to_string());

        let (prefix, _) = base_url
            .rsplit_once('/')
            .context("TEST_DATABASE_URL has no database name")?;
        let admin_url = format!("{}/postgres", prefix);
        let db_name = format!("skystats_test_{}", Uuid::new_v4().simple());

        let create = format!("CREATE DATABASE {}", db_name);
        let url = admin_url.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut conn = PgConnection::establish(&url)
                .with_context(|| format!("Failed to connect to {}", url))?;
            diesel::sql_query(create).execute(&mut conn)?;
            Ok(())
        })
        .await??;

        let pool = create_pool(&format!("{}/{}", prefix, db_name), 4)?;
        run_migrations(&pool).await?;

        Ok(Self {
            db_name,
            pool,
            admin_url,
        })
    }

    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        if let Ok(mut conn) = PgConnection::establish(&self.admin_url) {
            let _ = diesel::sql_query(format!(
                "DROP DATABASE IF EXISTS {} WITH (FORCE)",
                self.db_name
            ))
            .execute(&mut conn);
        }
    }
}
