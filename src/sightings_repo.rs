use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Nullable, Text, Timestamptz};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::aggregation::{self, Dimension, DimensionPair, HourlyPair};
use crate::db::PgPool;
use crate::schema::{aircraft_sightings, stats_snapshots};
use crate::sightings::{NewSighting, NewStatsSnapshot, Sighting};
use crate::stats::DashboardStats;

const INSERT_CHUNK_SIZE: usize = 1000;

/// Append-only storage for enriched sightings
#[async_trait]
pub trait SightingStore: Send + Sync {
    /// Append sightings, returning how many were written
    async fn insert_many(&self, sightings: Vec<NewSighting>) -> Result<usize>;

    /// Sightings with `seen_at >= cutoff`, oldest first.
    ///
    /// With a dimension, only sightings that carry a value for it are returned.
    async fn sightings_since(
        &self,
        cutoff: DateTime<Utc>,
        dimension: Option<Dimension>,
    ) -> Result<Vec<Sighting>>;

    /// Retention sweep; returns the number of sightings removed
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize>;

    async fn count_since(&self, cutoff: DateTime<Utc>) -> Result<i64>;

    /// Cheap round trip to check the store is reachable
    async fn ping(&self) -> Result<()>;

    async fn insert_stats_snapshot(&self, snapshot: NewStatsSnapshot) -> Result<()>;

    /// Distinct `(hex, value)` pairs for `dimension` since `cutoff`.
    ///
    /// The default aggregates over [`sightings_since`](Self::sightings_since);
    /// database stores should answer it with a `SELECT DISTINCT`.
    async fn distinct_pairs(
        &self,
        cutoff: DateTime<Utc>,
        dimension: Dimension,
    ) -> Result<Vec<DimensionPair>> {
        let rows = self.sightings_since(cutoff, Some(dimension)).await?;
        Ok(aggregation::distinct_pairs(&rows, dimension, cutoff))
    }

    /// Distinct `(hour, hex, value)` triples since `cutoff`, hours in UTC
    async fn hourly_pairs(
        &self,
        cutoff: DateTime<Utc>,
        dimension: Option<Dimension>,
    ) -> Result<Vec<HourlyPair>> {
        let rows = self.sightings_since(cutoff, dimension).await?;
        Ok(aggregation::hourly_pairs(&rows, dimension, cutoff))
    }

    /// Distinct values per attribute and the largest distance since `cutoff`
    async fn dashboard_summary(&self, cutoff: DateTime<Utc>) -> Result<DashboardStats> {
        let rows = self.sightings_since(cutoff, None).await?;
        Ok(aggregation::dashboard_summary(&rows, cutoff))
    }

    /// Airline display name to the smallest designator seen with it
    async fn airline_codes(&self, cutoff: DateTime<Utc>) -> Result<HashMap<String, String>> {
        let rows = self.sightings_since(cutoff, Some(Dimension::Airline)).await?;
        Ok(aggregation::airline_codes_by_name(&rows, cutoff))
    }
}

#[derive(Clone)]
pub struct SightingsRepository {
    pool: PgPool,
}

impl SightingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SightingStore for SightingsRepository {
    async fn insert_many(&self, sightings: Vec<NewSighting>) -> Result<usize> {
        if sightings.is_empty() {
            return Ok(0);
        }
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            conn.transaction::<_, anyhow::Error, _>(|conn| {
                let mut inserted = 0;
                for chunk in sightings.chunks(INSERT_CHUNK_SIZE) {
                    inserted += diesel::insert_into(aircraft_sightings::table)
                        .values(chunk)
                        .execute(conn)?;
                }
                Ok(inserted)
            })
        })
        .await?
    }

    async fn sightings_since(
        &self,
        cutoff: DateTime<Utc>,
        dimension: Option<Dimension>,
    ) -> Result<Vec<Sighting>> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let mut query = aircraft_sightings::table
                .filter(aircraft_sightings::seen_at.ge(cutoff))
                .select(Sighting::as_select())
                .into_boxed();

            query = match dimension {
                Some(Dimension::Flight) => query.filter(aircraft_sightings::flight.is_not_null()),
                Some(Dimension::AircraftType) => {
                    query.filter(aircraft_sightings::aircraft_type.is_not_null())
                }
                Some(Dimension::Country) => query.filter(aircraft_sightings::country.is_not_null()),
                Some(Dimension::Airline) => query.filter(aircraft_sightings::airline.is_not_null()),
                Some(Dimension::Hex) | None => query,
            };

            let rows = query
                .order(aircraft_sightings::seen_at.asc())
                .load::<Sighting>(&mut conn)?;
            debug!(
                "Loaded {} sightings since {} ({:?})",
                rows.len(),
                cutoff,
                dimension
            );
            Ok(rows)
        })
        .await?
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let deleted = diesel::delete(
                aircraft_sightings::table.filter(aircraft_sightings::seen_at.lt(cutoff)),
            )
            .execute(&mut conn)?;
            Ok(deleted)
        })
        .await?
    }

    async fn count_since(&self, cutoff: DateTime<Utc>) -> Result<i64> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let count = aircraft_sightings::table
                .filter(aircraft_sightings::seen_at.ge(cutoff))
                .count()
                .get_result::<i64>(&mut conn)?;
            Ok(count)
        })
        .await?
    }

    async fn ping(&self) -> Result<()> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            diesel::sql_query("SELECT 1").execute(&mut conn)?;
            Ok(())
        })
        .await?
    }

    async fn insert_stats_snapshot(&self, snapshot: NewStatsSnapshot) -> Result<()> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            diesel::insert_into(stats_snapshots::table)
                .values(&snapshot)
                .execute(&mut conn)?;
            Ok(())
        })
        .await?
    }

    async fn distinct_pairs(
        &self,
        cutoff: DateTime<Utc>,
        dimension: Dimension,
    ) -> Result<Vec<DimensionPair>> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            #[derive(QueryableByName)]
            struct Row {
                #[diesel(sql_type = Text)]
                hex: String,
                #[diesel(sql_type = Text)]
                value: String,
            }

            // Column names come from a closed enum, never from input
            let column = dimension.as_str();
            let rows = diesel::sql_query(format!(
                "SELECT DISTINCT hex, {column}::text AS value
                 FROM aircraft_sightings
                 WHERE seen_at >= $1 AND {column} IS NOT NULL"
            ))
            .bind::<Timestamptz, _>(cutoff)
            .load::<Row>(&mut conn)?;
            debug!("Loaded {} {} pairs since {}", rows.len(), column, cutoff);

            Ok(rows
                .into_iter()
                .map(|r| DimensionPair {
                    hex: r.hex,
                    value: r.value,
                })
                .collect())
        })
        .await?
    }

    async fn hourly_pairs(
        &self,
        cutoff: DateTime<Utc>,
        dimension: Option<Dimension>,
    ) -> Result<Vec<HourlyPair>> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            #[derive(QueryableByName)]
            struct Row {
                #[diesel(sql_type = Timestamptz)]
                hour: DateTime<Utc>,
                #[diesel(sql_type = Text)]
                hex: String,
                #[diesel(sql_type = Text)]
                value: String,
            }

            let (value, filter) = match dimension {
                Some(dimension) => {
                    let column = dimension.as_str();
                    (
                        format!("{column}::text"),
                        format!("AND {column} IS NOT NULL"),
                    )
                }
                None => ("''".to_string(), String::new()),
            };
            let rows = diesel::sql_query(format!(
                "SELECT DISTINCT
                        date_trunc('hour', seen_at AT TIME ZONE 'UTC') AT TIME ZONE 'UTC' AS hour,
                        hex,
                        {value} AS value
                 FROM aircraft_sightings
                 WHERE seen_at >= $1 {filter}
                 ORDER BY hour ASC"
            ))
            .bind::<Timestamptz, _>(cutoff)
            .load::<Row>(&mut conn)?;
            debug!(
                "Loaded {} hourly pairs since {} ({:?})",
                rows.len(),
                cutoff,
                dimension
            );

            Ok(rows
                .into_iter()
                .map(|r| HourlyPair {
                    hour: r.hour,
                    hex: r.hex,
                    value: r.value,
                })
                .collect())
        })
        .await?
    }

    async fn dashboard_summary(&self, cutoff: DateTime<Utc>) -> Result<DashboardStats> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            #[derive(QueryableByName)]
            struct Row {
                #[diesel(sql_type = BigInt)]
                total_flights: i64,
                #[diesel(sql_type = BigInt)]
                total_aircraft: i64,
                #[diesel(sql_type = BigInt)]
                aircraft_types: i64,
                #[diesel(sql_type = BigInt)]
                countries: i64,
                #[diesel(sql_type = BigInt)]
                airlines: i64,
                #[diesel(sql_type = Nullable<Double>)]
                max_distance: Option<f64>,
            }

            let row = diesel::sql_query(
                "SELECT COUNT(DISTINCT flight) AS total_flights,
                        COUNT(DISTINCT hex) AS total_aircraft,
                        COUNT(DISTINCT aircraft_type) AS aircraft_types,
                        COUNT(DISTINCT country) AS countries,
                        COUNT(DISTINCT airline) AS airlines,
                        MAX(distance) AS max_distance
                 FROM aircraft_sightings
                 WHERE seen_at >= $1",
            )
            .bind::<Timestamptz, _>(cutoff)
            .get_result::<Row>(&mut conn)?;

            Ok(DashboardStats {
                total_flights: row.total_flights.max(0) as usize,
                total_aircraft: row.total_aircraft.max(0) as usize,
                aircraft_types: row.aircraft_types.max(0) as usize,
                countries: row.countries.max(0) as usize,
                airlines: row.airlines.max(0) as usize,
                max_distance: row.max_distance.unwrap_or(0.0),
            })
        })
        .await?
    }

    async fn airline_codes(&self, cutoff: DateTime<Utc>) -> Result<HashMap<String, String>> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            #[derive(QueryableByName)]
            struct Row {
                #[diesel(sql_type = Text)]
                airline: String,
                #[diesel(sql_type = Text)]
                airline_code: String,
            }

            // Byte order, so the pick matches the in-memory comparison
            let rows = diesel::sql_query(
                "SELECT airline, MIN(airline_code COLLATE \"C\") AS airline_code
                 FROM aircraft_sightings
                 WHERE seen_at >= $1 AND airline IS NOT NULL AND airline_code IS NOT NULL
                 GROUP BY airline",
            )
            .bind::<Timestamptz, _>(cutoff)
            .load::<Row>(&mut conn)?;

            Ok(rows
                .into_iter()
                .map(|r| (r.airline, r.airline_code))
                .collect())
        })
        .await?
    }
}

/// Store kept in process memory, used by tests and local tooling.
///
/// [`set_unavailable`](Self::set_unavailable) makes every call fail the way an
/// unreachable database would.
#[derive(Debug, Default)]
pub struct InMemorySightingStore {
    sightings: RwLock<Vec<Sighting>>,
    snapshots: RwLock<Vec<NewStatsSnapshot>>,
    unavailable: AtomicBool,
}

impl InMemorySightingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("sighting store unavailable");
        }
        Ok(())
    }

    pub async fn snapshots(&self) -> Vec<NewStatsSnapshot> {
        self.snapshots.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.sightings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sightings.read().await.is_empty()
    }
}

#[async_trait]
impl SightingStore for InMemorySightingStore {
    async fn insert_many(&self, sightings: Vec<NewSighting>) -> Result<usize> {
        self.check_available()?;
        let count = sightings.len();
        self.sightings
            .write()
            .await
            .extend(sightings.into_iter().map(Sighting::from));
        Ok(count)
    }

    async fn sightings_since(
        &self,
        cutoff: DateTime<Utc>,
        dimension: Option<Dimension>,
    ) -> Result<Vec<Sighting>> {
        self.check_available()?;
        let mut rows: Vec<Sighting> = self
            .sightings
            .read()
            .await
            .iter()
            .filter(|s| s.seen_at >= cutoff)
            .filter(|s| dimension.is_none_or(|d| d.value(s).is_some()))
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.seen_at);
        Ok(rows)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        self.check_available()?;
        let mut sightings = self.sightings.write().await;
        let before = sightings.len();
        sightings.retain(|s| s.seen_at >= cutoff);
        Ok(before - sightings.len())
    }

    async fn count_since(&self, cutoff: DateTime<Utc>) -> Result<i64> {
        self.check_available()?;
        let count = self
            .sightings
            .read()
            .await
            .iter()
            .filter(|s| s.seen_at >= cutoff)
            .count();
        Ok(count as i64)
    }

    async fn ping(&self) -> Result<()> {
        self.check_available()
    }

    async fn insert_stats_snapshot(&self, snapshot: NewStatsSnapshot) -> Result<()> {
        self.check_available()?;
        self.snapshots.write().await.push(snapshot);
        Ok(())
    }
}
