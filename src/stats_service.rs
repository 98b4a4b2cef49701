use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::error;

use crate::aggregation::{Dimension, bucket_hourly_pairs, latest_per_aircraft, rank_pairs};
use crate::airlines::AirlineDirectory;
use crate::callsign::{UNKNOWN_AIRLINE, squawk_condition};
use crate::countries::{CountryInfo, HexRangeClassifier, UNKNOWN_FLAG};
use crate::sightings_repo::SightingStore;
use crate::stats::*;
use crate::time_range::{HourWindow, TimeRange};

/// Aircraft seen within this many seconds count as currently in range
pub const CURRENT_AIRCRAFT_WINDOW_SECS: i64 = 120;
pub const CURRENT_AIRCRAFT_LIMIT: usize = 50;
/// Window for the health check's recent-activity count
pub const HEALTH_WINDOW_MINUTES: i64 = 5;

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("aggregation failed: {0:#}")]
    StoreUnavailable(anyhow::Error),
}

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Dashboard statistics computed from the sighting store
#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn SightingStore>,
    airlines: Arc<AirlineDirectory>,
    classifier: Arc<HexRangeClassifier>,
    clock: Clock,
}

impl StatsService {
    pub fn new(
        store: Arc<dyn SightingStore>,
        airlines: Arc<AirlineDirectory>,
        classifier: Arc<HexRangeClassifier>,
    ) -> Self {
        Self {
            store,
            airlines,
            classifier,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock, for deterministic windows in tests
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn store(&self) -> &Arc<dyn SightingStore> {
        &self.store
    }

    /// Time a store call and map its failure
    async fn query<T>(
        &self,
        what: &str,
        call: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, AggregationError> {
        let start = Instant::now();
        let result = call.await;
        metrics::histogram!("stats.store.query_ms").record(start.elapsed().as_secs_f64() * 1000.0);

        result.map_err(|e| {
            metrics::counter!("stats.store.errors_total").increment(1);
            error!("Failed to load {}: {:#}", what, e);
            AggregationError::StoreUnavailable(e)
        })
    }

    pub async fn dashboard_stats(&self, range: TimeRange) -> Result<DashboardStats, AggregationError> {
        let cutoff = range.cutoff(self.now());
        self.query("dashboard summary", self.store.dashboard_summary(cutoff))
            .await
    }

    pub async fn top_aircraft_types(
        &self,
        range: TimeRange,
        limit: usize,
    ) -> Result<Vec<TopAircraftType>, AggregationError> {
        let cutoff = range.cutoff(self.now());
        let pairs = self
            .query(
                "aircraft type pairs",
                self.store.distinct_pairs(cutoff, Dimension::AircraftType),
            )
            .await?;

        Ok(
            rank_pairs(&pairs, limit)
                .into_iter()
                .map(|r| TopAircraftType {
                    aircraft_type: r.value,
                    count: r.count,
                    percentage: r.percentage,
                })
                .collect(),
        )
    }

    pub async fn top_countries(
        &self,
        range: TimeRange,
        limit: usize,
    ) -> Result<Vec<TopCountry>, AggregationError> {
        let cutoff = range.cutoff(self.now());
        let pairs = self
            .query(
                "country pairs",
                self.store.distinct_pairs(cutoff, Dimension::Country),
            )
            .await?;

        Ok(
            rank_pairs(&pairs, limit)
                .into_iter()
                .map(|r| TopCountry {
                    flag: self.classifier.flag_for_country(&r.value).to_string(),
                    country: r.value,
                    count: r.count,
                    percentage: r.percentage,
                })
                .collect(),
        )
    }

    /// Airlines ranked by distinct aircraft, grouped by display name
    pub async fn top_airlines(
        &self,
        range: TimeRange,
        limit: usize,
    ) -> Result<Vec<TopAirline>, AggregationError> {
        let cutoff = range.cutoff(self.now());
        let (pairs, codes) = tokio::try_join!(
            self.query(
                "airline pairs",
                self.store.distinct_pairs(cutoff, Dimension::Airline),
            ),
            self.query("airline codes", self.store.airline_codes(cutoff)),
        )?;

        Ok(
            rank_pairs(&pairs, limit)
                .into_iter()
                .map(|r| {
                    let code = codes
                        .get(&r.value)
                        .cloned()
                        .unwrap_or_else(|| UNKNOWN_AIRLINE.to_string());
                    let country = self.airlines.resolve_info(&code).country;
                    TopAirline {
                        airline: r.value,
                        airline_code: code,
                        country,
                        count: r.count,
                        percentage: r.percentage,
                    }
                })
                .collect(),
        )
    }

    pub async fn hourly_stats(&self, window: HourWindow) -> Result<Vec<HourlyStats>, AggregationError> {
        let cutoff = window.cutoff(self.now());
        let pairs = self
            .query("hourly pairs", self.store.hourly_pairs(cutoff, None))
            .await?;

        Ok(bucket_hourly_pairs(&pairs, false)
            .into_iter()
            .map(|b| HourlyStats {
                hour: b.hour,
                count: b.total_aircraft,
                hour_label: b.hour_label,
            })
            .collect())
    }

    pub async fn hourly_country_stats(
        &self,
        window: HourWindow,
    ) -> Result<Vec<HourlyCountryStats>, AggregationError> {
        let cutoff = window.cutoff(self.now());
        let pairs = self
            .query(
                "hourly country pairs",
                self.store.hourly_pairs(cutoff, Some(Dimension::Country)),
            )
            .await?;

        Ok(
            bucket_hourly_pairs(&pairs, true)
                .into_iter()
                .map(|b| HourlyCountryStats {
                    hour: b.hour,
                    hour_label: b.hour_label,
                    countries: b
                        .per_dimension
                        .into_iter()
                        .map(|c| CountryCount {
                            country: c.value,
                            count: c.count,
                        })
                        .collect(),
                    total_aircraft: b.total_aircraft,
                })
                .collect(),
        )
    }

    pub async fn hourly_airline_stats(
        &self,
        window: HourWindow,
    ) -> Result<Vec<HourlyAirlineStats>, AggregationError> {
        let cutoff = window.cutoff(self.now());
        let (pairs, codes) = tokio::try_join!(
            self.query(
                "hourly airline pairs",
                self.store.hourly_pairs(cutoff, Some(Dimension::Airline)),
            ),
            self.query("airline codes", self.store.airline_codes(cutoff)),
        )?;

        Ok(
            bucket_hourly_pairs(&pairs, true)
                .into_iter()
                .map(|b| HourlyAirlineStats {
                    hour: b.hour,
                    hour_label: b.hour_label,
                    airlines: b
                        .per_dimension
                        .into_iter()
                        .map(|a| AirlineCount {
                            airline_code: codes
                                .get(&a.value)
                                .cloned()
                                .unwrap_or_else(|| UNKNOWN_AIRLINE.to_string()),
                            airline: a.value,
                            count: a.count,
                        })
                        .collect(),
                    total_aircraft: b.total_aircraft,
                })
                .collect(),
        )
    }

    /// Latest position of every aircraft heard in the last two minutes
    pub async fn current_aircraft(&self) -> Result<Vec<CurrentAircraft>, AggregationError> {
        let cutoff = self.now() - Duration::seconds(CURRENT_AIRCRAFT_WINDOW_SECS);
        let sightings = self
            .query("current aircraft", self.store.sightings_since(cutoff, None))
            .await?;

        Ok(
            latest_per_aircraft(&sightings, cutoff, CURRENT_AIRCRAFT_LIMIT)
                .into_iter()
                .map(|s| {
                    let flag = s
                        .country_code
                        .as_deref()
                        .and_then(|code| self.classifier.flag_for_code(code))
                        .unwrap_or(UNKNOWN_FLAG);
                    let squawk = s.squawk.clone().unwrap_or_default();

                    CurrentAircraft {
                        hex: s.hex.clone(),
                        flight: s.flight.clone().unwrap_or_default(),
                        registration: s.registration.clone().unwrap_or_default(),
                        aircraft_type: s.aircraft_type.clone().unwrap_or_default(),
                        airline: s.airline.clone(),
                        country: s
                            .country
                            .clone()
                            .unwrap_or_else(|| CountryInfo::UNKNOWN.country.to_string()),
                        flag: flag.to_string(),
                        altitude: s.altitude,
                        ground_speed: s.ground_speed,
                        track: s.track,
                        distance: s.distance,
                        rssi: s.rssi,
                        squawk_condition: squawk_condition(&squawk)
                            .map(|c| c.as_str().to_string()),
                        squawk,
                        lat: s.lat,
                        lon: s.lon,
                        seen_at: s.seen_at,
                    }
                })
                .collect(),
        )
    }

    /// Store round trip plus the number of sightings in the last five minutes
    pub async fn health(&self) -> Result<HealthStatus, AggregationError> {
        let now = self.now();
        self.store
            .ping()
            .await
            .map_err(AggregationError::StoreUnavailable)?;
        let recent = self
            .store
            .count_since(now - Duration::minutes(HEALTH_WINDOW_MINUTES))
            .await
            .map_err(AggregationError::StoreUnavailable)?;

        Ok(HealthStatus {
            status: "healthy".to_string(),
            database: "connected".to_string(),
            recent_aircraft: recent,
            timestamp: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airlines::AirlineEntry;
    use crate::aggregation::{DimensionPair, HourlyPair};
    use crate::sightings::{NewSighting, NewStatsSnapshot, Sighting};
    use crate::sightings_repo::InMemorySightingStore;
    use anyhow::bail;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    fn sighting(hex: &str, minutes_ago: i64) -> NewSighting {
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

    fn service(store: Arc<dyn SightingStore>) -> StatsService {
        let mas = AirlineEntry {
            id: 1,
            name: "Malaysia Airlines".to_string(),
            alias: String::new(),
            iata: "MH".to_string(),
            icao: "MAS".to_string(),
            callsign: String::new(),
            country: "Malaysia".to_string(),
            active: true,
        };
        let airlines = AirlineDirectory::from_entries([
            ("MH".to_string(), mas.clone()),
            ("MAS".to_string(), mas),
        ]);
        StatsService::new(
            store,
            Arc::new(airlines),
            Arc::new(HexRangeClassifier::default()),
        )
        .with_clock(now)
    }

    #[tokio::test]
    async fn test_top_countries_with_flags() {
        let store = Arc::new(InMemorySightingStore::new());
        store
            .insert_many(vec![
                NewSighting {
                    country: Some("Malaysia".to_string()),
                    ..sighting("750001", 10)
                },
                NewSighting {
                    country: Some("Atlantis".to_string()),
                    ..sighting("000001", 10)
                },
            ])
            .await
            .unwrap();

        let countries = service(store)
            .top_countries(TimeRange::Day, 50)
            .await
            .unwrap();

        assert_eq!(countries.len(), 2);
        let atlantis = countries.iter().find(|c| c.country == "Atlantis").unwrap();
        assert_eq!(atlantis.flag, "🏳️");
        let malaysia = countries.iter().find(|c| c.country == "Malaysia").unwrap();
        assert_eq!(malaysia.flag, "🇲🇾");
    }

    #[tokio::test]
    async fn test_top_airlines_resolves_code_and_country() {
        let store = Arc::new(InMemorySightingStore::new());
        store
            .insert_many(vec![
                NewSighting {
                    airline: Some("Malaysia Airlines".to_string()),
                    airline_code: Some("MH".to_string()),
                    ..sighting("750001", 10)
                },
                NewSighting {
                    airline: Some("Malaysia Airlines".to_string()),
                    airline_code: Some("MAS".to_string()),
                    ..sighting("750002", 20)
                },
                NewSighting {
                    airline: Some("ZZZ".to_string()),
                    airline_code: Some("ZZZ".to_string()),
                    ..sighting("a00001", 20)
                },
            ])
            .await
            .unwrap();

        let airlines = service(store).top_airlines(TimeRange::Day, 50).await.unwrap();

        assert_eq!(airlines.len(), 2);
        assert_eq!(airlines[0].airline, "Malaysia Airlines");
        assert_eq!(airlines[0].airline_code, "MAS");
        assert_eq!(airlines[0].country, "Malaysia");
        assert_eq!(airlines[0].count, 2);
        assert_eq!(airlines[1].airline_code, "ZZZ");
        assert_eq!(airlines[1].country, "Unknown");
    }

    #[tokio::test]
    async fn test_current_aircraft() {
        let store = Arc::new(InMemorySightingStore::new());
        store
            .insert_many(vec![
                NewSighting {
                    country: Some("Malaysia".to_string()),
                    country_code: Some("MY".to_string()),
                    squawk: Some("7700".to_string()),
                    ..sighting("750001", 1)
                },
                // Older position of the same aircraft
                NewSighting {
                    squawk: Some("1200".to_string()),
                    ..sighting("750001", 2)
                },
                sighting("000001", 10),
            ])
            .await
            .unwrap();

        let current = service(store).current_aircraft().await.unwrap();

        assert_eq!(current.len(), 1);
        assert_eq!(current[0].hex, "750001");
        assert_eq!(current[0].flag, "🇲🇾");
        assert_eq!(current[0].squawk, "7700");
        assert_eq!(current[0].squawk_condition.as_deref(), Some("emergency"));
    }

    #[tokio::test]
    async fn test_current_aircraft_unknown_country() {
        let store = Arc::new(InMemorySightingStore::new());
        store.insert_many(vec![sighting("~00001", 0)]).await.unwrap();

        let current = service(store).current_aircraft().await.unwrap();

        assert_eq!(current[0].country, "Unknown");
        assert_eq!(current[0].flag, "❓");
        assert_eq!(current[0].squawk_condition, None);
    }

    #[tokio::test]
    async fn test_store_failure_is_aggregation_error() {
        let store = Arc::new(InMemorySightingStore::new());
        store.set_unavailable(true);
        let service = service(store);

        let err = service.dashboard_stats(TimeRange::Week).await.unwrap_err();
        assert!(matches!(err, AggregationError::StoreUnavailable(_)));
        assert!(err.to_string().starts_with("aggregation failed"));
        assert!(service.hourly_stats(HourWindow::default()).await.is_err());
        assert!(service.health().await.is_err());
    }

    /// Answers only the roll-up queries; full row loads fail
    struct RollupOnlyStore {
        inner: InMemorySightingStore,
    }

    #[async_trait]
    impl SightingStore for RollupOnlyStore {
        async fn insert_many(&self, sightings: Vec<NewSighting>) -> anyhow::Result<usize> {
            self.inner.insert_many(sightings).await
        }

        async fn sightings_since(
            &self,
            _cutoff: DateTime<Utc>,
            _dimension: Option<Dimension>,
        ) -> anyhow::Result<Vec<Sighting>> {
            bail!("full rows requested")
        }

        async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> anyhow::Result<usize> {
            self.inner.delete_older_than(cutoff).await
        }

        async fn count_since(&self, cutoff: DateTime<Utc>) -> anyhow::Result<i64> {
            self.inner.count_since(cutoff).await
        }

        async fn ping(&self) -> anyhow::Result<()> {
            self.inner.ping().await
        }

        async fn insert_stats_snapshot(&self, snapshot: NewStatsSnapshot) -> anyhow::Result<()> {
            self.inner.insert_stats_snapshot(snapshot).await
        }

        async fn distinct_pairs(
            &self,
            cutoff: DateTime<Utc>,
            dimension: Dimension,
        ) -> anyhow::Result<Vec<DimensionPair>> {
            self.inner.distinct_pairs(cutoff, dimension).await
        }

        async fn hourly_pairs(
            &self,
            cutoff: DateTime<Utc>,
            dimension: Option<Dimension>,
        ) -> anyhow::Result<Vec<HourlyPair>> {
            self.inner.hourly_pairs(cutoff, dimension).await
        }

        async fn dashboard_summary(&self, cutoff: DateTime<Utc>) -> anyhow::Result<DashboardStats> {
            self.inner.dashboard_summary(cutoff).await
        }

        async fn airline_codes(
            &self,
            cutoff: DateTime<Utc>,
        ) -> anyhow::Result<HashMap<String, String>> {
            self.inner.airline_codes(cutoff).await
        }
    }

    #[tokio::test]
    async fn test_windowed_stats_use_store_rollups() {
        let store = Arc::new(RollupOnlyStore {
            inner: InMemorySightingStore::new(),
        });
        store
            .insert_many(vec![
                NewSighting {
                    country: Some("Malaysia".to_string()),
                    airline: Some("Malaysia Airlines".to_string()),
                    airline_code: Some("MH".to_string()),
                    distance: Some(42.5),
                    ..sighting("750001", 10)
                },
                NewSighting {
                    country: Some("Malaysia".to_string()),
                    ..sighting("750001", 20)
                },
                NewSighting {
                    country: Some("Singapore".to_string()),
                    ..sighting("768001", 70)
                },
            ])
            .await
            .unwrap();
        let service = service(store);

        let stats = service.dashboard_stats(TimeRange::Day).await.unwrap();
        assert_eq!(stats.total_aircraft, 2);
        assert_eq!(stats.countries, 2);
        assert_eq!(stats.max_distance, 42.5);

        let countries = service.top_countries(TimeRange::Day, 50).await.unwrap();
        assert_eq!(countries[0].country, "Malaysia");
        assert_eq!(countries[0].count, 1);

        let airlines = service.top_airlines(TimeRange::Day, 50).await.unwrap();
        assert_eq!(airlines[0].airline_code, "MH");

        let hourly = service
            .hourly_country_stats(HourWindow::default())
            .await
            .unwrap();
        assert_eq!(hourly.len(), 2);
        assert_eq!(service.hourly_stats(HourWindow::default()).await.unwrap().len(), 2);
        assert!(service.hourly_airline_stats(HourWindow::default()).await.is_ok());

        // Only the live view reads whole rows
        assert!(service.current_aircraft().await.is_err());
    }

    #[tokio::test]
    async fn test_health_counts_recent() {
        let store = Arc::new(InMemorySightingStore::new());
        store
            .insert_many(vec![sighting("000001", 1), sighting("000002", 30)])
            .await
            .unwrap();

        let health = service(store).health().await.unwrap();

        assert_eq!(health.status, "healthy");
        assert_eq!(health.recent_aircraft, 1);
        assert_eq!(health.timestamp, now());
    }
}
