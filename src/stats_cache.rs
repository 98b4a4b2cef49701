use std::future::Future;
use std::time::{Duration, Instant};

use moka::future::Cache;

use crate::stats::*;
use crate::stats_service::{AggregationError, StatsService};
use crate::time_range::{HourWindow, TimeRange};

/// Cache keys for the windowed statistics
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
enum CacheKey {
    Dashboard(TimeRange),
    AircraftTypes(TimeRange, usize), // range, limit
    Countries(TimeRange, usize),
    Airlines(TimeRange, usize),
    Hourly(HourWindow),
    HourlyCountries(HourWindow),
    HourlyAirlines(HourWindow),
}

/// Cached statistics with a short TTL.
///
/// Current aircraft and health are always computed fresh.
#[derive(Clone)]
pub struct StatsCache {
    service: StatsService,
    dashboard_cache: Cache<CacheKey, DashboardStats>,
    aircraft_types_cache: Cache<CacheKey, Vec<TopAircraftType>>,
    countries_cache: Cache<CacheKey, Vec<TopCountry>>,
    airlines_cache: Cache<CacheKey, Vec<TopAirline>>,
    hourly_cache: Cache<CacheKey, Vec<HourlyStats>>,
    hourly_countries_cache: Cache<CacheKey, Vec<HourlyCountryStats>>,
    hourly_airlines_cache: Cache<CacheKey, Vec<HourlyAirlineStats>>,
}

async fn cached<V, F, Fut>(
    cache: &Cache<CacheKey, V>,
    key: CacheKey,
    metric: &'static str,
    fetch: F,
) -> Result<V, AggregationError>
where
    V: Clone + Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, AggregationError>>,
{
    let start = Instant::now();

    if let Some(hit) = cache.get(&key).await {
        metrics::counter!("stats.cache.hit").increment(1);
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        metrics::histogram!(metric).record(duration_ms);
        return Ok(hit);
    }

    metrics::counter!("stats.cache.miss").increment(1);
    let result = fetch().await?;
    cache.insert(key, result.clone()).await;

    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    metrics::histogram!(metric).record(duration_ms);
    Ok(result)
}

impl StatsCache {
    pub fn new(service: StatsService, ttl: Duration) -> Self {
        Self {
            service,
            dashboard_cache: Cache::builder().max_capacity(10).time_to_live(ttl).build(),
            aircraft_types_cache: Cache::builder().max_capacity(50).time_to_live(ttl).build(),
            countries_cache: Cache::builder().max_capacity(50).time_to_live(ttl).build(),
            airlines_cache: Cache::builder().max_capacity(50).time_to_live(ttl).build(),
            hourly_cache: Cache::builder().max_capacity(10).time_to_live(ttl).build(),
            hourly_countries_cache: Cache::builder().max_capacity(10).time_to_live(ttl).build(),
            hourly_airlines_cache: Cache::builder().max_capacity(10).time_to_live(ttl).build(),
        }
    }

    pub fn service(&self) -> &StatsService {
        &self.service
    }

    pub async fn dashboard_stats(&self, range: TimeRange) -> Result<DashboardStats, AggregationError> {
        cached(
            &self.dashboard_cache,
            CacheKey::Dashboard(range),
            "stats.query.dashboard_ms",
            || self.service.dashboard_stats(range),
        )
        .await
    }

    pub async fn top_aircraft_types(
        &self,
        range: TimeRange,
        limit: usize,
    ) -> Result<Vec<TopAircraftType>, AggregationError> {
        cached(
            &self.aircraft_types_cache,
            CacheKey::AircraftTypes(range, limit),
            "stats.query.aircraft_types_ms",
            || self.service.top_aircraft_types(range, limit),
        )
        .await
    }

    pub async fn top_countries(
        &self,
        range: TimeRange,
        limit: usize,
    ) -> Result<Vec<TopCountry>, AggregationError> {
        cached(
            &self.countries_cache,
            CacheKey::Countries(range, limit),
            "stats.query.countries_ms",
            || self.service.top_countries(range, limit),
        )
        .await
    }

    pub async fn top_airlines(
        &self,
        range: TimeRange,
        limit: usize,
    ) -> Result<Vec<TopAirline>, AggregationError> {
        cached(
            &self.airlines_cache,
            CacheKey::Airlines(range, limit),
            "stats.query.airlines_ms",
            || self.service.top_airlines(range, limit),
        )
        .await
    }

    pub async fn hourly_stats(&self, window: HourWindow) -> Result<Vec<HourlyStats>, AggregationError> {
        cached(
            &self.hourly_cache,
            CacheKey::Hourly(window),
            "stats.query.hourly_ms",
            || self.service.hourly_stats(window),
        )
        .await
    }

    pub async fn hourly_country_stats(
        &self,
        window: HourWindow,
    ) -> Result<Vec<HourlyCountryStats>, AggregationError> {
        cached(
            &self.hourly_countries_cache,
            CacheKey::HourlyCountries(window),
            "stats.query.hourly_countries_ms",
            || self.service.hourly_country_stats(window),
        )
        .await
    }

    pub async fn hourly_airline_stats(
        &self,
        window: HourWindow,
    ) -> Result<Vec<HourlyAirlineStats>, AggregationError> {
        cached(
            &self.hourly_airlines_cache,
            CacheKey::HourlyAirlines(window),
            "stats.query.hourly_airlines_ms",
            || self.service.hourly_airline_stats(window),
        )
        .await
    }

    pub async fn current_aircraft(&self) -> Result<Vec<CurrentAircraft>, AggregationError> {
        self.service.current_aircraft().await
    }

    pub async fn health(&self) -> Result<HealthStatus, AggregationError> {
        self.service.health().await
    }

    /// Drop every cached entry
    pub fn invalidate_all(&self) {
        self.dashboard_cache.invalidate_all();
        self.aircraft_types_cache.invalidate_all();
        self.countries_cache.invalidate_all();
        self.airlines_cache.invalidate_all();
        self.hourly_cache.invalidate_all();
        self.hourly_countries_cache.invalidate_all();
        self.hourly_airlines_cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airlines::AirlineDirectory;
    use crate::countries::HexRangeClassifier;
    use crate::sightings::NewSighting;
    use crate::sightings_repo::{InMemorySightingStore, SightingStore};
    use chrono::Utc;
    use std::sync::Arc;

    fn new_sighting(hex: &str) -> NewSighting {
        NewSighting {
            id: uuid::Uuid::now_v7(),
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
            seen_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_cached_until_invalidated() {
        let store = Arc::new(InMemorySightingStore::new());
        store.insert_many(vec![new_sighting("000001")]).await.unwrap();
        let service = StatsService::new(
            store.clone(),
            Arc::new(AirlineDirectory::empty()),
            Arc::new(HexRangeClassifier::default()),
        );
        let cache = StatsCache::new(service, Duration::from_secs(300));

        let first = cache.dashboard_stats(TimeRange::Day).await.unwrap();
        assert_eq!(first.total_aircraft, 1);

        store.insert_many(vec![new_sighting("000002")]).await.unwrap();
        let second = cache.dashboard_stats(TimeRange::Day).await.unwrap();
        assert_eq!(second.total_aircraft, 1);

        cache.invalidate_all();
        let third = cache.dashboard_stats(TimeRange::Day).await.unwrap();
        assert_eq!(third.total_aircraft, 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let store = Arc::new(InMemorySightingStore::new());
        store.set_unavailable(true);
        let service = StatsService::new(
            store.clone(),
            Arc::new(AirlineDirectory::empty()),
            Arc::new(HexRangeClassifier::default()),
        );
        let cache = StatsCache::new(service, Duration::from_secs(300));

        assert!(cache.top_countries(TimeRange::Week, 10).await.is_err());

        store.set_unavailable(false);
        assert!(cache.top_countries(TimeRange::Week, 10).await.unwrap().is_empty());
    }
}
