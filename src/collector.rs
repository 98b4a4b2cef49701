//! Periodic ingestion from a readsb/ultrafeeder receiver.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::config::validate_retention_days;
use crate::sightings::{Enricher, FeedSnapshot, FeedStats};
use crate::sightings_repo::SightingStore;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const RETENTION_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// HTTP client for the receiver's JSON endpoints
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    base_url: String,
}

impl FeedClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("skystats/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()
            .with_context(|| format!("Feeder returned an error for {}", url))?;

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode {}", url))
    }

    pub async fn fetch_stats(&self) -> Result<FeedStats> {
        self.get_json("/data/stats.json").await
    }

    pub async fn fetch_aircraft(&self) -> Result<FeedSnapshot> {
        self.get_json("/data/aircraft.json").await
    }

    /// Both documents, fetched concurrently; either failing fails the poll
    pub async fn fetch(&self) -> Result<(FeedStats, FeedSnapshot)> {
        tokio::try_join!(self.fetch_stats(), self.fetch_aircraft())
    }
}

/// Delete sightings older than `retention_days` before `now`.
///
/// An out-of-range day count is an error and deletes nothing.
pub async fn prune_sightings(
    store: &dyn SightingStore,
    retention_days: i64,
    now: DateTime<Utc>,
) -> Result<usize> {
    validate_retention_days(retention_days)?;
    let cutoff = TimeDelta::try_days(retention_days)
        .and_then(|retention| now.checked_sub_signed(retention))
        .ok_or_else(|| anyhow!("Retention of {} days is out of range", retention_days))?;
    let deleted = store.delete_older_than(cutoff).await?;
    metrics::counter!("collector.sightings_pruned_total").increment(deleted as u64);
    info!(
        "Pruned {} sightings older than {} ({} days)",
        deleted, cutoff, retention_days
    );
    Ok(deleted)
}

pub struct Collector {
    client: FeedClient,
    enricher: Enricher,
    store: Arc<dyn SightingStore>,
    poll_interval: Duration,
    retention_days: i64,
}

impl Collector {
    pub fn new(
        client: FeedClient,
        enricher: Enricher,
        store: Arc<dyn SightingStore>,
        poll_interval: Duration,
        retention_days: i64,
    ) -> Self {
        Self {
            client,
            enricher,
            store,
            poll_interval,
            retention_days,
        }
    }

    /// Store one pair of feed documents; returns the number of sightings saved
    pub async fn ingest(&self, stats: &FeedStats, snapshot: &FeedSnapshot) -> Result<usize> {
        self.store
            .insert_stats_snapshot(stats.to_snapshot())
            .await
            .context("Failed to save stats snapshot")?;

        let sightings = self.enricher.enrich(snapshot);
        let saved = self
            .store
            .insert_many(sightings)
            .await
            .context("Failed to save aircraft sightings")?;

        metrics::counter!("collector.sightings_saved_total").increment(saved as u64);
        metrics::gauge!("collector.aircraft_in_range").set(snapshot.aircraft.len() as f64);
        Ok(saved)
    }

    pub async fn poll_once(&self) -> Result<usize> {
        let start = Instant::now();
        metrics::counter!("collector.polls_total").increment(1);

        let (stats, snapshot) = self.client.fetch().await?;
        let saved = self.ingest(&stats, &snapshot).await?;

        debug!(
            "Poll took {:.1}ms",
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(saved)
    }

    pub async fn prune(&self, now: DateTime<Utc>) -> Result<usize> {
        prune_sightings(self.store.as_ref(), self.retention_days, now).await
    }

    /// Poll on every interval tick and prune hourly until `shutdown` resolves.
    ///
    /// Failed polls are logged and retried on the next tick.
    pub async fn run<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!(
            "Collecting from {} every {:?}, keeping {} days",
            self.client.base_url, self.poll_interval, self.retention_days
        );

        let mut poll = tokio::time::interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut retention = tokio::time::interval(RETENTION_INTERVAL);
        retention.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the first sweep runs an hour in
        retention.tick().await;

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down collector");
                    break;
                }
                _ = poll.tick() => {
                    match self.poll_once().await {
                        Ok(saved) => info!("Saved {} aircraft sightings", saved),
                        Err(e) => {
                            metrics::counter!("collector.poll_errors_total").increment(1);
                            error!("Error collecting data: {:#}", e);
                        }
                    }
                }
                _ = retention.tick() => {
                    if let Err(e) = self.prune(Utc::now()).await {
                        error!("Failed to prune old sightings: {:#}", e);
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airlines::AirlineDirectory;
    use crate::countries::HexRangeClassifier;
    use crate::sightings::NewSighting;
    use crate::sightings_repo::InMemorySightingStore;
    use axum::{Router, routing::get};

    const STATS_JSON: &str = r#"{"now": 1718000000, "aircraft_with_pos": 2, "aircraft_without_pos": 0,
        "last1min": {"messages": 1500}, "total": {"max_distance": 250000.0}}"#;
    const AIRCRAFT_JSON: &str = r#"{"now": 1718000000, "messages": 99, "aircraft": [
        {"hex": "750123", "flight": "MAS1    ", "alt_baro": 12000},
        {"hex": "768abc", "alt_baro": "ground"}]}"#;

    fn enricher() -> Enricher {
        Enricher::new(
            Arc::new(HexRangeClassifier::default()),
            Arc::new(AirlineDirectory::empty()),
        )
    }

    async fn serve_feed() -> String {
        let app = Router::new()
            .route("/data/stats.json", get(|| async { STATS_JSON }))
            .route("/data/aircraft.json", get(|| async { AIRCRAFT_JSON }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_poll_once_stores_feed() {
        let base_url = serve_feed().await;
        let store = Arc::new(InMemorySightingStore::new());
        let collector = Collector::new(
            FeedClient::new(&base_url).unwrap(),
            enricher(),
            store.clone(),
            Duration::from_secs(30),
            30,
        );

        let saved = collector.poll_once().await.unwrap();

        assert_eq!(saved, 2);
        assert_eq!(store.len().await, 2);
        let snapshots = store.snapshots().await;
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].messages_total, 1500);

        let sightings = store
            .sightings_since(DateTime::<Utc>::UNIX_EPOCH, None)
            .await
            .unwrap();
        let mas = sightings.iter().find(|s| s.hex == "750123").unwrap();
        assert_eq!(mas.flight.as_deref(), Some("MAS1"));
        assert_eq!(mas.airline_code.as_deref(), Some("MAS"));
        // Unknown code falls back to the code itself
        assert_eq!(mas.airline.as_deref(), Some("MAS"));
    }

    #[tokio::test]
    async fn test_poll_once_feeder_down() {
        let store = Arc::new(InMemorySightingStore::new());
        // Nothing listens on the discard port
        let collector = Collector::new(
            FeedClient::new("http://127.0.0.1:9").unwrap(),
            enricher(),
            store.clone(),
            Duration::from_secs(30),
            30,
        );

        assert!(collector.poll_once().await.is_err());
        assert!(store.is_empty().await);
    }

    fn sighting_at(hex: &str, seen_at: DateTime<Utc>) -> NewSighting {
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
            seen_at,
        }
    }

    #[tokio::test]
    async fn test_prune_sightings() {
        let store = InMemorySightingStore::new();
        let now = Utc::now();
        let make = |hex: &str, days_ago: i64| NewSighting {
            seen_at: now - TimeDelta::days(days_ago),
            ..sighting_at(hex, now)
        };
        store
            .insert_many(vec![make("000001", 31), make("000002", 29)])
            .await
            .unwrap();

        let deleted = prune_sightings(&store, 30, now).await.unwrap();

        assert_eq!(deleted, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_prune_sightings_rejects_bad_retention() {
        let store = InMemorySightingStore::new();
        let now = Utc::now();
        store
            .insert_many(vec![
                NewSighting {
                    seen_at: now - TimeDelta::days(31),
                    ..sighting_at("000001", now)
                },
                sighting_at("000002", now),
            ])
            .await
            .unwrap();

        // A negative window would put the cutoff in the future
        assert!(prune_sightings(&store, -1, now).await.is_err());
        assert!(prune_sightings(&store, 0, now).await.is_err());
        // Far beyond what a timestamp can hold
        assert!(prune_sightings(&store, 200_000_000, now).await.is_err());
        assert!(prune_sightings(&store, i64::MAX, now).await.is_err());

        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let base_url = serve_feed().await;
        let store = Arc::new(InMemorySightingStore::new());
        let collector = Collector::new(
            FeedClient::new(&base_url).unwrap(),
            enricher(),
            store.clone(),
            Duration::from_secs(3600),
            30,
        );

        collector
            .run(tokio::time::sleep(Duration::from_millis(500)))
            .await
            .unwrap();

        // The first tick fires immediately
        assert_eq!(store.len().await, 2);
    }
}
