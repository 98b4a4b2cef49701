use anyhow::{Context, Result};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() -> Result<()> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        // Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        )
        .context("Failed to set buckets for http_request_duration_seconds")?
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

/// Prometheus text exposition, `None` until [`init_metrics`] has run
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

/// Updates uptime and memory usage every 5 seconds
pub async fn process_metrics_task() {
    let start_time = Instant::now();

    loop {
        metrics::gauge!("process.uptime.seconds").set(start_time.elapsed().as_secs() as f64);
        metrics::gauge!("process.is_up").set(1.0);

        #[cfg(target_os = "linux")]
        {
            if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
                for line in status.lines() {
                    if line.starts_with("VmRSS:") {
                        // RSS in kB
                        if let Some(kb_str) = line.split_whitespace().nth(1)
                            && let Ok(kb) = kb_str.parse::<f64>()
                        {
                            metrics::gauge!("process.memory.bytes").set(kb * 1024.0);
                        }
                        break;
                    }
                }
            }
        }

        tokio::time::sleep(Duration::from_secs(5)).await;
    }
}

/// Register web metrics at zero so they show up before the first request
pub fn initialize_web_metrics() {
    metrics::counter!("stats.cache.hit").absolute(0);
    metrics::counter!("stats.cache.miss").absolute(0);
    metrics::counter!("stats.store.errors_total").absolute(0);
    metrics::counter!("stats.api.not_modified_total").absolute(0);
    metrics::counter!("stats.api.errors_total").absolute(0);
}

/// Register collector metrics at zero so they show up before the first poll
pub fn initialize_collector_metrics() {
    metrics::counter!("collector.polls_total").absolute(0);
    metrics::counter!("collector.poll_errors_total").absolute(0);
    metrics::counter!("collector.sightings_saved_total").absolute(0);
    metrics::counter!("collector.sightings_pruned_total").absolute(0);
    metrics::gauge!("collector.aircraft_in_range").set(0.0);
}
