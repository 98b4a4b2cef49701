use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use skystats::airlines::{AirlineDataset, parse_openflights};

/// Download the OpenFlights airline table and write the dataset the web
/// and collect commands read at startup
pub async fn handle_load_airlines(url: &str, output: &Path) -> Result<()> {
    sentry::configure_scope(|scope| {
        scope.set_tag("operation", "load-airlines");
    });
    info!("Downloading airline data from {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .context("Failed to build HTTP client")?;
    let body = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?
        .error_for_status()
        .with_context(|| format!("Server returned an error for {}", url))?
        .bytes()
        .await
        .context("Failed to read airline data")?;

    let airlines = parse_openflights(body.as_ref())?;
    let dataset = AirlineDataset::build(airlines, Utc::now());
    info!(
        "Parsed {} active airlines ({} lookup codes)",
        dataset.total_airlines,
        dataset.lookup.len()
    );

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    let json = serde_json::to_vec_pretty(&dataset).context("Failed to encode airline data")?;
    tokio::fs::write(output, json)
        .await
        .with_context(|| format!("Failed to write {:?}", output))?;

    info!("Wrote airline data to {:?}", output);
    Ok(())
}
