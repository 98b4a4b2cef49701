//! Airline reference data keyed by IATA and ICAO designators.
//!
//! The dataset is derived from the OpenFlights `airlines.dat` export. The
//! `load-airlines` command downloads and converts it; the directory reads the
//! converted JSON the first time a lookup needs it and keeps it for the life of
//! the process.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const OPENFLIGHTS_AIRLINES_URL: &str =
    "https://raw.githubusercontent.com/jpatokal/openflights/master/data/airlines.dat";

const UNKNOWN: &str = "Unknown";

/// One airline as stored in the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirlineEntry {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub iata: String,
    #[serde(default)]
    pub icao: String,
    #[serde(default)]
    pub callsign: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub active: bool,
}

/// Display information resolved for an airline code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirlineInfo {
    pub name: String,
    pub country: String,
}

/// Converted dataset as written by `load-airlines`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirlineDataset {
    pub last_updated: DateTime<Utc>,
    pub total_airlines: usize,
    pub airlines: Vec<AirlineEntry>,
    pub lookup: HashMap<String, AirlineEntry>,
}

impl AirlineDataset {
    /// Index active airlines by IATA code, then by ICAO code.
    /// An ICAO code that collides with another airline's IATA code wins.
    pub fn build(airlines: Vec<AirlineEntry>, last_updated: DateTime<Utc>) -> Self {
        let mut lookup = HashMap::new();
        for airline in airlines.iter().filter(|a| !a.iata.is_empty()) {
            lookup.insert(airline.iata.to_uppercase(), airline.clone());
        }
        for airline in airlines.iter().filter(|a| !a.icao.is_empty()) {
            lookup.insert(airline.icao.to_uppercase(), airline.clone());
        }

        Self {
            last_updated,
            total_airlines: airlines.len(),
            airlines,
            lookup,
        }
    }
}

/// Accepts both the converted dataset and a bare `code -> airline` map
#[derive(Deserialize)]
#[serde(untagged)]
enum AirlineFile {
    Dataset { lookup: HashMap<String, AirlineEntry> },
    Lookup(HashMap<String, AirlineEntry>),
}

/// Read an airline lookup table from a JSON file
pub fn load_lookup_file(path: &Path) -> Result<HashMap<String, AirlineEntry>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read airline data from {}", path.display()))?;
    let file: AirlineFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse airline data in {}", path.display()))?;

    let lookup = match file {
        AirlineFile::Dataset { lookup } | AirlineFile::Lookup(lookup) => lookup,
    };

    Ok(lookup
        .into_iter()
        .map(|(code, entry)| (code.to_uppercase(), entry))
        .collect())
}

/// Parse the OpenFlights `airlines.dat` CSV export.
///
/// Only active airlines that carry an IATA or ICAO code are kept. OpenFlights
/// writes `\N` for missing values; those become empty strings.
pub fn parse_openflights<R: Read>(reader: R) -> Result<Vec<AirlineEntry>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut airlines = Vec::new();
    let mut skipped = 0usize;

    for record in csv_reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                skipped += 1;
                warn!("Skipping malformed airline record: {}", e);
                continue;
            }
        };
        if record.len() < 8 {
            skipped += 1;
            continue;
        }

        let field = |i: usize| {
            let value = record.get(i).unwrap_or("").trim();
            if value == "\\N" {
                String::new()
            } else {
                value.to_string()
            }
        };

        let active = field(7) == "Y";
        let iata = field(3);
        let icao = field(4);
        if !active || (iata.is_empty() && icao.is_empty()) {
            continue;
        }

        let name = field(1);
        airlines.push(AirlineEntry {
            id: field(0).parse().unwrap_or(0),
            name: if name.is_empty() {
                UNKNOWN.to_string()
            } else {
                name
            },
            alias: field(2),
            iata,
            icao,
            callsign: field(5),
            country: field(6),
            active,
        });
    }

    if skipped > 0 {
        warn!("Skipped {} unusable airline records", skipped);
    }

    Ok(airlines)
}

type Loader = Box<dyn Fn() -> Result<HashMap<String, AirlineEntry>> + Send + Sync>;

/// Airline lookup with a one-time lazy load.
///
/// The first lookup runs the loader; concurrent first lookups block on the same
/// initialization instead of loading twice. A loader error leaves the directory
/// empty for the rest of the process, so every lookup takes the fallback path.
///
/// Long-running commands call [`preload`](Self::preload) at startup so the file
/// read never lands on an async worker thread.
pub struct AirlineDirectory {
    loader: Loader,
    entries: OnceCell<HashMap<String, AirlineEntry>>,
}

impl fmt::Debug for AirlineDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirlineDirectory")
            .field("loaded", &self.is_loaded())
            .field("entries", &self.entries.get().map(|e| e.len()))
            .finish()
    }
}

impl AirlineDirectory {
    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn() -> Result<HashMap<String, AirlineEntry>> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            entries: OnceCell::new(),
        }
    }

    /// Directory backed by a JSON dataset file, read on first use
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::with_loader(move || load_lookup_file(&path))
    }

    /// Directory over an in-memory table; no deferred load
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, AirlineEntry)>,
    {
        let entries: HashMap<String, AirlineEntry> = entries
            .into_iter()
            .map(|(code, entry)| (code.to_uppercase(), entry))
            .collect();
        Self {
            loader: Box::new(|| Ok(HashMap::new())),
            entries: OnceCell::with_value(entries),
        }
    }

    pub fn empty() -> Self {
        Self::from_entries(std::iter::empty())
    }

    fn entries(&self) -> &HashMap<String, AirlineEntry> {
        self.entries.get_or_init(|| match (self.loader)() {
            Ok(entries) => {
                info!("Loaded {} airline codes", entries.len());
                entries
            }
            Err(e) => {
                error!("Failed to load airline data, lookups will fall back to raw codes: {:#}", e);
                HashMap::new()
            }
        })
    }

    /// Run the deferred load on the blocking pool, returning the entry count
    pub async fn preload(directory: &Arc<Self>) -> Result<usize> {
        let directory = Arc::clone(directory);
        let count = tokio::task::spawn_blocking(move || directory.len())
            .await
            .context("Airline directory load panicked")?;
        info!("Airline directory ready with {} codes", count);
        Ok(count)
    }

    pub fn is_loaded(&self) -> bool {
        self.entries.get().is_some()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn lookup(&self, code: &str) -> Option<&AirlineEntry> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        self.entries().get(&code.to_uppercase())
    }

    /// Airline name for a code, or the code itself when it is not in the table
    pub fn resolve_name(&self, code: &str) -> String {
        if code.trim().is_empty() {
            return UNKNOWN.to_string();
        }
        match self.lookup(code) {
            Some(airline) => airline.name.clone(),
            None => code.to_string(),
        }
    }

    pub fn resolve_info(&self, code: &str) -> AirlineInfo {
        if code.trim().is_empty() {
            return AirlineInfo {
                name: UNKNOWN.to_string(),
                country: UNKNOWN.to_string(),
            };
        }
        match self.lookup(code) {
            Some(airline) => AirlineInfo {
                name: airline.name.clone(),
                country: airline.country.clone(),
            },
            None => AirlineInfo {
                name: self.resolve_name(code),
                country: UNKNOWN.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn airline(name: &str, iata: &str, icao: &str, country: &str) -> AirlineEntry {
        AirlineEntry {
            id: 0,
            name: name.to_string(),
            alias: String::new(),
            iata: iata.to_string(),
            icao: icao.to_string(),
            callsign: String::new(),
            country: country.to_string(),
            active: true,
        }
    }

    fn malaysia_directory() -> AirlineDirectory {
        let mas = airline("Malaysia Airlines", "MH", "MAS", "Malaysia");
        AirlineDirectory::from_entries([
            ("MH".to_string(), mas.clone()),
            ("MAS".to_string(), mas),
        ])
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let directory = malaysia_directory();

        assert_eq!(directory.resolve_name("mh"), directory.resolve_name("MH"));
        assert_eq!(directory.resolve_name("MH"), "Malaysia Airlines");
        assert_eq!(directory.resolve_name("mas"), "Malaysia Airlines");
    }

    #[test]
    fn test_resolve_miss_returns_raw_code() {
        let directory = malaysia_directory();

        assert_eq!(directory.resolve_name("ZZ"), "ZZ");
        assert_eq!(
            directory.resolve_info("ZZ"),
            AirlineInfo {
                name: "ZZ".to_string(),
                country: "Unknown".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_empty_code_is_unknown() {
        let directory = malaysia_directory();

        assert_eq!(directory.resolve_name(""), "Unknown");
        assert_eq!(
            directory.resolve_info(""),
            AirlineInfo {
                name: "Unknown".to_string(),
                country: "Unknown".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_info_hit() {
        let directory = malaysia_directory();
        let info = directory.resolve_info("MH");

        assert_eq!(info.name, "Malaysia Airlines");
        assert_eq!(info.country, "Malaysia");
    }

    #[test]
    fn test_failed_load_degrades_to_empty() {
        let directory = AirlineDirectory::from_path("/nonexistent/airlines.json");

        assert!(!directory.is_loaded());
        assert_eq!(directory.resolve_name("MH"), "MH");
        assert!(directory.is_loaded());
        assert!(directory.is_empty());
    }

    #[tokio::test]
    async fn test_preload_runs_loader_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = loads.clone();
        let directory = Arc::new(AirlineDirectory::with_loader(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(HashMap::from([(
                "MH".to_string(),
                airline("Malaysia Airlines", "MH", "MAS", "Malaysia"),
            )]))
        }));
        assert!(!directory.is_loaded());

        let count = AirlineDirectory::preload(&directory).await.unwrap();

        assert_eq!(count, 1);
        assert!(directory.is_loaded());
        assert_eq!(directory.resolve_name("mh"), "Malaysia Airlines");
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_preload_missing_file_is_empty() {
        let directory = Arc::new(AirlineDirectory::from_path("/nonexistent/airlines.json"));

        assert_eq!(AirlineDirectory::preload(&directory).await.unwrap(), 0);
        assert!(directory.is_loaded());
    }

    #[test]
    fn test_concurrent_first_lookups_load_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = loads.clone();
        let directory = AirlineDirectory::with_loader(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(HashMap::from([(
                "AK".to_string(),
                airline("AirAsia", "AK", "AXM", "Malaysia"),
            )]))
        });

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| assert_eq!(directory.resolve_name("ak"), "AirAsia"));
            }
        });

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_load_dataset_file() {
        let dataset = AirlineDataset::build(
            vec![airline("Singapore Airlines", "SQ", "SIA", "Singapore")],
            Utc::now(),
        );
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&dataset).unwrap().as_bytes())
            .unwrap();

        let directory = AirlineDirectory::from_path(file.path());
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.resolve_info("sia").country, "Singapore");
    }

    #[test]
    fn test_load_bare_lookup_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"qr": {{"name": "Qatar Airways", "iata": "QR", "icao": "QTR", "country": "Qatar"}}}}"#
        )
        .unwrap();

        let lookup = load_lookup_file(file.path()).unwrap();
        assert_eq!(lookup["QR"].name, "Qatar Airways");
    }

    #[test]
    fn test_parse_openflights() {
        let data = "\
1,\"Private flight\",\\N,\"-\",\"N/A\",\"\",\"\",\"Y\"
3,\"1Time Airline\",\\N,\"1T\",\"RNX\",\"NEXTIME\",\"South Africa\",\"Y\"
4,\"2 Sqn No 1 Elementary Flying Training School\",\\N,\"\",\"WYT\",\\N,\"United Kingdom\",\"N\"
5,\"213 Flight Unit\",\\N,\"\",\"TFU\",\\N,\"Russia\",\"Y\"
short,row
";
        let airlines = parse_openflights(data.as_bytes()).unwrap();

        let names: Vec<&str> = airlines.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Private flight", "1Time Airline", "213 Flight Unit"]
        );
        assert_eq!(airlines[1].iata, "1T");
        assert_eq!(airlines[1].icao, "RNX");
        assert_eq!(airlines[2].iata, "");
        assert_eq!(airlines[2].callsign, "");
    }

    #[test]
    fn test_dataset_icao_wins_collisions() {
        let dataset = AirlineDataset::build(
            vec![
                airline("Iata Holder", "ABC", "", "A"),
                airline("Icao Holder", "", "ABC", "B"),
            ],
            Utc::now(),
        );

        assert_eq!(dataset.total_airlines, 2);
        assert_eq!(dataset.lookup["ABC"].name, "Icao Holder");
    }
}
