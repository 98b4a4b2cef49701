//! Windowed roll-ups over enriched sightings.
//!
//! Every function here is pure: it receives the sightings a store returned and
//! the resolved cutoff, and counts distinct aircraft (`hex`) per category. The
//! cutoff is applied again even though stores already filter by it, so the
//! functions give the same answer for any superset of the window.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::sightings::Sighting;
use crate::stats::DashboardStats;

/// Sighting attribute an aggregation groups by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Flight,
    Hex,
    AircraftType,
    Country,
    Airline,
}

impl Dimension {
    /// The attribute value, `None` when the sighting does not carry it
    pub fn value<'a>(&self, sighting: &'a Sighting) -> Option<&'a str> {
        match self {
            Dimension::Flight => sighting.flight.as_deref(),
            Dimension::Hex => Some(sighting.hex.as_str()),
            Dimension::AircraftType => sighting.aircraft_type.as_deref(),
            Dimension::Country => sighting.country.as_deref(),
            Dimension::Airline => sighting.airline.as_deref(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Flight => "flight",
            Dimension::Hex => "hex",
            Dimension::AircraftType => "aircraft_type",
            Dimension::Country => "country",
            Dimension::Airline => "airline",
        }
    }
}

/// One row of a top-N breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedValue {
    pub value: String,
    pub count: usize,
    pub percentage: f64,
}

/// Distinct aircraft for one value inside an hourly bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionCount {
    pub value: String,
    pub count: usize,
}

/// One hour of an hourly series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyBucket {
    /// Start of the UTC hour
    pub hour: DateTime<Utc>,
    pub hour_label: String,
    /// Empty for the plain series
    pub per_dimension: Vec<DimensionCount>,
    pub total_aircraft: usize,
}

/// An aircraft seen with a dimension value inside the window
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DimensionPair {
    pub hex: String,
    pub value: String,
}

/// An aircraft seen with a dimension value inside one UTC hour.
///
/// `value` is empty for the plain series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HourlyPair {
    pub hour: DateTime<Utc>,
    pub hex: String,
    pub value: String,
}

fn in_window(sighting: &Sighting, cutoff: DateTime<Utc>) -> bool {
    sighting.seen_at >= cutoff
}

/// Count descending, then value ascending
fn rank<'a>(counts: HashMap<&'a str, usize>) -> Vec<(&'a str, usize)> {
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
}

/// Distinct aircraft in the window that carry a value for `dimension`
pub fn count_distinct_by_dimension(
    sightings: &[Sighting],
    dimension: Dimension,
    cutoff: DateTime<Utc>,
) -> usize {
    sightings
        .iter()
        .filter(|s| in_window(s, cutoff) && dimension.value(s).is_some())
        .map(|s| s.hex.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Distinct values of `dimension` among sightings in the window.
///
/// For [`Dimension::Hex`] this equals [`count_distinct_by_dimension`].
pub fn count_distinct_values(
    sightings: &[Sighting],
    dimension: Dimension,
    cutoff: DateTime<Utc>,
) -> usize {
    sightings
        .iter()
        .filter(|s| in_window(s, cutoff))
        .filter_map(|s| dimension.value(s))
        .collect::<HashSet<_>>()
        .len()
}

/// Each distinct `(hex, value)` pair in the window, in first-seen order
pub fn distinct_pairs(
    sightings: &[Sighting],
    dimension: Dimension,
    cutoff: DateTime<Utc>,
) -> Vec<DimensionPair> {
    let mut seen = HashSet::new();
    sightings
        .iter()
        .filter(|s| in_window(s, cutoff))
        .filter_map(|s| dimension.value(s).map(|v| (s.hex.as_str(), v)))
        .filter(|pair| seen.insert(*pair))
        .map(|(hex, value)| DimensionPair {
            hex: hex.to_string(),
            value: value.to_string(),
        })
        .collect()
}

/// The `limit` values with the most distinct aircraft among `pairs`.
///
/// Percentages are relative to the sum of counts in the returned rows, so they
/// add up to 100 even when the long tail has been cut off. Duplicate pairs
/// count once.
pub fn rank_pairs(pairs: &[DimensionPair], limit: usize) -> Vec<RankedValue> {
    let unique: HashSet<(&str, &str)> = pairs
        .iter()
        .map(|p| (p.hex.as_str(), p.value.as_str()))
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (_, value) in unique {
        *counts.entry(value).or_default() += 1;
    }

    let mut ranked = rank(counts);
    ranked.truncate(limit);

    let total: usize = ranked.iter().map(|(_, count)| count).sum();
    ranked
        .into_iter()
        .map(|(value, count)| RankedValue {
            value: value.to_string(),
            count,
            percentage: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            },
        })
        .collect()
}

/// The `limit` values with the most distinct aircraft in the window
pub fn top_n_by_dimension(
    sightings: &[Sighting],
    dimension: Dimension,
    cutoff: DateTime<Utc>,
    limit: usize,
) -> Vec<RankedValue> {
    rank_pairs(&distinct_pairs(sightings, dimension, cutoff), limit)
}

/// Headline counts for the dashboard: distinct values per attribute
pub fn dashboard_summary(sightings: &[Sighting], cutoff: DateTime<Utc>) -> DashboardStats {
    let max_distance = sightings
        .iter()
        .filter(|s| in_window(s, cutoff))
        .filter_map(|s| s.distance)
        .fold(None, |max: Option<f64>, d| Some(max.map_or(d, |m| m.max(d))))
        .unwrap_or(0.0);

    DashboardStats {
        total_flights: count_distinct_values(sightings, Dimension::Flight, cutoff),
        total_aircraft: count_distinct_values(sightings, Dimension::Hex, cutoff),
        aircraft_types: count_distinct_values(sightings, Dimension::AircraftType, cutoff),
        countries: count_distinct_values(sightings, Dimension::Country, cutoff),
        airlines: count_distinct_values(sightings, Dimension::Airline, cutoff),
        max_distance,
    }
}

/// Start of the UTC hour containing `at`
pub fn truncate_to_hour(at: DateTime<Utc>) -> DateTime<Utc> {
    at.duration_trunc(TimeDelta::hours(1)).unwrap_or(at)
}

/// 12-hour clock label for an hour, such as `3 PM`
pub fn hour_label(hour: DateTime<Utc>) -> String {
    hour.format("%-I %p").to_string()
}

/// Each distinct `(hour, hex, value)` triple in the window.
///
/// With a dimension, sightings without a value are skipped.
pub fn hourly_pairs(
    sightings: &[Sighting],
    dimension: Option<Dimension>,
    cutoff: DateTime<Utc>,
) -> Vec<HourlyPair> {
    let mut seen = HashSet::new();
    let mut pairs = Vec::new();

    for sighting in sightings.iter().filter(|s| in_window(s, cutoff)) {
        let value = match dimension {
            Some(dimension) => match dimension.value(sighting) {
                Some(value) => value,
                None => continue,
            },
            None => "",
        };
        let hour = truncate_to_hour(sighting.seen_at);
        if seen.insert((hour, sighting.hex.as_str(), value)) {
            pairs.push(HourlyPair {
                hour,
                hex: sighting.hex.clone(),
                value: value.to_string(),
            });
        }
    }
    pairs
}

/// Group hourly pairs into a time-ordered series.
///
/// Hours without any pair are left out. With `per_dimension` set, each bucket
/// lists its values ranked by distinct aircraft and `total_aircraft` is the sum
/// of the per-value counts; an aircraft that changed value within the hour is
/// counted once under each value.
pub fn bucket_hourly_pairs(pairs: &[HourlyPair], per_dimension: bool) -> Vec<HourlyBucket> {
    let mut buckets: BTreeMap<DateTime<Utc>, HashMap<&str, HashSet<&str>>> = BTreeMap::new();

    for pair in pairs {
        buckets
            .entry(truncate_to_hour(pair.hour))
            .or_default()
            .entry(pair.value.as_str())
            .or_default()
            .insert(pair.hex.as_str());
    }

    buckets
        .into_iter()
        .map(|(hour, values)| {
            let counts: HashMap<&str, usize> = values
                .into_iter()
                .map(|(value, aircraft)| (value, aircraft.len()))
                .collect();
            let total_aircraft = counts.values().sum();

            let per_dimension = if per_dimension {
                rank(counts)
                    .into_iter()
                    .map(|(value, count)| DimensionCount {
                        value: value.to_string(),
                        count,
                    })
                    .collect()
            } else {
                Vec::new()
            };

            HourlyBucket {
                hour,
                hour_label: hour_label(hour),
                per_dimension,
                total_aircraft,
            }
        })
        .collect()
}

/// Distinct aircraft per UTC hour, optionally broken down by a dimension
pub fn hourly_bucket_series(
    sightings: &[Sighting],
    dimension: Option<Dimension>,
    cutoff: DateTime<Utc>,
) -> Vec<HourlyBucket> {
    bucket_hourly_pairs(
        &hourly_pairs(sightings, dimension, cutoff),
        dimension.is_some(),
    )
}

/// Airline display name to the smallest designator seen with it in the window
pub fn airline_codes_by_name(
    sightings: &[Sighting],
    cutoff: DateTime<Utc>,
) -> HashMap<String, String> {
    let mut codes: HashMap<String, String> = HashMap::new();
    for sighting in sightings.iter().filter(|s| in_window(s, cutoff)) {
        let (Some(name), Some(code)) = (&sighting.airline, &sighting.airline_code) else {
            continue;
        };
        codes
            .entry(name.clone())
            .and_modify(|current| {
                if code.as_str() < current.as_str() {
                    *current = code.clone();
                }
            })
            .or_insert_with(|| code.clone());
    }
    codes
}

/// Most recent sighting of each aircraft, newest first
pub fn latest_per_aircraft(
    sightings: &[Sighting],
    cutoff: DateTime<Utc>,
    limit: usize,
) -> Vec<&Sighting> {
    let mut recent: Vec<&Sighting> = sightings.iter().filter(|s| in_window(s, cutoff)).collect();
    recent.sort_by(|a, b| b.seen_at.cmp(&a.seen_at).then_with(|| b.id.cmp(&a.id)));

    let mut seen = HashSet::new();
    recent
        .into_iter()
        .filter(|s| seen.insert(s.hex.as_str()))
        .take(limit)
        .collect()
}
