use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::airlines::AirlineDirectory;
use crate::callsign::{UNKNOWN_AIRLINE, extract_airline_code};
use crate::countries::HexRangeClassifier;

/// An enriched aircraft observation as stored in `aircraft_sightings`
#[derive(Debug, Clone, PartialEq, Default, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::aircraft_sightings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Sighting {
    pub id: Uuid,
    pub hex: String,
    pub flight: Option<String>,
    pub registration: Option<String>,
    pub aircraft_type: Option<String>,
    /// Display name resolved from the airline directory
    pub airline: Option<String>,
    /// Designator extracted from the callsign
    pub airline_code: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub altitude: Option<i32>,
    pub ground_speed: Option<f64>,
    pub track: Option<f64>,
    pub distance: Option<f64>,
    pub rssi: Option<f64>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub squawk: Option<String>,
    pub seen_at: DateTime<Utc>,
}

/// Insert model for new sightings
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = crate::schema::aircraft_sightings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewSighting {
    pub id: Uuid,
    pub hex: String,
    pub flight: Option<String>,
    pub registration: Option<String>,
    pub aircraft_type: Option<String>,
    pub airline: Option<String>,
    pub airline_code: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub altitude: Option<i32>,
    pub ground_speed: Option<f64>,
    pub track: Option<f64>,
    pub distance: Option<f64>,
    pub rssi: Option<f64>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub squawk: Option<String>,
    pub seen_at: DateTime<Utc>,
}

impl From<NewSighting> for Sighting {
    fn from(new: NewSighting) -> Self {
        Self {
            id: new.id,
            hex: new.hex,
            flight: new.flight,
            registration: new.registration,
            aircraft_type: new.aircraft_type,
            airline: new.airline,
            airline_code: new.airline_code,
            country: new.country,
            country_code: new.country_code,
            altitude: new.altitude,
            ground_speed: new.ground_speed,
            track: new.track,
            distance: new.distance,
            rssi: new.rssi,
            lat: new.lat,
            lon: new.lon,
            squawk: new.squawk,
            seen_at: new.seen_at,
        }
    }
}

/// Receiver statistics row for `stats_snapshots`
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = crate::schema::stats_snapshots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewStatsSnapshot {
    pub id: Uuid,
    pub aircraft_with_pos: i32,
    pub aircraft_without_pos: i32,
    pub messages_total: i64,
    pub max_distance: Option<f64>,
    pub snapshot_at: DateTime<Utc>,
}

/// readsb `aircraft.json`
#[derive(Debug, Clone, Deserialize)]
pub struct FeedSnapshot {
    /// Seconds since the epoch, with fraction
    pub now: f64,
    #[serde(default)]
    pub messages: u64,
    #[serde(default)]
    pub aircraft: Vec<FeedAircraft>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedAircraft {
    pub hex: String,
    #[serde(default)]
    pub flight: Option<String>,
    #[serde(default, rename = "r")]
    pub registration: Option<String>,
    #[serde(default, rename = "t")]
    pub aircraft_type: Option<String>,
    #[serde(default)]
    pub alt_baro: Option<BaroAltitude>,
    #[serde(default, rename = "gs")]
    pub ground_speed: Option<f64>,
    #[serde(default)]
    pub track: Option<f64>,
    #[serde(default, rename = "r_dst")]
    pub distance: Option<f64>,
    #[serde(default)]
    pub rssi: Option<f64>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub squawk: Option<String>,
}

/// Barometric altitude in feet, or a marker such as `"ground"`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BaroAltitude {
    Feet(f64),
    Marker(String),
}

impl BaroAltitude {
    pub fn feet(&self) -> Option<i32> {
        match self {
            BaroAltitude::Feet(feet) if feet.is_finite() => Some(feet.round() as i32),
            BaroAltitude::Feet(_) => None,
            BaroAltitude::Marker(marker) if marker.eq_ignore_ascii_case("ground") => Some(0),
            BaroAltitude::Marker(_) => None,
        }
    }
}

/// readsb `stats.json`, only the fields that are kept
#[derive(Debug, Clone, Deserialize)]
pub struct FeedStats {
    pub now: f64,
    #[serde(default)]
    pub aircraft_with_pos: i32,
    #[serde(default)]
    pub aircraft_without_pos: i32,
    #[serde(default)]
    pub last1min: Option<FeedStatsPeriod>,
    #[serde(default)]
    pub total: Option<FeedStatsPeriod>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedStatsPeriod {
    #[serde(default)]
    pub messages: i64,
    #[serde(default)]
    pub max_distance: Option<f64>,
}

impl FeedStats {
    pub fn to_snapshot(&self) -> NewStatsSnapshot {
        NewStatsSnapshot {
            id: Uuid::now_v7(),
            aircraft_with_pos: self.aircraft_with_pos,
            aircraft_without_pos: self.aircraft_without_pos,
            messages_total: self.last1min.as_ref().map(|p| p.messages).unwrap_or(0),
            max_distance: self.total.as_ref().and_then(|p| p.max_distance),
            snapshot_at: feed_timestamp(self.now),
        }
    }
}

/// Convert a feed `now` value to a timestamp, falling back to the local clock
pub fn feed_timestamp(now: f64) -> DateTime<Utc> {
    if !now.is_finite() {
        return Utc::now();
    }
    DateTime::from_timestamp_millis((now * 1000.0).round() as i64).unwrap_or_else(Utc::now)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Attaches country and airline metadata to raw feed aircraft
#[derive(Debug, Clone)]
pub struct Enricher {
    classifier: Arc<HexRangeClassifier>,
    airlines: Arc<AirlineDirectory>,
}

impl Enricher {
    pub fn new(classifier: Arc<HexRangeClassifier>, airlines: Arc<AirlineDirectory>) -> Self {
        Self {
            classifier,
            airlines,
        }
    }

    pub fn enrich_aircraft(&self, aircraft: &FeedAircraft, seen_at: DateTime<Utc>) -> NewSighting {
        let country = self.classifier.classify(&aircraft.hex);
        let flight = non_empty(aircraft.flight.as_deref());

        let code = extract_airline_code(flight.as_deref().unwrap_or(""));
        let (airline, airline_code) = if code == UNKNOWN_AIRLINE {
            (None, None)
        } else {
            (Some(self.airlines.resolve_name(code)), Some(code.to_string()))
        };

        let (country, country_code) = if country.is_unknown() {
            (None, None)
        } else {
            (
                Some(country.country.to_string()),
                Some(country.code.to_string()),
            )
        };

        NewSighting {
            id: Uuid::now_v7(),
            hex: aircraft.hex.trim().to_string(),
            flight,
            registration: non_empty(aircraft.registration.as_deref()),
            aircraft_type: non_empty(aircraft.aircraft_type.as_deref()),
            airline,
            airline_code,
            country,
            country_code,
            altitude: aircraft.alt_baro.as_ref().and_then(BaroAltitude::feet),
            ground_speed: aircraft.ground_speed,
            track: aircraft.track,
            distance: aircraft.distance,
            rssi: aircraft.rssi,
            lat: aircraft.lat,
            lon: aircraft.lon,
            squawk: non_empty(aircraft.squawk.as_deref()),
            seen_at,
        }
    }

    /// Enrich every aircraft in a feed snapshot, all stamped with the feed time
    pub fn enrich(&self, snapshot: &FeedSnapshot) -> Vec<NewSighting> {
        let seen_at = feed_timestamp(snapshot.now);
        snapshot
            .aircraft
            .iter()
            .filter(|a| !a.hex.trim().is_empty())
            .map(|a| self.enrich_aircraft(a, seen_at))
            .collect()
    }
}
