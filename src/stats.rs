use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Headline counts for a time range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_flights: usize,
    pub total_aircraft: usize,
    pub aircraft_types: usize,
    pub countries: usize,
    pub airlines: usize,
    /// Largest receiver distance reported in the window, 0 when none
    pub max_distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopAircraftType {
    pub aircraft_type: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCountry {
    pub country: String,
    pub flag: String,
    pub count: usize,
    pub percentage: f64,
}

/// Airline row; `airline_code` is the designator the aircraft flew under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopAirline {
    pub airline: String,
    pub airline_code: String,
    pub country: String,
    pub count: usize,
    pub percentage: f64,
}

/// Distinct aircraft seen during one UTC hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyStats {
    pub hour: DateTime<Utc>,
    pub count: usize,
    pub hour_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryCount {
    pub country: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyCountryStats {
    pub hour: DateTime<Utc>,
    pub hour_label: String,
    pub countries: Vec<CountryCount>,
    pub total_aircraft: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirlineCount {
    pub airline: String,
    pub airline_code: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyAirlineStats {
    pub hour: DateTime<Utc>,
    pub hour_label: String,
    pub airlines: Vec<AirlineCount>,
    pub total_aircraft: usize,
}

/// Latest state of an aircraft currently in range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentAircraft {
    pub hex: String,
    pub flight: String,
    pub registration: String,
    pub aircraft_type: String,
    pub airline: Option<String>,
    pub country: String,
    pub flag: String,
    pub altitude: Option<i32>,
    pub ground_speed: Option<f64>,
    pub track: Option<f64>,
    pub distance: Option<f64>,
    pub rssi: Option<f64>,
    pub squawk: String,
    /// `hijack`, `radio_failure` or `emergency` for the special squawk codes
    pub squawk_condition: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub seen_at: DateTime<Utc>,
}

/// Health check response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
    pub recent_aircraft: i64,
    pub timestamp: DateTime<Utc>,
}
