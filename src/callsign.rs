use once_cell::sync::Lazy;
use regex::Regex;

/// Value returned when a callsign carries no airline designator
pub const UNKNOWN_AIRLINE: &str = "Unknown";

static AIRLINE_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2,3}").unwrap());

/// Extract the airline designator from a flight callsign.
///
/// Airline flights broadcast callsigns that start with the two letter IATA or
/// three letter ICAO designator (`MH370`, `MAS370`). Registrations used as
/// callsigns (`9M-MXA`, `N123AB`) and purely numeric callsigns have no
/// designator and resolve to [`UNKNOWN_AIRLINE`]. This is a heuristic, not a
/// lookup: a registration such as `GABCD` still yields `GAB`.
pub fn extract_airline_code(flight: &str) -> &str {
    AIRLINE_PREFIX_RE
        .find(flight.trim())
        .map(|m| m.as_str())
        .unwrap_or(UNKNOWN_AIRLINE)
}

/// Special-purpose squawk codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquawkCondition {
    Hijack,
    RadioFailure,
    Emergency,
}

impl SquawkCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            SquawkCondition::Hijack => "hijack",
            SquawkCondition::RadioFailure => "radio_failure",
            SquawkCondition::Emergency => "emergency",
        }
    }
}

pub fn squawk_condition(squawk: &str) -> Option<SquawkCondition> {
    match squawk.trim() {
        "7500" => Some(SquawkCondition::Hijack),
        "7600" => Some(SquawkCondition::RadioFailure),
        "7700" => Some(SquawkCondition::Emergency),
        _ => None,
    }
}
