use chrono::{DateTime, Datelike, Month, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub type AirportId = i64;

/// An airport as listed by the airport service. `name` is the display
/// label, either a bare code ("JFK") or "CODE - City".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    pub id: AirportId,
    pub name: String,
}

impl Airport {
    pub fn new(id: AirportId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Airport code: the part of the label before " - ".
    pub fn code(&self) -> &str {
        self.name
            .split_once(" - ")
            .map(|(code, _)| code)
            .unwrap_or(&self.name)
            .trim()
    }
}

impl fmt::Display for Airport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Where the ids in an [`AirportListing`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirportIds {
    /// Sent by the service, stable across lists.
    Service,
    /// Numbered by position in a label-only list; only meaningful within
    /// that one list.
    Positional,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirportListing {
    pub airports: Vec<Airport>,
    pub ids: AirportIds,
}

impl AirportListing {
    pub fn with_service_ids(airports: Vec<Airport>) -> Self {
        Self {
            airports,
            ids: AirportIds::Service,
        }
    }
}

/// When the user intends to travel. Later forms ask for a full date, the
/// earlier one only for a month; the estimators only ever need the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelPeriod {
    Date(NaiveDate),
    Month(Month),
}

impl TravelPeriod {
    pub fn month(&self) -> Month {
        match self {
            TravelPeriod::Month(month) => *month,
            // NaiveDate::month() is always 1..=12
            TravelPeriod::Date(date) => Month::try_from(date.month() as u8).unwrap_or(Month::January),
        }
    }
}

impl fmt::Display for TravelPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelPeriod::Date(date) => write!(f, "{}", date),
            TravelPeriod::Month(month) => write!(f, "{}", month.name()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub departure: Option<AirportId>,
    pub arrival: Option<AirportId>,
    pub travel: Option<TravelPeriod>,
}

impl SelectionState {
    pub fn is_complete(&self) -> bool {
        self.departure.is_some() && self.arrival.is_some() && self.travel.is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    pub origins: Vec<Airport>,
    pub destinations_by_origin: HashMap<AirportId, Vec<Airport>>,
}

impl DirectorySnapshot {
    pub fn origin(&self, id: AirportId) -> Option<&Airport> {
        self.origins.iter().find(|a| a.id == id)
    }

    pub fn destinations(&self, origin: AirportId) -> &[Airport] {
        self.destinations_by_origin
            .get(&origin)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Everything an estimator may need about one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteQuery {
    pub departure: Airport,
    pub arrival: Airport,
    pub month: Month,
}

/// A delay probability in percent, held in tenths so it always renders
/// with exactly one fractional digit. Not capped at 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DelayProbability {
    tenths: u32,
}

impl DelayProbability {
    pub fn from_percent(percent: f64) -> Self {
        let tenths = (percent * 10.0).round().max(0.0) as u32;
        Self { tenths }
    }

    pub fn from_fraction(fraction: f64) -> Self {
        Self::from_percent(fraction * 100.0)
    }

    pub fn percent(&self) -> f64 {
        self.tenths as f64 / 10.0
    }
}

impl fmt::Display for DelayProbability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.tenths / 10, self.tenths % 10)
    }
}

pub const HIGH_RISK_THRESHOLD_PERCENT: f64 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub struct EstimationResult {
    pub probability: DelayProbability,
    pub computed_at: DateTime<Utc>,
}

impl EstimationResult {
    pub fn new(probability: DelayProbability) -> Self {
        Self {
            probability,
            computed_at: Utc::now(),
        }
    }

    pub fn is_high_risk(&self) -> bool {
        self.probability.percent() > HIGH_RISK_THRESHOLD_PERCENT
    }

    pub fn advisory(&self) -> Option<&'static str> {
        self.is_high_risk()
            .then_some("This route has a higher than average delay risk.")
    }
}

impl fmt::Display for EstimationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_airport_code_from_label() {
        assert_eq!(Airport::new(1, "JFK - New York").code(), "JFK");
        assert_eq!(Airport::new(2, "LAX").code(), "LAX");
    }

    #[test]
    fn test_travel_period_month() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 4).unwrap();
        assert_eq!(TravelPeriod::Date(date).month(), Month::July);
        assert_eq!(TravelPeriod::Month(Month::December).month(), Month::December);
    }

    #[test]
    fn test_probability_renders_one_decimal() {
        assert_eq!(DelayProbability::from_fraction(0.22).to_string(), "22.0");
        assert_eq!(DelayProbability::from_percent(18.04).to_string(), "18.0");
        assert_eq!(DelayProbability::from_percent(37.46).to_string(), "37.5");
        assert_eq!(DelayProbability::from_percent(112.3).to_string(), "112.3");
    }

    #[test]
    fn test_high_risk_advisory() {
        let calm = EstimationResult::new(DelayProbability::from_percent(30.0));
        assert!(calm.advisory().is_none());

        let risky = EstimationResult::new(DelayProbability::from_percent(30.1));
        assert!(risky.is_high_risk());
        assert_eq!(risky.to_string(), "30.1%");
        assert!(risky.advisory().is_some());
    }

    #[test]
    fn test_selection_completeness() {
        let mut selection = SelectionState {
            departure: Some(1),
            arrival: Some(2),
            travel: None,
        };
        assert!(!selection.is_complete());

        selection.travel = Some(TravelPeriod::Month(Month::March));
        assert!(selection.is_complete());

        selection.clear();
        assert_eq!(selection, SelectionState::default());
    }
}
