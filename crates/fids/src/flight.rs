//! Core flight types for fids.
//!
//! This module defines the flight record shown on the board and edited through
//! the CLI, along with the status, direction and category enumerations.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Airport codes whose destinations count as domestic.
pub const DOMESTIC_CODES: [&str; 10] = [
    "BOM", "DEL", "BLR", "HYD", "CCU", "PNQ", "AMD", "GOI", "COK", "TRV",
];

/// Operational status of a flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlightStatus {
    /// Scheduled, no further information yet.
    Scheduled,
    /// Passengers are boarding.
    Boarding,
    /// Departure or arrival is delayed.
    Delayed,
    /// The flight will not operate.
    Cancelled,
    /// The aircraft has left the gate.
    Departed,
    /// The aircraft has arrived.
    Arrived,
    /// Operating on schedule.
    OnTime,
}

impl FlightStatus {
    /// Every status, in display order.
    pub const ALL: [Self; 7] = [
        Self::Scheduled,
        Self::Boarding,
        Self::Delayed,
        Self::Cancelled,
        Self::Departed,
        Self::Arrived,
        Self::OnTime,
    ];

    /// The wire/database representation of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Boarding => "boarding",
            Self::Delayed => "delayed",
            Self::Cancelled => "cancelled",
            Self::Departed => "departed",
            Self::Arrived => "arrived",
            Self::OnTime => "on-time",
        }
    }

    /// Human-readable label for the board, e.g. `On Time`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Boarding => "Boarding",
            Self::Delayed => "Delayed",
            Self::Cancelled => "Cancelled",
            Self::Departed => "Departed",
            Self::Arrived => "Arrived",
            Self::OnTime => "On Time",
        }
    }

    /// Whether this status counts towards the on-time statistic.
    #[must_use]
    pub const fn is_on_time(self) -> bool {
        matches!(self, Self::OnTime | Self::Scheduled)
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlightStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::parse("status", s))
    }
}

/// Whether a flight leaves from or arrives at this airport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightDirection {
    /// Outbound movement.
    #[default]
    Departure,
    /// Inbound movement.
    Arrival,
}

impl FlightDirection {
    /// The wire/database representation of this direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Departure => "departure",
            Self::Arrival => "arrival",
        }
    }
}

impl fmt::Display for FlightDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlightDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "departure" => Ok(Self::Departure),
            "arrival" => Ok(Self::Arrival),
            _ => Err(Error::parse("direction", s)),
        }
    }
}

/// Board category, derived from a flight's destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Destination inside the country.
    #[default]
    Domestic,
    /// Everything else.
    International,
}

impl Category {
    /// Title used in the board heading.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Domestic => "Domestic",
            Self::International => "International",
        }
    }

    /// Classify a destination string such as `Mumbai (BOM)`.
    ///
    /// A destination is domestic when it carries a parenthesised code from
    /// [`DOMESTIC_CODES`]. Missing destinations are international.
    #[must_use]
    pub fn of_destination(destination: Option<&str>) -> Self {
        let Some(destination) = destination else {
            return Self::International;
        };
        let domestic = airport_code_pattern()
            .captures_iter(destination)
            .any(|caps| DOMESTIC_CODES.contains(&&caps[1]));
        if domestic {
            Self::Domestic
        } else {
            Self::International
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domestic => f.write_str("domestic"),
            Self::International => f.write_str("international"),
        }
    }
}

fn airport_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(([A-Z]{3})\)").expect("static pattern is valid"))
}

/// A scheduled movement shown on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightRecord {
    /// Unique identifier.
    pub id: String,
    /// Flight number, e.g. `AI1234`.
    pub flight_number: String,
    /// Operating airline.
    pub airline: String,
    /// Aircraft type, e.g. `A320`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aircraft_type: Option<String>,
    /// Origin airport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Destination airport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// Scheduled departure time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_departure: Option<DateTime<Utc>>,
    /// Scheduled arrival time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_arrival: Option<DateTime<Utc>>,
    /// Actual or estimated departure time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_departure: Option<DateTime<Utc>>,
    /// Actual or estimated arrival time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_arrival: Option<DateTime<Utc>>,
    /// Departure gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<String>,
    /// Terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
    /// Operational status.
    pub status: FlightStatus,
    /// Departure or arrival.
    #[serde(rename = "flight_type")]
    pub direction: FlightDirection,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last modified.
    pub updated_at: DateTime<Utc>,
}

impl FlightRecord {
    /// The scheduled time that belongs to this record's direction.
    #[must_use]
    pub fn own_time(&self) -> Option<DateTime<Utc>> {
        match self.direction {
            FlightDirection::Departure => self.scheduled_departure,
            FlightDirection::Arrival => self.scheduled_arrival,
        }
    }

    /// The actual time that belongs to this record's direction.
    #[must_use]
    pub fn own_actual_time(&self) -> Option<DateTime<Utc>> {
        match self.direction {
            FlightDirection::Departure => self.actual_departure,
            FlightDirection::Arrival => self.actual_arrival,
        }
    }

    /// The board category of this flight.
    #[must_use]
    pub fn category(&self) -> Category {
        Category::of_destination(self.destination.as_deref())
    }

    /// Case-insensitive match against number, airline, origin and destination.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        [
            Some(self.flight_number.as_str()),
            Some(self.airline.as_str()),
            self.origin.as_deref(),
            self.destination.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Sort flights ascending by scheduled departure, unscheduled ones last.
pub fn sort_by_departure(flights: &mut [FlightRecord]) {
    flights.sort_by(|a, b| match (a.scheduled_departure, b.scheduled_departure) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Form data for adding or editing a flight.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewFlight {
    /// Flight number (required).
    pub flight_number: String,
    /// Airline (required).
    pub airline: String,
    /// Aircraft type.
    pub aircraft_type: Option<String>,
    /// Origin airport.
    pub origin: Option<String>,
    /// Destination airport.
    pub destination: Option<String>,
    /// Scheduled departure time.
    pub scheduled_departure: Option<DateTime<Utc>>,
    /// Scheduled arrival time.
    pub scheduled_arrival: Option<DateTime<Utc>>,
    /// Gate.
    pub gate: Option<String>,
    /// Terminal.
    pub terminal: Option<String>,
    /// Initial status.
    pub status: Option<FlightStatus>,
    /// Departure or arrival.
    pub direction: FlightDirection,
}

impl From<&FlightRecord> for NewFlight {
    fn from(record: &FlightRecord) -> Self {
        Self {
            flight_number: record.flight_number.clone(),
            airline: record.airline.clone(),
            aircraft_type: record.aircraft_type.clone(),
            origin: record.origin.clone(),
            destination: record.destination.clone(),
            scheduled_departure: record.scheduled_departure,
            scheduled_arrival: record.scheduled_arrival,
            gate: record.gate.clone(),
            terminal: record.terminal.clone(),
            status: Some(record.status),
            direction: record.direction,
        }
    }
}

impl NewFlight {
    /// Create form data with the two required fields.
    #[must_use]
    pub fn new(flight_number: impl Into<String>, airline: impl Into<String>) -> Self {
        Self {
            flight_number: flight_number.into(),
            airline: airline.into(),
            ..Self::default()
        }
    }

    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFlight`] naming the first missing field.
    pub fn validate(&self) -> Result<()> {
        if self.flight_number.trim().is_empty() {
            return Err(Error::invalid_flight("flight_number is required"));
        }
        if self.airline.trim().is_empty() {
            return Err(Error::invalid_flight("airline is required"));
        }
        Ok(())
    }

    /// Trim strings and turn blank optional fields into `None`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        self.flight_number = self.flight_number.trim().to_string();
        self.airline = self.airline.trim().to_string();
        self.aircraft_type = blank_to_none(self.aircraft_type);
        self.origin = blank_to_none(self.origin);
        self.destination = blank_to_none(self.destination);
        self.gate = blank_to_none(self.gate);
        self.terminal = blank_to_none(self.terminal);
        self
    }
}
