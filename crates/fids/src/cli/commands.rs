//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use clap::{Args, Subcommand, ValueEnum};

use crate::config::SettingsUpdate;
use crate::error::{Error, Result};
use crate::flight::{Category, FlightDirection, FlightStatus, NewFlight};

/// Arguments for running the board.
#[derive(Debug, Args)]
pub struct DisplayArgs {
    /// Use generated demo data
    #[arg(long, conflicts_with = "live")]
    pub mock: bool,

    /// Use the local flight store
    #[arg(long)]
    pub live: bool,

    /// Category to show first
    #[arg(long, value_enum)]
    pub category: Option<CategoryArg>,

    /// Flights per page (4-12)
    #[arg(long, value_name = "N")]
    pub per_page: Option<usize>,

    /// Seconds between page rotations (5-60)
    #[arg(long, value_name = "SECS")]
    pub page_interval: Option<u64>,

    /// Seconds between data refreshes (30, 60, 120 or 300)
    #[arg(long, value_name = "SECS")]
    pub refresh_interval: Option<u64>,

    /// Hide the cursor when idle
    #[arg(long, value_name = "BOOL")]
    pub kiosk: Option<bool>,

    /// Go fullscreen on start
    #[arg(long)]
    pub fullscreen: bool,

    /// Extra setting as key=value (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    /// Print one board and exit
    #[arg(long)]
    pub once: bool,
}

impl DisplayArgs {
    /// Collect the flags into one settings update.
    ///
    /// `--set` assignments are applied first, so dedicated flags win.
    ///
    /// # Errors
    ///
    /// Returns an error if a `--set` assignment cannot be parsed.
    pub fn settings_update(&self) -> Result<SettingsUpdate> {
        let mut update = SettingsUpdate::default();
        for assignment in &self.settings {
            let parsed = SettingsUpdate::parse(assignment)?;
            update = merge(update, parsed);
        }

        if self.mock {
            update.use_mock_data = Some(true);
        } else if self.live {
            update.use_mock_data = Some(false);
        }
        if self.per_page.is_some() {
            update.flights_per_page = self.per_page;
        }
        if self.page_interval.is_some() {
            update.page_interval_secs = self.page_interval;
        }
        if self.refresh_interval.is_some() {
            update.refresh_interval_secs = self.refresh_interval;
        }
        if self.kiosk.is_some() {
            update.kiosk_mode = self.kiosk;
        }
        if self.fullscreen {
            update.auto_fullscreen = Some(true);
        }
        Ok(update)
    }
}

fn merge(base: SettingsUpdate, next: SettingsUpdate) -> SettingsUpdate {
    SettingsUpdate {
        use_mock_data: next.use_mock_data.or(base.use_mock_data),
        refresh_interval_secs: next.refresh_interval_secs.or(base.refresh_interval_secs),
        show_system_time: next.show_system_time.or(base.show_system_time),
        kiosk_mode: next.kiosk_mode.or(base.kiosk_mode),
        auto_fullscreen: next.auto_fullscreen.or(base.auto_fullscreen),
        flights_per_page: next.flights_per_page.or(base.flights_per_page),
        page_interval_secs: next.page_interval_secs.or(base.page_interval_secs),
    }
}

/// Flight management commands.
#[derive(Debug, Subcommand)]
pub enum FlightsCommand {
    /// Add a flight
    Add(FlightFields),

    /// List flights
    List {
        /// Match flight number, airline, origin or destination
        #[arg(short, long)]
        search: Option<String>,

        /// Filter by status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        /// Filter by direction
        #[arg(short = 't', long = "type", value_enum)]
        direction: Option<DirectionArg>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one flight
    Show {
        /// Flight id
        id: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Change fields of a flight
    Edit {
        /// Flight id
        id: String,

        /// Fields to change
        #[command(flatten)]
        fields: FlightFields,
    },

    /// Delete a flight
    Delete {
        /// Flight id
        id: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Flight fields shared by `add` and `edit`.
#[derive(Debug, Args, Default)]
pub struct FlightFields {
    /// Flight number, e.g. AI1234
    #[arg(short = 'n', long = "number")]
    pub flight_number: Option<String>,

    /// Operating airline
    #[arg(short, long)]
    pub airline: Option<String>,

    /// Aircraft type, e.g. A320
    #[arg(long)]
    pub aircraft: Option<String>,

    /// Origin airport, e.g. "Chennai (MAA)"
    #[arg(long)]
    pub origin: Option<String>,

    /// Destination airport, e.g. "Mumbai (BOM)"
    #[arg(short, long)]
    pub destination: Option<String>,

    /// Scheduled departure (RFC 3339 or "YYYY-MM-DD HH:MM" local time)
    #[arg(long, value_parser = parse_time)]
    pub departure: Option<DateTime<Utc>>,

    /// Scheduled arrival (RFC 3339 or "YYYY-MM-DD HH:MM" local time)
    #[arg(long, value_parser = parse_time)]
    pub arrival: Option<DateTime<Utc>>,

    /// Gate
    #[arg(short, long)]
    pub gate: Option<String>,

    /// Terminal
    #[arg(long)]
    pub terminal: Option<String>,

    /// Status
    #[arg(short, long, value_enum)]
    pub status: Option<StatusArg>,

    /// Departure or arrival
    #[arg(short = 't', long = "type", value_enum)]
    pub direction: Option<DirectionArg>,
}

impl FlightFields {
    /// Overlay the given fields on `form`.
    #[must_use]
    pub fn apply_to(&self, mut form: NewFlight) -> NewFlight {
        if let Some(number) = &self.flight_number {
            form.flight_number.clone_from(number);
        }
        if let Some(airline) = &self.airline {
            form.airline.clone_from(airline);
        }
        if self.aircraft.is_some() {
            form.aircraft_type.clone_from(&self.aircraft);
        }
        if self.origin.is_some() {
            form.origin.clone_from(&self.origin);
        }
        if self.destination.is_some() {
            form.destination.clone_from(&self.destination);
        }
        if self.departure.is_some() {
            form.scheduled_departure = self.departure;
        }
        if self.arrival.is_some() {
            form.scheduled_arrival = self.arrival;
        }
        if self.gate.is_some() {
            form.gate.clone_from(&self.gate);
        }
        if self.terminal.is_some() {
            form.terminal.clone_from(&self.terminal);
        }
        if let Some(status) = self.status {
            form.status = Some(status.into());
        }
        if let Some(direction) = self.direction {
            form.direction = direction.into();
        }
        form
    }
}

/// Parse a timestamp given on the command line.
///
/// # Errors
///
/// Returns an error if the text is neither RFC 3339 nor `YYYY-MM-DD HH:MM`.
pub fn parse_time(text: &str) -> Result<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Ok(time.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M")
        .map_err(|_| Error::parse("time", text))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|time| time.with_timezone(&Utc))
        .ok_or_else(|| Error::parse("time", text))
}

/// Seed command arguments.
#[derive(Debug, Args)]
pub struct SeedCommand {
    /// Number of flights to generate
    #[arg(short = 'n', long, default_value = "15")]
    pub count: usize,

    /// Only generate flights of this category
    #[arg(long, value_enum)]
    pub category: Option<CategoryArg>,
}

/// Dashboard command arguments.
#[derive(Debug, Args)]
pub struct DashboardCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Board category argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    /// Domestic destinations
    Domestic,
    /// International destinations
    International,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Domestic => Self::Domestic,
            CategoryArg::International => Self::International,
        }
    }
}

/// Flight status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Scheduled
    Scheduled,
    /// Boarding
    Boarding,
    /// Delayed
    Delayed,
    /// Cancelled
    Cancelled,
    /// Departed
    Departed,
    /// Arrived
    Arrived,
    /// On time
    OnTime,
}

impl From<StatusArg> for FlightStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Scheduled => Self::Scheduled,
            StatusArg::Boarding => Self::Boarding,
            StatusArg::Delayed => Self::Delayed,
            StatusArg::Cancelled => Self::Cancelled,
            StatusArg::Departed => Self::Departed,
            StatusArg::Arrived => Self::Arrived,
            StatusArg::OnTime => Self::OnTime,
        }
    }
}

/// Flight direction argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    /// Outbound
    Departure,
    /// Inbound
    Arrival,
}

impl From<DirectionArg> for FlightDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Departure => Self::Departure,
            DirectionArg::Arrival => Self::Arrival,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}
