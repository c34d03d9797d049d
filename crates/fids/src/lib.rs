//! `fids` - A flight information display system
//!
//! This library provides the departures board (paging, refresh, kiosk cursor
//! and settings), the flight data sources behind it, and the local flight
//! store they read from.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod flight;
pub mod logging;
pub mod source;
pub mod storage;

pub use config::{BoardConfig, Config, DisplaySettings, SettingsUpdate};
pub use display::{spawn_display, DisplayController, DisplayHandle};
pub use error::{Error, Result};
pub use flight::{Category, FlightDirection, FlightRecord, FlightStatus, NewFlight};
pub use logging::init_logging;
pub use source::{FlightSource, LiveSource, MockSource, SourceError, SourceSet};
pub use storage::{FlightQuery, FlightStats, Storage};
