//! View state published by the board.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::DisplaySettings;
use crate::flight::{Category, FlightRecord};
use crate::source::SourceError;

/// Health of the data feed as shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// The last refresh succeeded.
    #[default]
    Connected,
    /// The source answered with an error.
    Error,
    /// The source could not be reached.
    Disconnected,
}

impl ConnectionStatus {
    /// The status a failed refresh leads to.
    #[must_use]
    pub fn after_failure(err: &SourceError) -> Self {
        if err.is_transport() {
            Self::Disconnected
        } else {
            Self::Error
        }
    }

    /// Header indicator text.
    #[must_use]
    pub const fn indicator(self) -> &'static str {
        match self {
            Self::Connected => "LIVE",
            Self::Error => "ERROR",
            Self::Disconnected => "OFFLINE",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::Error => write!(f, "error"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Everything the board currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayViewState {
    /// Flights of the current category, ascending by scheduled departure.
    pub flights: Vec<FlightRecord>,
    /// Zero-based page index.
    pub current_page: usize,
    /// Category on screen.
    pub category: Category,
    /// Feed health.
    pub connection: ConnectionStatus,
    /// Time of the last successful refresh.
    pub last_updated: Option<DateTime<Utc>>,
    /// Wall clock shown in the header.
    pub now: DateTime<Utc>,
    /// Whether the surface is fullscreen.
    pub is_fullscreen: bool,
    /// Whether the admin controls are shown.
    pub show_admin_controls: bool,
    /// Whether the settings panel is open.
    pub settings_open: bool,
    /// Whether the cursor is shown.
    pub cursor_visible: bool,
    /// True until the first refresh completes.
    pub loading: bool,
}

impl DisplayViewState {
    /// Initial state before any data arrives.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            flights: Vec::new(),
            current_page: 0,
            category: Category::default(),
            connection: ConnectionStatus::default(),
            last_updated: None,
            now,
            is_fullscreen: false,
            show_admin_controls: false,
            settings_open: false,
            cursor_visible: true,
            loading: true,
        }
    }
}

/// A consistent view of the board for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplaySnapshot {
    /// View state.
    pub view: DisplayViewState,
    /// Settings in effect.
    pub settings: DisplaySettings,
    /// Flights on the current page.
    pub page: Vec<FlightRecord>,
    /// Number of pages.
    pub total_pages: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_mapping() {
        assert_eq!(
            ConnectionStatus::after_failure(&SourceError::query("bad filter")),
            ConnectionStatus::Error
        );
        assert_eq!(
            ConnectionStatus::after_failure(&SourceError::transport("timeout")),
            ConnectionStatus::Disconnected
        );
    }

    #[test]
    fn test_initial_view_state() {
        let view = DisplayViewState::new(Utc::now());
        assert_eq!(view.connection, ConnectionStatus::Connected);
        assert_eq!(view.category, Category::Domestic);
        assert_eq!(view.current_page, 0);
        assert!(view.loading);
        assert!(view.cursor_visible);
        assert!(view.last_updated.is_none());
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(ConnectionStatus::Disconnected.to_string(), "disconnected");
        assert_eq!(ConnectionStatus::Disconnected.indicator(), "OFFLINE");
        assert_eq!(ConnectionStatus::Connected.indicator(), "LIVE");
    }
}
