//! Flight data sources.
//!
//! The board asks a [`FlightSource`] for upcoming departures and does not care
//! which implementation answers. [`MockSource`] generates plausible random
//! flights; [`LiveSource`] reads the local flight store. [`SourceSet`] holds
//! both and picks one from the current display settings.

mod live;
mod mock;

use std::sync::Arc;

use thiserror::Error;

use crate::config::DisplaySettings;
use crate::flight::{Category, FlightRecord};

pub use live::LiveSource;
pub use mock::MockSource;

/// Errors a flight source can report.
///
/// The two variants drive different connection states on the board: a query
/// error means the source answered with a failure, a transport error means it
/// could not be reached at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The source was reached but returned an error.
    #[error("source query failed: {0}")]
    Query(String),

    /// The source could not be reached.
    #[error("source unreachable: {0}")]
    Transport(String),
}

impl SourceError {
    /// Create a query error.
    #[must_use]
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }

    /// Create a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Check if this is a transport failure.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// A provider of upcoming flights.
#[async_trait::async_trait]
pub trait FlightSource: Send + Sync + std::fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch flights scheduled to depart within `window` from now, ascending
    /// by scheduled departure.
    ///
    /// With a category, only flights of that category are returned.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Query`] if the source rejected the request and
    /// [`SourceError::Transport`] if it could not be reached.
    async fn fetch_upcoming(
        &self,
        category: Option<Category>,
        window: chrono::Duration,
    ) -> Result<Vec<FlightRecord>, SourceError>;
}

/// The mock and live sources, selected by [`DisplaySettings::use_mock_data`].
#[derive(Debug, Clone)]
pub struct SourceSet {
    mock: Arc<dyn FlightSource>,
    live: Arc<dyn FlightSource>,
}

impl SourceSet {
    /// Create a source set.
    #[must_use]
    pub fn new(mock: Arc<dyn FlightSource>, live: Arc<dyn FlightSource>) -> Self {
        Self { mock, live }
    }

    /// The source the given settings select.
    #[must_use]
    pub fn active(&self, settings: &DisplaySettings) -> Arc<dyn FlightSource> {
        if settings.use_mock_data {
            Arc::clone(&self.mock)
        } else {
            Arc::clone(&self.live)
        }
    }
}
