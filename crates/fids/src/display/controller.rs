//! The board's state machine.
//!
//! [`DisplayController`] owns the settings and view state and decides what
//! every trigger does to them: fetch results, category switches, page
//! rotation, clock ticks, key presses and settings changes. It never touches
//! timers or the terminal; the runtime in [`super::tasks`] does that and acts
//! on the [`Effect`]s returned here.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::keyboard::{action_for, panel_update, Key, KeyAction};
use super::pagination;
use super::state::{ConnectionStatus, DisplaySnapshot, DisplayViewState};
use crate::config::{BoardConfig, DisplaySettings, SettingsUpdate};
use crate::error::Result;
use crate::flight::{sort_by_departure, Category, FlightRecord};
use crate::source::{FlightSource, SourceError, SourceSet};

/// Work the runtime must do after a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Start a fetch.
    Refresh,
    /// Enter fullscreen if windowed, leave it if fullscreen.
    ToggleFullscreen,
    /// Settings were changed from the panel.
    SettingsChanged(SettingsChange),
}

/// Result of a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    /// The key was consumed by the board.
    pub handled: bool,
    /// Follow-up work, if any.
    pub effect: Option<Effect>,
}

/// Which parts of the settings changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct SettingsChange {
    /// The refresh timer must be rebuilt.
    pub refresh_interval: bool,
    /// The rotation timer must be rebuilt.
    pub page_interval: bool,
    /// A different source is active; refresh now.
    pub source: bool,
    /// Kiosk mode was switched.
    pub kiosk_mode: bool,
    /// The clock was shown or hidden.
    pub show_system_time: bool,
}

/// A fetch detached from the controller so it can run on its own task.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    source: Arc<dyn FlightSource>,
    category: Category,
    window: chrono::Duration,
}

impl FetchRequest {
    /// Name of the source being asked.
    #[must_use]
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Run the fetch.
    ///
    /// # Errors
    ///
    /// Returns whatever the source reports.
    pub async fn run(self) -> std::result::Result<Vec<FlightRecord>, SourceError> {
        self.source
            .fetch_upcoming(Some(self.category), self.window)
            .await
    }
}

/// Settings, view state and the sources they select.
#[derive(Debug)]
pub struct DisplayController {
    settings: DisplaySettings,
    view: DisplayViewState,
    sources: SourceSet,
    board: BoardConfig,
}

impl DisplayController {
    /// Create a controller showing the default category with no flights yet.
    #[must_use]
    pub fn new(settings: DisplaySettings, sources: SourceSet, board: BoardConfig) -> Self {
        Self {
            settings,
            view: DisplayViewState::new(Utc::now()),
            sources,
            board,
        }
    }

    /// Start on a specific category.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.view.category = category;
        self
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    /// Board presentation settings.
    #[must_use]
    pub fn board(&self) -> &BoardConfig {
        &self.board
    }

    /// Current view state.
    #[must_use]
    pub fn view(&self) -> &DisplayViewState {
        &self.view
    }

    /// Number of pages the current list needs.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        pagination::total_pages(self.view.flights.len(), self.settings.flights_per_page)
    }

    /// Flights on the current page.
    #[must_use]
    pub fn current_page_slice(&self) -> &[FlightRecord] {
        pagination::page_slice(
            &self.view.flights,
            self.view.current_page,
            self.settings.flights_per_page,
        )
    }

    /// Describe the fetch the current settings and category call for.
    #[must_use]
    pub fn fetch_request(&self) -> FetchRequest {
        FetchRequest {
            source: self.sources.active(&self.settings),
            category: self.view.category,
            window: self.board.look_ahead(),
        }
    }

    /// Fetch and apply in one step.
    pub async fn refresh(&mut self) {
        let result = self.fetch_request().run().await;
        self.apply_fetch(result, Utc::now());
    }

    /// Apply a completed fetch.
    ///
    /// Success replaces the list wholesale; failure keeps it and only moves
    /// the connection status.
    pub fn apply_fetch(
        &mut self,
        result: std::result::Result<Vec<FlightRecord>, SourceError>,
        now: DateTime<Utc>,
    ) {
        self.view.loading = false;
        match result {
            Ok(mut flights) => {
                sort_by_departure(&mut flights);
                debug!(count = flights.len(), category = %self.view.category, "Flights refreshed");
                self.view.flights = flights;
                self.view.connection = ConnectionStatus::Connected;
                self.view.last_updated = Some(now);
                self.view.current_page =
                    pagination::clamp_page(self.view.current_page, self.total_pages());
            }
            Err(err) => {
                let status = ConnectionStatus::after_failure(&err);
                warn!(error = %err, %status, "Flight refresh failed, keeping previous list");
                self.view.connection = status;
            }
        }
    }

    /// Switch category and go back to the first page.
    pub fn set_category(&mut self, category: Category) -> Effect {
        info!(%category, "Switching board category");
        self.view.category = category;
        self.view.current_page = 0;
        Effect::Refresh
    }

    /// Advance to the next page. Returns `true` if the page changed.
    pub fn rotate_page(&mut self) -> bool {
        let next = pagination::next_page(self.view.current_page, self.total_pages());
        let changed = next != self.view.current_page;
        self.view.current_page = next;
        changed
    }

    /// Update the header clock.
    pub fn tick_clock(&mut self, now: DateTime<Utc>) {
        self.view.now = now;
    }

    /// Dispatch a key press.
    ///
    /// While the settings panel is open, digits edit the settings.
    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        let Some(action) = action_for(key, self.view.settings_open) else {
            return self.handle_panel_key(key);
        };

        debug!(?key, ?action, "Key handled");
        let effect = match action {
            KeyAction::OpenSettings => {
                self.view.settings_open = true;
                None
            }
            KeyAction::CloseSettings => {
                self.view.settings_open = false;
                None
            }
            KeyAction::Refresh => Some(Effect::Refresh),
            KeyAction::ToggleAdmin => {
                self.view.show_admin_controls = !self.view.show_admin_controls;
                None
            }
            KeyAction::SelectCategory(category) => Some(self.set_category(category)),
            KeyAction::ToggleFullscreen => Some(Effect::ToggleFullscreen),
        };

        KeyOutcome {
            handled: true,
            effect,
        }
    }

    fn handle_panel_key(&mut self, key: Key) -> KeyOutcome {
        if !self.view.settings_open {
            return KeyOutcome::default();
        }
        let Some(update) = panel_update(key, &self.settings) else {
            return KeyOutcome::default();
        };
        match self.apply_settings(&update) {
            Ok(change) => KeyOutcome {
                handled: true,
                effect: Some(Effect::SettingsChanged(change)),
            },
            Err(err) => {
                warn!(error = %err, "Rejected settings change");
                KeyOutcome {
                    handled: true,
                    effect: None,
                }
            }
        }
    }

    /// Apply a partial settings change.
    ///
    /// # Errors
    ///
    /// Returns an error if the update carries an unsupported refresh interval;
    /// the settings are left unchanged in that case.
    pub fn apply_settings(&mut self, update: &SettingsUpdate) -> Result<SettingsChange> {
        let next = self.settings.apply(update)?;
        Ok(self.replace_settings(next))
    }

    /// Replace the settings wholesale and report what changed.
    pub fn replace_settings(&mut self, next: DisplaySettings) -> SettingsChange {
        let previous = std::mem::replace(&mut self.settings, next);
        let current = &self.settings;

        let change = SettingsChange {
            refresh_interval: previous.refresh_interval_secs != current.refresh_interval_secs,
            page_interval: previous.page_interval_secs != current.page_interval_secs,
            source: previous.use_mock_data != current.use_mock_data,
            kiosk_mode: previous.kiosk_mode != current.kiosk_mode,
            show_system_time: previous.show_system_time != current.show_system_time,
        };

        if previous.flights_per_page != current.flights_per_page {
            self.view.current_page =
                pagination::clamp_page(self.view.current_page, self.total_pages());
        }

        info!(?change, "Display settings replaced");
        change
    }

    /// Record the surface's fullscreen state.
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.view.is_fullscreen = fullscreen;
    }

    /// Record cursor visibility.
    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.view.cursor_visible = visible;
    }

    /// Capture the state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            view: self.view.clone(),
            settings: self.settings.clone(),
            page: self.current_page_slice().to_vec(),
            total_pages: self.total_pages(),
        }
    }
}
