//! Configuration management for fids.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults. It also
//! owns [`DisplaySettings`], the in-memory settings object of the board, and
//! the partial [`SettingsUpdate`] the settings panel applies to it.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "fids";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "flights.db";

/// Refresh intervals offered by the settings panel, in seconds.
pub const REFRESH_INTERVAL_CHOICES: [u64; 4] = [30, 60, 120, 300];

/// Allowed flights-per-page range.
pub const FLIGHTS_PER_PAGE_RANGE: (usize, usize) = (4, 12);

/// Allowed page rotation interval range, in seconds.
pub const PAGE_INTERVAL_RANGE: (u64, u64) = (5, 60);

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FIDS_`, sections split on `__`)
/// 2. TOML config file at `~/.config/fids/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial board settings.
    pub display: DisplaySettings,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Board presentation and data window.
    pub board: BoardConfig,
}

/// Runtime settings of the departures board.
///
/// Held in memory by the display and replaced wholesale whenever the settings
/// panel changes anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Use the mock generator instead of the flight store.
    pub use_mock_data: bool,
    /// Seconds between data refreshes.
    pub refresh_interval_secs: u64,
    /// Show the wall clock in the header.
    pub show_system_time: bool,
    /// Hide the cursor after inactivity.
    pub kiosk_mode: bool,
    /// Enter fullscreen when the board starts.
    pub auto_fullscreen: bool,
    /// Rows per page.
    pub flights_per_page: usize,
    /// Seconds between page rotations.
    pub page_interval_secs: u64,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/fids/flights.db`
    pub database_path: Option<PathBuf>,
}

/// Board presentation and data window configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Airport name in the header.
    pub airport_name: String,
    /// Origin written on generated mock flights.
    pub origin: String,
    /// Look-ahead window for upcoming flights, in hours.
    pub look_ahead_hours: u32,
    /// Number of flights the mock generator produces per fetch.
    pub mock_flight_count: usize,
    /// Simulated latency range of the mock generator, in milliseconds.
    pub mock_latency_ms: (u64, u64),
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            use_mock_data: true, // The store starts empty
            refresh_interval_secs: 60,
            show_system_time: true,
            kiosk_mode: true,
            auto_fullscreen: false,
            flights_per_page: 8,
            page_interval_secs: 15,
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            airport_name: "Chennai Airport".to_string(),
            origin: "Chennai (MAA)".to_string(),
            look_ahead_hours: 3,
            mock_flight_count: 15,
            mock_latency_ms: (500, 1500),
        }
    }
}

/// A partial change to [`DisplaySettings`].
///
/// Unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsUpdate {
    /// New data source selection.
    pub use_mock_data: Option<bool>,
    /// New refresh interval.
    pub refresh_interval_secs: Option<u64>,
    /// New clock visibility.
    pub show_system_time: Option<bool>,
    /// New kiosk mode flag.
    pub kiosk_mode: Option<bool>,
    /// New auto-fullscreen flag.
    pub auto_fullscreen: Option<bool>,
    /// New rows per page (clamped).
    pub flights_per_page: Option<usize>,
    /// New rotation interval (clamped).
    pub page_interval_secs: Option<u64>,
}

impl SettingsUpdate {
    /// Parse a single `key=value` assignment typed into the settings panel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for unknown keys or malformed values.
    pub fn parse(assignment: &str) -> Result<Self> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| Error::parse("setting", assignment))?;
        let (key, value) = (key.trim(), value.trim());

        let mut update = Self::default();
        match key {
            "use_mock_data" => update.use_mock_data = Some(flag("use_mock_data", value)?),
            "show_system_time" => update.show_system_time = Some(flag("show_system_time", value)?),
            "kiosk_mode" => update.kiosk_mode = Some(flag("kiosk_mode", value)?),
            "auto_fullscreen" => update.auto_fullscreen = Some(flag("auto_fullscreen", value)?),
            "refresh_interval_secs" => {
                update.refresh_interval_secs = Some(
                    value
                        .parse()
                        .map_err(|_| Error::parse("refresh_interval_secs", value))?,
                );
            }
            "flights_per_page" => {
                update.flights_per_page = Some(
                    value
                        .parse()
                        .map_err(|_| Error::parse("flights_per_page", value))?,
                );
            }
            "page_interval_secs" => {
                update.page_interval_secs = Some(
                    value
                        .parse()
                        .map_err(|_| Error::parse("page_interval_secs", value))?,
                );
            }
            _ => return Err(Error::parse("setting", key)),
        }
        Ok(update)
    }

    /// Check whether this update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl DisplaySettings {
    /// Produce new settings with `update` applied.
    ///
    /// Rows per page and the rotation interval are clamped into their ranges;
    /// a refresh interval that is not one of [`REFRESH_INTERVAL_CHOICES`] is
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] for an unsupported refresh interval.
    pub fn apply(&self, update: &SettingsUpdate) -> Result<Self> {
        if let Some(secs) = update.refresh_interval_secs {
            validate_refresh_interval(secs)?;
        }

        let (min_rows, max_rows) = FLIGHTS_PER_PAGE_RANGE;
        let (min_page, max_page) = PAGE_INTERVAL_RANGE;

        Ok(Self {
            use_mock_data: update.use_mock_data.unwrap_or(self.use_mock_data),
            refresh_interval_secs: update
                .refresh_interval_secs
                .unwrap_or(self.refresh_interval_secs),
            show_system_time: update.show_system_time.unwrap_or(self.show_system_time),
            kiosk_mode: update.kiosk_mode.unwrap_or(self.kiosk_mode),
            auto_fullscreen: update.auto_fullscreen.unwrap_or(self.auto_fullscreen),
            flights_per_page: update
                .flights_per_page
                .map_or(self.flights_per_page, |n| n.clamp(min_rows, max_rows)),
            page_interval_secs: update
                .page_interval_secs
                .map_or(self.page_interval_secs, |s| s.clamp(min_page, max_page)),
        })
    }

    /// Validate the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is outside its allowed range.
    pub fn validate(&self) -> Result<()> {
        validate_refresh_interval(self.refresh_interval_secs)?;

        let (min_rows, max_rows) = FLIGHTS_PER_PAGE_RANGE;
        if !(min_rows..=max_rows).contains(&self.flights_per_page) {
            return Err(Error::config_validation(format!(
                "flights_per_page ({}) must be between {min_rows} and {max_rows}",
                self.flights_per_page
            )));
        }

        let (min_page, max_page) = PAGE_INTERVAL_RANGE;
        if !(min_page..=max_page).contains(&self.page_interval_secs) {
            return Err(Error::config_validation(format!(
                "page_interval_secs ({}) must be between {min_page} and {max_page}",
                self.page_interval_secs
            )));
        }

        Ok(())
    }

    /// Get the refresh interval as a Duration.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Get the page rotation interval as a Duration.
    #[must_use]
    pub fn page_interval(&self) -> Duration {
        Duration::from_secs(self.page_interval_secs)
    }
}

fn flag(field: &'static str, value: &str) -> Result<bool> {
    match value {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(Error::parse(field, value)),
    }
}

fn validate_refresh_interval(secs: u64) -> Result<()> {
    if REFRESH_INTERVAL_CHOICES.contains(&secs) {
        Ok(())
    } else {
        Err(Error::config_validation(format!(
            "refresh_interval_secs ({secs}) must be one of {REFRESH_INTERVAL_CHOICES:?}"
        )))
    }
}

impl BoardConfig {
    /// Get the look-ahead window as a chrono Duration.
    #[must_use]
    pub fn look_ahead(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.look_ahead_hours))
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("FIDS_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        self.display.validate()?;

        if self.board.look_ahead_hours == 0 {
            return Err(Error::config_validation(
                "look_ahead_hours must be greater than 0",
            ));
        }

        let (low, high) = self.board.mock_latency_ms;
        if low > high {
            return Err(Error::config_validation(format!(
                "mock_latency_ms lower bound ({low}) cannot exceed upper bound ({high})"
            )));
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_display_settings() {
        let settings = DisplaySettings::default();

        assert!(settings.use_mock_data);
        assert_eq!(settings.refresh_interval_secs, 60);
        assert!(settings.show_system_time);
        assert!(settings.kiosk_mode);
        assert!(!settings.auto_fullscreen);
        assert_eq!(settings.flights_per_page, 8);
        assert_eq!(settings.page_interval_secs, 15);
    }

    #[test]
    fn test_default_board_config() {
        let board = BoardConfig::default();

        assert_eq!(board.look_ahead_hours, 3);
        assert_eq!(board.look_ahead(), chrono::Duration::hours(3));
        assert_eq!(board.mock_flight_count, 15);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_apply_replaces_only_given_fields() {
        let settings = DisplaySettings::default();
        let update = SettingsUpdate {
            kiosk_mode: Some(false),
            refresh_interval_secs: Some(120),
            ..SettingsUpdate::default()
        };

        let next = settings.apply(&update).unwrap();
        assert!(!next.kiosk_mode);
        assert_eq!(next.refresh_interval_secs, 120);
        assert_eq!(next.flights_per_page, settings.flights_per_page);
        assert_eq!(next.use_mock_data, settings.use_mock_data);
    }

    #[test]
    fn test_apply_clamps_flights_per_page() {
        let settings = DisplaySettings::default();

        let low = SettingsUpdate {
            flights_per_page: Some(1),
            ..SettingsUpdate::default()
        };
        assert_eq!(settings.apply(&low).unwrap().flights_per_page, 4);

        let high = SettingsUpdate {
            flights_per_page: Some(40),
            ..SettingsUpdate::default()
        };
        assert_eq!(settings.apply(&high).unwrap().flights_per_page, 12);
    }

    #[test]
    fn test_apply_clamps_page_interval() {
        let settings = DisplaySettings::default();
        let update = SettingsUpdate {
            page_interval_secs: Some(0),
            ..SettingsUpdate::default()
        };
        assert_eq!(settings.apply(&update).unwrap().page_interval_secs, 5);

        let update = SettingsUpdate {
            page_interval_secs: Some(600),
            ..SettingsUpdate::default()
        };
        assert_eq!(settings.apply(&update).unwrap().page_interval_secs, 60);
    }

    #[test]
    fn test_apply_rejects_unsupported_refresh_interval() {
        let settings = DisplaySettings::default();
        let update = SettingsUpdate {
            refresh_interval_secs: Some(45),
            ..SettingsUpdate::default()
        };

        let err = settings.apply(&update).unwrap_err().to_string();
        assert!(err.contains("refresh_interval_secs"));
    }

    #[test]
    fn test_apply_leaves_original_untouched() {
        let settings = DisplaySettings::default();
        let update = SettingsUpdate {
            flights_per_page: Some(10),
            ..SettingsUpdate::default()
        };
        let _ = settings.apply(&update).unwrap();
        assert_eq!(settings.flights_per_page, 8);
    }

    #[test]
    fn test_validate_rejects_out_of_range_rows() {
        let mut config = Config::default();
        config.display.flights_per_page = 20;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("flights_per_page"));
    }

    #[test]
    fn test_validate_rejects_zero_look_ahead() {
        let mut config = Config::default();
        config.board.look_ahead_hours = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("look_ahead_hours"));
    }

    #[test]
    fn test_validate_rejects_inverted_latency() {
        let mut config = Config::default();
        config.board.mock_latency_ms = (900, 100);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_settings_assignment() {
        let update = SettingsUpdate::parse("flights_per_page=10").unwrap();
        assert_eq!(update.flights_per_page, Some(10));

        let update = SettingsUpdate::parse("kiosk_mode = off").unwrap();
        assert_eq!(update.kiosk_mode, Some(false));

        assert!(SettingsUpdate::parse("volume=11").is_err());
        assert!(SettingsUpdate::parse("flights_per_page").is_err());
        assert!(SettingsUpdate::parse("kiosk_mode=maybe").is_err());
    }

    #[test]
    fn test_settings_update_is_empty() {
        assert!(SettingsUpdate::default().is_empty());
        assert!(!SettingsUpdate::parse("use_mock_data=true")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_intervals_as_durations() {
        let settings = DisplaySettings::default();
        assert_eq!(settings.refresh_interval(), Duration::from_secs(60));
        assert_eq!(settings.page_interval(), Duration::from_secs(15));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config.database_path().to_string_lossy().contains("flights.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/flights.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/flights.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("fids"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_display_settings_deserialize_partial() {
        let json = r#"{"flights_per_page": 6, "kiosk_mode": false}"#;
        let settings: DisplaySettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.flights_per_page, 6);
        assert!(!settings.kiosk_mode);
        assert_eq!(settings.page_interval_secs, 15);
    }
}
