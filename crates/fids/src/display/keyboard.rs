//! Keyboard shortcuts of the board.
//!
//! Keys are matched literally: `s` opens settings but `S` does nothing.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::config::{
    DisplaySettings, SettingsUpdate, FLIGHTS_PER_PAGE_RANGE, PAGE_INTERVAL_RANGE,
    REFRESH_INTERVAL_CHOICES,
};
use crate::flight::Category;

/// Step used when cycling the page interval from the settings panel.
const PAGE_INTERVAL_STEP: u64 = 5;

/// A key press as the board sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character.
    Char(char),
    /// The escape key.
    Escape,
    /// The F11 function key.
    F11,
    /// Anything else.
    Other,
}

impl Key {
    /// Translate a terminal key event, ignoring releases and repeats.
    #[must_use]
    pub fn from_event(event: &KeyEvent) -> Option<Self> {
        if event.kind != KeyEventKind::Press {
            return None;
        }
        Some(Self::from(event.code))
    }
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        match code {
            KeyCode::Char(c) => Self::Char(c),
            KeyCode::Esc => Self::Escape,
            KeyCode::F(11) => Self::F11,
            _ => Self::Other,
        }
    }
}

/// What a handled key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Show the settings panel.
    OpenSettings,
    /// Hide the settings panel.
    CloseSettings,
    /// Refresh the flight list now.
    Refresh,
    /// Show or hide the admin controls.
    ToggleAdmin,
    /// Switch the board to a category.
    SelectCategory(Category),
    /// Enter or leave fullscreen.
    ToggleFullscreen,
}

/// Map a key to its action.
///
/// Escape only counts while the settings panel is open. `None` means the key
/// is not handled and should be passed on.
#[must_use]
pub fn action_for(key: Key, settings_open: bool) -> Option<KeyAction> {
    match key {
        Key::Char('s') => Some(KeyAction::OpenSettings),
        Key::Char('r') => Some(KeyAction::Refresh),
        Key::Char('a') => Some(KeyAction::ToggleAdmin),
        Key::Char('d') => Some(KeyAction::SelectCategory(Category::Domestic)),
        Key::Char('i') => Some(KeyAction::SelectCategory(Category::International)),
        Key::Escape if settings_open => Some(KeyAction::CloseSettings),
        Key::F11 => Some(KeyAction::ToggleFullscreen),
        _ => None,
    }
}

/// Map a digit pressed in the open settings panel to a settings change.
///
/// `1` data source, `2` refresh interval, `3` clock, `4` kiosk mode,
/// `5` auto-fullscreen, `6` rows per page, `7` page interval. Numeric
/// settings cycle through their allowed values.
#[must_use]
pub fn panel_update(key: Key, settings: &DisplaySettings) -> Option<SettingsUpdate> {
    let Key::Char(c) = key else {
        return None;
    };

    let mut update = SettingsUpdate::default();
    match c {
        '1' => update.use_mock_data = Some(!settings.use_mock_data),
        '2' => {
            let next = REFRESH_INTERVAL_CHOICES
                .iter()
                .position(|&secs| secs == settings.refresh_interval_secs)
                .map_or(0, |i| (i + 1) % REFRESH_INTERVAL_CHOICES.len());
            update.refresh_interval_secs = Some(REFRESH_INTERVAL_CHOICES[next]);
        }
        '3' => update.show_system_time = Some(!settings.show_system_time),
        '4' => update.kiosk_mode = Some(!settings.kiosk_mode),
        '5' => update.auto_fullscreen = Some(!settings.auto_fullscreen),
        '6' => {
            let (min, max) = FLIGHTS_PER_PAGE_RANGE;
            let rows = settings.flights_per_page;
            update.flights_per_page = Some(if rows >= max { min } else { rows + 1 });
        }
        '7' => {
            let (min, max) = PAGE_INTERVAL_RANGE;
            let secs = settings.page_interval_secs;
            update.page_interval_secs = Some(if secs >= max {
                min
            } else {
                secs + PAGE_INTERVAL_STEP
            });
        }
        _ => return None,
    }
    Some(update)
}
