//! Cursor auto-hide for unattended screens.

use std::time::Duration;

use tokio::time::Instant;

/// Idle time after which the cursor is hidden in kiosk mode.
pub const CURSOR_IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Tracks cursor visibility and the pending hide deadline.
///
/// With kiosk mode on, every key press or mouse move shows the cursor and
/// pushes the deadline out by [`CURSOR_IDLE_TIMEOUT`]. Once the deadline
/// passes the cursor is hidden. Turning kiosk mode off clears the deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KioskCursor {
    enabled: bool,
    visible: bool,
    deadline: Option<Instant>,
    timeout: Duration,
}

impl KioskCursor {
    /// Create a tracker; with kiosk mode on the countdown starts at `now`.
    #[must_use]
    pub fn new(enabled: bool, now: Instant) -> Self {
        Self::with_timeout(enabled, now, CURSOR_IDLE_TIMEOUT)
    }

    /// Create a tracker with a custom idle timeout.
    #[must_use]
    pub fn with_timeout(enabled: bool, now: Instant, timeout: Duration) -> Self {
        Self {
            enabled,
            visible: true,
            deadline: enabled.then(|| now + timeout),
            timeout,
        }
    }

    /// Whether the cursor is currently shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether kiosk mode is on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// When the pending hide fires, if one is pending.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Register user activity. Returns `true` if the cursor became visible.
    pub fn activity(&mut self, now: Instant) -> bool {
        let was_hidden = !self.visible;
        self.visible = true;
        if self.enabled {
            self.deadline = Some(now + self.timeout);
        }
        was_hidden
    }

    /// Switch kiosk mode. Returns `true` if the cursor became visible.
    pub fn set_enabled(&mut self, enabled: bool, now: Instant) -> bool {
        if enabled == self.enabled {
            return false;
        }
        self.enabled = enabled;
        if enabled {
            self.deadline = Some(now + self.timeout);
            false
        } else {
            self.deadline = None;
            let was_hidden = !self.visible;
            self.visible = true;
            was_hidden
        }
    }

    /// Hide the cursor if the deadline has passed. Returns `true` if it was hidden now.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                let was_visible = self.visible;
                self.visible = false;
                was_visible
            }
            _ => false,
        }
    }
}
