//! The departures board.
//!
//! [`DisplayController`] holds the board's state and rules; [`spawn_display`]
//! runs it against a [`DisplaySurface`] with its timers and input.

pub mod controller;
pub mod input;
pub mod keyboard;
pub mod kiosk;
pub mod pagination;
pub mod render;
pub mod state;
pub mod surface;
pub mod tasks;

pub use controller::{DisplayController, Effect, FetchRequest, KeyOutcome, SettingsChange};
pub use input::{InputBus, InputEvent, InputSubscription, TerminalInput};
pub use keyboard::{Key, KeyAction};
pub use kiosk::{KioskCursor, CURSOR_IDLE_TIMEOUT};
pub use state::{ConnectionStatus, DisplaySnapshot, DisplayViewState};
pub use surface::{DisplaySurface, HeadlessSurface, SurfaceLog, TerminalSurface};
pub use tasks::{spawn_display, DisplayCommand, DisplayHandle};
