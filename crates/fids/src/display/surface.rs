//! Where the board is drawn.
//!
//! A [`DisplaySurface`] knows how to go fullscreen, show or hide the cursor
//! and put a rendered frame on screen. [`TerminalSurface`] drives a real
//! terminal through crossterm; [`HeadlessSurface`] only records what was asked
//! of it.

use std::io::{self, Stdout, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::Print,
    terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::debug;

use crate::error::{Error, Result};

/// Output side of the board.
pub trait DisplaySurface: Send + std::fmt::Debug {
    /// Whether the surface is currently fullscreen.
    fn is_fullscreen(&self) -> bool;

    /// Go fullscreen.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface refuses or does not support it.
    fn enter_fullscreen(&mut self) -> Result<()>;

    /// Leave fullscreen.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface refuses.
    fn exit_fullscreen(&mut self) -> Result<()>;

    /// Show or hide the pointer.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot change the cursor.
    fn set_cursor_visible(&mut self, visible: bool) -> Result<()>;

    /// Replace what is on screen with `frame`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the surface fails.
    fn draw(&mut self, frame: &str) -> Result<()>;
}

/// A terminal in raw mode. Fullscreen is the alternate screen.
///
/// The terminal is restored when the surface is dropped, including when
/// setup fails part way.
#[derive(Debug)]
pub struct TerminalSurface<W: Write = Stdout> {
    out: W,
    raw_mode: bool,
    fullscreen: bool,
}

impl TerminalSurface {
    /// Put the terminal in raw mode with mouse reporting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be configured.
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Self::attach(io::stdout(), true)
    }
}

impl<W: Write> TerminalSurface<W> {
    /// Take over `out`. `raw_mode` is whether raw mode is already on and has
    /// to be switched off again on drop.
    fn attach(out: W, raw_mode: bool) -> Result<Self> {
        let mut surface = Self {
            out,
            raw_mode,
            fullscreen: false,
        };
        // On error `surface` drops here and restores the terminal.
        execute!(surface.out, EnableMouseCapture)?;
        debug!("Terminal surface ready");
        Ok(surface)
    }

    /// Undo everything `attach` and fullscreen did. Every step runs even if
    /// an earlier one fails; the first error is returned.
    fn restore(&mut self) -> io::Result<()> {
        let mut result = Ok(());
        if self.fullscreen {
            result = result.and(execute!(self.out, LeaveAlternateScreen));
            self.fullscreen = false;
        }
        result = result.and(execute!(self.out, DisableMouseCapture, cursor::Show));
        if self.raw_mode {
            result = result.and(terminal::disable_raw_mode());
            self.raw_mode = false;
        }
        result
    }
}

impl<W: Write + Send + std::fmt::Debug> DisplaySurface for TerminalSurface<W> {
    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn enter_fullscreen(&mut self) -> Result<()> {
        execute!(self.out, EnterAlternateScreen)
            .map_err(|err| Error::surface(format!("cannot enter alternate screen: {err}")))?;
        self.fullscreen = true;
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<()> {
        execute!(self.out, LeaveAlternateScreen)
            .map_err(|err| Error::surface(format!("cannot leave alternate screen: {err}")))?;
        self.fullscreen = false;
        Ok(())
    }

    fn set_cursor_visible(&mut self, visible: bool) -> Result<()> {
        if visible {
            execute!(self.out, cursor::Show)?;
        } else {
            execute!(self.out, cursor::Hide)?;
        }
        Ok(())
    }

    fn draw(&mut self, frame: &str) -> Result<()> {
        queue!(
            self.out,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::All)
        )?;
        // Raw mode does not translate newlines.
        for line in frame.lines() {
            queue!(self.out, Print(line), Print("\r\n"))?;
        }
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for TerminalSurface<W> {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            tracing::warn!(error = %err, "Failed to restore terminal");
        }
    }
}

/// Calls recorded by a [`HeadlessSurface`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceLog {
    /// Whether the surface is fullscreen.
    pub fullscreen: bool,
    /// Number of `enter_fullscreen` calls, failed ones included.
    pub enter_attempts: usize,
    /// Number of `exit_fullscreen` calls.
    pub exit_attempts: usize,
    /// Last cursor visibility requested.
    pub cursor_visible: bool,
    /// Number of frames drawn.
    pub frames: usize,
    /// The most recent frame.
    pub last_frame: String,
}

/// A surface without a screen.
///
/// Clones share the same log, so a test can keep one and hand the other to
/// the runtime.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    log: Arc<Mutex<SurfaceLog>>,
    refuse_fullscreen: bool,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSurface {
    /// Create a windowed surface with a visible cursor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(SurfaceLog {
                cursor_visible: true,
                ..SurfaceLog::default()
            })),
            refuse_fullscreen: false,
        }
    }

    /// Start out fullscreen.
    #[must_use]
    pub fn fullscreen(self) -> Self {
        self.lock().fullscreen = true;
        self
    }

    /// Fail every fullscreen request.
    #[must_use]
    pub fn refusing_fullscreen(mut self) -> Self {
        self.refuse_fullscreen = true;
        self
    }

    /// A copy of the recorded calls.
    #[must_use]
    pub fn log(&self) -> SurfaceLog {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceLog> {
        self.log
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl DisplaySurface for HeadlessSurface {
    fn is_fullscreen(&self) -> bool {
        self.lock().fullscreen
    }

    fn enter_fullscreen(&mut self) -> Result<()> {
        let mut log = self.lock();
        log.enter_attempts += 1;
        if self.refuse_fullscreen {
            return Err(Error::surface("fullscreen not supported"));
        }
        log.fullscreen = true;
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<()> {
        let mut log = self.lock();
        log.exit_attempts += 1;
        log.fullscreen = false;
        Ok(())
    }

    fn set_cursor_visible(&mut self, visible: bool) -> Result<()> {
        self.lock().cursor_visible = visible;
        Ok(())
    }

    fn draw(&mut self, frame: &str) -> Result<()> {
        let mut log = self.lock();
        log.frames += 1;
        log.last_frame = frame.to_string();
        Ok(())
    }
}
