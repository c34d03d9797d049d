//! Process-wide input events.
//!
//! Key presses, mouse moves and fullscreen changes are published once on an
//! [`InputBus`]. The board takes an [`InputSubscription`] when it starts and
//! drops it on shutdown, so the bus's subscriber count shows whether
//! everything was released.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyModifiers, MouseEventKind};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::keyboard::Key;

/// Default number of events buffered per subscriber.
const BUS_CAPACITY: usize = 64;

/// How long the terminal reader waits for an event before checking for stop.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Something the user did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A key was pressed.
    Key(Key),
    /// The pointer moved.
    MouseMove,
    /// The surface entered or left fullscreen on its own.
    FullscreenChanged(bool),
    /// The user asked to quit (Ctrl+C in raw mode).
    Interrupt,
}

/// Broadcasts input to every active subscription.
#[derive(Debug, Clone)]
pub struct InputBus {
    tx: broadcast::Sender<InputEvent>,
}

impl Default for InputBus {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBus {
    /// Create a bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(BUS_CAPACITY)
    }

    /// Create a bus buffering `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event. Returns the number of subscriptions that will see it.
    pub fn publish(&self, event: InputEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Register a new subscription.
    #[must_use]
    pub fn subscribe(&self) -> InputSubscription {
        debug!(subscribers = self.subscriber_count() + 1, "Input subscription registered");
        InputSubscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A registration on the [`InputBus`]; dropping it deregisters.
#[derive(Debug)]
pub struct InputSubscription {
    rx: broadcast::Receiver<InputEvent>,
}

impl InputSubscription {
    /// Wait for the next event. Returns `None` once every bus handle is gone.
    ///
    /// Events missed because the subscriber fell behind are skipped.
    pub async fn recv(&mut self) -> Option<InputEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Input subscriber lagged, skipping events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Handle to the background terminal reader.
#[derive(Debug)]
pub struct TerminalInput {
    stop_signal: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl TerminalInput {
    /// Start reading terminal events and publishing them on `bus`.
    ///
    /// The reader runs on the blocking pool and polls, so [`Self::stop`] takes
    /// effect within a poll interval.
    #[must_use]
    pub fn spawn(bus: InputBus) -> Self {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&stop_signal);

        let task = tokio::task::spawn_blocking(move || {
            while !stop.load(Ordering::SeqCst) {
                match event::poll(POLL_INTERVAL) {
                    Ok(true) => match event::read() {
                        Ok(event) => {
                            if let Some(input) = translate(&event) {
                                bus.publish(input);
                            }
                        }
                        Err(err) => {
                            warn!(error = %err, "Failed to read terminal event");
                            break;
                        }
                    },
                    Ok(false) => {}
                    Err(err) => {
                        warn!(error = %err, "Failed to poll terminal events");
                        break;
                    }
                }
            }
            debug!("Terminal input reader stopped");
        });

        Self { stop_signal, task }
    }

    /// Signal the reader to stop and wait for it.
    pub async fn stop(self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        if let Err(err) = self.task.await {
            warn!(error = %err, "Terminal input reader panicked");
        }
    }
}

fn translate(event: &Event) -> Option<InputEvent> {
    match event {
        Event::Key(key)
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(InputEvent::Interrupt)
        }
        Event::Key(key) => Key::from_event(key).map(InputEvent::Key),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => Some(InputEvent::MouseMove),
            _ => None,
        },
        _ => None,
    }
}
