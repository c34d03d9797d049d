//! The board's runtime.
//!
//! [`spawn_display`] starts one task that owns every timer (data refresh,
//! page rotation, clock, cursor hide), the input subscription and the set of
//! in-flight fetches. Other tasks talk to it through a [`DisplayHandle`].
//! Shutting the handle down stops the loop, aborts outstanding fetches and
//! drops the subscription in one step.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::controller::{DisplayController, Effect, SettingsChange};
use super::input::{InputEvent, InputSubscription};
use super::kiosk::KioskCursor;
use super::render;
use super::state::DisplaySnapshot;
use super::surface::DisplaySurface;
use crate::config::{DisplaySettings, SettingsUpdate};
use crate::error::{Error, Result};
use crate::flight::{Category, FlightRecord};
use crate::source::SourceError;

/// Queue depth for commands sent to the runtime.
const COMMAND_BUFFER: usize = 32;

/// Period of the header clock.
const CLOCK_PERIOD: Duration = Duration::from_secs(1);

type FetchResult = std::result::Result<Vec<FlightRecord>, SourceError>;

/// Requests the runtime accepts.
#[derive(Debug)]
pub enum DisplayCommand {
    /// Fetch now.
    Refresh,
    /// Switch category.
    SetCategory(Category),
    /// Apply a partial settings change and report the outcome.
    UpdateSettings(SettingsUpdate, oneshot::Sender<Result<SettingsChange>>),
    /// Replace the settings wholesale.
    ReplaceSettings(DisplaySettings),
    /// Stop the runtime.
    Shutdown,
}

/// Control side of a running board.
#[derive(Debug)]
pub struct DisplayHandle {
    commands: mpsc::Sender<DisplayCommand>,
    snapshots: watch::Receiver<DisplaySnapshot>,
    task: JoinHandle<()>,
}

impl DisplayHandle {
    /// Send a raw command.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime has stopped.
    pub async fn send(&self, command: DisplayCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::internal("display runtime has stopped"))
    }

    /// Ask for an immediate refresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime has stopped.
    pub async fn refresh(&self) -> Result<()> {
        self.send(DisplayCommand::Refresh).await
    }

    /// Switch the board category.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime has stopped.
    pub async fn set_category(&self, category: Category) -> Result<()> {
        self.send(DisplayCommand::SetCategory(category)).await
    }

    /// Apply a partial settings change.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is rejected or the runtime has stopped.
    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<SettingsChange> {
        let (reply, response) = oneshot::channel();
        self.send(DisplayCommand::UpdateSettings(update, reply))
            .await?;
        response
            .await
            .map_err(|_| Error::internal("display runtime dropped the reply"))?
    }

    /// Replace the settings wholesale.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the runtime has stopped.
    pub async fn replace_settings(&self, settings: DisplaySettings) -> Result<()> {
        settings.validate()?;
        self.send(DisplayCommand::ReplaceSettings(settings)).await
    }

    /// The most recent state of the board.
    #[must_use]
    pub fn snapshot(&self) -> DisplaySnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that is notified on every change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<DisplaySnapshot> {
        self.snapshots.clone()
    }

    /// Whether the runtime has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the runtime and wait for it to release everything it holds.
    pub async fn shutdown(self) {
        let Self { commands, task, .. } = self;
        // A full queue or a stopped runtime both end up closing the channel.
        let _ = commands.try_send(DisplayCommand::Shutdown);
        drop(commands);
        if let Err(err) = task.await {
            warn!(error = %err, "Display runtime ended abnormally");
        }
    }
}

/// Start the board.
///
/// The first fetch starts immediately and auto-fullscreen, if enabled, is
/// attempted once. The runtime stops on [`DisplayHandle::shutdown`] or when
/// every command sender is gone.
#[must_use]
pub fn spawn_display(
    controller: DisplayController,
    surface: impl DisplaySurface + 'static,
    input: InputSubscription,
) -> DisplayHandle {
    let (commands, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (snapshot_tx, snapshots) = watch::channel(controller.snapshot());

    let kiosk = KioskCursor::new(controller.settings().kiosk_mode, Instant::now());
    let board = Board {
        controller,
        surface: Box::new(surface),
        kiosk,
        snapshots: snapshot_tx,
    };

    let task = tokio::spawn(run(board, command_rx, input));

    DisplayHandle {
        commands,
        snapshots,
        task,
    }
}

/// State owned by the runtime task.
#[derive(Debug)]
struct Board {
    controller: DisplayController,
    surface: Box<dyn DisplaySurface>,
    kiosk: KioskCursor,
    snapshots: watch::Sender<DisplaySnapshot>,
}

/// The two timers whose period comes from the settings.
struct Timers {
    refresh: Interval,
    rotate: Interval,
}

impl Timers {
    fn new(settings: &DisplaySettings) -> Self {
        Self {
            refresh: periodic(settings.refresh_interval()),
            rotate: periodic(settings.page_interval()),
        }
    }
}

/// An interval whose first tick is one period from now.
fn periodic(period: Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn run(
    mut board: Board,
    mut commands: mpsc::Receiver<DisplayCommand>,
    mut input: InputSubscription,
) {
    let mut timers = Timers::new(board.controller.settings());
    let mut clock = time::interval(CLOCK_PERIOD);
    clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut fetches: JoinSet<FetchResult> = JoinSet::new();
    let mut input_open = true;

    info!(
        category = %board.controller.view().category,
        source = board.controller.fetch_request().source_name(),
        "Display started"
    );

    board.mount();
    start_fetch(&board, &mut fetches);
    board.publish();

    loop {
        let hide_at = board.kiosk.deadline();

        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                if matches!(command, DisplayCommand::Shutdown) {
                    break;
                }
                for effect in board.handle_command(command) {
                    apply_effect(&mut board, effect, &mut timers, &mut fetches);
                }
                board.publish();
            }
            _ = timers.refresh.tick() => {
                debug!("Refresh timer fired");
                start_fetch(&board, &mut fetches);
            }
            _ = timers.rotate.tick() => {
                if board.controller.rotate_page() {
                    board.publish();
                }
            }
            _ = clock.tick(), if board.controller.settings().show_system_time => {
                board.controller.tick_clock(Utc::now());
                board.publish();
            }
            () = time::sleep_until(hide_at.unwrap_or_else(Instant::now)), if hide_at.is_some() => {
                if board.kiosk.expire(Instant::now()) {
                    board.sync_cursor();
                    board.publish();
                }
            }
            event = input.recv(), if input_open => {
                match event {
                    Some(event) => {
                        if let Some(effect) = board.handle_input(event) {
                            apply_effect(&mut board, effect, &mut timers, &mut fetches);
                        }
                        board.publish();
                    }
                    None => {
                        debug!("Input bus closed");
                        input_open = false;
                    }
                }
            }
            Some(joined) = fetches.join_next() => {
                board.finish_fetch(joined);
                board.publish();
            }
        }
    }

    fetches.abort_all();
    drop(input);
    info!("Display stopped");
}

fn start_fetch(board: &Board, fetches: &mut JoinSet<FetchResult>) {
    let request = board.controller.fetch_request();
    debug!(
        source = request.source_name(),
        in_flight = fetches.len(),
        "Starting fetch"
    );
    fetches.spawn(request.run());
}

fn apply_effect(
    board: &mut Board,
    effect: Effect,
    timers: &mut Timers,
    fetches: &mut JoinSet<FetchResult>,
) {
    match effect {
        Effect::Refresh => start_fetch(board, fetches),
        Effect::ToggleFullscreen => board.toggle_fullscreen(),
        Effect::SettingsChanged(change) => {
            let settings = board.controller.settings().clone();
            if change.refresh_interval {
                timers.refresh = periodic(settings.refresh_interval());
            }
            if change.page_interval {
                timers.rotate = periodic(settings.page_interval());
            }
            if change.kiosk_mode {
                board.kiosk.set_enabled(settings.kiosk_mode, Instant::now());
                board.sync_cursor();
            }
            if change.show_system_time {
                board.controller.tick_clock(Utc::now());
            }
            if change.source {
                start_fetch(board, fetches);
            }
        }
    }
}

impl Board {
    /// One-time work when the board appears.
    fn mount(&mut self) {
        let fullscreen = self.surface.is_fullscreen();
        if self.controller.settings().auto_fullscreen && !fullscreen {
            debug!("Entering fullscreen on start");
            if let Err(err) = self.surface.enter_fullscreen() {
                warn!(error = %err, "Auto-fullscreen failed");
            }
        }
        self.controller.set_fullscreen(self.surface.is_fullscreen());
        self.sync_cursor();
    }

    fn handle_command(&mut self, command: DisplayCommand) -> Vec<Effect> {
        match command {
            DisplayCommand::Refresh => vec![Effect::Refresh],
            DisplayCommand::SetCategory(category) => vec![self.controller.set_category(category)],
            DisplayCommand::UpdateSettings(update, reply) => {
                let result = self.controller.apply_settings(&update);
                let effects = match &result {
                    Ok(change) => vec![Effect::SettingsChanged(*change)],
                    Err(err) => {
                        warn!(error = %err, "Rejected settings update");
                        Vec::new()
                    }
                };
                let _ = reply.send(result);
                effects
            }
            DisplayCommand::ReplaceSettings(settings) => {
                vec![Effect::SettingsChanged(
                    self.controller.replace_settings(settings),
                )]
            }
            DisplayCommand::Shutdown => Vec::new(),
        }
    }

    fn handle_input(&mut self, event: InputEvent) -> Option<Effect> {
        match event {
            InputEvent::Key(key) => {
                self.activity();
                let outcome = self.controller.handle_key(key);
                outcome.effect
            }
            InputEvent::MouseMove => {
                self.activity();
                None
            }
            InputEvent::FullscreenChanged(fullscreen) => {
                self.controller.set_fullscreen(fullscreen);
                None
            }
            InputEvent::Interrupt => None,
        }
    }

    fn activity(&mut self) {
        if self.kiosk.activity(Instant::now()) {
            self.sync_cursor();
        }
    }

    fn finish_fetch(&mut self, joined: std::result::Result<FetchResult, JoinError>) {
        let result = joined.unwrap_or_else(|err| Err(SourceError::transport(err.to_string())));
        self.controller.apply_fetch(result, Utc::now());
    }

    fn toggle_fullscreen(&mut self) {
        let result = if self.surface.is_fullscreen() {
            self.surface.exit_fullscreen()
        } else {
            self.surface.enter_fullscreen()
        };
        if let Err(err) = result {
            warn!(error = %err, "Fullscreen toggle failed");
        }
        self.controller.set_fullscreen(self.surface.is_fullscreen());
    }

    fn sync_cursor(&mut self) {
        let visible = self.kiosk.is_visible();
        self.controller.set_cursor_visible(visible);
        if let Err(err) = self.surface.set_cursor_visible(visible) {
            warn!(error = %err, "Failed to change cursor visibility");
        }
    }

    fn publish(&mut self) {
        let snapshot = self.controller.snapshot();
        let frame = render::board(&snapshot, self.controller.board());
        if let Err(err) = self.surface.draw(&frame) {
            warn!(error = %err, "Failed to draw board");
        }
        self.snapshots.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::BoardConfig;
    use crate::display::input::InputBus;
    use crate::display::keyboard::Key;
    use crate::display::state::ConnectionStatus;
    use crate::display::surface::HeadlessSurface;
    use crate::source::testing::{flights, ScriptedSource};
    use crate::source::{FlightSource, MockSource, SourceSet};

    struct Harness {
        handle: DisplayHandle,
        bus: InputBus,
        surface: HeadlessSurface,
        source: Arc<ScriptedSource>,
    }

    fn start(source: ScriptedSource, settings: DisplaySettings) -> Harness {
        start_on(source, settings, HeadlessSurface::new())
    }

    fn start_on(
        source: ScriptedSource,
        settings: DisplaySettings,
        surface: HeadlessSurface,
    ) -> Harness {
        crate::logging::init_test_logging();
        let source = Arc::new(source);
        let live: Arc<dyn FlightSource> = Arc::clone(&source) as Arc<dyn FlightSource>;
        let mock: Arc<dyn FlightSource> = Arc::new(MockSource::new(15, "Chennai (MAA)"));
        let controller = DisplayController::new(
            DisplaySettings {
                use_mock_data: false,
                ..settings
            },
            SourceSet::new(mock, live),
            BoardConfig::default(),
        );
        let bus = InputBus::new();
        let handle = spawn_display(controller, surface.clone(), bus.subscribe());
        Harness {
            handle,
            bus,
            surface,
            source,
        }
    }

    async fn advance(secs: u64) {
        time::sleep(Duration::from_secs(secs)).await;
    }

    async fn settle() {
        time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rotation_end_to_end() {
        let settings = DisplaySettings {
            flights_per_page: 8,
            page_interval_secs: 15,
            ..DisplaySettings::default()
        };
        let h = start(ScriptedSource::returning(flights(20)), settings);

        settle().await;
        let snapshot = h.handle.snapshot();
        assert_eq!(snapshot.total_pages, 3);
        assert_eq!(snapshot.view.current_page, 0);

        advance(16).await;
        assert_eq!(h.handle.snapshot().view.current_page, 1);

        advance(15).await;
        let snapshot = h.handle.snapshot();
        assert_eq!(snapshot.view.current_page, 2);
        assert_eq!(snapshot.page.len(), 4);

        advance(15).await;
        assert_eq!(h.handle.snapshot().view.current_page, 0);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_page_never_rotates() {
        let h = start(ScriptedSource::returning(flights(6)), DisplaySettings::default());

        advance(120).await;
        assert_eq!(h.handle.snapshot().view.current_page, 0);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_flights() {
        let source = ScriptedSource::returning(flights(5))
            .then(Duration::ZERO, Ok(flights(5)))
            .then(Duration::ZERO, Err(SourceError::transport("network down")));
        let h = start(source, DisplaySettings::default());

        settle().await;
        assert_eq!(h.handle.snapshot().view.flights.len(), 5);

        h.handle.refresh().await.unwrap();
        settle().await;

        let snapshot = h.handle.snapshot();
        assert_eq!(snapshot.view.flights.len(), 5);
        assert_eq!(snapshot.view.connection, ConnectionStatus::Disconnected);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_timer_polls_source() {
        let settings = DisplaySettings {
            refresh_interval_secs: 30,
            ..DisplaySettings::default()
        };
        let h = start(ScriptedSource::returning(flights(2)), settings);

        advance(95).await;
        // Initial fetch plus ticks at 30, 60 and 90 seconds.
        assert_eq!(h.source.calls().len(), 4);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_completed_fetch_wins() {
        let source = ScriptedSource::returning(Vec::new())
            .then(Duration::from_secs(10), Ok(flights(3)))
            .then(Duration::from_secs(1), Ok(flights(7)));
        let h = start(source, DisplaySettings::default());

        settle().await;
        h.handle.refresh().await.unwrap();

        advance(2).await;
        assert_eq!(h.handle.snapshot().view.flights.len(), 7);

        advance(10).await;
        assert_eq!(h.handle.snapshot().view.flights.len(), 3);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_category_keys_reset_page_and_refetch() {
        let settings = DisplaySettings {
            page_interval_secs: 5,
            ..DisplaySettings::default()
        };
        let h = start(ScriptedSource::returning(flights(20)), settings);

        advance(6).await;
        assert_eq!(h.handle.snapshot().view.current_page, 1);

        h.bus.publish(InputEvent::Key(Key::Char('i')));
        settle().await;

        let snapshot = h.handle.snapshot();
        assert_eq!(snapshot.view.current_page, 0);
        assert_eq!(snapshot.view.category, Category::International);
        assert_eq!(
            h.source.calls(),
            [Some(Category::Domestic), Some(Category::International)]
        );

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_kiosk_hides_cursor_and_activity_restores_it() {
        let h = start(ScriptedSource::returning(flights(1)), DisplaySettings::default());

        advance(4).await;
        assert!(h.surface.log().cursor_visible);

        advance(2).await;
        assert!(!h.surface.log().cursor_visible);
        assert!(!h.handle.snapshot().view.cursor_visible);

        h.bus.publish(InputEvent::MouseMove);
        settle().await;
        assert!(h.surface.log().cursor_visible);

        advance(6).await;
        assert!(!h.surface.log().cursor_visible);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabling_kiosk_cancels_pending_hide() {
        let h = start(ScriptedSource::returning(flights(1)), DisplaySettings::default());

        advance(3).await;
        let update = SettingsUpdate {
            kiosk_mode: Some(false),
            ..SettingsUpdate::default()
        };
        let change = h.handle.update_settings(update).await.unwrap();
        assert!(change.kiosk_mode);

        advance(30).await;
        assert!(h.surface.log().cursor_visible);
        assert!(h.handle.snapshot().view.cursor_visible);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_fullscreen_attempted_once() {
        let settings = DisplaySettings {
            auto_fullscreen: true,
            ..DisplaySettings::default()
        };
        let h = start(ScriptedSource::returning(flights(10)), settings);

        advance(40).await;
        h.handle.refresh().await.unwrap();
        h.handle
            .update_settings(SettingsUpdate {
                flights_per_page: Some(5),
                ..SettingsUpdate::default()
            })
            .await
            .unwrap();
        advance(20).await;

        let log = h.surface.log();
        assert_eq!(log.enter_attempts, 1);
        assert!(log.frames > 1);
        assert!(h.handle.snapshot().view.is_fullscreen);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_fullscreen_skipped_when_already_fullscreen() {
        let settings = DisplaySettings {
            auto_fullscreen: true,
            ..DisplaySettings::default()
        };
        let h = start_on(
            ScriptedSource::returning(flights(1)),
            settings,
            HeadlessSurface::new().fullscreen(),
        );

        settle().await;
        assert_eq!(h.surface.log().enter_attempts, 0);
        assert!(h.handle.snapshot().view.is_fullscreen);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_fullscreen_failure_is_ignored() {
        let settings = DisplaySettings {
            auto_fullscreen: true,
            ..DisplaySettings::default()
        };
        let h = start_on(
            ScriptedSource::returning(flights(3)),
            settings,
            HeadlessSurface::new().refusing_fullscreen(),
        );

        settle().await;
        let snapshot = h.handle.snapshot();
        assert_eq!(h.surface.log().enter_attempts, 1);
        assert!(!snapshot.view.is_fullscreen);
        assert_eq!(snapshot.view.connection, ConnectionStatus::Connected);
        assert_eq!(snapshot.view.flights.len(), 3);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_f11_toggles_fullscreen() {
        let h = start(ScriptedSource::returning(flights(1)), DisplaySettings::default());

        h.bus.publish(InputEvent::Key(Key::F11));
        settle().await;
        assert!(h.handle.snapshot().view.is_fullscreen);

        h.bus.publish(InputEvent::Key(Key::F11));
        settle().await;
        assert!(!h.handle.snapshot().view.is_fullscreen);
        assert_eq!(h.surface.log().exit_attempts, 1);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fullscreen_change_from_outside_updates_view() {
        let h = start(ScriptedSource::returning(flights(1)), DisplaySettings::default());
        settle().await;
        assert!(!h.handle.snapshot().view.is_fullscreen);

        h.bus.publish(InputEvent::FullscreenChanged(true));
        settle().await;
        assert!(h.handle.snapshot().view.is_fullscreen);

        h.bus.publish(InputEvent::FullscreenChanged(false));
        settle().await;
        assert!(!h.handle.snapshot().view.is_fullscreen);
        // The surface was never asked to change.
        assert_eq!(h.surface.log().enter_attempts, 0);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_runs_only_while_shown() {
        let settings = DisplaySettings {
            show_system_time: false,
            ..DisplaySettings::default()
        };
        let h = start(ScriptedSource::returning(flights(1)), settings);
        settle().await;
        let frozen = h.handle.snapshot().view.now;

        advance(5).await;
        assert_eq!(h.handle.snapshot().view.now, frozen);

        let change = h
            .handle
            .update_settings(SettingsUpdate {
                show_system_time: Some(true),
                ..SettingsUpdate::default()
            })
            .await
            .unwrap();
        assert!(change.show_system_time);
        settle().await;
        let shown = h.handle.snapshot().view.now;
        assert!(shown > frozen);

        advance(2).await;
        assert!(h.handle.snapshot().view.now > shown);

        h.handle
            .update_settings(SettingsUpdate {
                show_system_time: Some(false),
                ..SettingsUpdate::default()
            })
            .await
            .unwrap();
        settle().await;
        let hidden = h.handle.snapshot().view.now;

        advance(5).await;
        assert_eq!(h.handle.snapshot().view.now, hidden);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_interval_change_rebuilds_timer() {
        let h = start(ScriptedSource::returning(flights(20)), DisplaySettings::default());

        settle().await;
        h.handle
            .update_settings(SettingsUpdate {
                page_interval_secs: Some(5),
                ..SettingsUpdate::default()
            })
            .await
            .unwrap();

        advance(6).await;
        assert_eq!(h.handle.snapshot().view.current_page, 1);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_source_refreshes() {
        let h = start(ScriptedSource::returning(flights(2)), DisplaySettings::default());

        settle().await;
        h.handle
            .update_settings(SettingsUpdate {
                use_mock_data: Some(true),
                ..SettingsUpdate::default()
            })
            .await
            .unwrap();
        settle().await;

        let snapshot = h.handle.snapshot();
        assert!(snapshot.settings.use_mock_data);
        assert_eq!(snapshot.view.flights.len(), 15);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_update_reports_error() {
        let h = start(ScriptedSource::returning(flights(2)), DisplaySettings::default());

        let result = h
            .handle
            .update_settings(SettingsUpdate {
                refresh_interval_secs: Some(45),
                ..SettingsUpdate::default()
            })
            .await;
        assert!(result.is_err());
        assert_eq!(h.handle.snapshot().settings.refresh_interval_secs, 60);

        h.handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_releases_subscription_and_fetches() {
        let source = ScriptedSource::returning(Vec::new())
            .then(Duration::from_secs(600), Ok(flights(3)));
        let h = start(source, DisplaySettings::default());

        settle().await;
        assert_eq!(h.bus.subscriber_count(), 1);

        h.handle.shutdown().await;
        assert_eq!(h.bus.subscriber_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_runtime() {
        let h = start(ScriptedSource::returning(flights(1)), DisplaySettings::default());
        let bus = h.bus.clone();
        settle().await;

        drop(h);
        settle().await;
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settings_panel_via_keys() {
        let h = start(ScriptedSource::returning(flights(1)), DisplaySettings::default());

        h.bus.publish(InputEvent::Key(Key::Char('s')));
        h.bus.publish(InputEvent::Key(Key::Char('6')));
        h.bus.publish(InputEvent::Key(Key::Escape));
        settle().await;

        let snapshot = h.handle.snapshot();
        assert!(!snapshot.view.settings_open);
        assert_eq!(snapshot.settings.flights_per_page, 9);
        assert!(h.surface.log().last_frame.contains("CHENNAI AIRPORT"));

        h.handle.shutdown().await;
    }
}
