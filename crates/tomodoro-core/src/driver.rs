//! Tick driver.
//!
//! Bridges wall-clock time to the pure reducer. A single actor task owns the
//! [`PomodoroStore`]; commands from [`TimerHandle`]s and ticks from the
//! one-second ticker arrive on channels and are applied one at a time, so
//! the state never needs a lock.
//!
//! ## Ticker lifecycle
//!
//! ```text
//! Stopped --status becomes Running--> Ticking
//! Ticking --status leaves Running---> Stopped   (guard dropped, task aborted)
//! Ticking --every second-----------> Ticking   (tick, then zero-crossing check)
//! ```
//!
//! After every applied message the driver looks at the resulting state. A
//! running timer at zero rings the chime and completes the session, which
//! moves the status to Idle, so each zero-crossing is handled exactly once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::chime::{self, Chime, TerminalBell, NOTIFICATION_TONES};
use crate::error::{CoreError, DriverError, ValidationError};
use crate::events::Event;
use crate::timer::{PomodoroState, PomodoroStore, SettingsPatch};

const COMMAND_BUFFER: usize = 32;
const TICK_BUFFER: usize = 8;
const EVENT_BUFFER: usize = 64;

enum Command {
    Request(Request),
    Shutdown(oneshot::Sender<()>),
}

enum Request {
    Start(oneshot::Sender<PomodoroState>),
    Pause(oneshot::Sender<PomodoroState>),
    Toggle(oneshot::Sender<PomodoroState>),
    Reset(oneshot::Sender<PomodoroState>),
    Complete(oneshot::Sender<PomodoroState>),
    UpdateSettings(
        SettingsPatch,
        oneshot::Sender<Result<PomodoroState, ValidationError>>,
    ),
}

/// A running one-second ticker. Dropping the guard cancels it.
#[derive(Debug)]
pub struct TickerGuard {
    generation: u64,
    task: JoinHandle<()>,
}

impl TickerGuard {
    /// Spawn a ticker that sends `generation` on `ticks` once per `period`.
    ///
    /// The first tick fires one full period after the call.
    pub fn spawn(period: Duration, generation: u64, ticks: mpsc::Sender<u64>) -> Self {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if ticks.send(generation).await.is_err() {
                    break;
                }
            }
        });
        Self { generation, task }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for TickerGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Builder for the driver task.
pub struct TimerDriver {
    store: PomodoroStore,
    chime: Arc<dyn Chime>,
    period: Duration,
}

impl TimerDriver {
    pub fn new(store: PomodoroStore) -> Self {
        Self {
            store,
            chime: Arc::new(TerminalBell),
            period: Duration::from_secs(1),
        }
    }

    pub fn with_chime(mut self, chime: Arc<dyn Chime>) -> Self {
        self.chime = chime;
        self
    }

    /// Override the tick period. One second unless testing.
    ///
    /// A zero period is ignored and the current one kept.
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        if period.is_zero() {
            tracing::warn!("ignoring zero tick period");
            return self;
        }
        self.period = period;
        self
    }

    /// Start the driver on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(self) -> TimerHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (tick_tx, tick_rx) = mpsc::channel(TICK_BUFFER);
        let (state_tx, state_rx) = watch::channel(*self.store.state());
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

        let actor = Actor {
            store: self.store,
            chime: self.chime,
            period: self.period,
            state_tx,
            event_tx: event_tx.clone(),
            tick_tx,
            ticker: None,
            generation: 0,
        };
        tokio::spawn(actor.run(command_rx, tick_rx));

        TimerHandle {
            commands: command_tx,
            state: state_rx,
            events: event_tx,
        }
    }
}

struct Actor {
    store: PomodoroStore,
    chime: Arc<dyn Chime>,
    period: Duration,
    state_tx: watch::Sender<PomodoroState>,
    event_tx: broadcast::Sender<Event>,
    tick_tx: mpsc::Sender<u64>,
    ticker: Option<TickerGuard>,
    generation: u64,
}

impl Actor {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>, mut ticks: mpsc::Receiver<u64>) {
        tracing::debug!("timer driver started");
        loop {
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(Command::Request(request)) => self.handle(request),
                    Some(Command::Shutdown(reply)) => {
                        commands.close();
                        self.stop_ticker();
                        let _ = reply.send(());
                        break;
                    }
                    None => break,
                },
                Some(generation) = ticks.recv() => self.on_tick(generation),
            }
        }
        self.stop_ticker();
        tracing::debug!("timer driver stopped");
    }

    fn handle(&mut self, request: Request) {
        match request {
            Request::Start(reply) => {
                let event = self.store.start();
                self.finish(event);
                let _ = reply.send(*self.store.state());
            }
            Request::Pause(reply) => {
                let event = self.store.pause();
                self.finish(event);
                let _ = reply.send(*self.store.state());
            }
            Request::Toggle(reply) => {
                let event = if self.store.state().is_running() {
                    self.store.pause()
                } else {
                    self.store.start()
                };
                self.finish(event);
                let _ = reply.send(*self.store.state());
            }
            Request::Reset(reply) => {
                let event = self.store.reset();
                self.finish(event);
                let _ = reply.send(*self.store.state());
            }
            Request::Complete(reply) => {
                let event = self.store.complete_session();
                self.finish(event);
                let _ = reply.send(*self.store.state());
            }
            Request::UpdateSettings(patch, reply) => {
                let result = self.store.update_settings(patch).map(|event| {
                    self.finish(event);
                    *self.store.state()
                });
                let _ = reply.send(result);
            }
        }
    }

    fn on_tick(&mut self, generation: u64) {
        // Ticks queued by a cancelled ticker are stale.
        if self.ticker.as_ref().map(TickerGuard::generation) != Some(generation) {
            return;
        }
        if self.store.tick() {
            self.finish(None);
        }
    }

    /// Publish `event`, handle a zero-crossing, and line the ticker up with the status.
    fn finish(&mut self, event: Option<Event>) {
        if let Some(event) = event {
            self.emit(event);
        }
        if self.store.state().at_zero_crossing() {
            chime::ring(self.chime.as_ref(), &NOTIFICATION_TONES);
            let completed = self.store.complete_session();
            if let Some(event) = completed {
                self.emit(event);
            }
        }
        self.sync_ticker();
        self.state_tx.send_replace(*self.store.state());
    }

    fn sync_ticker(&mut self) {
        let running = self.store.state().is_running();
        match (running, self.ticker.is_some()) {
            (true, false) => {
                self.generation += 1;
                self.ticker = Some(TickerGuard::spawn(
                    self.period,
                    self.generation,
                    self.tick_tx.clone(),
                ));
                tracing::info!(generation = self.generation, "ticker started");
            }
            (false, true) => self.stop_ticker(),
            _ => {}
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(guard) = self.ticker.take() {
            tracing::info!(generation = guard.generation(), "ticker stopped");
        }
    }

    fn emit(&self, event: Event) {
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }
}

/// Consumer-side handle to a running driver. Cheap to clone.
///
/// The driver stops once every handle is dropped or [`TimerHandle::shutdown`]
/// is called. After that, every method returns [`DriverError::NotRunning`].
#[derive(Clone)]
pub struct TimerHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<PomodoroState>,
    events: broadcast::Sender<Event>,
}

impl TimerHandle {
    /// Current state snapshot.
    pub fn state(&self) -> Result<PomodoroState, DriverError> {
        if self.commands.is_closed() {
            return Err(DriverError::NotRunning);
        }
        Ok(*self.state.borrow())
    }

    /// A receiver that is notified after every state change.
    pub fn watch(&self) -> watch::Receiver<PomodoroState> {
        self.state.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub async fn start_timer(&self) -> Result<PomodoroState, DriverError> {
        self.request(Request::Start).await
    }

    pub async fn pause_timer(&self) -> Result<PomodoroState, DriverError> {
        self.request(Request::Pause).await
    }

    /// Pause if running, start otherwise. Decided by the driver, so a phase
    /// that completes just before the request is seen in its new state.
    pub async fn toggle_timer(&self) -> Result<PomodoroState, DriverError> {
        self.request(Request::Toggle).await
    }

    pub async fn reset_timer(&self) -> Result<PomodoroState, DriverError> {
        self.request(Request::Reset).await
    }

    /// Finish the current phase now, as if it had run out.
    pub async fn complete_session(&self) -> Result<PomodoroState, DriverError> {
        self.request(Request::Complete).await
    }

    /// Merge `patch` into the settings.
    ///
    /// # Errors
    ///
    /// [`CoreError::Validation`] if the merged settings contain a zero value,
    /// [`CoreError::Driver`] if the driver has stopped.
    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<PomodoroState, CoreError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Request(Request::UpdateSettings(patch, tx)))
            .await
            .map_err(DriverError::from)?;
        let result = rx.await.map_err(DriverError::from)?;
        Ok(result?)
    }

    /// Stop the driver and its ticker. Other handles see `NotRunning` afterwards.
    pub async fn shutdown(&self) -> Result<(), DriverError> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(Command::Shutdown(tx)).await?;
        rx.await?;
        Ok(())
    }

    async fn request(
        &self,
        make: impl FnOnce(oneshot::Sender<PomodoroState>) -> Request,
    ) -> Result<PomodoroState, DriverError> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(Command::Request(make(tx))).await?;
        Ok(rx.await?)
    }
}
