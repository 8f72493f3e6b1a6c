use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum SessionEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Why an event source stopped producing events
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecvError {
    Timeout,
    Closed,
}

impl From<RecvTimeoutError> for RecvError {
    fn from(err: RecvTimeoutError) -> Self {
        match err {
            RecvTimeoutError::Timeout => RecvError::Timeout,
            RecvTimeoutError::Disconnected => RecvError::Closed,
        }
    }
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvError>;

    /// Block until the next event arrives.
    fn recv(&self) -> Result<SessionEvent, RecvError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<SessionEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                // Windows reports releases too; only presses type
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                    tx.send(SessionEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => tx.send(SessionEvent::Resize),
                Ok(_) => Ok(()),
                Err(err) => {
                    tracing::error!(%err, "terminal event reader stopped");
                    break;
                }
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvError> {
        Ok(self.rx.recv_timeout(timeout)?)
    }

    fn recv(&self) -> Result<SessionEvent, RecvError> {
        self.rx.recv().map_err(|_| RecvError::Closed)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<SessionEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<SessionEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvError> {
        Ok(self.rx.recv_timeout(timeout)?)
    }

    fn recv(&self) -> Result<SessionEvent, RecvError> {
        self.rx.recv().map_err(|_| RecvError::Closed)
    }
}

/// Advances the application one event at a time.
///
/// The runner owns the periodic tick schedule. While armed, `step` yields
/// `Tick` each time the next deadline passes, even when key events are
/// queued behind it; once cancelled it only yields real events.
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Option<Instant>,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
            next_tick: None,
        }
    }

    /// Start the tick schedule. Re-arming an armed schedule keeps its deadline.
    pub fn arm_ticks(&mut self) {
        if self.next_tick.is_none() {
            tracing::debug!(interval_ms = self.ticker.interval().as_millis() as u64, "ticks armed");
            self.next_tick = Some(Instant::now() + self.ticker.interval());
        }
    }

    pub fn cancel_ticks(&mut self) {
        if self.next_tick.take().is_some() {
            tracing::debug!("ticks cancelled");
        }
    }

    pub fn ticks_armed(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Next event, or `None` once the event source has gone away.
    pub fn step(&mut self) -> Option<SessionEvent> {
        let next = match self.next_tick {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    self.schedule_after(deadline, now);
                    return Some(SessionEvent::Tick);
                }
                self.event_source.recv_timeout(deadline - now)
            }
            None => self.event_source.recv(),
        };

        match next {
            Ok(ev) => Some(ev),
            Err(RecvError::Timeout) => {
                if let Some(deadline) = self.next_tick {
                    self.schedule_after(deadline, Instant::now());
                }
                Some(SessionEvent::Tick)
            }
            Err(RecvError::Closed) => None,
        }
    }

    // missed deadlines collapse into one tick instead of a burst
    fn schedule_after(&mut self, deadline: Instant, now: Instant) {
        let interval = self.ticker.interval();
        let next = deadline + interval;
        self.next_tick = Some(if next <= now { now + interval } else { next });
    }
}
