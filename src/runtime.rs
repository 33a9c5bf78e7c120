use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use log::{trace, warn};

use crate::quiz::Status;

/// Upper bound on how long the runner blocks while the clock is disarmed.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    /// The event source hung up; no further input will arrive.
    Closed,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait AppEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => AppEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(evt).is_err() {
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

impl AppEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl AppEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
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

    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// The one clock that feeds `Tick` into a quiz.
///
/// It is armed while the quiz is active and disarmed on every other
/// status, so a finished or restarted quiz never receives a stray tick.
#[derive(Debug)]
pub struct Countdown<T: Ticker> {
    ticker: T,
    next_tick: Option<Instant>,
}

impl<T: Ticker> Countdown<T> {
    pub fn new(ticker: T) -> Self {
        Self {
            ticker,
            next_tick: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Follows the quiz status: arm on entering active, cancel on leaving it.
    pub fn sync(&mut self, status: Status) {
        match (status, self.next_tick) {
            (Status::Active, None) => {
                trace!("countdown armed");
                self.next_tick = Some(Instant::now() + self.ticker.interval());
            }
            (Status::Ready | Status::Finished, Some(_)) => {
                trace!("countdown disarmed");
                self.next_tick = None;
            }
            _ => {}
        }
    }

    pub fn disarm(&mut self) {
        self.next_tick = None;
    }

    /// How long the runner may block before the next tick is due.
    pub fn poll_timeout(&self) -> Duration {
        match self.next_tick {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => IDLE_POLL,
        }
    }

    /// Consumes a due tick and schedules the next one.
    fn take_due(&mut self) -> bool {
        match self.next_tick {
            Some(deadline) if Instant::now() >= deadline => {
                self.next_tick = Some(deadline + self.ticker.interval());
                true
            }
            _ => false,
        }
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: AppEventSource> {
    event_source: E,
}

impl<E: AppEventSource> Runner<E> {
    pub fn new(event_source: E) -> Self {
        Self { event_source }
    }

    /// Blocks until the next terminal event or the countdown deadline.
    ///
    /// Returns `None` when nothing happened, which only occurs while the
    /// countdown is disarmed or the source woke up early. A disconnected
    /// source yields `Closed` so the caller can stop instead of spinning.
    pub fn step<T: Ticker>(&self, countdown: &mut Countdown<T>) -> Option<AppEvent> {
        if countdown.take_due() {
            return Some(AppEvent::Tick);
        }

        match self.event_source.recv_timeout(countdown.poll_timeout()) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) => countdown.take_due().then_some(AppEvent::Tick),
            Err(RecvTimeoutError::Disconnected) => {
                warn!("event source disconnected");
                Some(AppEvent::Closed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn fast() -> FixedTicker {
        FixedTicker::new(Duration::from_millis(1))
    }

    #[test]
    fn step_returns_tick_when_armed() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(TestEventSource::new(rx));
        let mut countdown = Countdown::new(fast());
        countdown.sync(Status::Active);

        match runner.step(&mut countdown) {
            Some(AppEvent::Tick) => {}
            other => panic!("expected Tick, got {other:?}"),
        }
    }

    #[test]
    fn step_never_ticks_when_disarmed() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(TestEventSource::new(rx));
        let mut countdown = Countdown::new(fast());

        assert!(runner.step(&mut countdown).is_none());
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Resize).unwrap();
        let runner = Runner::new(TestEventSource::new(rx));
        let mut countdown = Countdown::new(FixedTicker::new(Duration::from_secs(60)));
        countdown.sync(Status::Active);

        match runner.step(&mut countdown) {
            Some(AppEvent::Resize) => {}
            other => panic!("expected Resize event, got {other:?}"),
        }
    }

    #[test]
    fn step_reports_closed_source() {
        let (tx, rx) = mpsc::channel::<AppEvent>();
        drop(tx);
        let runner = Runner::new(TestEventSource::new(rx));

        let mut idle = Countdown::new(fast());
        assert!(matches!(runner.step(&mut idle), Some(AppEvent::Closed)));

        let mut armed = Countdown::new(FixedTicker::new(Duration::from_secs(60)));
        armed.sync(Status::Active);
        assert!(matches!(runner.step(&mut armed), Some(AppEvent::Closed)));
    }

    #[test]
    fn sync_arms_and_cancels() {
        let mut countdown = Countdown::new(FixedTicker::every_second());
        assert!(!countdown.is_armed());

        countdown.sync(Status::Ready);
        assert!(!countdown.is_armed());

        countdown.sync(Status::Active);
        assert!(countdown.is_armed());
        assert!(countdown.poll_timeout() <= Duration::from_secs(1));

        countdown.sync(Status::Finished);
        assert!(!countdown.is_armed());
        assert_eq!(countdown.poll_timeout(), IDLE_POLL);
    }

    #[test]
    fn sync_keeps_deadline_while_active() {
        let mut countdown = Countdown::new(FixedTicker::new(Duration::from_secs(60)));
        countdown.sync(Status::Active);
        let first = countdown.next_tick;

        countdown.sync(Status::Active);
        assert_eq!(countdown.next_tick, first);
    }

    #[test]
    fn disarm_drops_pending_tick() {
        let mut countdown = Countdown::new(fast());
        countdown.sync(Status::Active);
        std::thread::sleep(Duration::from_millis(5));
        countdown.disarm();

        assert!(!countdown.take_due());
    }
}
