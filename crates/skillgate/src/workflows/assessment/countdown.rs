//! Per-session countdown bound to the `Active` state.
//!
//! Each tick from the injected [`Ticker`] removes exactly one second from the session,
//! regardless of how much wall time actually passed, so tests can drive the countdown with
//! a [`ManualClock`].

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::debug;

use super::session::{Session, SessionEvent, Transition};

pub type SharedSession = Arc<Mutex<Session>>;

/// Renders remaining time as `minutes:seconds`.
pub fn format_time_left(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Source of one-second ticks for a single countdown.
pub trait Ticker: Send + 'static {
    /// Resolves on the next tick, or to `false` once the source can no longer tick.
    fn tick(&mut self) -> impl Future<Output = bool> + Send;
}

/// Factory handing out a fresh [`Ticker`] per countdown.
pub trait Clock: Send + Sync + 'static {
    type Ticker: Ticker;

    fn ticker(&self) -> Self::Ticker;
}

/// Production clock backed by a tokio interval.
#[derive(Debug, Clone, Copy)]
pub struct IntervalClock {
    period: Duration,
}

impl IntervalClock {
    pub fn new(period: Duration) -> Self {
        let period = if period.is_zero() {
            Duration::from_secs(1)
        } else {
            period
        };
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Default for IntervalClock {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Clock for IntervalClock {
    type Ticker = IntervalTicker;

    fn ticker(&self) -> IntervalTicker {
        IntervalTicker {
            period: self.period,
            interval: None,
        }
    }
}

pub struct IntervalTicker {
    period: Duration,
    // Created on first poll so the ticker can be built outside a runtime.
    interval: Option<Interval>,
}

impl Ticker for IntervalTicker {
    fn tick(&mut self) -> impl Future<Output = bool> + Send {
        async move {
            let period = self.period;
            let interval = self.interval.get_or_insert_with(|| {
                let mut interval = tokio::time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                interval
            });
            interval.tick().await;
            true
        }
    }
}

/// Clock advanced programmatically; every live ticker receives each advance.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    tickers: Arc<Mutex<Vec<mpsc::UnboundedSender<()>>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends `ticks` ticks to every live ticker and returns how many received them.
    pub fn advance(&self, ticks: u32) -> usize {
        let mut tickers = self.tickers.lock().expect("manual clock mutex poisoned");
        tickers.retain(|sender| (0..ticks).all(|_| sender.send(()).is_ok()));
        tickers.len()
    }
}

impl Clock for ManualClock {
    type Ticker = ManualTicker;

    fn ticker(&self) -> ManualTicker {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.tickers
            .lock()
            .expect("manual clock mutex poisoned")
            .push(sender);
        ManualTicker { receiver }
    }
}

pub struct ManualTicker {
    receiver: mpsc::UnboundedReceiver<()>,
}

impl Ticker for ManualTicker {
    fn tick(&mut self) -> impl Future<Output = bool> + Send {
        async move { self.receiver.recv().await.is_some() }
    }
}

/// How a countdown task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownExit {
    /// Time ran out and the countdown completed the session.
    Expired,
    /// The handle was cancelled or dropped.
    Cancelled,
    /// The session left `Active` or moved to a newer attempt first.
    Superseded,
    /// The tick source stopped producing ticks.
    SourceClosed,
}

/// Cancellable handle to a running countdown.
#[derive(Debug)]
pub struct CountdownHandle {
    attempt: u32,
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<CountdownExit>,
}

impl CountdownHandle {
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Stops ticking; ticks already in flight are dropped by the session's attempt guard.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    /// Waits for the countdown task to end.
    pub async fn join(mut self) -> CountdownExit {
        let cancel = self.cancel.take();
        let exit = (&mut self.task).await.unwrap_or(CountdownExit::Cancelled);
        drop(cancel);
        exit
    }
}

/// Spawns the ticking task for the session's current attempt.
///
/// `on_expire` runs once, with the session lock held, when this countdown is the path that
/// completes the session.
pub fn spawn_countdown<T, F>(session: SharedSession, mut ticker: T, on_expire: F) -> CountdownHandle
where
    T: Ticker,
    F: FnOnce(&Session) + Send + 'static,
{
    let attempt = session
        .lock()
        .expect("session mutex poisoned")
        .attempt();
    let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let mut on_expire = Some(on_expire);
        loop {
            tokio::select! {
                biased;
                _ = &mut cancel_rx => return CountdownExit::Cancelled,
                alive = ticker.tick() => {
                    if !alive {
                        return CountdownExit::SourceClosed;
                    }

                    let mut guard = session.lock().expect("session mutex poisoned");
                    match guard.apply(SessionEvent::Tick { attempt }) {
                        Transition::Ticked { .. } => {}
                        Transition::Completed(_) => {
                            if let Some(callback) = on_expire.take() {
                                callback(&guard);
                            }
                            return CountdownExit::Expired;
                        }
                        other => {
                            debug!(attempt, ?other, "countdown superseded");
                            return CountdownExit::Superseded;
                        }
                    }
                }
            }
        }
    });

    CountdownHandle {
        attempt,
        cancel: Some(cancel_tx),
        task,
    }
}
