use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::select;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum TimerState {
    Idle,
    Armed(u64),
    Fired,
    Cancelled,
}

#[derive(Debug)]
struct Inner {
    state: TimerState,
    generation: u64,
    // wakes the sleeper of the current arm when it is cancelled or replaced
    disarm: Option<CancellationToken>,
}

impl Inner {
    fn disarm(&mut self) {
        if let Some(disarm) = self.disarm.take() {
            disarm.cancel();
        }
    }
}

/// Cancellable deadline that aborts a connection when it expires.
///
/// The watchdog only holds the connection's abort handle. Whichever of
/// [`cancel`](Watchdog::cancel) and the expiry takes the lock first wins: a cancelled
/// timer never aborts, a fired timer has already aborted. Starting the timer again
/// invalidates the sleeper of the previous start. A cancelled or replaced sleeper exits
/// right away instead of waiting out its duration.
#[derive(Debug, Clone)]
pub struct Watchdog {
    abort: CancellationToken,
    inner: Arc<Mutex<Inner>>,
}

impl Watchdog {
    pub fn new(abort: CancellationToken) -> Self {
        Self { abort, inner: Arc::new(Mutex::new(Inner { state: TimerState::Idle, generation: 0, disarm: None })) }
    }

    /// Arms the timer; must be called within a tokio runtime.
    pub fn start(&self, duration: Duration) {
        let disarm = CancellationToken::new();
        let generation = {
            let mut inner = self.lock();
            inner.disarm();
            inner.generation += 1;
            inner.state = TimerState::Armed(inner.generation);
            inner.disarm = Some(disarm.clone());
            inner.generation
        };
        trace!(generation, ?duration, "start watchdog");

        let inner = Arc::clone(&self.inner);
        let abort = self.abort.clone();
        tokio::spawn(async move {
            select! {
                biased;
                () = disarm.cancelled() => {
                    trace!(generation, "watchdog disarmed");
                    return;
                }
                () = sleep(duration) => {}
            }

            let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
            if inner.state != TimerState::Armed(generation) {
                trace!(generation, "stale watchdog");
                return;
            }
            inner.state = TimerState::Fired;
            inner.disarm = None;
            drop(inner);

            warn!(?duration, "watchdog expired, abort connection");
            abort.cancel();
        });
    }

    /// Disarms the timer. Has no effect once it fired.
    pub fn cancel(&self) {
        let mut inner = self.lock();
        if let TimerState::Armed(generation) = inner.state {
            trace!(generation, "cancel watchdog");
            inner.state = TimerState::Cancelled;
            inner.disarm();
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.lock().state, TimerState::Armed(_))
    }

    pub fn is_fired(&self) -> bool {
        self.lock().state == TimerState::Fired
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
