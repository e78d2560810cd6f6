//! Cancellable one-shot tick scheduling

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
    time::Duration,
};
use tokio::{sync::mpsc, task::JoinHandle, time::sleep};
use tracing::{debug, warn};

/// Identifies one scheduled tick; delivered back when the delay elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickToken(u64);

impl TickToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Timer abstraction: schedule a tick after a delay, or cancel it before it fires
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration) -> TickToken;
    fn cancel(&self, token: TickToken);
}

/// Scheduler backed by tokio sleeps; fired tokens arrive on an mpsc channel
#[derive(Debug)]
pub struct TokioScheduler {
    next_id: AtomicU64,
    pending: Mutex<HashMap<TickToken, JoinHandle<()>>>,
    fired_tx: mpsc::UnboundedSender<TickToken>,
}

impl TokioScheduler {
    /// Create a scheduler and the receiver its fired tokens are delivered to
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TickToken>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            next_id: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
            fired_tx,
        };
        (scheduler, fired_rx)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration) -> TickToken {
        let token = TickToken(self.next_id.fetch_add(1, Ordering::Relaxed));
        let tx = self.fired_tx.clone();

        let handle = tokio::spawn(async move {
            sleep(delay).await;
            if tx.send(token).is_err() {
                debug!("Tick {} fired after the receiver was dropped", token.id());
            }
        });

        match self.pending.lock() {
            Ok(mut pending) => {
                pending.retain(|_, handle| !handle.is_finished());
                pending.insert(token, handle);
            }
            Err(e) => warn!("Failed to lock pending ticks: {}", e),
        }

        token
    }

    fn cancel(&self, token: TickToken) {
        match self.pending.lock() {
            Ok(mut pending) => {
                if let Some(handle) = pending.remove(&token) {
                    handle.abort();
                    debug!("Cancelled tick {}", token.id());
                }
            }
            Err(e) => warn!("Failed to lock pending ticks: {}", e),
        }
    }
}

/// Deterministic scheduler: ticks fire only when the caller pops them
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: AtomicU64,
    pending: Mutex<VecDeque<(TickToken, Duration)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the oldest pending tick, as if its delay elapsed
    pub fn fire_next(&self) -> Option<TickToken> {
        self.pending.lock().ok()?.pop_front().map(|(token, _)| token)
    }

    /// Tokens still waiting to fire, oldest first
    pub fn pending(&self) -> Vec<TickToken> {
        self.pending
            .lock()
            .map(|pending| pending.iter().map(|(token, _)| *token).collect())
            .unwrap_or_default()
    }

    /// Delay requested for a pending token
    pub fn delay_of(&self, token: TickToken) -> Option<Duration> {
        self.pending
            .lock()
            .ok()?
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, delay)| *delay)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration) -> TickToken {
        let token = TickToken(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        if let Ok(mut pending) = self.pending.lock() {
            pending.push_back((token, delay));
        }
        token
    }

    fn cancel(&self, token: TickToken) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.retain(|(t, _)| *t != token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_scheduler_fires_in_order_and_honours_cancel() {
        let scheduler = ManualScheduler::new();
        let first = scheduler.schedule(Duration::from_secs(1));
        let second = scheduler.schedule(Duration::from_secs(2));
        let third = scheduler.schedule(Duration::from_secs(3));

        assert_eq!(scheduler.delay_of(second), Some(Duration::from_secs(2)));
        scheduler.cancel(second);

        assert_eq!(scheduler.fire_next(), Some(first));
        assert_eq!(scheduler.fire_next(), Some(third));
        assert_eq!(scheduler.fire_next(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_delivers_fired_tokens() {
        let (scheduler, mut fired) = TokioScheduler::new();
        let token = scheduler.schedule(Duration::from_millis(1000));

        tokio::time::advance(Duration::from_millis(1001)).await;
        assert_eq!(fired.recv().await, Some(token));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_cancel_prevents_delivery() {
        let (scheduler, mut fired) = TokioScheduler::new();
        let cancelled = scheduler.schedule(Duration::from_millis(1000));
        scheduler.cancel(cancelled);
        let kept = scheduler.schedule(Duration::from_millis(2000));

        tokio::time::advance(Duration::from_millis(2500)).await;
        assert_eq!(fired.recv().await, Some(kept));
        assert!(fired.try_recv().is_err());
    }
}
