//! Cancellable timer registry for the envelope choreography.
//!
//! Three one-shot kinds plus one repeating ambient ticker, all firing
//! messages back into the single-threaded event loop. No business logic
//! lives here; the controller decides what an expiry means.

use crate::controller::TimerKind;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Fired(TimerKind),
    AmbientTick,
}

pub struct TimerRegistry {
    tx: UnboundedSender<TimerEvent>,
    pending: HashMap<TimerKind, JoinHandle<()>>,
    ambient: Option<JoinHandle<()>>,
}

impl TimerRegistry {
    pub fn new() -> (Self, UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                pending: HashMap::new(),
                ambient: None,
            },
            rx,
        )
    }

    /// Arms a one-shot timer, cancelling and replacing any pending timer of
    /// the same kind. At most one live instance per kind.
    pub fn schedule(&mut self, kind: TimerKind, delay: Duration) {
        self.cancel(kind);

        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the app loop already exited.
            let _ = tx.send(TimerEvent::Fired(kind));
        });
        self.pending.insert(kind, handle);
    }

    /// No-op when nothing of that kind is pending.
    pub fn cancel(&mut self, kind: TimerKind) {
        if let Some(handle) = self.pending.remove(&kind) {
            handle.abort();
        }
    }

    /// Cancels every one-shot kind. The ambient ticker is unaffected.
    pub fn clear_all(&mut self) {
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
    }

    pub fn has_pending(&self, kind: TimerKind) -> bool {
        self.pending
            .get(&kind)
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Starts the repeating ambient ticker. Called once at init; the
    /// motion preference is checked here and never re-checked per tick.
    pub fn start_ambient(&mut self, period: Duration, reduced_motion: bool) {
        if reduced_motion || self.ambient.is_some() {
            return;
        }

        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // Swallow the immediate first tick; seeding is the caller's job.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if tx.send(TimerEvent::AmbientTick).is_err() {
                    break;
                }
            }
        });
        self.ambient = Some(handle);
    }

    pub fn ambient_running(&self) -> bool {
        self.ambient.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        self.clear_all();
        if let Some(handle) = self.ambient.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::TimerKind;
    use tokio::time::{advance, timeout};

    // Lets freshly spawned timer tasks register their sleeps before the
    // clock moves.
    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    async fn recv_soon(rx: &mut UnboundedReceiver<TimerEvent>) -> Option<TimerEvent> {
        timeout(Duration::from_millis(10), rx.recv())
            .await
            .ok()
            .flatten()
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_timer_fires() {
        let (mut registry, mut rx) = TimerRegistry::new();
        registry.schedule(TimerKind::LetterReveal, Duration::from_millis(700));
        settle().await;

        advance(Duration::from_millis(700)).await;
        assert_eq!(
            recv_soon(&mut rx).await,
            Some(TimerEvent::Fired(TimerKind::LetterReveal))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let (mut registry, mut rx) = TimerRegistry::new();
        registry.schedule(TimerKind::LetterReveal, Duration::from_millis(700));
        registry.cancel(TimerKind::LetterReveal);
        settle().await;

        advance(Duration::from_millis(1000)).await;
        assert_eq!(recv_soon(&mut rx).await, None);
        assert!(!registry.has_pending(TimerKind::LetterReveal));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_unscheduled_is_noop() {
        let (mut registry, _rx) = TimerRegistry::new();
        registry.cancel(TimerKind::ReplayReopen);
        assert!(!registry.has_pending(TimerKind::ReplayReopen));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_pending_timer() {
        let (mut registry, mut rx) = TimerRegistry::new();
        registry.schedule(TimerKind::BurstClear, Duration::from_millis(100));
        registry.schedule(TimerKind::BurstClear, Duration::from_millis(6200));
        settle().await;

        // Past the first deadline: the replaced timer must not fire.
        advance(Duration::from_millis(200)).await;
        assert_eq!(recv_soon(&mut rx).await, None);

        advance(Duration::from_millis(6000)).await;
        assert_eq!(
            recv_soon(&mut rx).await,
            Some(TimerEvent::Fired(TimerKind::BurstClear))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_all_cancels_every_kind() {
        let (mut registry, mut rx) = TimerRegistry::new();
        registry.schedule(TimerKind::BurstClear, Duration::from_millis(100));
        registry.schedule(TimerKind::LetterReveal, Duration::from_millis(100));
        registry.schedule(TimerKind::ReplayReopen, Duration::from_millis(100));
        registry.clear_all();
        settle().await;

        advance(Duration::from_millis(500)).await;
        assert_eq!(recv_soon(&mut rx).await, None);
        assert!(!registry.has_pending(TimerKind::BurstClear));
        assert!(!registry.has_pending(TimerKind::LetterReveal));
        assert!(!registry.has_pending(TimerKind::ReplayReopen));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ambient_ticker_repeats() {
        let (mut registry, mut rx) = TimerRegistry::new();
        registry.start_ambient(Duration::from_millis(480), false);
        settle().await;

        advance(Duration::from_millis(480)).await;
        assert_eq!(recv_soon(&mut rx).await, Some(TimerEvent::AmbientTick));
        settle().await;

        advance(Duration::from_millis(480)).await;
        assert_eq!(recv_soon(&mut rx).await, Some(TimerEvent::AmbientTick));
        assert!(registry.ambient_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reduced_motion_skips_ambient_ticker() {
        let (mut registry, mut rx) = TimerRegistry::new();
        registry.start_ambient(Duration::from_millis(480), true);

        assert!(!registry.ambient_running());
        advance(Duration::from_millis(2000)).await;
        assert_eq!(recv_soon(&mut rx).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_all_leaves_ambient_running() {
        let (mut registry, mut rx) = TimerRegistry::new();
        registry.start_ambient(Duration::from_millis(480), false);
        registry.schedule(TimerKind::LetterReveal, Duration::from_millis(700));
        registry.clear_all();
        settle().await;

        advance(Duration::from_millis(480)).await;
        assert_eq!(recv_soon(&mut rx).await, Some(TimerEvent::AmbientTick));
    }
}
