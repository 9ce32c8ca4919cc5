//! Waiting for an injected provider.
//!
//! The host page may inject its wallet object before or after we start looking, and
//! may or may not announce it with a "ready" event. Detection probes immediately,
//! then keeps probing on a short interval and on every ready signal until the
//! provider shows up, the timeout passes, or the caller cancels.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tracing::debug;

pub const DEFAULT_DETECT_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, PartialEq, Eq)]
pub enum Detection<P> {
    Ready(P),
    TimedOut,
    Cancelled,
}

/// Looks for the provider right now.
pub trait ProviderProbe: Send + Sync {
    type Provider;
    fn probe(&self) -> Option<Self::Provider>;
}

/// One-shot "provider is ready" notification raised by the host integration.
#[derive(Debug)]
pub struct ReadySignal {
    tx: watch::Sender<bool>,
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadySignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn fire(&self) {
        self.tx.send_replace(true);
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

#[derive(Debug, Clone)]
pub struct DetectCanceller(Arc<Notify>);

impl DetectCanceller {
    pub fn cancel(&self) {
        self.0.notify_one();
    }
}

pub struct ProviderDetector {
    timeout: Duration,
    poll_interval: Duration,
    ready: watch::Receiver<bool>,
    cancel: Arc<Notify>,
}

impl ProviderDetector {
    pub fn new(ready: &ReadySignal) -> Self {
        Self {
            timeout: DEFAULT_DETECT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            ready: ready.subscribe(),
            cancel: Arc::new(Notify::new()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn canceller(&self) -> DetectCanceller {
        DetectCanceller(self.cancel.clone())
    }

    pub async fn detect<P: ProviderProbe>(&mut self, probe: &P) -> Detection<P::Provider> {
        if let Some(provider) = probe.probe() {
            return Detection::Ready(provider);
        }

        let deadline = tokio::time::sleep(self.timeout);
        tokio::pin!(deadline);
        let mut ticker = tokio::time::interval(self.poll_interval);
        let mut signal_closed = false;

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    debug!("no wallet provider after {:?}", self.timeout);
                    return Detection::TimedOut;
                }
                _ = self.cancel.notified() => {
                    debug!("wallet provider detection cancelled");
                    return Detection::Cancelled;
                }
                changed = self.ready.changed(), if !signal_closed => {
                    if changed.is_err() {
                        signal_closed = true;
                        continue;
                    }
                    if *self.ready.borrow_and_update() {
                        if let Some(provider) = probe.probe() {
                            return Detection::Ready(provider);
                        }
                    }
                }
                _ = ticker.tick() => {
                    if let Some(provider) = probe.probe() {
                        return Detection::Ready(provider);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct Slot(AtomicBool);

    impl ProviderProbe for Slot {
        type Provider = &'static str;

        fn probe(&self) -> Option<&'static str> {
            self.0.load(Ordering::SeqCst).then_some("rozo")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn already_injected_is_ready_immediately() {
        let slot = Slot(AtomicBool::new(true));
        let signal = ReadySignal::new();
        let mut detector = ProviderDetector::new(&signal);

        assert_eq!(detector.detect(&slot).await, Detection::Ready("rozo"));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_nothing_appears() {
        let slot = Slot::default();
        let signal = ReadySignal::new();
        let mut detector = ProviderDetector::new(&signal);

        let started = tokio::time::Instant::now();
        assert_eq!(detector.detect(&slot).await, Detection::TimedOut);
        assert!(started.elapsed() >= DEFAULT_DETECT_TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn ready_signal_wakes_detection() {
        let slot = Arc::new(Slot::default());
        let signal = Arc::new(ReadySignal::new());
        let mut detector = ProviderDetector::new(&signal).with_poll_interval(Duration::from_secs(60));

        {
            let slot = slot.clone();
            let signal = signal.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(500)).await;
                slot.0.store(true, Ordering::SeqCst);
                signal.fire();
            });
        }

        let started = tokio::time::Instant::now();
        assert_eq!(detector.detect(slot.as_ref()).await, Detection::Ready("rozo"));
        assert!(started.elapsed() < DEFAULT_DETECT_TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_finds_silent_injection() {
        let slot = Arc::new(Slot::default());
        let signal = ReadySignal::new();
        let mut detector = ProviderDetector::new(&signal);

        {
            let slot = slot.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(1_200)).await;
                slot.0.store(true, Ordering::SeqCst);
            });
        }

        assert_eq!(detector.detect(slot.as_ref()).await, Detection::Ready("rozo"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_waiting() {
        let slot = Slot::default();
        let signal = ReadySignal::new();
        let mut detector = ProviderDetector::new(&signal);

        detector.canceller().cancel();
        assert_eq!(detector.detect(&slot).await, Detection::Cancelled);
    }
}
