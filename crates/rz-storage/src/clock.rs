use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall clock in epoch milliseconds.
///
/// Injected because `SystemTime` is unavailable on `wasm32-unknown-unknown`;
/// the browser build supplies `Date.now()` instead.
pub trait Clock: Send + Sync {
    fn now_epoch_ms(&self) -> u128;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_ms(&self) -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default()
    }
}

/// Settable clock for tests.
#[derive(Debug, Default)]
pub struct FixedClock(AtomicU64);

impl FixedClock {
    pub fn at(epoch_ms: u64) -> Self {
        Self(AtomicU64::new(epoch_ms))
    }

    pub fn set(&self, epoch_ms: u64) {
        self.0.store(epoch_ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_epoch_ms(&self) -> u128 {
        u128::from(self.0.load(Ordering::SeqCst))
    }
}

impl<T: Clock + ?Sized> Clock for std::sync::Arc<T> {
    fn now_epoch_ms(&self) -> u128 {
        (**self).now_epoch_ms()
    }
}
