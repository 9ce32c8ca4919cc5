use crate::KvStore;
use tracing::warn;

/// Per-host "mini-app was added to the host client" marker.
pub struct MiniAppFlags<S> {
    storage: S,
}

impl<S: KvStore> MiniAppFlags<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    fn key_for_host(hostname: &str) -> String {
        format!("miniapp_added:{hostname}")
    }

    pub fn is_added(&self, hostname: &str) -> bool {
        match self.storage.get_raw(&Self::key_for_host(hostname)) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(err) => {
                warn!("failed to read mini-app flag for {}: {}", hostname, err);
                false
            }
        }
    }

    pub fn mark_added(&self, hostname: &str) {
        if let Err(err) = self.storage.set_raw(&Self::key_for_host(hostname), "true") {
            warn!("failed to persist mini-app flag for {}: {}", hostname, err);
        }
    }

    pub fn clear(&self, hostname: &str) {
        if let Err(err) = self.storage.remove(&Self::key_for_host(hostname)) {
            warn!("failed to clear mini-app flag for {}: {}", hostname, err);
        }
    }
}
