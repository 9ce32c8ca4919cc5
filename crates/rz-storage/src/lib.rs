use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub mod bookmarks;
pub mod clock;
pub mod flags;
pub mod receipts;

pub use bookmarks::{BOOKMARKS_KEY, BookmarkStore};
pub use clock::{Clock, FixedClock, SystemClock};
pub use flags::MiniAppFlags;
pub use receipts::{DEFAULT_RETENTION_DAYS, RECEIPTS_KEY, ReceiptStore};

/// String key/value persistence, the shape of browser `localStorage`.
///
/// Stores above this trait write whole JSON documents under one key and never
/// rely on atomicity across keys.
pub trait KvStore: Send + Sync {
    fn get_raw(&self, key: &str) -> Result<Option<String>>;
    fn set_raw(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_raw(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl KvStore for InMemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let guard = self.values.read().map_err(|_| anyhow!("in-memory store poisoned"))?;
        Ok(guard.get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self.values.write().map_err(|_| anyhow!("in-memory store poisoned"))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut guard = self.values.write().map_err(|_| anyhow!("in-memory store poisoned"))?;
        guard.remove(key);
        Ok(())
    }
}

#[cfg(feature = "rocksdb")]
pub use rocks::RocksDbStore;

#[cfg(feature = "rocksdb")]
mod rocks {
    use super::KvStore;
    use anyhow::Result;
    use rocksdb::{DB, Options};
    use std::sync::Arc;

    /// Durable backend for native embedders (desktop shell, integration tests).
    pub struct RocksDbStore {
        db: Arc<DB>,
    }

    impl RocksDbStore {
        pub fn open_default(path: &str) -> Result<Self> {
            let mut options = Options::default();
            options.create_if_missing(true);
            let db = DB::open(&options, path)?;
            Ok(Self { db: Arc::new(db) })
        }

        fn key_for(key: &str) -> String {
            format!("kv:{key}")
        }
    }

    impl KvStore for RocksDbStore {
        fn get_raw(&self, key: &str) -> Result<Option<String>> {
            let value = self.db.get(Self::key_for(key).as_bytes())?;
            match value {
                Some(raw) => Ok(Some(String::from_utf8(raw)?)),
                None => Ok(None),
            }
        }

        fn set_raw(&self, key: &str, value: &str) -> Result<()> {
            self.db.put(Self::key_for(key).as_bytes(), value.as_bytes())?;
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.db.delete(Self::key_for(key).as_bytes())?;
            Ok(())
        }
    }
}
