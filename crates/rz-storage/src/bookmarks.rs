//! Bookmarked catalog entries.
//!
//! The set lives in memory and is written back in full after every change. A failed
//! write is logged and the in-memory set keeps the change; the next successful write
//! catches storage up. When the stored set could not be read at startup nothing is
//! written until a later read succeeds, and the stored ids are merged in first.

use crate::KvStore;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

pub const BOOKMARKS_KEY: &str = "rozo_restaurant_bookmarks";

pub struct BookmarkStore<S> {
    storage: S,
    ids: RwLock<Vec<String>>,
    synced: AtomicBool,
}

fn push_unique(ids: &mut Vec<String>, id: String) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

impl<S: KvStore> BookmarkStore<S> {
    /// Read the persisted set; unreadable or corrupt storage starts empty.
    pub fn load(storage: S) -> Self {
        let stored = Self::read_stored(&storage);
        let synced = stored.is_some();

        let mut unique: Vec<String> = Vec::new();
        for id in stored.unwrap_or_default() {
            push_unique(&mut unique, id);
        }

        Self {
            storage,
            ids: RwLock::new(unique),
            synced: AtomicBool::new(synced),
        }
    }

    fn read_stored(storage: &S) -> Option<Vec<String>> {
        match storage.get_raw(BOOKMARKS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(ids) => Some(ids),
                Err(err) => {
                    warn!("stored bookmarks are unreadable: {}", err);
                    None
                }
            },
            Ok(None) => Some(Vec::new()),
            Err(err) => {
                warn!("failed to read bookmarks: {}", err);
                None
            }
        }
    }

    pub fn has(&self, id: &str) -> bool {
        self.ids
            .read()
            .map(|ids| ids.iter().any(|existing| existing == id))
            .unwrap_or(false)
    }

    /// Bookmarked ids in the order they were added.
    pub fn ids(&self) -> Vec<String> {
        self.ids.read().map(|ids| ids.clone()).unwrap_or_default()
    }

    pub fn add(&self, id: &str) {
        self.mutate(|ids| {
            if ids.iter().any(|existing| existing == id) {
                return false;
            }
            ids.push(id.to_owned());
            true
        });
    }

    pub fn remove(&self, id: &str) {
        self.mutate(|ids| {
            let before = ids.len();
            ids.retain(|existing| existing != id);
            ids.len() != before
        });
    }

    /// Flip membership and return whether `id` is bookmarked afterwards.
    pub fn toggle(&self, id: &str) -> bool {
        let mut now_present = false;
        self.mutate(|ids| {
            if let Some(position) = ids.iter().position(|existing| existing == id) {
                ids.remove(position);
                now_present = false;
            } else {
                ids.push(id.to_owned());
                now_present = true;
            }
            true
        });
        now_present
    }

    /// Catalog entries that are bookmarked, in catalog order.
    ///
    /// Ids no longer present in the catalog are skipped.
    pub fn resolve<'a, T, F>(&self, catalog: &'a [T], id_of: F) -> Vec<&'a T>
    where
        F: Fn(&T) -> &str,
    {
        let Ok(ids) = self.ids.read() else {
            return Vec::new();
        };
        catalog
            .iter()
            .filter(|entry| ids.iter().any(|id| id == id_of(*entry)))
            .collect()
    }

    fn mutate(&self, f: impl FnOnce(&mut Vec<String>) -> bool) {
        let Ok(mut ids) = self.ids.write() else {
            warn!("bookmark set poisoned; change ignored");
            return;
        };
        if !f(&mut ids) {
            return;
        }
        if !self.synced.load(Ordering::SeqCst) {
            let Some(stored) = Self::read_stored(&self.storage) else {
                warn!("bookmark change kept in memory; stored set still unreadable");
                return;
            };
            let mut merged = Vec::with_capacity(stored.len() + ids.len());
            for id in stored.into_iter().chain(ids.drain(..)) {
                push_unique(&mut merged, id);
            }
            *ids = merged;
            self.synced.store(true, Ordering::SeqCst);
        }
        self.persist(&ids);
    }

    fn persist(&self, ids: &[String]) {
        let json = match serde_json::to_string(ids) {
            Ok(json) => json,
            Err(err) => {
                warn!("failed to encode bookmarks: {}", err);
                return;
            }
        };
        if let Err(err) = self.storage.set_raw(BOOKMARKS_KEY, &json) {
            warn!("failed to persist bookmarks: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;
    use crate::test_support::BrokenStore;
    use std::sync::Arc;

    fn stored_ids(storage: &InMemoryStore) -> Vec<String> {
        let raw = storage.get_raw(BOOKMARKS_KEY).unwrap().unwrap_or_else(|| "[]".into());
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn add_is_idempotent() {
        let storage = Arc::new(InMemoryStore::default());
        let store = BookmarkStore::load(storage.clone());

        store.add("r1");
        store.add("r1");
        store.add("r1");

        assert!(store.has("r1"));
        assert_eq!(stored_ids(&storage), ["r1"]);
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let store = BookmarkStore::load(InMemoryStore::default());

        assert!(!store.has("r1"));
        assert!(store.toggle("r1"));
        assert!(!store.toggle("r1"));
        assert!(!store.has("r1"));

        store.add("r2");
        store.toggle("r2");
        store.toggle("r2");
        assert!(store.has("r2"));
    }

    #[test]
    fn remove_is_idempotent() {
        let storage = Arc::new(InMemoryStore::default());
        let store = BookmarkStore::load(storage.clone());
        store.add("r1");
        store.add("r2");

        store.remove("r1");
        store.remove("r1");

        assert!(!store.has("r1"));
        assert_eq!(stored_ids(&storage), ["r2"]);
    }

    #[test]
    fn reload_reads_persisted_set() {
        let storage = Arc::new(InMemoryStore::default());
        BookmarkStore::load(storage.clone()).add("r9");

        let reloaded = BookmarkStore::load(storage);
        assert_eq!(reloaded.ids(), ["r9"]);
    }

    #[test]
    fn corrupt_storage_starts_empty() {
        let storage = InMemoryStore::default();
        storage.set_raw(BOOKMARKS_KEY, "{not json").unwrap();
        let store = BookmarkStore::load(storage);
        assert!(store.ids().is_empty());
    }

    #[test]
    fn unreadable_set_is_not_overwritten() -> anyhow::Result<()> {
        let storage = Arc::new(InMemoryStore::default());
        storage.set_raw(BOOKMARKS_KEY, "{not json")?;
        let store = BookmarkStore::load(storage.clone());

        store.add("r1");
        assert!(store.has("r1"));
        assert_eq!(storage.get_raw(BOOKMARKS_KEY)?.as_deref(), Some("{not json"));

        // Once the stored set reads again, it is merged in before the next write.
        storage.set_raw(BOOKMARKS_KEY, r#"["r0","r1"]"#)?;
        store.add("r2");
        assert_eq!(store.ids(), ["r0", "r1", "r2"]);
        assert_eq!(stored_ids(&storage), ["r0", "r1", "r2"]);
        Ok(())
    }

    #[test]
    fn resolve_drops_unknown_ids_and_follows_catalog_order() {
        let store = BookmarkStore::load(InMemoryStore::default());
        store.add("c");
        store.add("gone");
        store.add("a");

        let catalog = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];
        let resolved = store.resolve(&catalog, |entry| entry.as_str());
        assert_eq!(resolved, [&"a".to_owned(), &"c".to_owned()]);
    }

    #[test]
    fn storage_failure_keeps_memory_state() {
        let store = BookmarkStore::load(BrokenStore);
        store.add("r1");
        assert!(store.has("r1"));
        assert!(!store.toggle("r1"));
    }
}
