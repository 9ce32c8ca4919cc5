//! Catalog documents and their loader.
//!
//! A catalog is served as static JSON, either a bare array of entries or an object
//! wrapping the array (`{"locations": [...]}` for restaurants, `{"services": [...]}`
//! for AI services). Parsing goes through serde so a bad document becomes a
//! [`CatalogError::Shape`] with a readable message instead of a half-valid list.

use async_trait::async_trait;
use rz_api_types::{AiService, Coordinates, Restaurant};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{debug, warn};

const WRAPPER_KEYS: [&str; 2] = ["locations", "services"];

/// Read-only view every catalog entry offers to search and ranking.
pub trait CatalogEntry {
    fn id(&self) -> &str;

    /// Text fields matched by the search box, in no particular order.
    fn search_fields(&self) -> Vec<&str>;

    fn coordinates(&self) -> Option<Coordinates> {
        None
    }
}

impl<E: CatalogEntry + ?Sized> CatalogEntry for &E {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn search_fields(&self) -> Vec<&str> {
        (**self).search_fields()
    }

    fn coordinates(&self) -> Option<Coordinates> {
        (**self).coordinates()
    }
}

impl CatalogEntry for Restaurant {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.address.as_str()];
        fields.extend(self.description.as_deref());
        fields.extend(self.domain.as_deref());
        fields
    }

    fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat?, self.lon?))
    }
}

impl CatalogEntry for AiService {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.name.as_str(),
            self.category.as_str(),
            self.description.as_str(),
        ];
        fields.extend(self.domain.as_deref());
        fields
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("failed to load catalog: {0}")]
    Fetch(String),
    #[error("unexpected catalog format: {0}")]
    Shape(String),
}

/// Validate a catalog document and decode its entries.
pub fn parse_catalog<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, CatalogError> {
    let document: Value =
        serde_json::from_str(raw).map_err(|err| CatalogError::Shape(format!("not valid JSON: {err}")))?;

    let entries = match document {
        Value::Array(items) => items,
        Value::Object(mut map) => WRAPPER_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| {
                CatalogError::Shape("expected an array or an object with a `locations` array".to_owned())
            })?,
        other => {
            return Err(CatalogError::Shape(format!(
                "expected an array, got {}",
                json_kind(&other)
            )));
        }
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item)
                .map_err(|err| CatalogError::Shape(format!("entry {index}: {err}")))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Where a catalog document comes from.
///
/// Browser fetches are not `Send`, so on wasm32 the futures drop that bound.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<String>;
}

/// A catalog already held in memory (bundled file, test fixture).
pub struct StaticSource {
    body: String,
}

impl StaticSource {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl CatalogSource for StaticSource {
    async fn fetch(&self) -> anyhow::Result<String> {
        Ok(self.body.clone())
    }
}

/// Shared "still mounted" flag. Clones observe the same flag.
#[derive(Debug, Clone)]
pub struct MountGuard(Arc<AtomicBool>);

impl MountGuard {
    pub fn mounted() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn unmount(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Default for MountGuard {
    fn default() -> Self {
        Self::mounted()
    }
}

#[derive(Debug, Clone)]
pub struct LoadState<T> {
    pub data: Option<Vec<T>>,
    pub loading: bool,
    pub error: Option<String>,
    /// Bumped on every successful load; ranking memoizes on it.
    pub revision: u64,
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            revision: 0,
        }
    }
}

pub struct CatalogLoader<T, S> {
    source: S,
    guard: MountGuard,
    state: RwLock<LoadState<T>>,
}

impl<T, S> CatalogLoader<T, S>
where
    T: DeserializeOwned + Clone + Send + Sync,
    S: CatalogSource,
{
    pub fn new(source: S, guard: MountGuard) -> Self {
        Self {
            source,
            guard,
            state: RwLock::new(LoadState::default()),
        }
    }

    pub fn guard(&self) -> &MountGuard {
        &self.guard
    }

    pub fn state(&self) -> LoadState<T> {
        self.state
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Fetch and validate once.
    ///
    /// Returns `None` when the view went away, either before the fetch started or
    /// while it was in flight; the stored state is left untouched in that case.
    pub async fn load(&self) -> Option<LoadState<T>> {
        if !self.guard.is_mounted() {
            return None;
        }

        self.update(|state| {
            state.loading = true;
            state.error = None;
        });

        let outcome = match self.source.fetch().await {
            Ok(raw) => parse_catalog::<T>(&raw),
            Err(err) => Err(CatalogError::Fetch(err.to_string())),
        };

        if !self.guard.is_mounted() {
            debug!("catalog result arrived after unmount; dropped");
            return None;
        }

        self.update(|state| {
            state.loading = false;
            match outcome {
                Ok(entries) => {
                    state.data = Some(entries);
                    state.error = None;
                    state.revision += 1;
                }
                Err(err) => {
                    warn!("catalog load failed: {}", err);
                    state.data = None;
                    state.error = Some(err.to_string());
                }
            }
        });

        Some(self.state())
    }

    fn update(&self, f: impl FnOnce(&mut LoadState<T>)) {
        if let Ok(mut guard) = self.state.write() {
            f(&mut guard);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use tokio::sync::Notify;

    const RESTAURANTS: &str = r#"{"locations":[
        {"id":"r1","name":"Cafe Aroma","address":"1 Main St","lat":37.77,"lon":-122.41},
        {"id":"r2","name":"Bistro Noir","address":"2 Side St","lat":37.78,"lon":-122.42}
    ]}"#;

    struct FailingSource;

    #[async_trait]
    impl CatalogSource for FailingSource {
        async fn fetch(&self) -> anyhow::Result<String> {
            Err(anyhow!("connection refused"))
        }
    }

    /// Blocks until released so a test can unmount mid-flight.
    struct GatedSource {
        gate: Arc<Notify>,
        body: String,
    }

    #[async_trait]
    impl CatalogSource for GatedSource {
        async fn fetch(&self) -> anyhow::Result<String> {
            self.gate.notified().await;
            Ok(self.body.clone())
        }
    }

    #[test]
    fn accepts_wrapped_locations() {
        let entries: Vec<Restaurant> = parse_catalog(RESTAURANTS).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].name, "Bistro Noir");
    }

    #[test]
    fn accepts_bare_array() {
        let raw = r#"[{"id":"a1","name":"Summarizer","category":"writing","description":"Summaries"}]"#;
        let entries: Vec<AiService> = parse_catalog(raw).unwrap();
        assert_eq!(entries[0].category, "writing");
    }

    #[test]
    fn rejects_object_without_array() {
        let err = parse_catalog::<Restaurant>(r#"{"locations": {"id": "r1"}}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Shape(_)));

        let err = parse_catalog::<Restaurant>(r#""hello""#).unwrap_err();
        assert_eq!(
            err,
            CatalogError::Shape("expected an array, got a string".to_owned())
        );
    }

    #[test]
    fn reports_bad_entry_index() {
        let raw = r#"[{"id":"r1","name":"A","lat":1.0,"lon":1.0},{"id":"r2"}]"#;
        match parse_catalog::<Restaurant>(raw) {
            Err(CatalogError::Shape(message)) => assert!(message.starts_with("entry 1:")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn entry_without_coordinates_is_kept() {
        let raw = r#"[
            {"id":"r1","name":"Cafe Aroma","lat":37.77,"lon":-122.41},
            {"id":"r2","name":"Online Only"}
        ]"#;
        let entries: Vec<Restaurant> = parse_catalog(raw).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].coordinates(), Some(Coordinates::new(37.77, -122.41)));
        assert_eq!(entries[1].coordinates(), None);
    }

    #[tokio::test]
    async fn load_success_populates_data() {
        let loader: CatalogLoader<Restaurant, _> =
            CatalogLoader::new(StaticSource::new(RESTAURANTS), MountGuard::mounted());

        let state = loader.load().await.expect("still mounted");
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(state.data.map(|d| d.len()), Some(2));
        assert_eq!(state.revision, 1);
    }

    #[tokio::test]
    async fn fetch_failure_sets_error_and_clears_data() {
        let loader: CatalogLoader<Restaurant, _> =
            CatalogLoader::new(FailingSource, MountGuard::mounted());

        let state = loader.load().await.expect("still mounted");
        assert!(state.data.is_none());
        assert_eq!(
            state.error.as_deref(),
            Some("failed to load catalog: connection refused")
        );
    }

    #[tokio::test]
    async fn shape_mismatch_is_reported_like_fetch_failure() {
        let loader: CatalogLoader<Restaurant, _> =
            CatalogLoader::new(StaticSource::new(r#"{"items": []}"#), MountGuard::mounted());

        let state = loader.load().await.expect("still mounted");
        assert!(state.data.is_none());
        assert!(state.error.unwrap().starts_with("unexpected catalog format"));
    }

    #[tokio::test]
    async fn result_after_unmount_is_dropped() {
        let gate = Arc::new(Notify::new());
        let loader: Arc<CatalogLoader<Restaurant, _>> = Arc::new(CatalogLoader::new(
            GatedSource {
                gate: gate.clone(),
                body: RESTAURANTS.to_owned(),
            },
            MountGuard::mounted(),
        ));

        let task = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.load().await })
        };

        tokio::task::yield_now().await;
        loader.guard().unmount();
        gate.notify_one();

        assert!(task.await.unwrap().is_none());
        let state = loader.state();
        assert!(state.data.is_none());
        assert_eq!(state.revision, 0);
    }

    #[tokio::test]
    async fn unmounted_loader_does_not_fetch() {
        let guard = MountGuard::mounted();
        guard.unmount();
        let loader: CatalogLoader<Restaurant, _> = CatalogLoader::new(FailingSource, guard);

        assert!(loader.load().await.is_none());
        assert!(!loader.state().loading);
    }
}
