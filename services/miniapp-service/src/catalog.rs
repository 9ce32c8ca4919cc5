use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    Json,
    extract::{Query, State},
};
use rz_api_types::{AiService, Coordinates, Restaurant};
use rz_discovery::geo::format_miles;
use rz_discovery::ranking::MAP_VIEW_RADIUS;
use rz_discovery::{CatalogLoader, CatalogSource, MountGuard, Radius, filter_entries, rank_by_distance};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::{ApiResult, AppState, bad_request};

/// Catalog document on local disk.
pub(crate) struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileSource {
    async fn fetch(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))
    }
}

/// Load and validate a catalog file; a bad file stops startup.
pub(crate) async fn load_catalog<T>(path: &Path) -> Result<Vec<T>>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    let loader = CatalogLoader::<T, _>::new(FileSource::new(path), MountGuard::mounted());
    let state = loader
        .load()
        .await
        .context("catalog loader was unmounted")?;

    if let Some(error) = state.error {
        anyhow::bail!("{}: {}", path.display(), error);
    }
    let entries = state.data.unwrap_or_default();
    info!("loaded {} catalog entries from {}", entries.len(), path.display());
    Ok(entries)
}

#[derive(Debug, Deserialize)]
pub(crate) struct RestaurantQuery {
    q: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    radius: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AiServiceQuery {
    q: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RestaurantHit {
    #[serde(flatten)]
    restaurant: Restaurant,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance_miles: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance_label: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CatalogResponse<T> {
    count: usize,
    entries: Vec<T>,
}

impl<T> CatalogResponse<T> {
    fn new(entries: Vec<T>) -> Self {
        Self {
            count: entries.len(),
            entries,
        }
    }
}

/// Search restaurants; with `lat`/`lon` the hits are ranked by distance and cut at
/// `radius` miles (default 10).
pub(crate) async fn restaurants(
    State(state): State<AppState>,
    Query(query): Query<RestaurantQuery>,
) -> ApiResult<CatalogResponse<RestaurantHit>> {
    let matches = filter_entries(state.restaurants.as_slice(), query.q.as_deref().unwrap_or_default());

    let origin = match (query.lat, query.lon) {
        (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
        (None, None) => None,
        _ => return Err(bad_request("lat and lon must be given together")),
    };

    let Some(origin) = origin else {
        let entries = matches
            .into_iter()
            .map(|restaurant| RestaurantHit {
                restaurant: restaurant.clone(),
                distance_miles: None,
                distance_label: None,
            })
            .collect();
        return Ok(Json(CatalogResponse::new(entries)));
    };

    if !(-90.0..=90.0).contains(&origin.lat) || !(-180.0..=180.0).contains(&origin.lon) {
        return Err(bad_request("coordinates out of range"));
    }
    let radius = match query.radius {
        None => MAP_VIEW_RADIUS,
        Some(miles) if miles.is_finite() && miles > 0.0 => Radius::Miles(miles),
        Some(_) => return Err(bad_request("radius must be a positive number of miles")),
    };

    let entries = rank_by_distance(matches.as_slice(), origin, radius)
        .into_iter()
        .map(|ranked| RestaurantHit {
            restaurant: (*ranked.entry).clone(),
            distance_miles: Some(ranked.distance_miles),
            distance_label: Some(format_miles(ranked.distance_miles)),
        })
        .collect();
    Ok(Json(CatalogResponse::new(entries)))
}

pub(crate) async fn ai_services(
    State(state): State<AppState>,
    Query(query): Query<AiServiceQuery>,
) -> ApiResult<CatalogResponse<AiService>> {
    let entries = filter_entries(state.ai_services.as_slice(), query.q.as_deref().unwrap_or_default())
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(CatalogResponse::new(entries)))
}
