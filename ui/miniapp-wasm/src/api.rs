//! Static catalog documents served next to the app.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use gloo_net::http::Request;
use rz_discovery::CatalogSource;

pub const RESTAURANTS_PATH: &str = "/restaurants.json";
pub const AI_SERVICES_PATH: &str = "/ai-services.json";

pub async fn fetch_text(url: &str) -> Result<String, String> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !response.ok() {
        return Err(format!("{} {}", response.status(), response.status_text()));
    }

    response.text().await.map_err(|e| format!("text error: {e}"))
}

/// Same-origin JSON document fetched with `fetch`.
pub struct FetchSource {
    url: String,
}

impl FetchSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait(?Send)]
impl CatalogSource for FetchSource {
    async fn fetch(&self) -> Result<String> {
        fetch_text(&self.url).await.map_err(|e| anyhow!(e))
    }
}
