use anyhow::{Context, Result};
use async_trait::async_trait;
use rz_discovery::CatalogSource;

/// Static catalog document served over HTTP (`/restaurants.json`, `/ai-services.json`).
pub struct HttpCatalogSource {
    url: String,
    http: reqwest::Client,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self) -> Result<String> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("catalog fetch transport")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("catalog fetch HTTP {status} for {}", self.url);
        }

        response.text().await.context("catalog fetch body")
    }
}
