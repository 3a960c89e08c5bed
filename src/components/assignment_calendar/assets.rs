use crate::error::{asset_error, CalendarResult};
use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::Client;
use std::fmt;
use tracing::{debug, info};

/// Kind of static resource the calendar library needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Script,
    Style,
}

/// One static resource, relative to the asset base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub kind: AssetKind,
    pub path: String,
}

impl Asset {
    pub fn script(path: &str) -> Self {
        Self {
            kind: AssetKind::Script,
            path: path.to_string(),
        }
    }

    pub fn style(path: &str) -> Self {
        Self {
            kind: AssetKind::Style,
            path: path.to_string(),
        }
    }

    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.path.trim_start_matches('/'))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AssetKind::Script => write!(f, "script {}", self.path),
            AssetKind::Style => write!(f, "style {}", self.path),
        }
    }
}

/// Resources the calendar library needs, in load order
pub fn default_assets() -> Vec<Asset> {
    vec![
        Asset::script("jquery.min.js"),
        Asset::script("moment.min.js"),
        Asset::script("fullcalendar.min.js"),
        Asset::style("fullcalendar.min.css"),
    ]
}

/// Loads scripts and styles into the hosting page
#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn load_script(&self, url: &str) -> CalendarResult<()>;
    async fn load_style(&self, url: &str) -> CalendarResult<()>;
}

/// Load every asset in parallel. Fails if any one of them fails.
pub async fn load_all(loader: &dyn AssetLoader, base_url: &str, assets: &[Asset]) -> CalendarResult<()> {
    let loads = assets.iter().map(|asset| {
        let url = asset.url(base_url);
        async move {
            debug!(%asset, "Loading asset");
            match asset.kind {
                AssetKind::Script => loader.load_script(&url).await,
                AssetKind::Style => loader.load_style(&url).await,
            }
        }
    });

    try_join_all(loads).await?;
    info!(count = assets.len(), "Calendar assets loaded");
    Ok(())
}

/// Asset loader that fetches each resource over HTTP
#[derive(Clone, Default)]
pub struct HttpAssetLoader {
    client: Client,
}

impl HttpAssetLoader {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    async fn fetch(&self, url: &str) -> CalendarResult<()> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| asset_error(&format!("Failed to load {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(asset_error(&format!(
                "Failed to load {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| asset_error(&format!("Failed to read {}: {}", url, e)))?;
        debug!(url, bytes = body.len(), "Asset fetched");
        Ok(())
    }
}

#[async_trait]
impl AssetLoader for HttpAssetLoader {
    async fn load_script(&self, url: &str) -> CalendarResult<()> {
        self.fetch(url).await
    }

    async fn load_style(&self, url: &str) -> CalendarResult<()> {
        self.fetch(url).await
    }
}
