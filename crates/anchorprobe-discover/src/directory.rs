//! Paginated anchor directory client.
//!
//! The directory answers with pages of the form
//! `{"meta": {"next": "/api/v1/probe/?offset=100..."}, "objects": [...]}`.
//! `next` links are resolved against the directory host and followed
//! until the last page.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use anchorprobe_core::config::DirectoryConfig;
use anchorprobe_core::Endpoint;

use crate::error::{DiscoverError, Result};

/// Source of the complete anchor list.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// Fetch every page and return all endpoints in directory order.
    async fn fetch_all(&self) -> Result<Vec<Endpoint>>;
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    meta: PageMeta,
    objects: Vec<Endpoint>,
}

#[derive(Debug, Default, Deserialize)]
struct PageMeta {
    next: Option<String>,
}

/// HTTP client for the RIPE Atlas style probe directory.
pub struct AtlasDirectory {
    client: Client,
    base_url: Url,
    query: String,
}

impl AtlasDirectory {
    pub fn new(config: &DirectoryConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| DiscoverError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url,
            query: config.query.clone(),
        })
    }

    /// Resolve a path or absolute link against the directory host.
    fn resolve(&self, link: &str) -> Result<Url> {
        self.base_url
            .join(link)
            .map_err(|e| DiscoverError::InvalidUrl {
                url: link.to_string(),
                reason: e.to_string(),
            })
    }

    async fn fetch_page(&self, url: Url) -> Result<Page> {
        let page = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Page>()
            .await?;
        Ok(page)
    }
}

#[async_trait]
impl DirectorySource for AtlasDirectory {
    async fn fetch_all(&self) -> Result<Vec<Endpoint>> {
        let mut endpoints = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(self.resolve(&self.query)?);

        while let Some(url) = next.take() {
            if !seen.insert(url.clone()) {
                tracing::warn!(url = %url, "Directory pagination loops back, stopping");
                break;
            }

            tracing::debug!(url = %url, "Fetching directory page");
            let page = self.fetch_page(url).await?;
            endpoints.extend(page.objects);

            next = match page.meta.next.as_deref() {
                Some(link) if !link.is_empty() => Some(self.resolve(link)?),
                _ => None,
            };
        }

        tracing::info!(
            endpoints = endpoints.len(),
            pages = seen.len(),
            "Fetched anchor directory"
        );
        Ok(endpoints)
    }
}
