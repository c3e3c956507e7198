use serde::Serialize;

use crate::base_url::{BaseUrl, BaseUrlError};
use crate::document::{DocumentError, DocumentSink};
use crate::endpoints::Endpoints;
use crate::fetch::{ContentFetcher, FetchError};
use crate::style::{StyleError, StyleInjector, StyleOutcome};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Style(#[from] StyleError),
    #[error("failed to place sidebar markup: {0}")]
    Document(#[from] DocumentError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SidebarContent {
    Mounted { url: String, bytes: usize },
    /// Fetch failed; nothing was written and the sidebar stays empty.
    Degraded { url: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarReport {
    pub stylesheet: StyleOutcome,
    pub content: SidebarContent,
}

impl SidebarReport {
    pub fn is_mounted(&self) -> bool {
        matches!(self.content, SidebarContent::Mounted { .. })
    }
}

/// Links the stylesheet, then fetches the server-rendered sidebar and
/// writes it after the loader script. The caller awaits this before the
/// page is treated as interactive.
pub struct SidebarLoader<F> {
    style: StyleInjector,
    sidebar_url: String,
    fetcher: F,
}

impl<F: ContentFetcher> SidebarLoader<F> {
    pub fn new(base: &BaseUrl, endpoints: &Endpoints, fetcher: F) -> Result<Self, BaseUrlError> {
        Ok(Self {
            style: StyleInjector::new(base, endpoints)?,
            sidebar_url: endpoints.sidebar_url(base)?,
            fetcher,
        })
    }

    pub fn sidebar_url(&self) -> &str {
        &self.sidebar_url
    }

    pub async fn load(&self, document: &impl DocumentSink) -> Result<SidebarReport, LoadError> {
        let stylesheet = self.style.inject(document)?;

        let content = match self.fetcher.fetch_text(&self.sidebar_url).await {
            Ok(markup) => {
                document.write_after_loader(&markup)?;
                tracing::info!(url = %self.sidebar_url, bytes = markup.len(), "sidebar mounted");
                SidebarContent::Mounted {
                    url: self.sidebar_url.clone(),
                    bytes: markup.len(),
                }
            }
            Err(error) => {
                tracing::warn!(url = %self.sidebar_url, %error, "sidebar fetch failed; leaving sidebar empty");
                degraded(&self.sidebar_url, &error)
            }
        };

        Ok(SidebarReport {
            stylesheet,
            content,
        })
    }
}

fn degraded(url: &str, error: &FetchError) -> SidebarContent {
    SidebarContent::Degraded {
        url: url.to_string(),
        error: error.to_string(),
    }
}
