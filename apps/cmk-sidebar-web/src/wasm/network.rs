use super::*;

use std::time::Duration;

use async_trait::async_trait;
use cmk_sidebar_core::with_timeout;
use gloo_net::http::{Request, Response};
use gloo_timers::future::sleep;

/// `ContentFetcher` backed by the browser fetch API. Same-origin cookies are
/// sent, so the server sees the user's monitoring session.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct GlooFetcher {
    timeout_ms: Option<u64>,
}

impl GlooFetcher {
    pub(super) fn new(timeout_ms: Option<u64>) -> Self {
        Self { timeout_ms }
    }

    async fn send(&self, url: &str) -> Result<Response, FetchError> {
        let request = async {
            Request::get(url)
                .send()
                .await
                .map_err(|error| FetchError::network(url, error))
        };
        with_timeout(url, self.timeout_ms, request, |timeout_ms| {
            sleep(Duration::from_millis(timeout_ms))
        })
        .await
    }
}

#[async_trait(?Send)]
impl ContentFetcher for GlooFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.send(url).await?;
        FetchError::check_status(url, response.status())?;
        response
            .text()
            .await
            .map_err(|error| FetchError::read(url, error))
    }
}
