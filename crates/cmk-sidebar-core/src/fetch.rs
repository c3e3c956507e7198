use std::fmt::Display;
use std::future::Future;
use std::rc::Rc;

use async_trait::async_trait;
use futures_util::{FutureExt, pin_mut, select};

/// Transport failure of a single GET. Returned to the caller, never raised
/// as a page-fatal error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
    #[error("request to {url} returned http {status}")]
    Status { url: String, status: u16 },
    #[error("reading response body from {url} failed: {message}")]
    Read { url: String, message: String },
    #[error("request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. }
            | Self::Status { url, .. }
            | Self::Read { url, .. }
            | Self::Timeout { url, .. } => url,
        }
    }

    pub fn network(url: &str, error: impl Display) -> Self {
        Self::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    pub fn read(url: &str, error: impl Display) -> Self {
        Self::Read {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    /// Any 2xx passes; every other status is a failed fetch.
    pub fn check_status(url: &str, status: u16) -> Result<(), Self> {
        if (200..300).contains(&status) {
            return Ok(());
        }
        Err(Self::Status {
            url: url.to_string(),
            status,
        })
    }
}

/// Runs `request` and gives up with `FetchError::Timeout` once `timer`
/// completes first. Without a timeout the request runs to completion.
pub async fn with_timeout<T, Timer>(
    url: &str,
    timeout_ms: Option<u64>,
    request: impl Future<Output = Result<T, FetchError>>,
    timer: impl FnOnce(u64) -> Timer,
) -> Result<T, FetchError>
where
    Timer: Future<Output = ()>,
{
    let Some(timeout_ms) = timeout_ms else {
        return request.await;
    };

    let request = request.fuse();
    let timer = timer(timeout_ms).fuse();
    pin_mut!(request, timer);
    select! {
        result = request => result,
        () = timer => Err(FetchError::Timeout {
            url: url.to_string(),
            timeout_ms,
        }),
    }
}

/// Fetches a resource as text with a single GET. No retries; redirects
/// follow whatever the host transport does.
#[async_trait(?Send)]
pub trait ContentFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

#[async_trait(?Send)]
impl<T: ContentFetcher + ?Sized> ContentFetcher for &T {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch_text(url).await
    }
}

#[async_trait(?Send)]
impl<T: ContentFetcher + ?Sized> ContentFetcher for Rc<T> {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch_text(url).await
    }
}
