use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::endpoints::Endpoints;
use crate::fetch::{ContentFetcher, FetchError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SiteTokenError {
    #[error("site switch token must not be empty")]
    Empty,
}

/// Opaque site switch request, sent verbatim as the query string. The
/// server owns its format; only a blank token is refused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SiteToken(String);

impl SiteToken {
    pub fn parse(raw: &str) -> Result<Self, SiteTokenError> {
        if raw.trim().is_empty() {
            return Err(SiteTokenError::Empty);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadPolicy {
    /// Reload the content frame whatever the switch request returned.
    #[default]
    Always,
    /// Reload only after the server acknowledged the switch.
    OnSuccess,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame `{0}` is not present in the browsing context")]
    NotFound(String),
    #[error("reloading frame `{name}` failed: {message}")]
    Reload { name: String, message: String },
}

/// Handle to the frame showing the site-scoped content.
pub trait FrameReloader {
    fn name(&self) -> &str;

    fn reload(&self) -> Result<(), FrameError>;
}

impl<T: FrameReloader + ?Sized> FrameReloader for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn reload(&self) -> Result<(), FrameError> {
        (**self).reload()
    }
}

impl<T: FrameReloader + ?Sized> FrameReloader for Rc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn reload(&self) -> Result<(), FrameError> {
        (**self).reload()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReloadStatus {
    Reloaded,
    Skipped,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOutcome {
    pub url: String,
    pub request: Result<(), FetchError>,
    pub reload: ReloadStatus,
}

impl SwitchOutcome {
    /// True only when the server accepted the switch request.
    pub fn switched(&self) -> bool {
        self.request.is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SwitchError {
    #[error(transparent)]
    Token(#[from] SiteTokenError),
    #[error("a site switch is already in progress")]
    InProgress,
}

/// Switches the server-side site context, then reloads the content frame.
pub struct SiteSwitcher<F, R> {
    fetcher: F,
    frame: R,
    endpoints: Endpoints,
    policy: ReloadPolicy,
    in_flight: Cell<bool>,
}

impl<F: ContentFetcher, R: FrameReloader> SiteSwitcher<F, R> {
    pub fn new(fetcher: F, frame: R, endpoints: Endpoints, policy: ReloadPolicy) -> Self {
        Self {
            fetcher,
            frame,
            endpoints,
            policy,
            in_flight: Cell::new(false),
        }
    }

    pub fn policy(&self) -> ReloadPolicy {
        self.policy
    }

    pub async fn switch_raw(
        &self,
        base_uri: &str,
        raw_token: &str,
    ) -> Result<SwitchOutcome, SwitchError> {
        let token = SiteToken::parse(raw_token)?;
        self.switch(base_uri, &token).await
    }

    /// Requests the switch, then reloads the frame as the policy says. A
    /// second call while one switch is still awaiting the server is
    /// rejected.
    pub async fn switch(
        &self,
        base_uri: &str,
        token: &SiteToken,
    ) -> Result<SwitchOutcome, SwitchError> {
        if self.in_flight.replace(true) {
            return Err(SwitchError::InProgress);
        }
        let _guard = InFlightGuard(&self.in_flight);
        Ok(self.perform(base_uri, token).await)
    }

    async fn perform(&self, base_uri: &str, token: &SiteToken) -> SwitchOutcome {
        let url = self.endpoints.switch_site_url(base_uri, token);
        let request = match self.fetcher.fetch_text(&url).await {
            Ok(_) => {
                tracing::info!(%url, "site switch accepted");
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%url, %error, "site switch request failed");
                Err(error)
            }
        };

        let reload = if request.is_err() && self.policy == ReloadPolicy::OnSuccess {
            tracing::debug!(frame = self.frame.name(), "frame reload skipped after failed switch");
            ReloadStatus::Skipped
        } else {
            match self.frame.reload() {
                Ok(()) => ReloadStatus::Reloaded,
                Err(error) => {
                    tracing::warn!(frame = self.frame.name(), %error, "frame reload failed");
                    ReloadStatus::Failed {
                        error: error.to_string(),
                    }
                }
            }
        };

        SwitchOutcome {
            url,
            request,
            reload,
        }
    }
}

struct InFlightGuard<'a>(&'a Cell<bool>);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::RecordingFetcher;

    #[derive(Debug, Default)]
    struct CountingFrame {
        reloads: Cell<u32>,
        missing: bool,
    }

    impl FrameReloader for CountingFrame {
        fn name(&self) -> &str {
            "main"
        }

        fn reload(&self) -> Result<(), FrameError> {
            if self.missing {
                return Err(FrameError::NotFound("main".to_string()));
            }
            self.reloads.set(self.reloads.get() + 1);
            Ok(())
        }
    }

    const SWITCH_URL: &str = "https://monitor.example/switch_site.py?site=prod";

    #[test]
    fn token_is_kept_verbatim_and_only_blank_is_refused() {
        assert_eq!(
            SiteToken::parse("_site_switch=a%20b&x=y z").map(|token| token.as_str().to_string()),
            Ok("_site_switch=a%20b&x=y z".to_string())
        );
        assert_eq!(
            SiteToken::parse("?site=prod#top").map(|token| token.as_str().to_string()),
            Ok("?site=prod#top".to_string())
        );
        assert_eq!(SiteToken::parse("  "), Err(SiteTokenError::Empty));
        assert_eq!(SiteToken::parse(""), Err(SiteTokenError::Empty));
    }

    #[tokio::test]
    async fn switch_requests_endpoint_then_reloads_frame() -> anyhow::Result<()> {
        let fetcher = RecordingFetcher::default().with_response(SWITCH_URL, "ignored body");
        let frame = CountingFrame::default();
        let switcher = SiteSwitcher::new(&fetcher, &frame, Endpoints::default(), ReloadPolicy::Always);

        let outcome = switcher
            .switch("https://monitor.example", &SiteToken::parse("site=prod")?)
            .await?;

        assert_eq!(fetcher.requests(), vec![SWITCH_URL.to_string()]);
        assert_eq!(outcome.url, SWITCH_URL);
        assert!(outcome.switched());
        assert_eq!(outcome.reload, ReloadStatus::Reloaded);
        assert_eq!(frame.reloads.get(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn failed_switch_still_reloads_by_default_but_reports_failure() -> anyhow::Result<()> {
        let fetcher = RecordingFetcher::default();
        let frame = CountingFrame::default();
        let switcher = SiteSwitcher::new(&fetcher, &frame, Endpoints::default(), ReloadPolicy::default());

        let outcome = switcher
            .switch("https://monitor.example", &SiteToken::parse("site=prod")?)
            .await?;

        assert!(!outcome.switched());
        assert!(matches!(outcome.request, Err(FetchError::Network { .. })));
        assert_eq!(outcome.reload, ReloadStatus::Reloaded);
        assert_eq!(frame.reloads.get(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn on_success_policy_skips_reload_after_failure() -> anyhow::Result<()> {
        let fetcher = RecordingFetcher::default();
        let frame = CountingFrame::default();
        let switcher =
            SiteSwitcher::new(&fetcher, &frame, Endpoints::default(), ReloadPolicy::OnSuccess);

        let outcome = switcher
            .switch("https://monitor.example", &SiteToken::parse("site=prod")?)
            .await?;

        assert_eq!(outcome.reload, ReloadStatus::Skipped);
        assert_eq!(frame.reloads.get(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn missing_frame_is_reported_in_outcome() -> anyhow::Result<()> {
        let fetcher = RecordingFetcher::default().with_response(SWITCH_URL, "");
        let frame = CountingFrame {
            reloads: Cell::new(0),
            missing: true,
        };
        let switcher = SiteSwitcher::new(&fetcher, &frame, Endpoints::default(), ReloadPolicy::Always);

        let outcome = switcher
            .switch("https://monitor.example/", &SiteToken::parse("site=prod")?)
            .await?;

        assert!(outcome.switched());
        assert_eq!(
            outcome.reload,
            ReloadStatus::Failed {
                error: "frame `main` is not present in the browsing context".to_string()
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn token_with_spaces_still_requests_and_reloads() -> anyhow::Result<()> {
        let fetcher = RecordingFetcher::default();
        let frame = CountingFrame::default();
        let switcher = SiteSwitcher::new(&fetcher, &frame, Endpoints::default(), ReloadPolicy::Always);

        let outcome = switcher
            .switch_raw("https://monitor.example", "_site_switch=a%20b&x=y z")
            .await?;

        assert_eq!(
            fetcher.requests(),
            vec!["https://monitor.example/switch_site.py?_site_switch=a%20b&x=y z".to_string()]
        );
        assert_eq!(outcome.reload, ReloadStatus::Reloaded);
        assert_eq!(frame.reloads.get(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn switch_raw_rejects_blank_tokens_without_requests() {
        let fetcher = RecordingFetcher::default();
        let frame = CountingFrame::default();
        let switcher = SiteSwitcher::new(&fetcher, &frame, Endpoints::default(), ReloadPolicy::Always);

        let result = switcher.switch_raw("https://monitor.example", "").await;

        assert_eq!(result, Err(SwitchError::Token(SiteTokenError::Empty)));
        assert!(fetcher.requests().is_empty());
        assert_eq!(frame.reloads.get(), 0);
    }

    #[tokio::test]
    async fn switch_raw_releases_in_flight_guard() -> anyhow::Result<()> {
        let fetcher = RecordingFetcher::default().with_response(SWITCH_URL, "");
        let frame = CountingFrame::default();
        let switcher = SiteSwitcher::new(&fetcher, &frame, Endpoints::default(), ReloadPolicy::Always);

        switcher.switch_raw("https://monitor.example", "site=prod").await?;
        let second = switcher.switch_raw("https://monitor.example", "site=prod").await?;

        assert!(second.switched());
        assert_eq!(frame.reloads.get(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_switch_is_rejected() {
        let fetcher = RecordingFetcher::default().with_response(SWITCH_URL, "");
        let frame = CountingFrame::default();
        let switcher = SiteSwitcher::new(&fetcher, &frame, Endpoints::default(), ReloadPolicy::Always);

        switcher.in_flight.set(true);
        let raw = switcher.switch_raw("https://monitor.example", "site=prod").await;
        let parsed = match SiteToken::parse("site=prod") {
            Ok(token) => switcher.switch("https://monitor.example", &token).await,
            Err(error) => Err(error.into()),
        };

        assert_eq!(raw, Err(SwitchError::InProgress));
        assert_eq!(parsed, Err(SwitchError::InProgress));
        assert!(fetcher.requests().is_empty());
        assert_eq!(frame.reloads.get(), 0);
    }
}
