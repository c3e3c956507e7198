use serde::{Deserialize, Serialize};

use crate::base_url::{BaseUrl, BaseUrlError};
use crate::endpoints::Endpoints;
use crate::site_switch::ReloadPolicy;

pub const DEFAULT_LOADER_SCRIPT_ID: &str = "check_mk_sidebar";
pub const DEFAULT_RELOAD_FRAME: &str = "main";
pub const ENV_BASE_URL: &str = "CMK_SIDEBAR_BASE_URL";
pub const ENV_RELOAD_FRAME: &str = "CMK_SIDEBAR_RELOAD_FRAME";
pub const ENV_FETCH_TIMEOUT_MS: &str = "CMK_SIDEBAR_FETCH_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("sidebar config is not valid json: {0}")]
    Json(String),
    #[error("invalid sidebar base url: {0}")]
    BaseUrl(#[from] BaseUrlError),
    #[error("no base url configured and loader script `{script_id}` has no usable source")]
    MissingBaseUrl { script_id: String },
    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Sidebar bootstrap settings. Every field has a default so a page can
/// pass a partial JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarConfig {
    pub base_url: Option<String>,
    pub loader_script_id: String,
    pub endpoints: Endpoints,
    pub reload_frame: String,
    pub reload_policy: ReloadPolicy,
    pub fetch_timeout_ms: Option<u64>,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            loader_script_id: DEFAULT_LOADER_SCRIPT_ID.to_string(),
            endpoints: Endpoints::default(),
            reload_frame: DEFAULT_RELOAD_FRAME.to_string(),
            reload_policy: ReloadPolicy::default(),
            fetch_timeout_ms: None,
        }
    }
}

impl SidebarConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|error| ConfigError::Json(error.to_string()))?;
        config.validated()
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_value(value).map_err(|error| ConfigError::Json(error.to_string()))?;
        config.validated()
    }

    /// Defaults overlaid with `CMK_SIDEBAR_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `CMK_SIDEBAR_*` overrides looked up through `lookup`; blank
    /// values are ignored.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let lookup = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = Some(base_url);
        }
        if let Some(frame) = lookup(ENV_RELOAD_FRAME) {
            self.reload_frame = frame;
        }
        if let Some(raw) = lookup(ENV_FETCH_TIMEOUT_MS) {
            let timeout_ms = raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_FETCH_TIMEOUT_MS,
                value: raw.clone(),
            })?;
            self.fetch_timeout_ms = Some(timeout_ms);
        }
        self.validated()
    }

    /// Resolves the base url: the configured value wins, the loader
    /// script's own source is the fallback.
    pub fn resolve_base_url(&self, script_src: Option<&str>) -> Result<BaseUrl, ConfigError> {
        if let Some(base_url) = self.base_url.as_deref() {
            return Ok(BaseUrl::parse(base_url)?);
        }
        match script_src.map(str::trim).filter(|src| !src.is_empty()) {
            Some(src) => Ok(BaseUrl::from_script_src(src)?),
            None => Err(ConfigError::MissingBaseUrl {
                script_id: self.loader_script_id.clone(),
            }),
        }
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if let Some(base_url) = self.base_url.as_deref() {
            BaseUrl::parse(base_url)?;
        }
        if self.loader_script_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "loader_script_id",
                value: self.loader_script_id,
            });
        }
        if self.reload_frame.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "reload_frame",
                value: self.reload_frame,
            });
        }
        if self.fetch_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "fetch_timeout_ms",
                value: "0".to_string(),
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_object_yields_defaults() -> anyhow::Result<()> {
        let config = SidebarConfig::from_json("{}")?;
        assert_eq!(config, SidebarConfig::default());
        assert_eq!(config.loader_script_id, "check_mk_sidebar");
        assert_eq!(config.reload_frame, "main");
        assert_eq!(config.reload_policy, ReloadPolicy::Always);
        Ok(())
    }

    #[test]
    fn partial_json_overrides_selected_fields() -> anyhow::Result<()> {
        let config = SidebarConfig::from_json_value(json!({
            "base_url": "https://monitor.example/ui/",
            "endpoints": { "sidebar": "sidebar_snapins.py" },
            "reload_policy": "on_success",
            "fetch_timeout_ms": 5000
        }))?;

        assert_eq!(config.base_url.as_deref(), Some("https://monitor.example/ui/"));
        assert_eq!(config.endpoints.sidebar, "sidebar_snapins.py");
        assert_eq!(config.endpoints.stylesheet, "check_mk.css");
        assert_eq!(config.reload_policy, ReloadPolicy::OnSuccess);
        assert_eq!(config.fetch_timeout_ms, Some(5000));
        Ok(())
    }

    #[test]
    fn invalid_json_and_values_are_rejected() {
        assert!(matches!(
            SidebarConfig::from_json("{\"reload_policy\": \"sometimes\"}"),
            Err(ConfigError::Json(_))
        ));
        assert_eq!(
            SidebarConfig::from_json_value(json!({ "base_url": "monitor.example" })),
            Err(ConfigError::BaseUrl(BaseUrlError::InvalidBaseUrl))
        );
        assert_eq!(
            SidebarConfig::from_json_value(json!({ "fetch_timeout_ms": 0 })),
            Err(ConfigError::InvalidValue {
                key: "fetch_timeout_ms",
                value: "0".to_string()
            })
        );
        assert!(matches!(
            SidebarConfig::from_json_value(json!({ "reload_frame": " " })),
            Err(ConfigError::InvalidValue { key: "reload_frame", .. })
        ));
    }

    #[test]
    fn environment_overrides_apply_and_ignore_blanks() -> anyhow::Result<()> {
        let config = SidebarConfig::default().with_overrides(env(&[
            (ENV_BASE_URL, " https://monitor.example/prod/check_mk "),
            (ENV_RELOAD_FRAME, "  "),
            (ENV_FETCH_TIMEOUT_MS, "2500"),
        ]))?;

        assert_eq!(
            config.base_url.as_deref(),
            Some("https://monitor.example/prod/check_mk")
        );
        assert_eq!(config.reload_frame, "main");
        assert_eq!(config.fetch_timeout_ms, Some(2500));
        Ok(())
    }

    #[test]
    fn from_env_reads_process_environment() -> anyhow::Result<()> {
        unsafe { std::env::set_var(ENV_RELOAD_FRAME, "content") };
        let result = SidebarConfig::from_env();
        unsafe { std::env::remove_var(ENV_RELOAD_FRAME) };

        assert_eq!(result?.reload_frame, "content");
        Ok(())
    }

    #[test]
    fn non_numeric_timeout_override_is_rejected() {
        let result =
            SidebarConfig::default().with_overrides(env(&[(ENV_FETCH_TIMEOUT_MS, "soon")]));
        assert_eq!(
            result,
            Err(ConfigError::InvalidValue {
                key: ENV_FETCH_TIMEOUT_MS,
                value: "soon".to_string()
            })
        );
    }

    #[test]
    fn explicit_base_url_wins_over_script_source() -> anyhow::Result<()> {
        let config = SidebarConfig {
            base_url: Some("https://monitor.example/ui".to_string()),
            ..SidebarConfig::default()
        };

        let base = config.resolve_base_url(Some("https://other.example/js/sidebar.js"))?;

        assert_eq!(base.as_str(), "https://monitor.example/ui/");
        Ok(())
    }

    #[test]
    fn script_source_is_the_fallback() -> anyhow::Result<()> {
        let base = SidebarConfig::default()
            .resolve_base_url(Some("https://monitor.example/ui/sidebar.js"))?;
        assert_eq!(base.as_str(), "https://monitor.example/ui/");
        Ok(())
    }

    #[test]
    fn missing_script_context_is_an_error() {
        assert_eq!(
            SidebarConfig::default().resolve_base_url(None),
            Err(ConfigError::MissingBaseUrl {
                script_id: "check_mk_sidebar".to_string()
            })
        );
        assert!(matches!(
            SidebarConfig::default().resolve_base_url(Some("  ")),
            Err(ConfigError::MissingBaseUrl { .. })
        ));
    }
}
