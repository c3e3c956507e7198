use serde::{Deserialize, Serialize};

use crate::base_url::{BaseUrl, BaseUrlError};
use crate::site_switch::SiteToken;

pub const DEFAULT_STYLESHEET: &str = "check_mk.css";
pub const DEFAULT_SIDEBAR_ENDPOINT: &str = "sidebar.py";
pub const DEFAULT_SWITCH_SITE_ENDPOINT: &str = "switch_site.py";

/// Resource names the sidebar requests from the monitoring web server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub stylesheet: String,
    pub sidebar: String,
    pub switch_site: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            stylesheet: DEFAULT_STYLESHEET.to_string(),
            sidebar: DEFAULT_SIDEBAR_ENDPOINT.to_string(),
            switch_site: DEFAULT_SWITCH_SITE_ENDPOINT.to_string(),
        }
    }
}

impl Endpoints {
    pub fn stylesheet_url(&self, base: &BaseUrl) -> Result<String, BaseUrlError> {
        base.join(&self.stylesheet)
    }

    pub fn sidebar_url(&self, base: &BaseUrl) -> Result<String, BaseUrlError> {
        base.join(&self.sidebar)
    }

    /// `<base_uri>/<switch_site>?<token>`. The base uri is the one the
    /// server rendered into the site switch control, not the loader base.
    pub fn switch_site_url(&self, base_uri: &str, token: &SiteToken) -> String {
        let base_uri = base_uri.trim().trim_end_matches('/');
        let endpoint = self.switch_site.trim_start_matches('/');
        format!("{base_uri}/{endpoint}?{}", token.as_str())
    }
}
