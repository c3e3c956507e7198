use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BaseUrlError {
    #[error("base url must not be empty")]
    Empty,
    #[error("base url must use http:// or https:// and include a host")]
    InvalidBaseUrl,
    #[error("script source `{0}` does not name a file below a directory")]
    ScriptSourceWithoutPath(String),
    #[error("resource `{resource}` cannot be resolved against the base url: {message}")]
    InvalidResource { resource: String, message: String },
}

/// Prefix every relative sidebar resource is resolved against.
///
/// Always an absolute `http`/`https` URL whose path ends with `/`, without
/// query or fragment, in WHATWG serialization (lowercase scheme and host).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BaseUrl(Url);

impl BaseUrl {
    /// Parses an explicitly configured base url. A path without a trailing
    /// slash is treated as a directory.
    pub fn parse(raw: &str) -> Result<Self, BaseUrlError> {
        let mut url = parse_http_url(raw)?;
        if !url.path().ends_with('/') {
            let directory = format!("{}/", url.path());
            url.set_path(&directory);
        }
        Ok(Self(url))
    }

    /// Derives the base url from the loader script's own source by dropping
    /// the trailing file name, e.g. `https://h/ui/sidebar.js` -> `https://h/ui/`.
    pub fn from_script_src(src: &str) -> Result<Self, BaseUrlError> {
        let trimmed = src.trim();
        let without_query = trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let has_path = without_query
            .split_once("://")
            .is_some_and(|(_, remainder)| remainder.contains('/'));

        let mut url = parse_http_url(trimmed)?;
        if !has_path {
            return Err(BaseUrlError::ScriptSourceWithoutPath(src.to_string()));
        }
        let directory = match url.path().rfind('/') {
            Some(last_slash) => url.path()[..=last_slash].to_string(),
            None => "/".to_string(),
        };
        url.set_path(&directory);
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// `scheme://host[:port]` without a trailing slash.
    pub fn origin(&self) -> String {
        self.0.origin().ascii_serialization()
    }

    /// Resolves a resource against this base with standard relative
    /// reference rules.
    pub fn join(&self, resource: &str) -> Result<String, BaseUrlError> {
        self.0
            .join(resource.trim())
            .map(String::from)
            .map_err(|error| BaseUrlError::InvalidResource {
                resource: resource.to_string(),
                message: error.to_string(),
            })
    }
}

/// `http`/`https` url with a non-empty authority; query and fragment are
/// dropped.
fn parse_http_url(raw: &str) -> Result<Url, BaseUrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BaseUrlError::Empty);
    }
    let Some((scheme, remainder)) = trimmed.split_once("://") else {
        return Err(BaseUrlError::InvalidBaseUrl);
    };
    if !(scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")) {
        return Err(BaseUrlError::InvalidBaseUrl);
    }
    if remainder.trim().is_empty() || remainder.starts_with(['/', '?', '#']) {
        return Err(BaseUrlError::InvalidBaseUrl);
    }

    let mut url = Url::parse(trimmed).map_err(|_| BaseUrlError::InvalidBaseUrl)?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(BaseUrlError::InvalidBaseUrl);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaseUrl {
    type Err = BaseUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
