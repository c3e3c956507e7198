#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("loader script context is unavailable: {0}")]
    MissingScriptContext(String),
    #[error("document operation failed: {0}")]
    Operation(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetLink {
    pub href: String,
    pub rel: &'static str,
    pub media_type: &'static str,
}

impl StylesheetLink {
    pub fn stylesheet(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: "stylesheet",
            media_type: "text/css",
        }
    }
}

/// The page document as seen by the sidebar bootstrap.
///
/// Implementations mutate the shared document tree through `&self`; the
/// page is single-threaded so no locking is involved.
pub trait DocumentSink {
    fn has_stylesheet(&self, href: &str) -> bool;

    fn append_stylesheet(&self, link: &StylesheetLink) -> Result<(), DocumentError>;

    /// Places markup verbatim immediately after the loader script so it
    /// lands in the same document order an inline write would produce.
    fn write_after_loader(&self, markup: &str) -> Result<(), DocumentError>;
}
