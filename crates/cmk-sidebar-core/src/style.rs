use serde::Serialize;

use crate::base_url::{BaseUrl, BaseUrlError};
use crate::document::{DocumentError, DocumentSink, StylesheetLink};
use crate::endpoints::Endpoints;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    #[error("failed to attach stylesheet {href}: {source}")]
    Attach {
        href: String,
        #[source]
        source: DocumentError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StyleOutcome {
    Injected { href: String },
    AlreadyPresent { href: String },
}

impl StyleOutcome {
    pub fn href(&self) -> &str {
        match self {
            Self::Injected { href } | Self::AlreadyPresent { href } => href,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StyleInjector {
    href: String,
}

impl StyleInjector {
    pub fn new(base: &BaseUrl, endpoints: &Endpoints) -> Result<Self, BaseUrlError> {
        Ok(Self {
            href: endpoints.stylesheet_url(base)?,
        })
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    /// Links the sidebar stylesheet into the document. Running it again on
    /// the same page adds nothing.
    pub fn inject(&self, document: &impl DocumentSink) -> Result<StyleOutcome, StyleError> {
        if document.has_stylesheet(&self.href) {
            tracing::debug!(href = %self.href, "sidebar stylesheet already linked");
            return Ok(StyleOutcome::AlreadyPresent {
                href: self.href.clone(),
            });
        }

        document
            .append_stylesheet(&StylesheetLink::stylesheet(self.href.clone()))
            .map_err(|source| StyleError::Attach {
                href: self.href.clone(),
                source,
            })?;
        tracing::debug!(href = %self.href, "sidebar stylesheet linked");
        Ok(StyleOutcome::Injected {
            href: self.href.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::testing::MemoryDocument;

    #[test]
    fn injects_stylesheet_next_to_base_url() -> anyhow::Result<()> {
        let base = BaseUrl::parse("https://monitor.example/ui/")?;
        let document = MemoryDocument::default();
        let injector = StyleInjector::new(&base, &Endpoints::default())?;

        let outcome = injector.inject(&document)?;

        assert_eq!(
            outcome,
            StyleOutcome::Injected {
                href: "https://monitor.example/ui/check_mk.css".to_string()
            }
        );
        let links = document.stylesheets.borrow();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "https://monitor.example/ui/check_mk.css");
        assert_eq!(links[0].rel, "stylesheet");
        assert_eq!(links[0].media_type, "text/css");
        Ok(())
    }

    #[test]
    fn stylesheet_href_follows_every_base_url() -> anyhow::Result<()> {
        for raw in [
            "http://localhost/",
            "https://monitor.example/ui/",
            "https://monitor.example:5000/prod/check_mk/",
        ] {
            let base = BaseUrl::parse(raw)?;
            let injector = StyleInjector::new(&base, &Endpoints::default())?;
            assert_eq!(injector.href(), format!("{raw}check_mk.css"));
        }
        Ok(())
    }

    #[test]
    fn second_injection_links_nothing() -> anyhow::Result<()> {
        let base = BaseUrl::parse("https://monitor.example/ui/")?;
        let document = MemoryDocument::default();
        let injector = StyleInjector::new(&base, &Endpoints::default())?;

        injector.inject(&document)?;
        let second = injector.inject(&document)?;

        assert!(matches!(second, StyleOutcome::AlreadyPresent { .. }));
        assert_eq!(document.stylesheets.borrow().len(), 1);
        Ok(())
    }

    #[test]
    fn document_failure_is_reported_not_skipped() -> anyhow::Result<()> {
        let base = BaseUrl::parse("https://monitor.example/ui/")?;
        let document = MemoryDocument::default();
        document.fail_styles.set(true);

        let result = StyleInjector::new(&base, &Endpoints::default())?.inject(&document);

        assert!(matches!(result, Err(StyleError::Attach { ref href, .. }) if href == "https://monitor.example/ui/check_mk.css"));
        assert!(document.stylesheets.borrow().is_empty());
        Ok(())
    }

    #[test]
    fn mixed_case_base_yields_normalized_href_and_single_link() -> anyhow::Result<()> {
        let base = BaseUrl::parse("HTTPS://Monitor.example/UI/")?;
        let document = MemoryDocument::default();
        let injector = StyleInjector::new(&base, &Endpoints::default())?;

        assert_eq!(injector.href(), "https://monitor.example/UI/check_mk.css");
        document.stylesheets.borrow_mut().push(StylesheetLink::stylesheet(
            "https://monitor.example/UI/check_mk.css".to_string(),
        ));
        let outcome = injector.inject(&document)?;

        assert!(matches!(outcome, StyleOutcome::AlreadyPresent { .. }));
        assert_eq!(document.stylesheets.borrow().len(), 1);
        Ok(())
    }
}
