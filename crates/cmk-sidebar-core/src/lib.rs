//! Core of the monitoring UI sidebar bootstrap.
//!
//! Everything here is independent of the browser: the DOM, the HTTP
//! transport and the content frame are reached through the
//! [`DocumentSink`], [`ContentFetcher`], [`PanelRegion`] and
//! [`FrameReloader`] traits, which the web shell implements with `web-sys`.

pub mod base_url;
pub mod config;
pub mod document;
pub mod endpoints;
pub mod fetch;
pub mod graph_template;
pub mod loader;
pub mod panel;
pub mod site_switch;
pub mod style;

pub use base_url::{BaseUrl, BaseUrlError};
pub use config::{ConfigError, SidebarConfig};
pub use document::{DocumentError, DocumentSink, StylesheetLink};
pub use endpoints::Endpoints;
pub use fetch::{ContentFetcher, FetchError, with_timeout};
pub use loader::{LoadError, SidebarContent, SidebarLoader, SidebarReport};
pub use panel::{
    Panel, PanelLookupError, PanelRegion, PanelRegistry, PanelVisibility,
    STRUCTURAL_CONTENT_OFFSET, panel_from_structure,
};
pub use site_switch::{
    FrameError, FrameReloader, ReloadPolicy, ReloadStatus, SiteSwitcher, SiteToken,
    SiteTokenError, SwitchError, SwitchOutcome,
};
pub use style::{StyleError, StyleInjector, StyleOutcome};
