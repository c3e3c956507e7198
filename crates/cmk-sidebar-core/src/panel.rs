use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::document::DocumentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelVisibility {
    Shown,
    Hidden,
}

impl PanelVisibility {
    pub fn from_hidden(hidden: bool) -> Self {
        if hidden { Self::Hidden } else { Self::Shown }
    }

    pub fn is_hidden(self) -> bool {
        self == Self::Hidden
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Shown => Self::Hidden,
            Self::Hidden => Self::Shown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shown => "shown",
            Self::Hidden => "hidden",
        }
    }
}

/// The collapsible body of a panel.
pub trait PanelRegion {
    /// Whether the region is currently rendered hidden.
    fn is_hidden(&self) -> bool;

    /// Applies (`true`) or clears (`false`) the hidden styling.
    fn set_hidden(&self, hidden: bool) -> Result<(), DocumentError>;
}

/// Child-node index of a panel's content region below the header's parent,
/// as laid out by the server markup: text, header, text, content.
pub const STRUCTURAL_CONTENT_OFFSET: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PanelLookupError {
    #[error("panel `{panel}` has no content region at child node {offset} of its header's parent")]
    MissingContent { panel: String, offset: u32 },
}

/// Builds a panel from markup without explicit panel attributes: the
/// content region is the parent's child node at
/// [`STRUCTURAL_CONTENT_OFFSET`], looked up through `child_at`.
pub fn panel_from_structure<H, C: PanelRegion>(
    id: impl Into<String>,
    header: H,
    child_at: impl FnOnce(u32) -> Option<C>,
) -> Result<Panel<H, C>, PanelLookupError> {
    let id = id.into();
    match child_at(STRUCTURAL_CONTENT_OFFSET) {
        Some(content) => Ok(Panel::new(id, header, content)),
        None => Err(PanelLookupError::MissingContent {
            panel: id,
            offset: STRUCTURAL_CONTENT_OFFSET,
        }),
    }
}

/// One sidebar panel with its header and content held explicitly.
#[derive(Debug, Clone)]
pub struct Panel<H, C> {
    id: String,
    header: H,
    content: C,
}

impl<H, C: PanelRegion> Panel<H, C> {
    pub fn new(id: impl Into<String>, header: H, content: C) -> Self {
        Self {
            id: id.into(),
            header,
            content,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn header(&self) -> &H {
        &self.header
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    pub fn visibility(&self) -> PanelVisibility {
        PanelVisibility::from_hidden(self.content.is_hidden())
    }

    /// Flips the content region between shown and hidden, reading the
    /// current state from the rendered region on every call.
    pub fn toggle(&self) -> Result<PanelVisibility, DocumentError> {
        let next = self.visibility().toggled();
        self.content.set_hidden(next.is_hidden())?;
        Ok(next)
    }
}

#[derive(Debug)]
pub struct PanelRegistry<H, C> {
    panels: BTreeMap<String, Panel<H, C>>,
}

impl<H, C> Default for PanelRegistry<H, C> {
    fn default() -> Self {
        Self {
            panels: BTreeMap::new(),
        }
    }
}

impl<H, C: PanelRegion> PanelRegistry<H, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a panel, returning the one it replaced under the same id.
    pub fn register(&mut self, panel: Panel<H, C>) -> Option<Panel<H, C>> {
        self.panels.insert(panel.id.clone(), panel)
    }

    pub fn get(&self, id: &str) -> Option<&Panel<H, C>> {
        self.panels.get(id)
    }

    /// Registers every panel whose `wire` step (e.g. attaching the header
    /// click handler) succeeds. Panels that cannot be wired stay
    /// unregistered; their ids are returned.
    pub fn register_wired<E: Display>(
        &mut self,
        panels: impl IntoIterator<Item = Panel<H, C>>,
        mut wire: impl FnMut(&Panel<H, C>) -> Result<(), E>,
    ) -> Vec<String> {
        let mut unwired = Vec::new();
        for panel in panels {
            if let Err(error) = wire(&panel) {
                tracing::warn!(panel = %panel.id, %error, "sidebar panel could not be wired; toggle disabled");
                unwired.push(panel.id);
                continue;
            }
            self.register(panel);
        }
        unwired
    }

    /// Id of the first panel whose header satisfies `matches`.
    pub fn id_for_header(&self, matches: impl Fn(&H) -> bool) -> Option<&str> {
        self.panels
            .values()
            .find(|panel| matches(&panel.header))
            .map(|panel| panel.id.as_str())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.panels.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn clear(&mut self) {
        self.panels.clear();
    }

    /// Toggles the panel registered under `id`. Unknown panels and failed
    /// style writes leave the page untouched and are only logged.
    pub fn toggle(&self, id: &str) -> Option<PanelVisibility> {
        let Some(panel) = self.panels.get(id) else {
            tracing::warn!(panel = id, "toggle requested for unknown sidebar panel");
            return None;
        };
        match panel.toggle() {
            Ok(visibility) => {
                tracing::debug!(panel = id, visibility = visibility.as_str(), "sidebar panel toggled");
                Some(visibility)
            }
            Err(error) => {
                tracing::warn!(panel = id, %error, "sidebar panel content could not be toggled");
                None
            }
        }
    }
}
