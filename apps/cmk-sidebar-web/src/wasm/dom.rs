use super::*;

use web_sys::{Document, Element, HtmlLinkElement, HtmlScriptElement};

/// The live page: stylesheets go to `<head>`, sidebar markup goes into a
/// mount placed right after the loader script.
pub(super) struct WebDocument {
    document: Document,
    loader_id: String,
    anchor: Option<Element>,
    mount: RefCell<Option<Element>>,
}

impl WebDocument {
    pub(super) fn locate(loader_id: &str) -> Result<Self, String> {
        let window = web_sys::window().ok_or_else(|| "window is unavailable".to_string())?;
        let document = window
            .document()
            .ok_or_else(|| "document is unavailable".to_string())?;
        let anchor = document.get_element_by_id(loader_id);
        if anchor.is_none() {
            tracing::warn!(loader_id, "sidebar loader element not found");
        }
        Ok(Self {
            document,
            loader_id: loader_id.to_string(),
            anchor,
            mount: RefCell::new(None),
        })
    }

    /// The loader `<script>`: either the anchor itself or the first script
    /// inside the anchor container.
    fn loader_script(&self) -> Option<HtmlScriptElement> {
        let anchor = self.anchor.as_ref()?;
        if anchor.tag_name().eq_ignore_ascii_case("script") {
            return anchor.clone().dyn_into::<HtmlScriptElement>().ok();
        }
        anchor
            .query_selector("script")
            .ok()
            .flatten()
            .and_then(|script| script.dyn_into::<HtmlScriptElement>().ok())
    }

    pub(super) fn loader_script_src(&self) -> Option<String> {
        self.loader_script()
            .map(|script| script.src())
            .filter(|src| !src.trim().is_empty())
    }

    /// Where panels are discovered: the sidebar mount once written, the
    /// whole document otherwise.
    pub(super) fn panel_root(&self) -> Option<Element> {
        self.mount
            .borrow()
            .clone()
            .or_else(|| self.document.document_element())
    }

    fn stylesheet_parent(&self) -> Result<Element, DocumentError> {
        if let Some(head) = self.document.head() {
            return Ok(head.into());
        }
        self.document
            .body()
            .map(Into::into)
            .ok_or_else(|| DocumentError::Operation("document has neither head nor body".to_string()))
    }
}

impl DocumentSink for WebDocument {
    fn has_stylesheet(&self, href: &str) -> bool {
        let Ok(links) = self.document.query_selector_all("link[rel=\"stylesheet\"]") else {
            return false;
        };
        (0..links.length())
            .filter_map(|index| links.get(index))
            .filter_map(|node| node.dyn_into::<HtmlLinkElement>().ok())
            .any(|link| link.href() == href)
    }

    fn append_stylesheet(&self, link: &StylesheetLink) -> Result<(), DocumentError> {
        let element = self
            .document
            .create_element("link")
            .map_err(|_| DocumentError::Operation("failed to create link element".to_string()))?
            .dyn_into::<HtmlLinkElement>()
            .map_err(|_| DocumentError::Operation("link element is not HtmlLinkElement".to_string()))?;
        element.set_id(STYLESHEET_LINK_ID);
        element.set_rel(link.rel);
        element.set_type(link.media_type);
        element.set_href(&link.href);
        self.stylesheet_parent()?
            .append_child(&element)
            .map_err(|_| DocumentError::Operation("failed to append stylesheet link".to_string()))?;
        Ok(())
    }

    fn write_after_loader(&self, markup: &str) -> Result<(), DocumentError> {
        let anchor = self.anchor.as_ref().ok_or_else(|| {
            DocumentError::MissingScriptContext(format!("#{} is not in the document", self.loader_id))
        })?;

        let mount = match self.document.get_element_by_id(SIDEBAR_MOUNT_ID) {
            Some(existing) => existing,
            None => {
                let element = self.document.create_element("div").map_err(|_| {
                    DocumentError::Operation("failed to create sidebar mount".to_string())
                })?;
                element.set_id(SIDEBAR_MOUNT_ID);
                let placed = match self.loader_script() {
                    Some(script) => script
                        .insert_adjacent_element("afterend", &element)
                        .map(|_| ()),
                    None => anchor.append_child(&element).map(|_| ()),
                };
                placed.map_err(|_| {
                    DocumentError::Operation("failed to place sidebar mount".to_string())
                })?;
                element
            }
        };

        mount.set_inner_html(markup);
        *self.mount.borrow_mut() = Some(mount);
        Ok(())
    }
}

/// Panel body element. Hidden state is read from the computed style so
/// stylesheet-hidden panels count as hidden too.
pub(super) struct WebPanelContent(HtmlElement);

impl PanelRegion for WebPanelContent {
    fn is_hidden(&self) -> bool {
        let computed = web_sys::window()
            .and_then(|window| window.get_computed_style(&self.0).ok().flatten())
            .and_then(|style| style.get_property_value("display").ok());
        match computed {
            Some(display) => display == "none",
            None => self
                .0
                .style()
                .get_property_value("display")
                .is_ok_and(|display| display == "none"),
        }
    }

    fn set_hidden(&self, hidden: bool) -> Result<(), DocumentError> {
        let style = self.0.style();
        if hidden {
            return style
                .set_property("display", "none")
                .map_err(|_| DocumentError::Operation("failed to hide panel content".to_string()));
        }

        style
            .remove_property("display")
            .map_err(|_| DocumentError::Operation("failed to show panel content".to_string()))?;
        // The stylesheet may hide the region by default; override it inline.
        if self.is_hidden() {
            style
                .set_property("display", "block")
                .map_err(|_| DocumentError::Operation("failed to show panel content".to_string()))?;
        }
        Ok(())
    }
}

pub(super) type WebPanel = Panel<HtmlElement, WebPanelContent>;

/// Collects the panels below `root`. Panels marked up with explicit panel
/// attributes come first; plain server markup falls back to the structural
/// header -> content association. Incomplete panels are reported by id and
/// skipped.
pub(super) fn discover_panels(root: &Element) -> (Vec<WebPanel>, Vec<String>) {
    let mut panels = Vec::new();
    let mut failures = Vec::new();
    discover_marked_panels(root, &mut panels, &mut failures);
    discover_structural_panels(root, &mut panels, &mut failures);
    (panels, failures)
}

fn discover_marked_panels(root: &Element, panels: &mut Vec<WebPanel>, failures: &mut Vec<String>) {
    let Ok(nodes) = root.query_selector_all(PANEL_SELECTOR) else {
        return;
    };

    for index in 0..nodes.length() {
        let Some(element) = nodes
            .get(index)
            .and_then(|node| node.dyn_into::<Element>().ok())
        else {
            continue;
        };
        let panel_id = element
            .get_attribute(PANEL_ATTRIBUTE)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("panel-{index}"));

        let header = find_html_element(&element, PANEL_HEADER_SELECTOR);
        let content = find_html_element(&element, PANEL_CONTENT_SELECTOR);
        match (header, content) {
            (Some(header), Some(content)) => {
                panels.push(Panel::new(panel_id, header, WebPanelContent(content)));
            }
            (header, content) => {
                tracing::warn!(
                    panel = %panel_id,
                    has_header = header.is_some(),
                    has_content = content.is_some(),
                    "sidebar panel markup is incomplete; toggle disabled"
                );
                failures.push(panel_id);
            }
        }
    }
}

fn discover_structural_panels(
    root: &Element,
    panels: &mut Vec<WebPanel>,
    failures: &mut Vec<String>,
) {
    let Ok(headers) = root.query_selector_all(STRUCTURAL_HEADER_SELECTOR) else {
        return;
    };

    for index in 0..headers.length() {
        let Some(header) = headers
            .get(index)
            .and_then(|node| node.dyn_into::<HtmlElement>().ok())
        else {
            continue;
        };
        if header.closest(PANEL_SELECTOR).ok().flatten().is_some() {
            continue;
        }
        let Some(parent) = header.parent_element() else {
            continue;
        };
        let panel_id = Some(parent.id())
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("snapin-{index}"));

        let children = parent.child_nodes();
        let lookup = panel_from_structure(panel_id.clone(), header, |offset| {
            children
                .item(offset)
                .and_then(|node| node.dyn_into::<HtmlElement>().ok())
                .map(WebPanelContent)
        });
        match lookup {
            Ok(panel) => panels.push(panel),
            Err(error) => {
                tracing::warn!(panel = %panel_id, %error, "sidebar panel structural lookup failed; toggle disabled");
                failures.push(panel_id);
            }
        }
    }
}

fn find_html_element(parent: &Element, selector: &str) -> Option<HtmlElement> {
    parent
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
}
