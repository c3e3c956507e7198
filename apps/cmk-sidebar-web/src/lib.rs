#[cfg(any(target_arch = "wasm32", test))]
mod boot_state;
#[cfg(target_arch = "wasm32")]
mod wasm_constants;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use cmk_sidebar_core::{
        ContentFetcher, DocumentError, DocumentSink, FetchError, FrameError, FrameReloader, Panel,
        PanelRegion, PanelRegistry, SidebarConfig, SidebarLoader, SiteSwitcher, StylesheetLink,
        panel_from_structure,
    };
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::HtmlElement;
    use web_time::Instant;

    use crate::boot_state::BootDiagnostics;
    use crate::wasm_constants::*;

    mod dom;
    mod frames;
    mod lifecycle;
    mod network;

    use dom::{WebDocument, WebPanelContent, discover_panels};
    use frames::NamedFrame;
    use lifecycle::*;
    use network::GlooFetcher;

    type WebSiteSwitcher = SiteSwitcher<GlooFetcher, NamedFrame>;

    thread_local! {
        static DIAGNOSTICS: RefCell<BootDiagnostics> = RefCell::new(BootDiagnostics::default());
        static PANELS: RefCell<PanelRegistry<HtmlElement, WebPanelContent>> = RefCell::new(PanelRegistry::new());
        static PANEL_CLICK_HANDLERS: RefCell<Vec<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(Vec::new()) };
        static SITE_SWITCHER: RefCell<Option<Rc<WebSiteSwitcher>>> = const { RefCell::new(None) };
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
        set_boot_phase("booting", "reading sidebar configuration");

        let config = match load_page_config() {
            Ok(config) => config,
            Err(error) => {
                set_boot_error(&error);
                return;
            }
        };
        install_site_switcher(&config);

        spawn_local(async move {
            if let Err(error) = boot(config).await {
                set_boot_error(&error);
            }
        });
    }

    /// Styling, sidebar markup and panel wiring run strictly in order; the
    /// sidebar is declared interactive only after the markup is in place.
    async fn boot(config: SidebarConfig) -> Result<(), String> {
        let boot_started_at = Instant::now();
        DIAGNOSTICS.with(|state| {
            let mut state = state.borrow_mut();
            state.boot_started_at_unix_ms = Some(now_unix_ms());
            state.boot_total_latency_ms = None;
        });

        let document = WebDocument::locate(&config.loader_script_id)?;
        let base = config
            .resolve_base_url(document.loader_script_src().as_deref())
            .map_err(|error| error.to_string())?;
        DIAGNOSTICS.with(|state| state.borrow_mut().base_url = Some(base.to_string()));

        let fetcher = GlooFetcher::new(config.fetch_timeout_ms);
        let loader = SidebarLoader::new(&base, &config.endpoints, fetcher)
            .map_err(|error| error.to_string())?;
        set_boot_phase("loading", loader.sidebar_url());
        let report = loader
            .load(&document)
            .await
            .map_err(|error| error.to_string())?;
        DIAGNOSTICS.with(|state| state.borrow_mut().record_load(&report));

        let registered = install_panels(&document);
        let detail = if report.is_mounted() {
            format!("sidebar mounted, {registered} panels")
        } else {
            format!("sidebar unavailable, {registered} panels")
        };
        set_boot_phase("interactive", &detail);

        let elapsed_ms = u64::try_from(boot_started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        record_boot_latency(elapsed_ms, BOOT_TOTAL_BUDGET_MS);
        Ok(())
    }

    fn install_site_switcher(config: &SidebarConfig) {
        let switcher = SiteSwitcher::new(
            GlooFetcher::new(config.fetch_timeout_ms),
            NamedFrame::new(config.reload_frame.clone()),
            config.endpoints.clone(),
            config.reload_policy,
        );
        SITE_SWITCHER.with(|slot| *slot.borrow_mut() = Some(Rc::new(switcher)));
    }

    fn install_panels(document: &WebDocument) -> usize {
        let Some(root) = document.panel_root() else {
            return 0;
        };
        let (panels, mut failures) = discover_panels(&root);

        PANEL_CLICK_HANDLERS.with(|handlers| handlers.borrow_mut().clear());
        let registered = PANELS.with(|registry| {
            let mut registry = registry.borrow_mut();
            registry.clear();
            let unwired = registry.register_wired(panels, |panel| {
                let panel_id = panel.id().to_string();
                let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
                    toggle_panel(&panel_id);
                }));
                panel
                    .header()
                    .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())
                    .map_err(|error| format!("click handler not attached: {error:?}"))?;
                PANEL_CLICK_HANDLERS.with(|handlers| handlers.borrow_mut().push(callback));
                Ok::<(), String>(())
            });
            failures.extend(unwired);
            registry.len()
        });

        DIAGNOSTICS.with(|state| state.borrow_mut().record_panels(registered, failures));
        registered
    }

    fn toggle_panel(panel_id: &str) -> Option<&'static str> {
        PANELS
            .with(|registry| registry.borrow().toggle(panel_id))
            .map(|visibility| visibility.as_str())
    }

    /// Toggles a sidebar panel by id or by its header element; returns
    /// `"shown"`, `"hidden"`, or `undefined` when no such panel is registered.
    #[wasm_bindgen]
    pub fn toggle_sidebar_snapin(target: JsValue) -> Option<String> {
        let panel_id = match target.as_string() {
            Some(panel_id) => panel_id,
            None => PANELS.with(|registry| {
                registry
                    .borrow()
                    .id_for_header(|header| AsRef::<JsValue>::as_ref(header) == &target)
                    .map(str::to_string)
            })?,
        };
        toggle_panel(&panel_id).map(str::to_string)
    }

    /// Switches the server-side site context and reloads the content frame.
    /// Resolves to whether the server accepted the switch.
    #[wasm_bindgen]
    pub async fn switch_site(base_uri: String, token: String) -> Result<bool, JsValue> {
        let Some(switcher) = SITE_SWITCHER.with(|slot| slot.borrow().clone()) else {
            return Err(JsValue::from_str("sidebar is not initialized"));
        };
        let outcome = switcher
            .switch_raw(&base_uri, &token)
            .await
            .map_err(|error| JsValue::from_str(&error.to_string()))?;
        DIAGNOSTICS.with(|state| state.borrow_mut().record_switch(&outcome));
        Ok(outcome.switched())
    }

    #[wasm_bindgen]
    pub fn boot_diagnostics_json() -> String {
        DIAGNOSTICS.with(|state| state.borrow().to_json())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::boot_diagnostics_json;

#[cfg(not(target_arch = "wasm32"))]
pub fn boot_diagnostics_json() -> String {
    "{\"phase\":\"native\",\"detail\":\"sidebar diagnostics only available on wasm\"}".to_string()
}
