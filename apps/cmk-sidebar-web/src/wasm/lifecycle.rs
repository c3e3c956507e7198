use super::*;

pub(super) fn set_boot_phase(phase: &str, detail: &str) {
    DIAGNOSTICS.with(|state| state.borrow_mut().set_phase(phase, detail));
    tracing::info!(phase, detail, "sidebar boot phase");
    update_status_dom(phase, detail, false);
}

pub(super) fn set_boot_error(message: &str) {
    DIAGNOSTICS.with(|state| state.borrow_mut().set_error(message));
    tracing::error!(error = message, "sidebar bootstrap failed");
    update_status_dom("error", message, true);
}

/// Mirrors boot progress into the optional status element a page may
/// provide for operators.
pub(super) fn update_status_dom(phase: &str, detail: &str, is_error: bool) {
    let Some(status) = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(STATUS_ELEMENT_ID))
        .and_then(|status| status.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };
    let label = if is_error { "Sidebar error" } else { "Sidebar" };
    status.set_inner_text(&format!("{label}: {phase} ({detail})"));
    let _ = status
        .set_attribute("data-state", if is_error { "error" } else { phase });
}

pub(super) fn record_boot_latency(actual_ms: u64, budget_ms: u64) {
    DIAGNOSTICS.with(|state| state.borrow_mut().boot_total_latency_ms = Some(actual_ms));
    if actual_ms > budget_ms {
        tracing::warn!(actual_ms, budget_ms, "sidebar boot exceeded its latency budget");
    }
}

pub(super) fn now_unix_ms() -> u64 {
    let now = js_sys::Date::now();
    if !now.is_finite() || now.is_sign_negative() {
        return 0;
    }
    now.floor().min(u64::MAX as f64) as u64
}

/// Reads the page-provided configuration from `window.__CMK_SIDEBAR_CONFIG__`,
/// which may be a JSON string or a plain object. Absent means defaults.
pub(super) fn load_page_config() -> Result<SidebarConfig, String> {
    let Some(window) = web_sys::window() else {
        return Err("window is unavailable".to_string());
    };
    let value = js_sys::Reflect::get(&window, &JsValue::from_str(PAGE_CONFIG_GLOBAL))
        .map_err(|_| format!("{PAGE_CONFIG_GLOBAL} is not readable"))?;
    if value.is_undefined() || value.is_null() {
        return Ok(SidebarConfig::default());
    }

    let raw = match value.as_string() {
        Some(raw) => raw,
        None => js_sys::JSON::stringify(&value)
            .ok()
            .and_then(|json| json.as_string())
            .ok_or_else(|| format!("{PAGE_CONFIG_GLOBAL} cannot be serialized"))?,
    };
    SidebarConfig::from_json(&raw).map_err(|error| error.to_string())
}
