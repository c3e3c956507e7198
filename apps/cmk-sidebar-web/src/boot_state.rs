use cmk_sidebar_core::{ReloadStatus, SidebarContent, SidebarReport, SwitchOutcome};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct BootDiagnostics {
    pub phase: String,
    pub detail: String,
    pub boot_started_at_unix_ms: Option<u64>,
    pub boot_total_latency_ms: Option<u64>,
    pub base_url: Option<String>,
    pub stylesheet_href: Option<String>,
    pub sidebar_url: Option<String>,
    pub sidebar_bytes: Option<usize>,
    pub sidebar_error: Option<String>,
    pub panels_registered: usize,
    pub panel_lookup_failures: Vec<String>,
    pub site_switch_total: u64,
    pub site_switch_failures: u64,
    pub last_site_switch_url: Option<String>,
    pub last_frame_reload: Option<ReloadStatus>,
    pub last_error: Option<String>,
}

impl Default for BootDiagnostics {
    fn default() -> Self {
        Self {
            phase: "idle".to_string(),
            detail: "sidebar not started".to_string(),
            boot_started_at_unix_ms: None,
            boot_total_latency_ms: None,
            base_url: None,
            stylesheet_href: None,
            sidebar_url: None,
            sidebar_bytes: None,
            sidebar_error: None,
            panels_registered: 0,
            panel_lookup_failures: Vec::new(),
            site_switch_total: 0,
            site_switch_failures: 0,
            last_site_switch_url: None,
            last_frame_reload: None,
            last_error: None,
        }
    }
}

impl BootDiagnostics {
    pub fn set_phase(&mut self, phase: &str, detail: &str) {
        self.phase = phase.to_string();
        self.detail = detail.to_string();
        if phase != "error" {
            self.last_error = None;
        }
    }

    pub fn set_error(&mut self, message: &str) {
        self.phase = "error".to_string();
        self.detail = "sidebar bootstrap failed".to_string();
        self.last_error = Some(message.to_string());
    }

    pub fn record_load(&mut self, report: &SidebarReport) {
        self.stylesheet_href = Some(report.stylesheet.href().to_string());
        match &report.content {
            SidebarContent::Mounted { url, bytes } => {
                self.sidebar_url = Some(url.clone());
                self.sidebar_bytes = Some(*bytes);
                self.sidebar_error = None;
            }
            SidebarContent::Degraded { url, error } => {
                self.sidebar_url = Some(url.clone());
                self.sidebar_bytes = None;
                self.sidebar_error = Some(error.clone());
            }
        }
    }

    pub fn record_panels(&mut self, registered: usize, lookup_failures: Vec<String>) {
        self.panels_registered = registered;
        self.panel_lookup_failures = lookup_failures;
    }

    pub fn record_switch(&mut self, outcome: &SwitchOutcome) {
        self.site_switch_total = self.site_switch_total.saturating_add(1);
        if !outcome.switched() {
            self.site_switch_failures = self.site_switch_failures.saturating_add(1);
        }
        self.last_site_switch_url = Some(outcome.url.clone());
        self.last_frame_reload = Some(outcome.reload.clone());
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            "{\"phase\":\"error\",\"detail\":\"diagnostics serialization failed\"}".to_string()
        })
    }
}
