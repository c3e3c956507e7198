pub(crate) const PAGE_CONFIG_GLOBAL: &str = "__CMK_SIDEBAR_CONFIG__";
pub(crate) const STATUS_ELEMENT_ID: &str = "check_mk_sidebar_status";
pub(crate) const SIDEBAR_MOUNT_ID: &str = "check_mk_sidebar_content";
pub(crate) const STYLESHEET_LINK_ID: &str = "check_mk_sidebar_stylesheet";
pub(crate) const PANEL_ATTRIBUTE: &str = "data-cmk-panel";
pub(crate) const PANEL_SELECTOR: &str = "[data-cmk-panel]";
pub(crate) const PANEL_HEADER_SELECTOR: &str = "[data-cmk-panel-header]";
pub(crate) const PANEL_CONTENT_SELECTOR: &str = "[data-cmk-panel-content]";
pub(crate) const STRUCTURAL_HEADER_SELECTOR: &str = "h2";
pub(crate) const BOOT_TOTAL_BUDGET_MS: u64 = 2_000;
