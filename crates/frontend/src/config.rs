//! Frontend configuration

use nanostore_core::DashboardConfig;
use once_cell::sync::Lazy;

static CONFIG: Lazy<DashboardConfig> = Lazy::new(DashboardConfig::from_build_env);

/// Configuration compiled into this build
pub fn dashboard_config() -> &'static DashboardConfig {
    &CONFIG
}

/// UI timing
pub struct UiConfig;

impl UiConfig {
    /// How long a toast stays on screen
    pub const TOAST_TIMEOUT_MS: u32 = 5_000;

    /// How long the session warning toast stays on screen
    pub const WARNING_TOAST_TIMEOUT_MS: u32 = 10_000;

    /// Rows per report page
    pub const REPORT_PAGE_SIZE: u32 = nanostore_core::report::DEFAULT_PAGE_SIZE;
}
