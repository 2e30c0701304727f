//! Dashboard summary
//!
//! Loads the catalog counts and the admin profile one call at a time, pausing
//! between calls so a cold load does not trip the backend's rate limit. A
//! failed call counts as an empty collection and is recorded for display.

use std::time::Duration;
use tracing::{debug, warn};

use crate::api::models::UserProfile;
use crate::api::Api;
use crate::gateway::ApiError;

/// Pause between the sequential dashboard calls
pub const DEFAULT_CALL_DELAY: Duration = Duration::from_secs(1);

/// Shown when every collection came back empty
pub const RATE_LIMIT_HINT: &str =
    "Unable to load data. You may be rate limited. Please wait a few minutes and try again.";

/// A dashboard section that failed to load
#[derive(Debug, Clone, PartialEq)]
pub struct SectionFailure {
    pub section: &'static str,
    pub error: ApiError,
}

/// Counts and profile for the dashboard landing view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSummary {
    pub main_categories: usize,
    pub sub_categories: usize,
    pub services: usize,
    pub profile: Option<UserProfile>,
    pub failures: Vec<SectionFailure>,
    /// Set when all three collections are empty
    pub warning: Option<String>,
}

impl DashboardSummary {
    fn record<T>(&mut self, section: &'static str, result: Result<T, ApiError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                if error.is_rate_limited() {
                    warn!("Rate limited for {section}, will retry later");
                } else {
                    warn!("{section} fetch failed: {error}");
                }
                self.failures.push(SectionFailure { section, error });
                None
            }
        }
    }
}

/// Loads the dashboard sequentially with `delay` after each catalog call
pub async fn load_dashboard(api: &Api, delay: Duration) -> DashboardSummary {
    let mut summary = DashboardSummary::default();

    let result = api.main_categories.list().await;
    summary.main_categories = summary.record("main categories", result).map_or(0, |v| v.len());
    debug!("Main categories loaded: {}", summary.main_categories);
    tokio::time::sleep(delay).await;

    let result = api.sub_categories.list().await;
    summary.sub_categories = summary.record("sub categories", result).map_or(0, |v| v.len());
    debug!("Sub categories loaded: {}", summary.sub_categories);
    tokio::time::sleep(delay).await;

    let result = api.services.list().await;
    summary.services = summary.record("services", result).map_or(0, |v| v.len());
    debug!("Services loaded: {}", summary.services);
    tokio::time::sleep(delay).await;

    let result = api.auth.profile().await;
    summary.profile = summary.record("profile", result);

    if summary.main_categories == 0 && summary.sub_categories == 0 && summary.services == 0 {
        warn!("All catalog calls came back empty - the backend may be rate limiting");
        summary.warning = Some(RATE_LIMIT_HINT.to_string());
    }

    summary
}
