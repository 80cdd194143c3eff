use crate::config::{AppConfig, HelperConfig};
use crate::error::AppResult;
use crate::organization::Organization;

/// Shared state for one helper run: the parsed configuration plus lookup of
/// the helper entry and its organization bundle.
pub struct AppContext {
    pub config: AppConfig,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn helper(&self, kind: &str, name: Option<&str>) -> AppResult<&HelperConfig> {
        self.config.helper(kind, name)
    }

    pub fn organization_for(&self, helper: &HelperConfig) -> AppResult<Organization> {
        let config = self.config.organization(&helper.organization)?;
        Organization::from_config(&helper.organization, config)
    }
}
