use std::sync::Arc;

use stockwise_infra::InventoryIntel;
use stockwise_intel::InventoryDataSource;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppServices {
    pub intel: InventoryIntel<dyn InventoryDataSource>,
}

impl AppServices {
    pub fn new(intel: InventoryIntel<dyn InventoryDataSource>) -> Self {
        Self { intel }
    }

    /// Convenience for tests/dev: default timeout, wall clock.
    pub fn from_source(source: Arc<dyn InventoryDataSource>) -> Self {
        Self::new(InventoryIntel::new(source))
    }
}
