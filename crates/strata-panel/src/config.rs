//! Runtime configuration.

use strata_input::{InputMap, actions};

/// Settings a [`PanelRuntime`](crate::PanelRuntime) starts with.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Action used by cancel registrations and close-with-cancel.
    pub cancel_action: String,
    /// Action table consulted when routing input.
    pub input_map: InputMap,
    /// Maximum parked items per type in the scratch pool. `None` is unbounded.
    pub pool_limit: Option<usize>,
    /// Parked items kept per type after each `update`. `None` never trims.
    pub pool_high_water: Option<usize>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            cancel_action: actions::UI_CANCEL.to_owned(),
            input_map: InputMap::with_ui_defaults(),
            pool_limit: Some(64),
            pool_high_water: Some(16),
        }
    }
}

impl RuntimeConfig {
    pub fn with_cancel_action(mut self, action: impl Into<String>) -> Self {
        self.cancel_action = action.into();
        self
    }

    pub fn with_input_map(mut self, input_map: InputMap) -> Self {
        self.input_map = input_map;
        self
    }

    pub fn with_pool_limit(mut self, limit: Option<usize>) -> Self {
        self.pool_limit = limit;
        self
    }

    pub fn with_pool_high_water(mut self, high_water: Option<usize>) -> Self {
        self.pool_high_water = high_water;
        self
    }
}
