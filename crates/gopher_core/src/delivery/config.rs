//! Runtime configuration of the delivery coordinator.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Behaviour tree tick period in milliseconds.
    pub tick_period_ms: u64,
    /// Express mode: do not hold at stops for the go button.
    pub express: bool,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self { tick_period_ms: 500, express: false }
    }
}
