use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_num_of_esims() -> u32 {
    1
}

/// What the checkout asks the engine to price.
///
/// `customer` is an open attribute bag (loyalty tier, device model, ...) that
/// rule conditions can reference by dot path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRequest {
    #[serde(default)]
    pub country_iso: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    pub requested_duration_days: u32,
    #[serde(default = "default_num_of_esims")]
    pub num_of_esims: u32,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub customer: Map<String, Value>,
}

impl PricingRequest {
    pub fn for_days(days: u32) -> Self {
        Self {
            country_iso: None,
            region: None,
            requested_duration_days: days,
            num_of_esims: 1,
            payment_method: None,
            customer: Map::new(),
        }
    }

    /// Number of eSIMs in the order, never zero.
    pub fn quantity(&self) -> u32 {
        self.num_of_esims.max(1)
    }
}
