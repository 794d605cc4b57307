use serde::{Deserialize, Serialize};

/// Donor screening thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityPolicy {
    pub minimum_age: i32,
    pub maximum_age: i32,
    pub minimum_weight_kg: f64,
    pub donation_interval_days: i64,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            minimum_age: 18,
            maximum_age: 65,
            minimum_weight_kg: 50.0,
            donation_interval_days: 90,
        }
    }
}
