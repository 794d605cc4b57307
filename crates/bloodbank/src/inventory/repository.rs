use serde::{Deserialize, Serialize};

use crate::domain::{BloodStock, BloodType};
use crate::storage::RepositoryError;

/// Read-side filter over stock rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockFilter {
    /// Keep rows whose available units are strictly below this value.
    pub available_below: Option<u32>,
}

impl StockFilter {
    pub fn matches(&self, stock: &BloodStock) -> bool {
        self.available_below
            .map_or(true, |limit| stock.available_units < limit)
    }
}

/// Storage abstraction for per-blood-type stock rows.
///
/// `update` is a compare-and-swap: it succeeds only while the stored row still carries
/// `expected_version`, bumps the version and returns the stored row.
pub trait StockRepository: Send + Sync {
    fn fetch(&self, blood_type: BloodType) -> Result<Option<BloodStock>, RepositoryError>;
    fn update(&self, stock: BloodStock, expected_version: u64)
        -> Result<BloodStock, RepositoryError>;
    /// Rows matching `filter`, ordered by blood type.
    fn list(&self, filter: &StockFilter) -> Result<Vec<BloodStock>, RepositoryError>;
}
