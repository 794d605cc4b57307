pub mod blood_type;
pub mod donor;
pub mod stock;

pub use blood_type::{AboGroup, BloodType, BloodTypeParseError, RhFactor};
pub use donor::{DonorId, DonorRecord};
pub use stock::{Availability, BloodStock, StockLevels, StockStatus, StockThresholds};
