use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::blood_type::BloodType;

/// Identifier wrapper for registered donors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DonorId(pub String);

impl std::fmt::Display for DonorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Donor as stored by the persistence layer.
///
/// `date_of_birth` is optional because rows imported from older intake forms may lack it; the
/// eligibility evaluator rejects such donors as invalid input rather than guessing an age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorRecord {
    pub donor_id: DonorId,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub weight_kg: f64,
    pub blood_type: BloodType,
    pub last_donation_date: Option<NaiveDate>,
    pub is_eligible: bool,
    pub total_donations: u32,
    /// Bumped by every stored update; writes carry the version they were based on.
    #[serde(default)]
    pub version: u64,
}
