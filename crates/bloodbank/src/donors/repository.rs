use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{BloodType, DonorId, DonorRecord};
use crate::storage::RepositoryError;

/// Listing filter mirroring the donor table controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorFilter {
    #[serde(default, deserialize_with = "query_blood_type")]
    pub blood_type: Option<BloodType>,
    #[serde(default)]
    pub eligible: Option<bool>,
}

impl DonorFilter {
    pub fn matches(&self, donor: &DonorRecord) -> bool {
        self.blood_type
            .map_or(true, |blood_type| donor.blood_type == blood_type)
            && self.eligible.map_or(true, |flag| donor.is_eligible == flag)
    }
}

/// An unescaped `+` in a query string decodes to a space, so `?blood_type=O+` arrives as `"O "`.
fn query_blood_type<'de, D>(deserializer: D) -> Result<Option<BloodType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.map(|value| {
        let label = match value.strip_suffix(' ') {
            Some(group) if !group.trim().is_empty() => format!("{}+", group.trim()),
            _ => value,
        };
        label.parse::<BloodType>().map_err(serde::de::Error::custom)
    })
    .transpose()
}

/// Storage abstraction for donor records.
pub trait DonorRepository: Send + Sync {
    fn insert(&self, record: DonorRecord) -> Result<DonorRecord, RepositoryError>;
    /// Replace the stored row only if its version still equals `expected_version`.
    fn update(
        &self,
        record: DonorRecord,
        expected_version: u64,
    ) -> Result<DonorRecord, RepositoryError>;
    fn fetch(&self, id: &DonorId) -> Result<Option<DonorRecord>, RepositoryError>;
    /// Donors matching `filter`, ordered by id.
    fn list(&self, filter: &DonorFilter) -> Result<Vec<DonorRecord>, RepositoryError>;
}
