use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::RepositoryError;
use crate::domain::{BloodStock, BloodType, DonorId, DonorRecord, StockLevels};
use crate::donors::{DonorFilter, DonorRepository};
use crate::inventory::{StockFilter, StockRepository};

fn lock<'a, T>(
    mutex: &'a Mutex<T>,
    store: &str,
) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{store} lock poisoned")))
}

/// Stock rows held in process memory, keyed by blood type.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStockRepository {
    records: Arc<Mutex<BTreeMap<BloodType, BloodStock>>>,
}

impl InMemoryStockRepository {
    /// One zeroed row per blood type, as provisioned at system setup.
    pub fn provisioned(now: DateTime<Utc>) -> Self {
        let records = BloodType::ALL
            .into_iter()
            .map(|blood_type| (blood_type, BloodStock::empty(blood_type, now)))
            .collect();
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    /// Seed or overwrite a row outside the ledger; the version restarts at zero.
    pub fn seed(
        &self,
        blood_type: BloodType,
        levels: StockLevels,
        now: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records, "stock")?;
        guard.insert(blood_type, BloodStock::with_levels(blood_type, levels, now));
        Ok(())
    }
}

impl StockRepository for InMemoryStockRepository {
    fn fetch(&self, blood_type: BloodType) -> Result<Option<BloodStock>, RepositoryError> {
        let guard = lock(&self.records, "stock")?;
        Ok(guard.get(&blood_type).cloned())
    }

    fn update(
        &self,
        mut stock: BloodStock,
        expected_version: u64,
    ) -> Result<BloodStock, RepositoryError> {
        let mut guard = lock(&self.records, "stock")?;
        let current = guard
            .get_mut(&stock.blood_type)
            .ok_or(RepositoryError::NotFound)?;

        if current.version != expected_version {
            return Err(RepositoryError::VersionConflict {
                expected: expected_version,
                found: current.version,
            });
        }

        stock.version = expected_version + 1;
        *current = stock.clone();
        Ok(stock)
    }

    fn list(&self, filter: &StockFilter) -> Result<Vec<BloodStock>, RepositoryError> {
        let guard = lock(&self.records, "stock")?;
        Ok(guard
            .values()
            .filter(|stock| filter.matches(stock))
            .cloned()
            .collect())
    }
}

/// Donor records held in process memory, keyed by id.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDonorRepository {
    records: Arc<Mutex<BTreeMap<DonorId, DonorRecord>>>,
}

impl DonorRepository for InMemoryDonorRepository {
    fn insert(&self, record: DonorRecord) -> Result<DonorRecord, RepositoryError> {
        let mut guard = lock(&self.records, "donor")?;
        if guard.contains_key(&record.donor_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.donor_id.clone(), record.clone());
        Ok(record)
    }

    fn update(
        &self,
        mut record: DonorRecord,
        expected_version: u64,
    ) -> Result<DonorRecord, RepositoryError> {
        let mut guard = lock(&self.records, "donor")?;
        let current = guard
            .get_mut(&record.donor_id)
            .ok_or(RepositoryError::NotFound)?;

        if current.version != expected_version {
            return Err(RepositoryError::VersionConflict {
                expected: expected_version,
                found: current.version,
            });
        }

        record.version = expected_version + 1;
        *current = record.clone();
        Ok(record)
    }

    fn fetch(&self, id: &DonorId) -> Result<Option<DonorRecord>, RepositoryError> {
        let guard = lock(&self.records, "donor")?;
        Ok(guard.get(id).cloned())
    }

    fn list(&self, filter: &DonorFilter) -> Result<Vec<DonorRecord>, RepositoryError> {
        let guard = lock(&self.records, "donor")?;
        Ok(guard
            .values()
            .filter(|donor| filter.matches(donor))
            .cloned()
            .collect())
    }
}
