use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::clock::FixedClock;
use crate::domain::{AboGroup, BloodType, DonorId, DonorRecord, RhFactor, StockLevels};
use crate::donors::{DonorFilter, DonorRegistration, DonorRepository, DonorService};
use crate::eligibility::{EligibilityEvaluator, EligibilityPolicy};
use crate::inventory::{InventoryLedger, LedgerConfig};
use crate::storage::{InMemoryDonorRepository, InMemoryStockRepository, RepositoryError};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 11, 0, 0).unwrap()
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn b_negative() -> BloodType {
    BloodType::new(AboGroup::B, RhFactor::Negative)
}

pub(super) fn registration(id: &str) -> DonorRegistration {
    DonorRegistration {
        donor_id: Some(DonorId(id.to_string())),
        full_name: "Amara Okafor".to_string(),
        date_of_birth: date(1991, 4, 12),
        weight_kg: 64.0,
        blood_type: b_negative(),
        last_donation_date: None,
    }
}

pub(super) struct Harness<D> {
    pub(super) service: DonorService<D, InMemoryStockRepository>,
    pub(super) donors: Arc<D>,
    pub(super) stock: Arc<InMemoryStockRepository>,
    pub(super) clock: Arc<FixedClock>,
}

pub(super) fn harness() -> Harness<InMemoryDonorRepository> {
    harness_with(Arc::new(InMemoryDonorRepository::default()))
}

pub(super) fn harness_with<D>(donors: Arc<D>) -> Harness<D>
where
    D: DonorRepository + 'static,
{
    let clock = Arc::new(FixedClock::new(now()));
    let stock = Arc::new(InMemoryStockRepository::provisioned(now()));
    stock
        .seed(b_negative(), StockLevels::new(3, 3, 0), now())
        .expect("seed");

    let ledger = Arc::new(InventoryLedger::new(
        stock.clone(),
        clock.clone(),
        LedgerConfig::default(),
    ));
    let evaluator = Arc::new(EligibilityEvaluator::new(
        EligibilityPolicy::default(),
        clock.clone(),
    ));
    let service = DonorService::new(donors.clone(), ledger, evaluator, clock.clone());

    Harness {
        service,
        donors,
        stock,
        clock,
    }
}

/// Donor store whose writes fail after the record was read.
#[derive(Default)]
pub(super) struct ReadOnlyDonors {
    pub(super) inner: InMemoryDonorRepository,
}

impl DonorRepository for ReadOnlyDonors {
    fn insert(&self, record: DonorRecord) -> Result<DonorRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(
        &self,
        _record: DonorRecord,
        _expected_version: u64,
    ) -> Result<DonorRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("donor table locked".to_string()))
    }

    fn fetch(&self, id: &DonorId) -> Result<Option<DonorRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list(&self, filter: &DonorFilter) -> Result<Vec<DonorRecord>, RepositoryError> {
        self.inner.list(filter)
    }
}

/// Donor store whose first two reads wait for each other, so two callers start from the same row.
pub(super) struct PairedReads {
    pub(super) inner: InMemoryDonorRepository,
    gate: Barrier,
    reads: AtomicUsize,
}

impl PairedReads {
    pub(super) fn new() -> Self {
        Self {
            inner: InMemoryDonorRepository::default(),
            gate: Barrier::new(2),
            reads: AtomicUsize::new(0),
        }
    }
}

impl DonorRepository for PairedReads {
    fn insert(&self, record: DonorRecord) -> Result<DonorRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(
        &self,
        record: DonorRecord,
        expected_version: u64,
    ) -> Result<DonorRecord, RepositoryError> {
        self.inner.update(record, expected_version)
    }

    fn fetch(&self, id: &DonorId) -> Result<Option<DonorRecord>, RepositoryError> {
        if self.reads.fetch_add(1, Ordering::SeqCst) < 2 {
            self.gate.wait();
        }
        self.inner.fetch(id)
    }

    fn list(&self, filter: &DonorFilter) -> Result<Vec<DonorRecord>, RepositoryError> {
        self.inner.list(filter)
    }
}
