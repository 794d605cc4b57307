use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::clock::FixedClock;
use crate::domain::{AboGroup, BloodStock, BloodType, RhFactor, StockLevels};
use crate::inventory::{
    InventoryLedger, LedgerConfig, StockFilter, StockMovement, StockRepository,
};
use crate::storage::{InMemoryStockRepository, RepositoryError};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
}

pub(super) fn o_positive() -> BloodType {
    BloodType::new(AboGroup::O, RhFactor::Positive)
}

pub(super) fn a_negative() -> BloodType {
    BloodType::new(AboGroup::A, RhFactor::Negative)
}

pub(super) fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(now()))
}

pub(super) fn seeded_repository(seed: &[(BloodType, StockLevels)]) -> Arc<InMemoryStockRepository> {
    let repository = InMemoryStockRepository::provisioned(now());
    for (blood_type, levels) in seed {
        repository
            .seed(*blood_type, *levels, now())
            .expect("seed succeeds");
    }
    Arc::new(repository)
}

pub(super) fn build_ledger(
    seed: &[(BloodType, StockLevels)],
) -> (
    InventoryLedger<InMemoryStockRepository>,
    Arc<InMemoryStockRepository>,
    Arc<FixedClock>,
) {
    let repository = seeded_repository(seed);
    let clock = clock();
    let ledger = InventoryLedger::new(repository.clone(), clock.clone(), LedgerConfig::default());
    (ledger, repository, clock)
}

pub(super) fn levels_of(
    repository: &InMemoryStockRepository,
    blood_type: BloodType,
) -> StockLevels {
    repository
        .fetch(blood_type)
        .expect("fetch succeeds")
        .expect("row present")
        .levels()
}

/// Backend that cannot be reached at all.
pub(super) struct UnavailableRepository;

impl StockRepository for UnavailableRepository {
    fn fetch(&self, _blood_type: BloodType) -> Result<Option<BloodStock>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(
        &self,
        _stock: BloodStock,
        _expected_version: u64,
    ) -> Result<BloodStock, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _filter: &StockFilter) -> Result<Vec<BloodStock>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Reads succeed, writes fail.
pub(super) struct ReadOnlyRepository {
    pub(super) inner: Arc<InMemoryStockRepository>,
}

impl StockRepository for ReadOnlyRepository {
    fn fetch(&self, blood_type: BloodType) -> Result<Option<BloodStock>, RepositoryError> {
        self.inner.fetch(blood_type)
    }

    fn update(
        &self,
        _stock: BloodStock,
        _expected_version: u64,
    ) -> Result<BloodStock, RepositoryError> {
        Err(RepositoryError::Unavailable("write timed out".to_string()))
    }

    fn list(&self, filter: &StockFilter) -> Result<Vec<BloodStock>, RepositoryError> {
        self.inner.list(filter)
    }
}

/// Lets another writer add one unit between the ledger's read and write, `races` times.
pub(super) struct RacingRepository {
    pub(super) inner: Arc<InMemoryStockRepository>,
    pub(super) races: Mutex<u32>,
}

impl RacingRepository {
    pub(super) fn new(inner: Arc<InMemoryStockRepository>, races: u32) -> Self {
        Self {
            inner,
            races: Mutex::new(races),
        }
    }
}

impl StockRepository for RacingRepository {
    fn fetch(&self, blood_type: BloodType) -> Result<Option<BloodStock>, RepositoryError> {
        self.inner.fetch(blood_type)
    }

    fn update(
        &self,
        stock: BloodStock,
        expected_version: u64,
    ) -> Result<BloodStock, RepositoryError> {
        let race = {
            let mut remaining = self.races.lock().expect("race mutex poisoned");
            if *remaining > 0 {
                *remaining -= 1;
                true
            } else {
                false
            }
        };

        if race {
            let current = self
                .inner
                .fetch(stock.blood_type)?
                .expect("row present for race");
            let levels = StockMovement::Add(1)
                .apply(current.levels())
                .expect("concurrent add applies");
            self.inner
                .update(current.advanced(levels, current.last_updated), current.version)?;
        }

        self.inner.update(stock, expected_version)
    }

    fn list(&self, filter: &StockFilter) -> Result<Vec<BloodStock>, RepositoryError> {
        self.inner.list(filter)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
