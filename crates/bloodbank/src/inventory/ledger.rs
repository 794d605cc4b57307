use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::repository::{StockFilter, StockRepository};
use super::transition::{InsufficientStock, StockMovement, TransitionError};
use crate::clock::Clock;
use crate::domain::{Availability, BloodStock, BloodType, StockStatus, StockThresholds};
use crate::error::ErrorKind;
use crate::storage::RepositoryError;

/// Ledger tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Re-reads allowed after a write loses a version race.
    pub max_conflict_retries: u32,
    pub thresholds: StockThresholds,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: 3,
            thresholds: StockThresholds::default(),
        }
    }
}

/// Row of the inventory overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockSummaryEntry {
    pub blood_type: BloodType,
    pub total_units: u32,
    pub available_units: u32,
    pub reserved_units: u32,
    pub status: StockStatus,
    pub status_label: &'static str,
    pub last_updated: DateTime<Utc>,
}

impl StockSummaryEntry {
    fn from_stock(stock: &BloodStock, thresholds: &StockThresholds) -> Self {
        let status = StockStatus::classify(stock.available_units, thresholds);
        Self {
            blood_type: stock.blood_type,
            total_units: stock.total_units,
            available_units: stock.available_units,
            reserved_units: stock.reserved_units,
            status,
            status_label: status.label(),
            last_updated: stock.last_updated,
        }
    }
}

/// Per-blood-type unit accounting over a [`StockRepository`].
///
/// Every mutation reads the row, applies the [`StockMovement`] in memory and writes all pools
/// plus the timestamp back in a single versioned update. A write that loses a version race is
/// retried from a fresh read, so concurrent approvals cannot overwrite each other.
pub struct InventoryLedger<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    config: LedgerConfig,
}

impl<R> InventoryLedger<R>
where
    R: StockRepository + 'static,
{
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>, config: LedgerConfig) -> Self {
        Self {
            repository,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Record units received from an approved donation.
    pub fn add_units(&self, blood_type: BloodType, units: u32) -> Result<BloodStock, LedgerError> {
        self.apply(blood_type, StockMovement::Add(units))
    }

    /// Issue units directly from available stock, bypassing reservation.
    pub fn remove_units(
        &self,
        blood_type: BloodType,
        units: u32,
    ) -> Result<BloodStock, LedgerError> {
        self.apply(blood_type, StockMovement::Remove(units))
    }

    /// Earmark available units for an approved transfusion request.
    pub fn reserve_units(
        &self,
        blood_type: BloodType,
        units: u32,
    ) -> Result<BloodStock, LedgerError> {
        self.apply(blood_type, StockMovement::Reserve(units))
    }

    /// Consume previously reserved units once the transfusion happened.
    pub fn fulfill_reserved(
        &self,
        blood_type: BloodType,
        units: u32,
    ) -> Result<BloodStock, LedgerError> {
        self.apply(blood_type, StockMovement::FulfillReserved(units))
    }

    pub fn check_availability(
        &self,
        blood_type: BloodType,
        units_needed: u32,
    ) -> Result<Availability, LedgerError> {
        let stock = self.stock(blood_type)?;
        Ok(Availability::assess(stock.available_units, units_needed))
    }

    pub fn stock(&self, blood_type: BloodType) -> Result<BloodStock, LedgerError> {
        self.repository
            .fetch(blood_type)
            .map_err(LedgerError::Unavailable)?
            .ok_or(LedgerError::NotFound(blood_type))
    }

    /// Every stock row with its status grade, ordered by blood type.
    pub fn summary(&self) -> Result<Vec<StockSummaryEntry>, LedgerError> {
        self.entries(&StockFilter::default())
    }

    /// Rows whose available units fall below the critical threshold.
    pub fn low_stock_alerts(&self) -> Result<Vec<StockSummaryEntry>, LedgerError> {
        self.entries(&StockFilter {
            available_below: Some(self.config.thresholds.critical_below),
        })
    }

    fn entries(&self, filter: &StockFilter) -> Result<Vec<StockSummaryEntry>, LedgerError> {
        let rows = self
            .repository
            .list(filter)
            .map_err(LedgerError::Unavailable)?;
        Ok(rows
            .iter()
            .map(|stock| StockSummaryEntry::from_stock(stock, &self.config.thresholds))
            .collect())
    }

    /// Apply `movement` to the row for `blood_type`.
    ///
    /// A zero unit count is rejected before the repository is touched. A movement that would
    /// overflow a pool can only be detected against the stored levels, so that InvalidInput
    /// is raised after the read and nothing is written.
    pub fn apply(
        &self,
        blood_type: BloodType,
        movement: StockMovement,
    ) -> Result<BloodStock, LedgerError> {
        let units = movement.units();
        if units == 0 {
            return Err(LedgerError::InvalidInput(format!(
                "{} requires a positive unit count",
                movement.label()
            )));
        }

        let mut conflicts = 0;
        loop {
            let current = self.stock(blood_type)?;

            let levels = movement.apply(current.levels()).map_err(|err| match err {
                TransitionError::Insufficient(detail) => {
                    warn!(
                        blood_type = %blood_type,
                        movement = movement.label(),
                        requested = detail.requested,
                        on_hand = detail.on_hand,
                        "stock movement rejected"
                    );
                    LedgerError::InsufficientStock { blood_type, detail }
                }
                TransitionError::Overflow { .. } => LedgerError::InvalidInput(err.to_string()),
            })?;

            let next = current.advanced(levels, self.clock.now());
            match self.repository.update(next, current.version) {
                Ok(stored) => {
                    info!(
                        blood_type = %blood_type,
                        movement = movement.label(),
                        units,
                        total = stored.total_units,
                        available = stored.available_units,
                        reserved = stored.reserved_units,
                        "stock updated"
                    );
                    return Ok(stored);
                }
                Err(RepositoryError::VersionConflict { expected, found }) => {
                    conflicts += 1;
                    if conflicts > self.config.max_conflict_retries {
                        warn!(
                            blood_type = %blood_type,
                            movement = movement.label(),
                            attempts = conflicts,
                            "giving up after repeated concurrent updates"
                        );
                        return Err(LedgerError::Conflict {
                            blood_type,
                            attempts: conflicts,
                        });
                    }
                    debug!(
                        blood_type = %blood_type,
                        expected,
                        found,
                        "stock changed underneath update; retrying"
                    );
                }
                Err(RepositoryError::NotFound) => return Err(LedgerError::NotFound(blood_type)),
                Err(err) => {
                    error!(
                        blood_type = %blood_type,
                        movement = movement.label(),
                        error = %err,
                        "stock write failed"
                    );
                    return Err(LedgerError::Unavailable(err));
                }
            }
        }
    }
}

/// Error raised by the inventory ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no stock record for blood type {0}")]
    NotFound(BloodType),
    #[error("insufficient {blood_type} stock: {detail}")]
    InsufficientStock {
        blood_type: BloodType,
        #[source]
        detail: InsufficientStock,
    },
    #[error("{blood_type} stock changed concurrently {attempts} time(s); try again")]
    Conflict { blood_type: BloodType, attempts: u32 },
    #[error("inventory storage failure: {0}")]
    Unavailable(#[source] RepositoryError),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidInput(_) => ErrorKind::InvalidInput,
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            LedgerError::Conflict { .. } => ErrorKind::Conflict,
            LedgerError::Unavailable(_) => ErrorKind::Transient,
        }
    }
}
