use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::repository::{DonorFilter, DonorRepository};
use crate::clock::Clock;
use crate::domain::{BloodStock, BloodType, DonorId, DonorRecord};
use crate::eligibility::{
    EligibilityDecision, EligibilityError, EligibilityEvaluator, EligibilityInput,
};
use crate::error::ErrorKind;
use crate::inventory::{InventoryLedger, LedgerError, StockRepository};
use crate::storage::RepositoryError;

/// Intake form for a new donor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorRegistration {
    #[serde(default)]
    pub donor_id: Option<DonorId>,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub weight_kg: f64,
    pub blood_type: BloodType,
    #[serde(default)]
    pub last_donation_date: Option<NaiveDate>,
}

/// Result of an accepted donation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonationReceipt {
    pub donor: DonorRecord,
    pub units: u32,
    pub stock: BloodStock,
}

/// Result of recomputing a donor's flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityRefresh {
    pub donor: DonorRecord,
    pub decision: EligibilityDecision,
    pub changed: bool,
}

/// Donor workflow composing the donor repository, the evaluator and the inventory ledger.
pub struct DonorService<D, S> {
    donors: Arc<D>,
    ledger: Arc<InventoryLedger<S>>,
    evaluator: Arc<EligibilityEvaluator>,
    clock: Arc<dyn Clock>,
    sequence: AtomicU64,
}

impl<D, S> DonorService<D, S>
where
    D: DonorRepository + 'static,
    S: StockRepository + 'static,
{
    pub fn new(
        donors: Arc<D>,
        ledger: Arc<InventoryLedger<S>>,
        evaluator: Arc<EligibilityEvaluator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            donors,
            ledger,
            evaluator,
            clock,
            sequence: AtomicU64::new(1),
        }
    }

    pub fn evaluator(&self) -> &EligibilityEvaluator {
        &self.evaluator
    }

    pub fn ledger(&self) -> &InventoryLedger<S> {
        &self.ledger
    }

    fn next_donor_id(&self) -> Result<DonorId, DonorServiceError> {
        loop {
            let id = self.sequence.fetch_add(1, Ordering::Relaxed);
            let candidate = DonorId(format!("donor-{id:06}"));
            if self.donors.fetch(&candidate)?.is_none() {
                return Ok(candidate);
            }
        }
    }

    /// Store a new donor with the eligibility flag computed at intake.
    pub fn register(
        &self,
        registration: DonorRegistration,
    ) -> Result<DonorRecord, DonorServiceError> {
        let donor_id = match registration.donor_id {
            Some(id) => id,
            None => self.next_donor_id()?,
        };

        let decision = self.evaluator.evaluate(&EligibilityInput {
            date_of_birth: Some(registration.date_of_birth),
            weight_kg: registration.weight_kg,
            last_donation_date: registration.last_donation_date,
        })?;

        let record = DonorRecord {
            donor_id,
            full_name: registration.full_name,
            date_of_birth: Some(registration.date_of_birth),
            weight_kg: registration.weight_kg,
            blood_type: registration.blood_type,
            last_donation_date: registration.last_donation_date,
            is_eligible: decision.eligible,
            total_donations: 0,
            version: 0,
        };

        let stored = self.donors.insert(record)?;
        info!(
            donor_id = %stored.donor_id,
            blood_type = %stored.blood_type,
            eligible = stored.is_eligible,
            "donor registered"
        );
        Ok(stored)
    }

    pub fn get(&self, donor_id: &DonorId) -> Result<DonorRecord, DonorServiceError> {
        self.donors
            .fetch(donor_id)?
            .ok_or_else(|| DonorServiceError::NotFound(donor_id.clone()))
    }

    pub fn list(&self, filter: &DonorFilter) -> Result<Vec<DonorRecord>, DonorServiceError> {
        Ok(self.donors.list(filter)?)
    }

    /// Recompute eligibility and persist the flag when it changed.
    ///
    /// The write is version-checked; a concurrent change to the donor triggers a fresh read and
    /// evaluation.
    pub fn refresh_eligibility(
        &self,
        donor_id: &DonorId,
    ) -> Result<EligibilityRefresh, DonorServiceError> {
        let mut conflicts = 0;
        loop {
            let donor = self.get(donor_id)?;
            let decision = self.evaluator.evaluate_donor(&donor)?;

            if donor.is_eligible == decision.eligible {
                return Ok(EligibilityRefresh {
                    donor,
                    decision,
                    changed: false,
                });
            }

            let expected = donor.version;
            let candidate = DonorRecord {
                is_eligible: decision.eligible,
                ..donor
            };
            if let Some(updated) = self.write_donor(candidate, expected, &mut conflicts)? {
                info!(
                    donor_id = %updated.donor_id,
                    eligible = updated.is_eligible,
                    "donor eligibility changed"
                );
                return Ok(EligibilityRefresh {
                    donor: updated,
                    decision,
                    changed: true,
                });
            }
        }
    }

    /// Accept a donation: claim the donor row, then credit the units to the donor's blood type.
    ///
    /// The claim is a version-checked write that records the donation and clears the
    /// eligibility flag, so two concurrent donations by one donor cannot both pass the
    /// eligibility check. If crediting the stock fails afterwards the claim is reverted.
    pub fn record_donation(
        &self,
        donor_id: &DonorId,
        units: u32,
    ) -> Result<DonationReceipt, DonorServiceError> {
        if units == 0 {
            return Err(DonorServiceError::InvalidInput(
                "a donation must contain at least one unit".to_string(),
            ));
        }

        let mut conflicts = 0;
        let (previous, claimed) = loop {
            let donor = self.get(donor_id)?;
            let decision = self.evaluator.evaluate_donor(&donor)?;
            if !decision.eligible {
                return Err(DonorServiceError::Ineligible {
                    donor_id: donor.donor_id,
                    summary: decision.summary(),
                });
            }

            let today = self.clock.now().date_naive();
            let candidate = DonorRecord {
                last_donation_date: Some(today),
                total_donations: donor.total_donations.saturating_add(1),
                is_eligible: false,
                ..donor.clone()
            };
            if let Some(claimed) = self.write_donor(candidate, donor.version, &mut conflicts)? {
                break (donor, claimed);
            }
        };

        let stock = match self.ledger.add_units(claimed.blood_type, units) {
            Ok(stock) => stock,
            Err(err) => {
                self.release_claim(previous, &claimed, units);
                return Err(err.into());
            }
        };

        info!(
            donor_id = %claimed.donor_id,
            blood_type = %claimed.blood_type,
            units,
            total_donations = claimed.total_donations,
            "donation recorded"
        );

        Ok(DonationReceipt {
            donor: claimed,
            units,
            stock,
        })
    }

    /// Version-checked donor write. `None` means the row moved and the caller should re-read.
    fn write_donor(
        &self,
        candidate: DonorRecord,
        expected_version: u64,
        conflicts: &mut u32,
    ) -> Result<Option<DonorRecord>, DonorServiceError> {
        let donor_id = candidate.donor_id.clone();
        match self.donors.update(candidate, expected_version) {
            Ok(stored) => Ok(Some(stored)),
            Err(RepositoryError::VersionConflict { expected, found }) => {
                *conflicts += 1;
                if *conflicts > self.ledger.config().max_conflict_retries {
                    warn!(
                        donor_id = %donor_id,
                        attempts = *conflicts,
                        "giving up after repeated concurrent donor updates"
                    );
                    return Err(RepositoryError::VersionConflict { expected, found }.into());
                }
                debug!(
                    donor_id = %donor_id,
                    expected,
                    found,
                    "donor changed underneath update; retrying"
                );
                Ok(None)
            }
            Err(RepositoryError::NotFound) => Err(DonorServiceError::NotFound(donor_id)),
            Err(err) => Err(err.into()),
        }
    }

    fn release_claim(&self, previous: DonorRecord, claimed: &DonorRecord, units: u32) {
        if let Err(err) = self.donors.update(previous, claimed.version) {
            error!(
                donor_id = %claimed.donor_id,
                units,
                error = %err,
                "stock not credited and donor claim could not be reverted"
            );
        }
    }
}

/// Error raised by the donor workflow.
#[derive(Debug, thiserror::Error)]
pub enum DonorServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("donor {0} not found")]
    NotFound(DonorId),
    #[error("donor {donor_id} is {summary}")]
    Ineligible { donor_id: DonorId, summary: String },
    #[error(transparent)]
    Eligibility(#[from] EligibilityError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("donor storage failure: {0}")]
    Repository(#[from] RepositoryError),
}

impl DonorServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DonorServiceError::InvalidInput(_) | DonorServiceError::Eligibility(_) => {
                ErrorKind::InvalidInput
            }
            DonorServiceError::NotFound(_) => ErrorKind::NotFound,
            DonorServiceError::Ineligible { .. } => ErrorKind::Ineligible,
            DonorServiceError::Ledger(err) => err.kind(),
            DonorServiceError::Repository(err) => match err {
                RepositoryError::NotFound => ErrorKind::NotFound,
                RepositoryError::Conflict | RepositoryError::VersionConflict { .. } => {
                    ErrorKind::Conflict
                }
                RepositoryError::Unavailable(_) => ErrorKind::Transient,
            },
        }
    }
}
