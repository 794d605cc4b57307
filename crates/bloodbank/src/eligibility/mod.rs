//! Donor eligibility rules: age window, minimum weight and the interval since the last donation.

mod config;
mod rules;

#[cfg(test)]
mod tests;

pub use config::EligibilityPolicy;
pub use rules::{age_on, days_since};

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::domain::DonorRecord;

/// Inputs to a single eligibility decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityInput {
    pub date_of_birth: Option<NaiveDate>,
    pub weight_kg: f64,
    pub last_donation_date: Option<NaiveDate>,
}

impl EligibilityInput {
    /// Build an input from `YYYY-MM-DD` strings as they arrive from forms or storage.
    pub fn parse(
        date_of_birth: Option<&str>,
        weight_kg: f64,
        last_donation_date: Option<&str>,
    ) -> Result<Self, EligibilityError> {
        let date_of_birth = date_of_birth
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_date("date_of_birth", raw))
            .transpose()?;
        let last_donation_date = last_donation_date
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_date("last_donation_date", raw))
            .transpose()?;

        Ok(Self {
            date_of_birth,
            weight_kg,
            last_donation_date,
        })
    }

    pub fn from_donor(donor: &DonorRecord) -> Self {
        Self {
            date_of_birth: donor.date_of_birth,
            weight_kg: donor.weight_kg,
            last_donation_date: donor.last_donation_date,
        }
    }
}

fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, EligibilityError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| EligibilityError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

/// Rejected inputs; every variant is an invalid-input condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EligibilityError {
    #[error("date of birth is required to evaluate eligibility")]
    MissingDateOfBirth,
    #[error("{field} must be a YYYY-MM-DD date (found '{value}')")]
    InvalidDate { field: &'static str, value: String },
}

/// Failed screening rule, kept so the dashboard can tell the donor why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum IneligibilityReason {
    AgeOutOfRange {
        age: i32,
        minimum: i32,
        maximum: i32,
    },
    UnderWeight {
        weight_kg: f64,
        minimum_kg: f64,
    },
    DonationIntervalNotElapsed {
        days_since: i64,
        required_days: i64,
    },
}

impl IneligibilityReason {
    pub fn summary(&self) -> String {
        match self {
            IneligibilityReason::AgeOutOfRange {
                age,
                minimum,
                maximum,
            } => format!("age {age} outside {minimum}-{maximum}"),
            IneligibilityReason::UnderWeight {
                weight_kg,
                minimum_kg,
            } => format!("weight {weight_kg:.1} kg below minimum {minimum_kg:.1} kg"),
            IneligibilityReason::DonationIntervalNotElapsed {
                days_since,
                required_days,
            } => format!("last donation {days_since} day(s) ago, {required_days} required"),
        }
    }
}

/// Outcome of an evaluation, with the computed figures behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityDecision {
    pub eligible: bool,
    pub age: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_since_last_donation: Option<i64>,
    pub reasons: Vec<IneligibilityReason>,
}

impl EligibilityDecision {
    pub fn summary(&self) -> String {
        if self.eligible {
            "eligible to donate".to_string()
        } else {
            let reasons: Vec<String> = self.reasons.iter().map(|reason| reason.summary()).collect();
            format!("not eligible: {}", reasons.join("; "))
        }
    }
}

/// Side-effect free evaluator; callers persist the resulting flag.
pub struct EligibilityEvaluator {
    policy: EligibilityPolicy,
    clock: Arc<dyn Clock>,
}

impl EligibilityEvaluator {
    pub fn new(policy: EligibilityPolicy, clock: Arc<dyn Clock>) -> Self {
        Self { policy, clock }
    }

    pub fn policy(&self) -> &EligibilityPolicy {
        &self.policy
    }

    pub fn evaluate(
        &self,
        input: &EligibilityInput,
    ) -> Result<EligibilityDecision, EligibilityError> {
        self.evaluate_at(input, self.clock.now())
    }

    pub fn evaluate_at(
        &self,
        input: &EligibilityInput,
        now: DateTime<Utc>,
    ) -> Result<EligibilityDecision, EligibilityError> {
        let date_of_birth = input
            .date_of_birth
            .ok_or(EligibilityError::MissingDateOfBirth)?;

        let signals = rules::assess(date_of_birth, input, &self.policy, now);

        Ok(EligibilityDecision {
            eligible: signals.reasons.is_empty(),
            age: signals.age,
            days_since_last_donation: signals.days_since_last_donation,
            reasons: signals.reasons,
        })
    }

    pub fn evaluate_donor(
        &self,
        donor: &DonorRecord,
    ) -> Result<EligibilityDecision, EligibilityError> {
        self.evaluate(&EligibilityInput::from_donor(donor))
    }

    /// Boolean form used by presentation code.
    pub fn is_eligible(
        &self,
        date_of_birth: Option<&str>,
        weight_kg: f64,
        last_donation_date: Option<&str>,
    ) -> Result<bool, EligibilityError> {
        let input = EligibilityInput::parse(date_of_birth, weight_kg, last_donation_date)?;
        Ok(self.evaluate(&input)?.eligible)
    }
}

/// Evaluate raw inputs against the default policy as of `now`.
pub fn evaluate_eligibility(
    date_of_birth: Option<&str>,
    weight_kg: f64,
    last_donation_date: Option<&str>,
    now: DateTime<Utc>,
) -> Result<bool, EligibilityError> {
    let input = EligibilityInput::parse(date_of_birth, weight_kg, last_donation_date)?;
    let date_of_birth = input
        .date_of_birth
        .ok_or(EligibilityError::MissingDateOfBirth)?;
    let signals = rules::assess(date_of_birth, &input, &EligibilityPolicy::default(), now);
    Ok(signals.reasons.is_empty())
}
