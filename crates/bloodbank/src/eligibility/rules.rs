use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};

use super::config::EligibilityPolicy;
use super::{EligibilityInput, IneligibilityReason};

/// Age in whole years on `today`; the year only counts once the birthday has been reached.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

/// Whole days elapsed since midnight UTC of `last_donation`, truncated toward zero.
pub fn days_since(last_donation: NaiveDate, now: DateTime<Utc>) -> i64 {
    let midnight = Utc.from_utc_datetime(&last_donation.and_time(NaiveTime::default()));
    now.signed_duration_since(midnight).num_days()
}

pub(crate) struct EligibilitySignals {
    pub age: i32,
    pub days_since_last_donation: Option<i64>,
    pub reasons: Vec<IneligibilityReason>,
}

pub(crate) fn assess(
    date_of_birth: NaiveDate,
    input: &EligibilityInput,
    policy: &EligibilityPolicy,
    now: DateTime<Utc>,
) -> EligibilitySignals {
    let mut reasons = Vec::new();

    let age = age_on(date_of_birth, now.date_naive());
    if age < policy.minimum_age || age > policy.maximum_age {
        reasons.push(IneligibilityReason::AgeOutOfRange {
            age,
            minimum: policy.minimum_age,
            maximum: policy.maximum_age,
        });
    }

    // NaN weights fail this comparison as well.
    if !(input.weight_kg >= policy.minimum_weight_kg) {
        reasons.push(IneligibilityReason::UnderWeight {
            weight_kg: input.weight_kg,
            minimum_kg: policy.minimum_weight_kg,
        });
    }

    let days_since_last_donation = input
        .last_donation_date
        .map(|last_donation| days_since(last_donation, now));
    if let Some(days) = days_since_last_donation {
        if days < policy.donation_interval_days {
            reasons.push(IneligibilityReason::DonationIntervalNotElapsed {
                days_since: days,
                required_days: policy.donation_interval_days,
            });
        }
    }

    EligibilitySignals {
        age,
        days_since_last_donation,
        reasons,
    }
}
