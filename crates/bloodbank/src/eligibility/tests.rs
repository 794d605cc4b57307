use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use super::*;
use crate::clock::FixedClock;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 14, 30, 0).unwrap()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn evaluator() -> EligibilityEvaluator {
    EligibilityEvaluator::new(EligibilityPolicy::default(), Arc::new(FixedClock::new(now())))
}

fn input(date_of_birth: NaiveDate, weight_kg: f64, last: Option<NaiveDate>) -> EligibilityInput {
    EligibilityInput {
        date_of_birth: Some(date_of_birth),
        weight_kg,
        last_donation_date: last,
    }
}

#[test]
fn age_counts_only_completed_birthdays() {
    assert_eq!(age_on(date(2000, 10, 16), date(2026, 10, 16)), 26);
    assert_eq!(age_on(date(2000, 10, 17), date(2026, 10, 16)), 25);
    assert_eq!(age_on(date(2000, 11, 1), date(2026, 10, 16)), 25);
    assert_eq!(age_on(date(2000, 2, 29), date(2026, 2, 28)), 25);
    assert_eq!(age_on(date(2000, 2, 29), date(2026, 3, 1)), 26);
}

#[test]
fn days_since_truncates_partial_days() {
    let last = date(2026, 7, 18);
    assert_eq!(days_since(last, Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap()), 90);
    assert_eq!(
        days_since(last, Utc.with_ymd_and_hms(2026, 10, 15, 23, 59, 59).unwrap()),
        89
    );
}

#[test]
fn donor_turning_eighteen_today_is_eligible() {
    let decision = evaluator()
        .evaluate(&input(date(2008, 10, 16), 70.0, None))
        .expect("evaluates");
    assert!(decision.eligible, "{}", decision.summary());
    assert_eq!(decision.age, 18);
}

#[test]
fn donor_one_day_short_of_eighteen_is_ineligible() {
    let decision = evaluator()
        .evaluate(&input(date(2008, 10, 17), 70.0, None))
        .expect("evaluates");
    assert!(!decision.eligible);
    assert_eq!(decision.age, 17);
    assert!(matches!(
        decision.reasons.as_slice(),
        [IneligibilityReason::AgeOutOfRange { age: 17, .. }]
    ));
}

#[test]
fn upper_age_bound_is_inclusive() {
    let sixty_five = evaluator()
        .evaluate(&input(date(1961, 10, 16), 70.0, None))
        .expect("evaluates");
    assert!(sixty_five.eligible);

    let sixty_six = evaluator()
        .evaluate(&input(date(1960, 10, 16), 70.0, None))
        .expect("evaluates");
    assert!(!sixty_six.eligible);
}

#[test]
fn donation_interval_boundary_is_ninety_days() {
    let today = now().date_naive();

    let ninety = evaluator()
        .evaluate(&input(date(1990, 1, 1), 70.0, Some(today - Duration::days(90))))
        .expect("evaluates");
    assert!(ninety.eligible);
    assert_eq!(ninety.days_since_last_donation, Some(90));

    let eighty_nine = evaluator()
        .evaluate(&input(date(1990, 1, 1), 70.0, Some(today - Duration::days(89))))
        .expect("evaluates");
    assert!(!eighty_nine.eligible);
    assert!(eighty_nine.summary().contains("89 day(s) ago"));
}

#[test]
fn non_positive_weight_is_a_failing_input_not_an_error() {
    let decision = evaluator()
        .evaluate(&input(date(1990, 1, 1), 0.0, None))
        .expect("zero weight evaluates");
    assert!(!decision.eligible);

    let negative = evaluator()
        .evaluate(&input(date(1990, 1, 1), -3.0, None))
        .expect("negative weight evaluates");
    assert!(!negative.eligible);

    let boundary = evaluator()
        .evaluate(&input(date(1990, 1, 1), 50.0, None))
        .expect("evaluates");
    assert!(boundary.eligible);
}

#[test]
fn every_failed_rule_is_reported() {
    let today = now().date_naive();
    let decision = evaluator()
        .evaluate(&input(date(2015, 1, 1), 30.0, Some(today - Duration::days(10))))
        .expect("evaluates");

    assert_eq!(decision.reasons.len(), 3);
    let summary = decision.summary();
    assert!(summary.starts_with("not eligible"));
    assert!(summary.contains("age 11"));
    assert!(summary.contains("below minimum"));
}

#[test]
fn missing_date_of_birth_is_invalid_input() {
    let result = evaluator().evaluate(&EligibilityInput {
        date_of_birth: None,
        weight_kg: 70.0,
        last_donation_date: None,
    });
    assert_eq!(result, Err(EligibilityError::MissingDateOfBirth));

    assert_eq!(
        evaluator().is_eligible(Some("  "), 70.0, None),
        Err(EligibilityError::MissingDateOfBirth)
    );
}

#[test]
fn unparseable_dates_are_invalid_input() {
    match evaluator().is_eligible(Some("16/10/1990"), 70.0, None) {
        Err(EligibilityError::InvalidDate { field, .. }) => assert_eq!(field, "date_of_birth"),
        other => panic!("expected invalid date, got {other:?}"),
    }

    match evaluate_eligibility(Some("1990-10-16"), 70.0, Some("yesterday"), now()) {
        Err(EligibilityError::InvalidDate { field, .. }) => {
            assert_eq!(field, "last_donation_date")
        }
        other => panic!("expected invalid date, got {other:?}"),
    }
}

#[test]
fn free_function_uses_default_policy() {
    assert_eq!(
        evaluate_eligibility(Some("1990-10-16"), 72.5, Some("2026-07-18"), now()),
        Ok(true)
    );
    assert_eq!(
        evaluate_eligibility(Some("1990-10-16"), 72.5, Some("2026-07-19"), now()),
        Ok(false)
    );
}

#[test]
fn custom_policy_changes_thresholds() {
    let policy = EligibilityPolicy {
        minimum_age: 17,
        maximum_age: 70,
        minimum_weight_kg: 45.0,
        donation_interval_days: 56,
    };
    let evaluator = EligibilityEvaluator::new(policy, Arc::new(FixedClock::new(now())));
    let today = now().date_naive();

    let decision = evaluator
        .evaluate(&input(date(2009, 1, 1), 46.0, Some(today - Duration::days(56))))
        .expect("evaluates");
    assert!(decision.eligible, "{}", decision.summary());
}
