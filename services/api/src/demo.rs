use crate::infra::{build_services, Services};
use bloodbank::clock::{Clock, FixedClock};
use bloodbank::domain::{AboGroup, BloodStock, BloodType, DonorId, RhFactor, StockLevels};
use bloodbank::donors::DonorRegistration;
use bloodbank::eligibility::EligibilityPolicy;
use bloodbank::error::AppError;
use bloodbank::inventory::{LedgerConfig, LedgerError};
use bloodbank::storage::InMemoryStockRepository;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for the demo clock (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Skip the donor intake portion of the demo.
    #[arg(long)]
    pub(crate) skip_donors: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, skip_donors } = args;

    let today = today.unwrap_or_else(|| Utc::now().date_naive());
    let clock = Arc::new(FixedClock::new(
        today.and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()).and_utc(),
    ));
    let stock = Arc::new(InMemoryStockRepository::provisioned(clock.now()));
    let services = build_services(
        stock.clone(),
        LedgerConfig::default(),
        EligibilityPolicy::default(),
        clock.clone(),
    );

    let o_positive = BloodType::new(AboGroup::O, RhFactor::Positive);
    let a_negative = BloodType::new(AboGroup::A, RhFactor::Negative);
    stock
        .seed(o_positive, StockLevels::new(20, 20, 0), clock.now())
        .map_err(LedgerError::Unavailable)?;
    stock
        .seed(a_negative, StockLevels::new(10, 10, 0), clock.now())
        .map_err(LedgerError::Unavailable)?;

    println!("Blood bank ledger demo ({today})");
    print_stock("Seeded", &services.ledger.stock(o_positive)?);

    let reserved = services.ledger.reserve_units(o_positive, 5)?;
    print_stock("Reserved 5 units", &reserved);

    let fulfilled = services.ledger.fulfill_reserved(o_positive, 5)?;
    print_stock("Fulfilled 5 reserved units", &fulfilled);

    let availability = services.ledger.check_availability(o_positive, 20)?;
    println!(
        "- Request for {} units of {}: available={} current={} shortage={}",
        availability.units_needed,
        o_positive,
        availability.available,
        availability.current_units,
        availability.shortage
    );

    match services.ledger.reserve_units(o_positive, 20) {
        Ok(stock) => print_stock("Reserved 20 units", &stock),
        Err(err) => println!("- Reserve 20 units rejected: {err}"),
    }

    let removed = services.ledger.remove_units(a_negative, 3)?;
    print_stock("Removed 3 units", &removed);

    if !skip_donors {
        run_donor_intake(&services, clock.as_ref(), today)?;
    }

    println!("\nInventory overview");
    for entry in services.ledger.summary()? {
        println!(
            "  - {:<3} total {:>3} | available {:>3} | reserved {:>3} | {}",
            entry.blood_type.label(),
            entry.total_units,
            entry.available_units,
            entry.reserved_units,
            entry.status_label
        );
    }

    let alerts = services.ledger.low_stock_alerts()?;
    if alerts.is_empty() {
        println!("Low stock alerts: none");
    } else {
        let labels: Vec<&str> = alerts.iter().map(|entry| entry.blood_type.label()).collect();
        println!("Low stock alerts: {}", labels.join(", "));
    }

    Ok(())
}

fn run_donor_intake(
    services: &Services,
    clock: &FixedClock,
    today: NaiveDate,
) -> Result<(), AppError> {
    println!("\nDonor intake demo");
    let registration = DonorRegistration {
        donor_id: None,
        full_name: "Demo Donor".to_string(),
        date_of_birth: today - Duration::days(30 * 365),
        weight_kg: 68.0,
        blood_type: BloodType::new(AboGroup::O, RhFactor::Positive),
        last_donation_date: None,
    };

    let donor = services.donors.register(registration)?;
    println!(
        "- Registered {} ({}) eligible={}",
        donor.donor_id, donor.blood_type, donor.is_eligible
    );

    let receipt = services.donors.record_donation(&donor.donor_id, 1)?;
    println!(
        "- Donation of {} unit(s) recorded; {} available now {}",
        receipt.units, receipt.stock.blood_type, receipt.stock.available_units
    );

    report_refresh(services, &donor.donor_id, "Same day")?;
    clock.advance(Duration::days(90));
    report_refresh(services, &donor.donor_id, "After 90 days")?;
    Ok(())
}

fn report_refresh(services: &Services, donor_id: &DonorId, label: &str) -> Result<(), AppError> {
    let refresh = services.donors.refresh_eligibility(donor_id)?;
    println!("  {label}: {}", refresh.decision.summary());
    Ok(())
}

fn print_stock(label: &str, stock: &BloodStock) {
    println!(
        "- {label}: {} total={} available={} reserved={}",
        stock.blood_type, stock.total_units, stock.available_units, stock.reserved_units
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_against_fixed_date() {
        let args = DemoArgs {
            today: NaiveDate::from_ymd_opt(2026, 10, 16),
            skip_donors: false,
        };
        run_demo(args).expect("demo completes");
    }
}
