use bloodbank::clock::Clock;
use bloodbank::donors::DonorService;
use bloodbank::eligibility::{EligibilityEvaluator, EligibilityPolicy};
use bloodbank::inventory::{InventoryLedger, LedgerConfig};
use bloodbank::storage::{InMemoryDonorRepository, InMemoryStockRepository};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type Ledger = InventoryLedger<InMemoryStockRepository>;
pub(crate) type Donors = DonorService<InMemoryDonorRepository, InMemoryStockRepository>;

/// Core services sharing one stock repository, one clock and one evaluator.
pub(crate) struct Services {
    pub(crate) ledger: Arc<Ledger>,
    pub(crate) donors: Arc<Donors>,
}

pub(crate) fn build_services(
    stock: Arc<InMemoryStockRepository>,
    ledger_config: LedgerConfig,
    policy: EligibilityPolicy,
    clock: Arc<dyn Clock>,
) -> Services {
    let ledger = Arc::new(InventoryLedger::new(stock, clock.clone(), ledger_config));
    let evaluator = Arc::new(EligibilityEvaluator::new(policy, clock.clone()));
    let donors = Arc::new(DonorService::new(
        Arc::new(InMemoryDonorRepository::default()),
        ledger.clone(),
        evaluator,
        clock,
    ));
    Services { ledger, donors }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
