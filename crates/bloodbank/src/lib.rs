//! Blood inventory accounting and donor eligibility.
//!
//! The crate owns the business rules behind the blood-bank dashboard: moving units between the
//! total, available and reserved pools of each blood type, and deciding whether a donor may give
//! blood today. Persistence is reached through the typed repositories in [`storage`].

pub mod clock;
pub mod config;
pub mod domain;
pub mod donors;
pub mod eligibility;
pub mod error;
pub mod inventory;
pub mod storage;
pub mod telemetry;
