//! Donor registration and the donation workflow that feeds the inventory ledger.

pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use repository::{DonorFilter, DonorRepository};
pub use router::donor_router;
pub use service::{
    DonationReceipt, DonorRegistration, DonorService, DonorServiceError, EligibilityRefresh,
};
