//! Blood stock accounting across the total, available and reserved pools.

pub mod ledger;
pub mod repository;
pub mod router;
pub mod transition;

#[cfg(test)]
mod tests;

pub use ledger::{InventoryLedger, LedgerConfig, LedgerError, StockSummaryEntry};
pub use repository::{StockFilter, StockRepository};
pub use router::inventory_router;
pub use transition::{InsufficientStock, StockMovement, StockPool, TransitionError};
