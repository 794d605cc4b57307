use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::StockLevels;

/// Pool a movement draws from or adds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockPool {
    Total,
    Available,
    Reserved,
}

impl StockPool {
    pub const fn label(self) -> &'static str {
        match self {
            StockPool::Total => "total",
            StockPool::Available => "available",
            StockPool::Reserved => "reserved",
        }
    }
}

impl fmt::Display for StockPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single ledger operation and its unit count.
///
/// | movement          | requires        | effect                         |
/// |-------------------|-----------------|--------------------------------|
/// | `Add`             | -               | total += n, available += n     |
/// | `Remove`          | available >= n  | available -= n                 |
/// | `Reserve`         | available >= n  | available -= n, reserved += n  |
/// | `FulfillReserved` | reserved >= n   | reserved -= n, total -= n      |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "movement", content = "units", rename_all = "snake_case")]
pub enum StockMovement {
    Add(u32),
    Remove(u32),
    Reserve(u32),
    FulfillReserved(u32),
}

impl StockMovement {
    pub const fn units(self) -> u32 {
        match self {
            StockMovement::Add(units)
            | StockMovement::Remove(units)
            | StockMovement::Reserve(units)
            | StockMovement::FulfillReserved(units) => units,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            StockMovement::Add(_) => "add",
            StockMovement::Remove(_) => "remove",
            StockMovement::Reserve(_) => "reserve",
            StockMovement::FulfillReserved(_) => "fulfill",
        }
    }

    /// Compute the levels after this movement without touching storage.
    pub fn apply(self, levels: StockLevels) -> Result<StockLevels, TransitionError> {
        let StockLevels {
            total_units,
            available_units,
            reserved_units,
        } = levels;

        match self {
            StockMovement::Add(units) => {
                let total_units = total_units
                    .checked_add(units)
                    .ok_or(TransitionError::Overflow {
                        pool: StockPool::Total,
                        units,
                    })?;
                let available_units =
                    available_units
                        .checked_add(units)
                        .ok_or(TransitionError::Overflow {
                            pool: StockPool::Available,
                            units,
                        })?;
                Ok(StockLevels::new(total_units, available_units, reserved_units))
            }
            StockMovement::Remove(units) => {
                let available_units = draw(StockPool::Available, available_units, units)?;
                Ok(StockLevels::new(total_units, available_units, reserved_units))
            }
            StockMovement::Reserve(units) => {
                let available_units = draw(StockPool::Available, available_units, units)?;
                let reserved_units =
                    reserved_units
                        .checked_add(units)
                        .ok_or(TransitionError::Overflow {
                            pool: StockPool::Reserved,
                            units,
                        })?;
                Ok(StockLevels::new(total_units, available_units, reserved_units))
            }
            StockMovement::FulfillReserved(units) => {
                let reserved_units = draw(StockPool::Reserved, reserved_units, units)?;
                let total_units = draw(StockPool::Total, total_units, units)?;
                Ok(StockLevels::new(total_units, available_units, reserved_units))
            }
        }
    }
}

fn draw(pool: StockPool, on_hand: u32, requested: u32) -> Result<u32, InsufficientStock> {
    on_hand.checked_sub(requested).ok_or(InsufficientStock {
        pool,
        requested,
        on_hand,
    })
}

/// Precondition failure: the pool holds fewer units than requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("requested {requested} {pool} unit(s) but only {on_hand} on hand")]
pub struct InsufficientStock {
    pub pool: StockPool,
    pub requested: u32,
    pub on_hand: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error(transparent)]
    Insufficient(#[from] InsufficientStock),
    #[error("adding {units} unit(s) would overflow the {pool} pool")]
    Overflow { pool: StockPool, units: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_grows_total_and_available() {
        let next = StockMovement::Add(4)
            .apply(StockLevels::new(10, 8, 2))
            .expect("add applies");
        assert_eq!(next, StockLevels::new(14, 12, 2));
    }

    #[test]
    fn remove_leaves_total_untouched() {
        let next = StockMovement::Remove(3)
            .apply(StockLevels::new(10, 10, 0))
            .expect("remove applies");
        assert_eq!(next, StockLevels::new(10, 7, 0));
        assert_eq!(next.directly_consumed(), 3);
    }

    #[test]
    fn reserve_then_fulfill_conserves_units() {
        let reserved = StockMovement::Reserve(5)
            .apply(StockLevels::new(20, 20, 0))
            .expect("reserve applies");
        assert_eq!(reserved, StockLevels::new(20, 15, 5));

        let fulfilled = StockMovement::FulfillReserved(5)
            .apply(reserved)
            .expect("fulfil applies");
        assert_eq!(fulfilled, StockLevels::new(15, 15, 0));
        assert_eq!(
            fulfilled.available_units + fulfilled.reserved_units,
            fulfilled.total_units
        );
    }

    #[test]
    fn reserve_beyond_available_is_rejected() {
        let err = StockMovement::Reserve(6)
            .apply(StockLevels::new(8, 5, 3))
            .expect_err("insufficient");
        assert_eq!(
            err,
            TransitionError::Insufficient(InsufficientStock {
                pool: StockPool::Available,
                requested: 6,
                on_hand: 5,
            })
        );
    }

    #[test]
    fn fulfill_beyond_reserved_is_rejected() {
        let err = StockMovement::FulfillReserved(4)
            .apply(StockLevels::new(8, 5, 3))
            .expect_err("insufficient");
        assert!(matches!(
            err,
            TransitionError::Insufficient(InsufficientStock {
                pool: StockPool::Reserved,
                ..
            })
        ));
        assert!(err.to_string().contains("reserved"));
    }

    #[test]
    fn add_overflow_is_reported() {
        let err = StockMovement::Add(1)
            .apply(StockLevels::new(u32::MAX, u32::MAX, 0))
            .expect_err("overflow");
        assert!(matches!(err, TransitionError::Overflow { .. }));
    }

    #[test]
    fn consistency_survives_any_sequence_of_accepted_movements() {
        let movements = [
            StockMovement::Add(12),
            StockMovement::Reserve(5),
            StockMovement::Remove(2),
            StockMovement::Reserve(9),
            StockMovement::FulfillReserved(3),
            StockMovement::Add(1),
            StockMovement::FulfillReserved(2),
            StockMovement::Remove(7),
            StockMovement::Reserve(4),
        ];

        let mut levels = StockLevels::default();
        let mut consumed_directly = 0;
        for movement in movements {
            match movement.apply(levels) {
                Ok(next) => {
                    if let StockMovement::Remove(units) = movement {
                        consumed_directly += units;
                    }
                    levels = next;
                }
                Err(TransitionError::Insufficient(_)) => {}
                Err(other) => panic!("unexpected error {other:?}"),
            }
            assert!(levels.is_consistent(), "{levels:?} after {movement:?}");
            assert_eq!(
                levels.available_units + levels.reserved_units + consumed_directly,
                levels.total_units
            );
        }
    }
}
