use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::blood_type::BloodType;

/// Unit counts held for one blood type.
///
/// Units leave through two paths. Reserved units are consumed by a fulfilment, which lowers
/// `total_units`. Direct removals only lower `available_units`, so the gap between `total_units`
/// and the two pools is the running count of directly consumed units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StockLevels {
    pub total_units: u32,
    pub available_units: u32,
    pub reserved_units: u32,
}

impl StockLevels {
    pub const fn new(total_units: u32, available_units: u32, reserved_units: u32) -> Self {
        Self {
            total_units,
            available_units,
            reserved_units,
        }
    }

    /// Units issued through direct removal that are still counted in `total_units`.
    pub fn directly_consumed(&self) -> u32 {
        self.total_units
            .saturating_sub(self.available_units.saturating_add(self.reserved_units))
    }

    /// `available + reserved` never exceeds `total`.
    pub fn is_consistent(&self) -> bool {
        u64::from(self.available_units) + u64::from(self.reserved_units)
            <= u64::from(self.total_units)
    }
}

/// Stock row for a single blood type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodStock {
    pub blood_type: BloodType,
    pub total_units: u32,
    pub available_units: u32,
    pub reserved_units: u32,
    pub last_updated: DateTime<Utc>,
    /// Incremented by the repository on every successful write.
    pub version: u64,
}

impl BloodStock {
    pub fn empty(blood_type: BloodType, now: DateTime<Utc>) -> Self {
        Self::with_levels(blood_type, StockLevels::default(), now)
    }

    pub fn with_levels(blood_type: BloodType, levels: StockLevels, now: DateTime<Utc>) -> Self {
        Self {
            blood_type,
            total_units: levels.total_units,
            available_units: levels.available_units,
            reserved_units: levels.reserved_units,
            last_updated: now,
            version: 0,
        }
    }

    pub fn levels(&self) -> StockLevels {
        StockLevels::new(self.total_units, self.available_units, self.reserved_units)
    }

    /// Copy carrying new levels and timestamp; the version is left for the repository to bump.
    pub fn advanced(&self, levels: StockLevels, now: DateTime<Utc>) -> Self {
        Self {
            blood_type: self.blood_type,
            total_units: levels.total_units,
            available_units: levels.available_units,
            reserved_units: levels.reserved_units,
            last_updated: now,
            version: self.version,
        }
    }
}

/// Thresholds used to grade available stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockThresholds {
    pub critical_below: u32,
    pub low_below: u32,
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self {
            critical_below: 5,
            low_below: 10,
        }
    }
}

/// Grade of available units for a blood type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Critical,
    Low,
    Adequate,
}

impl StockStatus {
    pub fn classify(available_units: u32, thresholds: &StockThresholds) -> Self {
        if available_units < thresholds.critical_below {
            StockStatus::Critical
        } else if available_units < thresholds.low_below {
            StockStatus::Low
        } else {
            StockStatus::Adequate
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            StockStatus::Critical => "Critical",
            StockStatus::Low => "Low",
            StockStatus::Adequate => "Adequate",
        }
    }
}

/// Answer to "can `units_needed` be served from available stock right now?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub available: bool,
    pub current_units: u32,
    pub units_needed: u32,
    pub shortage: u32,
}

impl Availability {
    pub fn assess(current_units: u32, units_needed: u32) -> Self {
        Self {
            available: current_units >= units_needed,
            current_units,
            units_needed,
            shortage: units_needed.saturating_sub(current_units),
        }
    }
}
