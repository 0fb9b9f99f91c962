//! Drive mode selection
//!
//! One purely combinational decision per tick: which gear, and which mixing
//! strategy. No memory is carried between ticks; the stall signal arrives
//! already debounced.

use serde::{Deserialize, Serialize};

/// Mechanical reduction selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gear {
    /// High-torque reduction for precise or forced-slow driving
    Low,
    /// High-speed reduction for normal driving
    High,
}

/// Drive actuation strategy for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveMode {
    /// Low gear, arcade mixing with the speed offset subtracted
    LowGearOffset,
    /// Low gear, plain arcade mixing
    LowGear,
    /// High gear, curvature mixing
    HighGear,
}

impl DriveMode {
    /// Gear selection implied by this mode
    pub fn gear(self) -> Gear {
        match self {
            DriveMode::LowGearOffset | DriveMode::LowGear => Gear::Low,
            DriveMode::HighGear => Gear::High,
        }
    }
}

/// Pick the drive mode for this tick, first match wins
///
/// Priority: forced offset mode, then forced low gear or a detected stall,
/// then normal high-gear curvature driving.
pub fn select_mode(force_low_offset: bool, force_low: bool, stalling: bool) -> DriveMode {
    if force_low_offset {
        DriveMode::LowGearOffset
    } else if force_low || stalling {
        DriveMode::LowGear
    } else {
        DriveMode::HighGear
    }
}
