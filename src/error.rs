//! Kernel error types
//!
//! Every variant is a configuration error detected while the task table is
//! being built. None of them can occur once the scheduler is running; the
//! firmware treats them as fatal at boot.

use core::fmt;

use crate::clock::Tick;

/// Result type for kernel configuration operations
pub type Result<T> = core::result::Result<T, KernelError>;

/// Task table configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KernelError {
    /// Slot index is outside the table
    SlotOutOfRange { slot: usize, capacity: usize },
    /// Slot already holds a registered task
    SlotTaken { slot: usize },
    /// Period is zero or too large for the wrap-safe due test
    InvalidPeriod { slot: usize, period_ms: Tick },
    /// Slot was never registered before boot
    UnregisteredSlot { slot: usize },
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::SlotOutOfRange { slot, capacity } => {
                write!(f, "slot {} out of range (capacity {})", slot, capacity)
            }
            KernelError::SlotTaken { slot } => write!(f, "slot {} already registered", slot),
            KernelError::InvalidPeriod { slot, period_ms } => {
                write!(f, "slot {}: invalid period {}ms", slot, period_ms)
            }
            KernelError::UnregisteredSlot { slot } => write!(f, "slot {} never registered", slot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            KernelError::SlotOutOfRange { slot: 4, capacity: 2 }.to_string(),
            "slot 4 out of range (capacity 2)"
        );
        assert_eq!(
            KernelError::InvalidPeriod { slot: 0, period_ms: 0 }.to_string(),
            "slot 0: invalid period 0ms"
        );
    }
}
