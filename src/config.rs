//! # miniOS Configuration
//!
//! Compile-time constants governing the task table, the clock and the
//! control-plane buffers. All limits are fixed at compile time — no dynamic
//! allocation.

use crate::clock::Tick;

/// Number of task slots in the firmware's task table. Every slot must be
/// registered during initialization; the kernel refuses to boot otherwise.
pub const NUM_TASKS: usize = 2;

/// SysTick frequency in Hz. One tick of the kernel clock is one millisecond.
pub const TICK_HZ: u32 = 1000;

/// System clock frequency in Hz (default for STM32F4 at 16 MHz HSI).
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;

/// First PID handed out by a task table. Later registrations count up from here.
pub const PID_BASE: u32 = 1000;

/// Largest accepted task period. The wrap-safe due test compares deadlines
/// as signed differences, so a period must stay below half the clock range.
pub const MAX_PERIOD_MS: Tick = i32::MAX as Tick;

/// Blink cadence of the LED task.
pub const DEFAULT_BLINK_MS: Tick = 500;

/// Cadence of the console printer task.
pub const DEFAULT_PRINT_MS: Tick = 1000;

/// Longest request line the transport will assemble, excluding the terminator.
/// Longer lines are discarded.
pub const REQUEST_LINE_CAPACITY: usize = 128;

/// Capacity of a JSON response body.
pub const RESPONSE_CAPACITY: usize = 1024;

/// Baud rate of the request link (USART2, ST-LINK virtual COM port).
pub const SERIAL_BAUD: u32 = 115_200;
