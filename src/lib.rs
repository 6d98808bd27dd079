//! # miniOS — cooperative periodic-task kernel
//!
//! A minimal multitasking kernel for single-core microcontrollers: a fixed
//! table of periodic tasks, a non-preemptive scheduler driven by a wrapping
//! millisecond clock, and a JSON control plane for starting, stopping and
//! inspecting tasks while the scheduler runs.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │           Task Bodies (tasks.rs) · Blinker · Printer    │
//! ├────────────────────────────────────────────────────────┤
//! │               Kernel control loop (kernel.rs)           │
//! │        poll request → route → respond → tick()          │
//! ├──────────────┬────────────────────┬───────────────────┤
//! │  Transport   │   Router           │  Control Plane    │
//! │  transport.rs│   router.rs        │  control.rs       │
//! │  ─ lines     │   ─ route table    │  ─ start · stop   │
//! │  ─ HTTP frame│   ─ JSON bodies    │  ─ toggle · snap  │
//! ├──────────────┴────────────────────┴───────────────────┤
//! │        Scheduler + Task Table (scheduler.rs)            │
//! │          register() · tick() · slot arena               │
//! ├────────────────────────────────────────────────────────┤
//! │        Task Model (task.rs) · Clock (clock.rs)          │
//! ├────────────────────────────────────────────────────────┤
//! │   Arch Port (arch/cortex_m4.rs, arch/stm32f4.rs)        │
//! │   SysTick clock · ITM console · LED · USART2           │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Execution Model
//!
//! - **One thread**: the control loop alternates between serving at most one
//!   request and running one scheduler tick; nothing else touches the table
//! - **Run to completion**: task actions are never interrupted by other tasks
//! - **Wrap-safe deadlines**: due tests use signed differences of `u32` ticks
//!
//! ## Memory Model
//!
//! - **No heap**: all state is statically sized
//! - **Fixed slot array**: `[Option<TaskControlBlock>; N]`, filled at init
//! - **Bounded buffers**: `heapless` strings for request lines and responses

#![cfg_attr(not(test), no_std)]

pub mod clock;
pub mod config;
pub mod control;
pub mod error;
pub mod kernel;
pub mod logging;
pub mod router;
pub mod scheduler;
pub mod task;
pub mod tasks;
pub mod transport;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod arch;

#[cfg(test)]
mod mock;

pub use clock::{Clock, Tick};
pub use error::KernelError;
pub use kernel::Kernel;
pub use scheduler::Scheduler;
pub use task::{Pid, TaskAction, TaskContext, TaskState};
