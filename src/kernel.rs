//! # Kernel
//!
//! Ties the task table to the request transport and runs the control loop.
//!
//! ## Startup Sequence
//!
//! ```text
//! reset_handler (cortex-m-rt)
//!   └─► main()
//!         ├─► Scheduler::new()       ← Empty task table over the SysTick clock
//!         ├─► Scheduler::register()  ← One call per slot (×N)
//!         ├─► Kernel::new()          ← Refuses to boot with an unregistered slot
//!         └─► Kernel::run()          ← Control loop (no return)
//! ```
//!
//! ## Control Cycle
//!
//! Each iteration first services at most one pending request, then runs one
//! scheduler tick. The two phases never overlap, so the task table needs no
//! lock: the kernel lends it to the router and the scheduler in turn.

use crate::clock::Clock;
use crate::error::Result;
use crate::router;
use crate::scheduler::Scheduler;
use crate::transport::Transport;
use crate::{log_debug, log_info};

/// What one control cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// A request was routed and answered.
    pub handled_request: bool,
    /// Tasks fired by the tick.
    pub fired: usize,
}

/// The running system: task table plus request transport.
pub struct Kernel<'a, C: Clock, T: Transport, const N: usize> {
    scheduler: Scheduler<'a, C, N>,
    transport: T,
}

impl<'a, C: Clock, T: Transport, const N: usize> Kernel<'a, C, T, N> {
    /// Boot the kernel over a fully registered task table.
    ///
    /// # Returns
    /// - `Ok(kernel)` — ready to run
    /// - `Err(KernelError::UnregisteredSlot)` — a slot was left empty
    pub fn new(scheduler: Scheduler<'a, C, N>, transport: T) -> Result<Self> {
        scheduler.validate()?;
        log_info!("[KERNEL] Booted with {} tasks at {}ms", N, scheduler.now());
        Ok(Self { scheduler, transport })
    }

    /// Run one control cycle: route at most one request, then tick.
    pub fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        if let Some(line) = self.transport.poll_request() {
            let body = router::handle(&mut self.scheduler, &line);
            self.transport.send_response(&body);
            report.handled_request = true;
        }

        report.fired = self.scheduler.tick();
        if report.fired > 0 {
            log_debug!("[KERNEL] Tick fired {} tasks", report.fired);
        }
        report
    }

    /// Run the control loop forever.
    pub fn run(&mut self) -> ! {
        log_info!("[KERNEL] Entering control loop");
        loop {
            self.run_cycle();
        }
    }

    pub fn scheduler(&self) -> &Scheduler<'a, C, N> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<'a, C, N> {
        &mut self.scheduler
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
