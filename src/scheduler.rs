//! # Scheduler
//!
//! Owns the task table and performs the periodic sweep. Implements a
//! cooperative, non-preemptive, run-to-completion scheduler driven by a
//! wrapping millisecond clock.
//!
//! ## Scheduling Algorithm
//!
//! On every `tick()`:
//! 1. **Read the clock once**: all decisions in the sweep use the same `now`
//! 2. **Sweep slots in ascending order**: stopped tasks are skipped
//! 3. **Due test**: `now - next_run_ms`, read as a signed value, is `>= 0`
//! 4. **Fire**: run the action to completion, then set
//!    `last_run_ms = now` and `next_run_ms = now + period_ms`
//!
//! Rescheduling is relative to the actual fire time, so a late task does not
//! build up a backlog of missed firings.

use crate::clock::{Clock, Tick};
use crate::config::{MAX_PERIOD_MS, PID_BASE};
use crate::error::{KernelError, Result};
use crate::task::{Pid, TaskAction, TaskControlBlock};
use crate::{log_debug, log_info};

// ---------------------------------------------------------------------------
// Scheduler struct
// ---------------------------------------------------------------------------

/// The task table plus the clock that drives it.
///
/// ## Design Notes
///
/// - All tasks live inline in a fixed-size slot array (no heap)
/// - A slot index is the task's external handle and never changes
/// - Slots are filled during initialization only; nothing is ever removed
/// - PIDs come from a per-table counter starting at `PID_BASE`
pub struct Scheduler<'a, C: Clock, const N: usize> {
    /// Fixed-size slot array. `None` only before registration.
    tasks: [Option<TaskControlBlock<'a>>; N],

    /// Millisecond time source.
    clock: C,

    /// PID handed to the next registration.
    next_pid: Pid,
}

impl<'a, C: Clock, const N: usize> Scheduler<'a, C, N> {
    /// Create an empty task table.
    pub fn new(clock: C) -> Self {
        Self {
            tasks: core::array::from_fn(|_| None),
            clock,
            next_pid: PID_BASE,
        }
    }

    /// Register a task in `slot`.
    ///
    /// Must be called during initialization only. A started task is first
    /// due one period from now; a stopped one waits for `start`.
    ///
    /// # Returns
    /// - `Ok(pid)` — the PID assigned to the task
    /// - `Err(KernelError)` — bad slot, duplicate slot, or bad period
    pub fn register(
        &mut self,
        slot: usize,
        name: &'static str,
        action: &'a mut dyn TaskAction,
        period_ms: Tick,
        start_immediately: bool,
    ) -> Result<Pid> {
        if slot >= N {
            return Err(KernelError::SlotOutOfRange { slot, capacity: N });
        }
        if self.tasks[slot].is_some() {
            return Err(KernelError::SlotTaken { slot });
        }
        if period_ms == 0 || period_ms > MAX_PERIOD_MS {
            return Err(KernelError::InvalidPeriod { slot, period_ms });
        }

        let pid = self.next_pid;
        self.next_pid += 1;

        let now = self.clock.now();
        let tcb = TaskControlBlock::new(slot, pid, name, action, period_ms, start_immediately, now);
        log_info!(
            "[SCHED] Registered {} (slot {}, pid {}, every {}ms, {})",
            name,
            slot,
            pid,
            period_ms,
            tcb.state().as_str()
        );
        self.tasks[slot] = Some(tcb);
        Ok(pid)
    }

    /// Check that every slot was registered. Called once before the run loop.
    pub fn validate(&self) -> Result<()> {
        match self.tasks.iter().position(Option::is_none) {
            Some(slot) => Err(KernelError::UnregisteredSlot { slot }),
            None => Ok(()),
        }
    }

    /// Run one sweep: fire every running task whose deadline has passed.
    ///
    /// Returns the number of tasks fired.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;

        for tcb in self.tasks.iter_mut().flatten() {
            if !tcb.is_due(now) {
                continue;
            }
            tcb.fire(now);
            fired += 1;
            log_debug!("[SCHED] Fired {} at {}ms", tcb.name(), now);
        }

        fired
    }

    /// Current clock reading.
    #[inline]
    pub fn now(&self) -> Tick {
        self.clock.now()
    }

    /// The task in `slot`, if the slot exists and is registered.
    pub fn task(&self, slot: usize) -> Option<&TaskControlBlock<'a>> {
        self.tasks.get(slot).and_then(Option::as_ref)
    }

    pub(crate) fn task_mut(&mut self, slot: usize) -> Option<&mut TaskControlBlock<'a>> {
        self.tasks.get_mut(slot).and_then(Option::as_mut)
    }

    /// Registered tasks in slot order.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskControlBlock<'a>> {
        self.tasks.iter().flatten()
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::task::{TaskContext, TaskState};
    use core::cell::RefCell;
    use std::vec::Vec;

    /// Records `(slot, now)` for every firing into a shared log.
    struct Recorder<'l> {
        log: &'l RefCell<Vec<(usize, Tick)>>,
    }

    impl TaskAction for Recorder<'_> {
        fn run(&mut self, ctx: &TaskContext) {
            self.log.borrow_mut().push((ctx.slot, ctx.now));
        }
    }

    #[test]
    fn test_register_assigns_increasing_pids() {
        let clock = MockClock::new();
        let mut a = |_: &TaskContext| {};
        let mut b = |_: &TaskContext| {};
        let mut sched: Scheduler<_, 2> = Scheduler::new(&clock);

        assert_eq!(sched.register(1, "b", &mut b, 100, false), Ok(PID_BASE));
        assert_eq!(sched.register(0, "a", &mut a, 100, false), Ok(PID_BASE + 1));
        assert_eq!(sched.task(1).map(|t| t.pid()), Some(PID_BASE));
        assert!(sched.validate().is_ok());
    }

    #[test]
    fn test_register_rejects_bad_config() {
        let clock = MockClock::new();
        let mut a = |_: &TaskContext| {};
        let mut b = |_: &TaskContext| {};
        let mut c = |_: &TaskContext| {};
        let mut d = |_: &TaskContext| {};
        let mut sched: Scheduler<_, 2> = Scheduler::new(&clock);

        assert_eq!(
            sched.register(2, "a", &mut a, 100, false),
            Err(KernelError::SlotOutOfRange { slot: 2, capacity: 2 })
        );
        assert_eq!(
            sched.register(0, "b", &mut b, 0, false),
            Err(KernelError::InvalidPeriod { slot: 0, period_ms: 0 })
        );
        assert_eq!(
            sched.register(0, "c", &mut c, MAX_PERIOD_MS + 1, false),
            Err(KernelError::InvalidPeriod { slot: 0, period_ms: MAX_PERIOD_MS + 1 })
        );
        assert!(sched.register(0, "d", &mut d, 100, false).is_ok());
        assert_eq!(sched.validate(), Err(KernelError::UnregisteredSlot { slot: 1 }));
    }

    #[test]
    fn test_register_rejects_duplicate_slot() {
        let clock = MockClock::new();
        let mut a = |_: &TaskContext| {};
        let mut b = |_: &TaskContext| {};
        let mut c = |_: &TaskContext| {};
        let mut sched: Scheduler<_, 2> = Scheduler::new(&clock);

        assert_eq!(sched.register(0, "a", &mut a, 100, false), Ok(PID_BASE));
        assert_eq!(
            sched.register(0, "b", &mut b, 100, false),
            Err(KernelError::SlotTaken { slot: 0 })
        );
        // Failed registrations do not consume a PID or replace the task
        assert_eq!(sched.task(0).map(|t| t.name()), Some("a"));
        assert_eq!(sched.register(1, "c", &mut c, 100, false), Ok(PID_BASE + 1));
    }

    #[test]
    fn test_tick_fires_once_per_period_without_drift() {
        let clock = MockClock::new();
        let log = RefCell::new(Vec::new());
        let mut rec = Recorder { log: &log };
        let mut sched: Scheduler<_, 1> = Scheduler::new(&clock);
        sched.register(0, "rec", &mut rec, 100, true).unwrap();

        // Ticks arrive late by varying amounts
        for now in [50, 100, 130, 229, 230, 345] {
            clock.set(now);
            sched.tick();
        }

        // 100 fires → next 200; 229 fires (late) → next 329; 345 fires
        assert_eq!(*log.borrow(), [(0, 100), (0, 229), (0, 345)]);
        let tcb = sched.task(0).unwrap();
        assert_eq!(tcb.last_run_ms(), 345);
        assert_eq!(tcb.next_run_ms(), 445);
    }

    #[test]
    fn test_tick_skips_stopped_tasks() {
        let clock = MockClock::new();
        let log = RefCell::new(Vec::new());
        let mut rec = Recorder { log: &log };
        let mut sched: Scheduler<_, 1> = Scheduler::new(&clock);
        sched.register(0, "rec", &mut rec, 100, false).unwrap();

        clock.set(10_000);
        assert_eq!(sched.tick(), 0);
        assert!(log.borrow().is_empty());
        assert_eq!(sched.task(0).unwrap().state(), TaskState::Stopped);
    }

    #[test]
    fn test_tick_runs_due_tasks_in_slot_order() {
        let clock = MockClock::new();
        let log = RefCell::new(Vec::new());
        let mut rec0 = Recorder { log: &log };
        let mut rec1 = Recorder { log: &log };
        let mut rec2 = Recorder { log: &log };
        let mut sched: Scheduler<_, 3> = Scheduler::new(&clock);

        // Registered out of order on purpose
        sched.register(2, "c", &mut rec2, 10, true).unwrap();
        sched.register(0, "a", &mut rec0, 10, true).unwrap();
        sched.register(1, "b", &mut rec1, 10, true).unwrap();

        clock.set(10);
        assert_eq!(sched.tick(), 3);
        assert_eq!(*log.borrow(), [(0, 10), (1, 10), (2, 10)]);
    }

    #[test]
    fn test_tick_handles_clock_wrap() {
        let clock = MockClock::new();
        let log = RefCell::new(Vec::new());
        let mut rec = Recorder { log: &log };
        let mut sched: Scheduler<_, 1> = Scheduler::new(&clock);
        sched.register(0, "rec", &mut rec, 100, true).unwrap();

        sched.task_mut(0).unwrap().set_next_run_ms(Tick::MAX - 10);

        clock.set(Tick::MAX - 20);
        assert_eq!(sched.tick(), 0);

        // Clock wraps past the deadline
        clock.set(5);
        assert_eq!(sched.tick(), 1);
        assert_eq!(*log.borrow(), [(0, 5)]);
        assert_eq!(sched.task(0).unwrap().next_run_ms(), 105);
    }

    #[test]
    fn test_deadline_set_before_wrap_fires_after() {
        let clock = MockClock::starting_at(Tick::MAX - 49);
        let log = RefCell::new(Vec::new());
        let mut rec = Recorder { log: &log };
        let mut sched: Scheduler<_, 1> = Scheduler::new(&clock);
        sched.register(0, "rec", &mut rec, 100, true).unwrap();

        // next_run_ms wrapped to 50
        assert_eq!(sched.task(0).unwrap().next_run_ms(), 50);

        clock.set(Tick::MAX);
        assert_eq!(sched.tick(), 0);
        clock.set(49);
        assert_eq!(sched.tick(), 0);
        clock.set(50);
        assert_eq!(sched.tick(), 1);
    }
}
