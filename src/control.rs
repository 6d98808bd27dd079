//! # Control Plane
//!
//! Lifecycle operations on the task table, callable between scheduler ticks.
//! Mutators are silent no-ops on an invalid slot or when the task is already
//! in the requested state; they return whether anything changed.
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `start`   | `Stopped → Running`, next firing one full period from now |
//! | `stop`    | `Running → Stopped`, timing fields left as-is |
//! | `toggle`  | `stop` if running, otherwise `start` |
//! | `snapshot`| read-only view of one or all tasks |

use crate::clock::Clock;
use crate::log_info;
use crate::scheduler::Scheduler;
use crate::task::{TaskIdentity, TaskSnapshot};

impl<'a, C: Clock, const N: usize> Scheduler<'a, C, N> {
    /// Start the task in `slot`. Never fires it immediately and never reuses
    /// a deadline from before it was stopped.
    pub fn start(&mut self, slot: usize) -> bool {
        let now = self.now();
        let Some(tcb) = self.task_mut(slot) else {
            return false;
        };
        let started = tcb.start(now);
        if started {
            log_info!("[CTRL] Started {} (next at {}ms)", tcb.name(), tcb.next_run_ms());
        }
        started
    }

    /// Stop the task in `slot`. Any in-flight firing has already completed.
    pub fn stop(&mut self, slot: usize) -> bool {
        let Some(tcb) = self.task_mut(slot) else {
            return false;
        };
        let stopped = tcb.stop();
        if stopped {
            log_info!("[CTRL] Stopped {}", tcb.name());
        }
        stopped
    }

    /// Flip the task in `slot` between running and stopped.
    pub fn toggle(&mut self, slot: usize) -> bool {
        let running = match self.task(slot) {
            Some(tcb) => tcb.is_running(),
            None => return false,
        };
        if running {
            self.stop(slot)
        } else {
            self.start(slot)
        }
    }

    /// Full view of one task, or `None` for an invalid slot.
    pub fn snapshot(&self, slot: usize) -> Option<TaskSnapshot> {
        self.task(slot).map(|tcb| tcb.snapshot())
    }

    /// Full view of every task, in slot order.
    pub fn snapshot_all(&self) -> impl Iterator<Item = TaskSnapshot> + use<'_, 'a, C, N> {
        self.tasks().map(|tcb| tcb.snapshot())
    }

    /// Identity-only view of every task, in slot order.
    pub fn identities(&self) -> impl Iterator<Item = TaskIdentity> + use<'_, 'a, C, N> {
        self.tasks().map(|tcb| tcb.identity())
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
