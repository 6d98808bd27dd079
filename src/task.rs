//! # Task Control Block
//!
//! Defines the task model for miniOS. A task is a named, periodic action
//! living in a fixed slot of the task table. Its identity (slot, PID, name,
//! period) is fixed at registration; only its run state and timing fields
//! change afterwards, and only through the scheduler or the control plane.

use serde::Serialize;

use crate::clock::{self, Tick};

/// Process-identifier-like task id, unique for the lifetime of a task table.
pub type Pid = u32;

// ---------------------------------------------------------------------------
// Task state machine
// ---------------------------------------------------------------------------

/// Run state of a task.
///
/// ```text
///   ┌──────────┐   start / toggle    ┌─────────┐
///   │ Stopped  │ ──────────────────► │ Running │ ──┐ tick(): due → fire,
///   └──────────┘                     └─────────┘ ◄─┘ next = now + period
///        ▲            stop / toggle       │
///        └────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskState {
    /// Not considered by the scheduler; timing fields are inert.
    Stopped,
    /// Fired by the scheduler whenever `next_run_ms` is due.
    Running,
}

impl TaskState {
    /// Wire name of the state.
    pub const fn as_str(self) -> &'static str {
        match self {
            TaskState::Stopped => "STOPPED",
            TaskState::Running => "RUNNING",
        }
    }
}

// ---------------------------------------------------------------------------
// Task action
// ---------------------------------------------------------------------------

/// What a task's action sees when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskContext {
    /// Slot of the firing task.
    pub slot: usize,
    /// PID of the firing task.
    pub pid: Pid,
    /// Name of the firing task.
    pub name: &'static str,
    /// Clock reading of the tick that fired the task.
    pub now: Tick,
}

/// The side-effecting body of a task.
///
/// Actions run to completion on the scheduler's thread. The scheduler does
/// not observe failures; an action must contain its own errors.
pub trait TaskAction {
    fn run(&mut self, ctx: &TaskContext);
}

impl<F> TaskAction for F
where
    F: FnMut(&TaskContext),
{
    fn run(&mut self, ctx: &TaskContext) {
        self(ctx)
    }
}

// ---------------------------------------------------------------------------
// Read-only views
// ---------------------------------------------------------------------------

/// Full read-only view of a task, as reported by `status` and `info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskSnapshot {
    #[serde(rename = "id")]
    pub slot: usize,
    pub pid: Pid,
    pub name: &'static str,
    pub state: TaskState,
    pub last_run_ms: Tick,
    pub next_run_ms: Tick,
}

/// Identity-only view of a task, as reported by the task listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskIdentity {
    #[serde(rename = "id")]
    pub slot: usize,
    pub pid: Pid,
    pub name: &'static str,
}

// ---------------------------------------------------------------------------
// Task Control Block
// ---------------------------------------------------------------------------

/// Task Control Block (TCB) — one per registered task.
///
/// TCBs are stored inline in the scheduler's slot array and never move or
/// disappear once registered. The action is borrowed for the lifetime of
/// the table, so task bodies keep their private state outside the kernel.
pub struct TaskControlBlock<'a> {
    slot: usize,
    pid: Pid,
    name: &'static str,
    action: &'a mut dyn TaskAction,
    state: TaskState,
    period_ms: Tick,
    last_run_ms: Tick,
    next_run_ms: Tick,
}

impl<'a> TaskControlBlock<'a> {
    /// Build a freshly registered TCB.
    ///
    /// A task started immediately is first due one period after `now`; a
    /// stopped task keeps `next_run_ms` at zero until it is started.
    pub(crate) fn new(
        slot: usize,
        pid: Pid,
        name: &'static str,
        action: &'a mut dyn TaskAction,
        period_ms: Tick,
        start_immediately: bool,
        now: Tick,
    ) -> Self {
        let (state, next_run_ms) = if start_immediately {
            (TaskState::Running, clock::deadline_after(now, period_ms))
        } else {
            (TaskState::Stopped, 0)
        };

        Self {
            slot,
            pid,
            name,
            action,
            state,
            period_ms,
            last_run_ms: 0,
            next_run_ms,
        }
    }

    #[inline]
    pub fn slot(&self) -> usize {
        self.slot
    }

    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn state(&self) -> TaskState {
        self.state
    }

    #[inline]
    pub fn period_ms(&self) -> Tick {
        self.period_ms
    }

    #[inline]
    pub fn last_run_ms(&self) -> Tick {
        self.last_run_ms
    }

    #[inline]
    pub fn next_run_ms(&self) -> Tick {
        self.next_run_ms
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == TaskState::Running
    }

    /// Whether the scheduler should fire this task at `now`.
    #[inline]
    pub fn is_due(&self, now: Tick) -> bool {
        self.is_running() && clock::is_due(now, self.next_run_ms)
    }

    /// `Stopped → Running`, first due one full period after `now`.
    /// Returns `false` (and changes nothing) if already running.
    pub(crate) fn start(&mut self, now: Tick) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = TaskState::Running;
        self.next_run_ms = clock::deadline_after(now, self.period_ms);
        true
    }

    /// `Running → Stopped`. Timing fields stay as they were.
    /// Returns `false` if already stopped.
    pub(crate) fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = TaskState::Stopped;
        true
    }

    /// Run the action and reschedule relative to the actual fire time.
    pub(crate) fn fire(&mut self, now: Tick) {
        let ctx = TaskContext {
            slot: self.slot,
            pid: self.pid,
            name: self.name,
            now,
        };
        self.action.run(&ctx);
        self.last_run_ms = now;
        self.next_run_ms = clock::deadline_after(now, self.period_ms);
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            slot: self.slot,
            pid: self.pid,
            name: self.name,
            state: self.state,
            last_run_ms: self.last_run_ms,
            next_run_ms: self.next_run_ms,
        }
    }

    pub fn identity(&self) -> TaskIdentity {
        TaskIdentity {
            slot: self.slot,
            pid: self.pid,
            name: self.name,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_next_run_ms(&mut self, next_run_ms: Tick) {
        self.next_run_ms = next_run_ms;
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
