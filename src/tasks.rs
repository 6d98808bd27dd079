//! # Task Bodies
//!
//! The concrete actions the firmware registers. Each body owns whatever
//! state it needs between firings.
//!
//! | Task | Slot | Period | Behavior |
//! |------|------|--------|----------|
//! | `Blinker` | 0 | `DEFAULT_BLINK_MS` | Flips the LED on every firing |
//! | `Printer` | 1 | `DEFAULT_PRINT_MS` | Writes a hello line to the console |

use core::fmt::Write;

use embedded_hal::digital::{OutputPin, PinState};

use crate::log_warn;
use crate::task::{TaskAction, TaskContext};

/// Toggles an output pin on every firing. Starts with the LED off.
pub struct Blinker<P> {
    pin: P,
    led_on: bool,
}

impl<P: OutputPin> Blinker<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, led_on: false }
    }

    pub fn is_on(&self) -> bool {
        self.led_on
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }
}

impl<P: OutputPin> TaskAction for Blinker<P> {
    fn run(&mut self, ctx: &TaskContext) {
        self.led_on = !self.led_on;
        if self.pin.set_state(PinState::from(self.led_on)).is_err() {
            log_warn!("[TASK] {} failed to drive LED", ctx.name);
        }
    }
}

/// Writes `[PID p] Hello from task 'name' (id=slot) at Nms` to a console.
pub struct Printer<W> {
    console: W,
}

impl<W: Write> Printer<W> {
    pub fn new(console: W) -> Self {
        Self { console }
    }

    pub fn console(&self) -> &W {
        &self.console
    }
}

impl<W: Write> TaskAction for Printer<W> {
    fn run(&mut self, ctx: &TaskContext) {
        let written = write!(
            self.console,
            "[PID {}] Hello from task '{}' (id={}) at {}ms\r\n",
            ctx.pid, ctx.name, ctx.slot, ctx.now
        );
        if written.is_err() {
            log_warn!("[TASK] {} console write failed", ctx.name);
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
