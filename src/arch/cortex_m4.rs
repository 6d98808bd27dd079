//! # Cortex-M4 Port Layer
//!
//! Core-peripheral pieces of the port: the SysTick millisecond clock and an
//! ITM console for task output.
//!
//! ## Clock
//!
//! SysTick fires at `TICK_HZ` (1 kHz). The handler only bumps an atomic
//! counter, so the control loop reads time without a critical section and
//! the counter wraps naturally at `u32::MAX`.

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::{ITM, SYST};

use crate::clock::{Clock, Tick};
use crate::config::{SYSTEM_CLOCK_HZ, TICK_HZ};

/// Milliseconds since SysTick was started.
static MILLIS: AtomicU32 = AtomicU32::new(0);

// ---------------------------------------------------------------------------
// SysTick configuration
// ---------------------------------------------------------------------------

/// Configure the SysTick timer for the kernel clock.
///
/// Sets up SysTick to fire at `TICK_HZ` frequency using the processor
/// clock. Each tick must call `on_systick()`.
pub fn configure_systick(syst: &mut SYST) {
    let reload = SYSTEM_CLOCK_HZ / TICK_HZ - 1;
    syst.set_reload(reload);
    syst.clear_current();
    syst.set_clock_source(SystClkSource::Core);
    syst.enable_counter();
    syst.enable_interrupt();
}

/// Advance the kernel clock by one millisecond. Call from the `SysTick`
/// exception handler only.
#[inline]
pub fn on_systick() {
    MILLIS.fetch_add(1, Ordering::Relaxed);
}

/// Kernel clock backed by SysTick.
pub struct SysTickClock {
    _syst: SYST,
}

impl SysTickClock {
    /// Take SysTick, start it, and begin counting from zero.
    pub fn start(mut syst: SYST) -> Self {
        MILLIS.store(0, Ordering::Relaxed);
        configure_systick(&mut syst);
        Self { _syst: syst }
    }
}

impl Clock for SysTickClock {
    fn now(&self) -> Tick {
        MILLIS.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// ITM console
// ---------------------------------------------------------------------------

/// Text console on ITM stimulus port 0 (SWO).
///
/// Output is discarded while no debugger has enabled the ITM, instead of
/// stalling on a FIFO that never drains.
pub struct ItmConsole {
    itm: ITM,
}

impl ItmConsole {
    pub fn new(itm: ITM) -> Self {
        Self { itm }
    }

    fn enabled(&self) -> bool {
        const ITMENA: u32 = 1 << 0;
        self.itm.tcr.read() & ITMENA != 0 && self.itm.ter[0].read() & 1 != 0
    }
}

impl fmt::Write for ItmConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.enabled() {
            cortex_m::itm::write_str(&mut self.itm.stim[0], s);
        }
        Ok(())
    }
}
