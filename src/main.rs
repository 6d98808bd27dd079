//! # miniOS Firmware (NUCLEO-F401RE)
//!
//! Registers the two demo tasks, both stopped, and serves the task control
//! API on USART2 (the ST-LINK virtual COM port, 115200 8N1):
//!
//! | Slot | Task | Period | Output |
//! |------|------|--------|--------|
//! | 0 | `Blinker` | 500 ms | LD2 (PA5) |
//! | 1 | `SerialPrinter` | 1000 ms | ITM port 0 (SWO) |
//!
//! Send `GET /tasks/start/0` followed by a newline to start blinking;
//! `GET /tasks/status` lists both tasks with their timing.
//!
//! The firmware only builds for bare-metal ARM targets, e.g.
//! `cargo build --release --target thumbv7em-none-eabihf`.

#![cfg_attr(all(target_arch = "arm", target_os = "none"), no_std)]
#![cfg_attr(all(target_arch = "arm", target_os = "none"), no_main)]

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod firmware {
    use cortex_m_rt::{entry, exception};
    #[cfg(feature = "defmt")]
    use defmt_rtt as _;
    use panic_halt as _;

    use minios::arch::cortex_m4::{self, ItmConsole, SysTickClock};
    use minios::arch::stm32f4::Board;
    use minios::config::{DEFAULT_BLINK_MS, DEFAULT_PRINT_MS, NUM_TASKS};
    use minios::log_info;
    use minios::tasks::{Blinker, Printer};
    use minios::transport::SerialTransport;
    use minios::{Kernel, Scheduler};

    /// Firmware entry point. Builds the task table, boots the kernel and
    /// runs the control loop. Does not return.
    #[entry]
    fn main() -> ! {
        let cp = cortex_m::Peripherals::take().unwrap();
        let board = Board::take().unwrap();

        log_info!("miniOS v{}", env!("CARGO_PKG_VERSION"));

        let mut blinker = Blinker::new(board.led);
        let mut printer = Printer::new(ItmConsole::new(cp.ITM));
        let clock = SysTickClock::start(cp.SYST);

        let mut scheduler: Scheduler<_, NUM_TASKS> = Scheduler::new(clock);
        scheduler
            .register(0, "Blinker", &mut blinker, DEFAULT_BLINK_MS, false)
            .expect("Failed to register Blinker");
        scheduler
            .register(1, "SerialPrinter", &mut printer, DEFAULT_PRINT_MS, false)
            .expect("Failed to register SerialPrinter");

        let transport = SerialTransport::new(board.usart2);
        let mut kernel = Kernel::new(scheduler, transport).expect("Task table incomplete");
        kernel.run()
    }

    #[exception]
    fn SysTick() {
        cortex_m4::on_systick();
    }
}

#[cfg(not(all(target_arch = "arm", target_os = "none")))]
fn main() {
    eprintln!("miniOS firmware runs on bare-metal ARM; build with --target thumbv7em-none-eabihf");
}
