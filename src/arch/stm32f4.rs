//! # STM32F4 Board Layer (NUCLEO-F401RE)
//!
//! Register-level drivers for the two board resources the firmware uses:
//!
//! | Resource | Pins | Use |
//! |----------|------|-----|
//! | LD2 (green LED) | PA5 | Blinker task output |
//! | USART2 | PA2 (TX), PA3 (RX), AF7 | Request link (ST-LINK virtual COM port) |
//!
//! Clocks are left at reset defaults (16 MHz HSI, no PLL), matching
//! `SYSTEM_CLOCK_HZ`.

use core::convert::Infallible;
use core::ptr::{read_volatile, write_volatile};
use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write};

use crate::config::{SERIAL_BAUD, SYSTEM_CLOCK_HZ};

// ---------------------------------------------------------------------------
// Register map
// ---------------------------------------------------------------------------

const RCC_AHB1ENR: usize = 0x4002_3830;
const RCC_APB1ENR: usize = 0x4002_3840;
const RCC_AHB1ENR_GPIOAEN: u32 = 1 << 0;
const RCC_APB1ENR_USART2EN: u32 = 1 << 17;

const GPIOA: usize = 0x4002_0000;
const GPIO_MODER: usize = 0x00;
const GPIO_BSRR: usize = 0x18;
const GPIO_AFRL: usize = 0x20;

const USART2: usize = 0x4000_4400;
const USART_SR: usize = 0x00;
const USART_DR: usize = 0x04;
const USART_BRR: usize = 0x08;
const USART_CR1: usize = 0x0C;
const USART_SR_ORE: u32 = 1 << 3;
const USART_SR_RXNE: u32 = 1 << 5;
const USART_SR_TC: u32 = 1 << 6;
const USART_SR_TXE: u32 = 1 << 7;
const USART_CR1_RE: u32 = 1 << 2;
const USART_CR1_TE: u32 = 1 << 3;
const USART_CR1_UE: u32 = 1 << 13;

const LED_PIN: u32 = 5;
const TX_PIN: u32 = 2;
const RX_PIN: u32 = 3;
const AF7_USART2: u32 = 7;

#[inline]
fn read_reg(addr: usize) -> u32 {
    unsafe { read_volatile(addr as *const u32) }
}

#[inline]
fn write_reg(addr: usize, value: u32) {
    unsafe { write_volatile(addr as *mut u32, value) }
}

#[inline]
fn modify_reg(addr: usize, f: impl FnOnce(u32) -> u32) {
    write_reg(addr, f(read_reg(addr)));
}

// ---------------------------------------------------------------------------
// Board singleton
// ---------------------------------------------------------------------------

static TAKEN: AtomicBool = AtomicBool::new(false);

/// Board resources. Exists at most once.
pub struct Board {
    pub led: Led,
    pub usart2: Usart2,
}

impl Board {
    /// Configure the board and hand out its resources. `None` after the
    /// first call.
    pub fn take() -> Option<Self> {
        if TAKEN.swap(true, Ordering::AcqRel) {
            return None;
        }
        modify_reg(RCC_AHB1ENR, |v| v | RCC_AHB1ENR_GPIOAEN);
        modify_reg(RCC_APB1ENR, |v| v | RCC_APB1ENR_USART2EN);

        Some(Self {
            led: Led::init(),
            usart2: Usart2::init(SERIAL_BAUD),
        })
    }
}

// ---------------------------------------------------------------------------
// LED
// ---------------------------------------------------------------------------

/// LD2 on PA5, push-pull output.
pub struct Led {
    _private: (),
}

impl Led {
    fn init() -> Self {
        let shift = LED_PIN * 2;
        modify_reg(GPIOA + GPIO_MODER, |v| (v & !(0b11 << shift)) | (0b01 << shift));
        write_reg(GPIOA + GPIO_BSRR, 1 << (LED_PIN + 16));
        Self { _private: () }
    }
}

impl PinErrorType for Led {
    type Error = Infallible;
}

impl OutputPin for Led {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        write_reg(GPIOA + GPIO_BSRR, 1 << (LED_PIN + 16));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        write_reg(GPIOA + GPIO_BSRR, 1 << LED_PIN);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// USART2
// ---------------------------------------------------------------------------

/// USART2 receive errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsartError {
    /// A byte arrived before the previous one was read
    Overrun,
}

impl embedded_io::Error for UsartError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// USART2, 8N1, polled.
pub struct Usart2 {
    _private: (),
}

impl Usart2 {
    fn init(baud: u32) -> Self {
        for pin in [TX_PIN, RX_PIN] {
            let mode_shift = pin * 2;
            modify_reg(GPIOA + GPIO_MODER, |v| (v & !(0b11 << mode_shift)) | (0b10 << mode_shift));
            let af_shift = pin * 4;
            modify_reg(GPIOA + GPIO_AFRL, |v| (v & !(0xF << af_shift)) | (AF7_USART2 << af_shift));
        }

        // Oversampling by 16: BRR holds fck / baud, rounded
        write_reg(USART2 + USART_BRR, (SYSTEM_CLOCK_HZ + baud / 2) / baud);
        write_reg(USART2 + USART_CR1, USART_CR1_UE | USART_CR1_TE | USART_CR1_RE);
        Self { _private: () }
    }

    #[inline]
    fn status(&self) -> u32 {
        read_reg(USART2 + USART_SR)
    }
}

impl ErrorType for Usart2 {
    type Error = UsartError;
}

impl ReadReady for Usart2 {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.status() & USART_SR_RXNE != 0)
    }
}

impl Read for Usart2 {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut n = 0;
        loop {
            let sr = self.status();
            if sr & USART_SR_ORE != 0 {
                // SR then DR read clears ORE
                let _ = read_reg(USART2 + USART_DR);
                return Err(UsartError::Overrun);
            }
            if sr & USART_SR_RXNE != 0 {
                buf[n] = read_reg(USART2 + USART_DR) as u8;
                n += 1;
                if n == buf.len() {
                    return Ok(n);
                }
            } else if n > 0 {
                return Ok(n);
            }
        }
    }
}

impl Write for Usart2 {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for &byte in buf {
            while self.status() & USART_SR_TXE == 0 {}
            write_reg(USART2 + USART_DR, u32::from(byte));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        while self.status() & USART_SR_TC == 0 {}
        Ok(())
    }
}
