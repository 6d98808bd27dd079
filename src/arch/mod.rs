//! # Architecture Abstraction Layer
//!
//! Hardware behind the kernel's collaborator traits. `cortex_m4` covers the
//! core peripherals (SysTick clock, ITM console); `stm32f4` covers the board
//! pins and the request UART.

pub mod cortex_m4;
pub mod stm32f4;
