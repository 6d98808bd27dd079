//! Host-side stand-ins for the board peripherals, used by unit tests.

use core::convert::Infallible;
use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;

/// Error returned by `MockSerial` where a read failure was injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockSerialError;

impl embedded_io::Error for MockSerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}

/// In-memory serial link: injected bytes are read back, written bytes are kept.
/// A `None` entry in the receive queue fails the read that reaches it.
#[derive(Debug, Default)]
pub struct MockSerial {
    rx: VecDeque<Option<u8>>,
    tx: Vec<u8>,
}

impl MockSerial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the transport to read.
    pub fn inject_rx(&mut self, data: &[u8]) {
        self.rx.extend(data.iter().copied().map(Some));
    }

    /// Queue one failed read, as an overrun would produce.
    pub fn inject_rx_error(&mut self) {
        self.rx.push_back(None);
    }

    /// Everything written so far, as text.
    pub fn tx_string(&self) -> String {
        String::from_utf8_lossy(&self.tx).into_owned()
    }

    pub fn clear_tx(&mut self) {
        self.tx.clear();
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = MockSerialError;
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.rx.front() == Some(&None) {
            self.rx.pop_front();
            return Err(MockSerialError);
        }

        let mut n = 0;
        while n < buf.len() {
            match self.rx.front() {
                Some(Some(byte)) => {
                    buf[n] = *byte;
                    self.rx.pop_front();
                    n += 1;
                }
                _ => break,
            }
        }
        Ok(n)
    }
}

impl embedded_io::ReadReady for MockSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.rx.is_empty())
    }
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.tx.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Output pin that remembers its level and counts writes.
#[derive(Debug, Default)]
pub struct MockPin {
    pub high: bool,
    pub writes: u32,
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        self.writes += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        self.writes += 1;
        Ok(())
    }
}
