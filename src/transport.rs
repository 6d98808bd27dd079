//! # Transport
//!
//! The byte-level edge of the control plane. A transport yields complete
//! request lines and accepts rendered response bodies; what carries the
//! bytes (a UART, a socket, a test buffer) is up to the implementation.
//!
//! ## Framing
//!
//! - A request line ends at `\r` or `\n`. Empty lines and HTTP header lines
//!   (`Name: value`) are skipped, so a browser's full request reduces to its
//!   request line.
//! - A line longer than `REQUEST_LINE_CAPACITY` is dropped whole, as is a
//!   line interrupted by a read error.
//! - Every response is sent as a minimal HTTP/1.1 `200 OK` with a JSON body.

use core::fmt;

use embedded_io::{Read, ReadReady, Write};
use heapless::String;

use crate::config::REQUEST_LINE_CAPACITY;
use crate::{log_debug, log_warn};

/// One assembled request line, without its terminator.
pub type RequestLine = String<REQUEST_LINE_CAPACITY>;

/// Source of request lines and sink for responses.
pub trait Transport {
    /// Return the next complete request line, if one is pending.
    /// Must not block waiting for input.
    fn poll_request(&mut self) -> Option<RequestLine>;

    /// Send a JSON body as the response to the last request.
    /// Delivery failures are the transport's to absorb.
    fn send_response(&mut self, body: &str);
}

// ---------------------------------------------------------------------------
// Line assembly
// ---------------------------------------------------------------------------

/// Accumulates bytes into request lines.
#[derive(Debug, Default)]
pub struct LineAssembler<const N: usize> {
    buf: String<N>,
    /// Skip everything up to the next terminator.
    dropping: bool,
}

impl<const N: usize> LineAssembler<N> {
    pub const fn new() -> Self {
        Self {
            buf: String::new(),
            dropping: false,
        }
    }

    /// Feed one byte. Returns a line when `byte` terminates a request line.
    pub fn push(&mut self, byte: u8) -> Option<String<N>> {
        match byte {
            b'\r' | b'\n' => self.finish(),
            _ => {
                if !self.dropping && self.buf.push(char::from(byte)).is_err() {
                    log_warn!("[NET] Dropping request line longer than {} bytes", N);
                    self.discard();
                }
                None
            }
        }
    }

    /// Throw away the line in progress, including any bytes that arrive
    /// before its terminator.
    pub fn discard(&mut self) {
        self.buf.clear();
        self.dropping = true;
    }

    fn finish(&mut self) -> Option<String<N>> {
        if core::mem::take(&mut self.dropping) {
            return None;
        }

        let line = core::mem::take(&mut self.buf);
        if line.is_empty() {
            return None;
        }
        if is_header_line(&line) {
            log_debug!("[NET] Skipped header: {}", line.as_str());
            return None;
        }
        Some(line)
    }
}

/// `Name: value`, where the name is a single token.
fn is_header_line(line: &str) -> bool {
    match line.split_once(':') {
        Some((name, _)) => !name.is_empty() && !name.contains(char::is_whitespace),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Response framing
// ---------------------------------------------------------------------------

/// Write `body` framed as an HTTP/1.1 JSON response.
pub fn write_http_response<W: fmt::Write>(w: &mut W, body: &str) -> fmt::Result {
    w.write_str("HTTP/1.1 200 OK\r\n")?;
    w.write_str("Content-Type: application/json\r\n")?;
    w.write_str("Connection: close\r\n")?;
    w.write_str("\r\n")?;
    w.write_str(body)?;
    w.write_str("\r\n")
}

/// `core::fmt::Write` over an `embedded_io::Write`.
struct FmtWriter<'w, W> {
    inner: &'w mut W,
}

impl<W: Write> fmt::Write for FmtWriter<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

// ---------------------------------------------------------------------------
// Serial transport
// ---------------------------------------------------------------------------

/// Request lines over a byte stream (UART, USB CDC, ...).
pub struct SerialTransport<S> {
    serial: S,
    line: LineAssembler<REQUEST_LINE_CAPACITY>,
}

impl<S> SerialTransport<S>
where
    S: Read + ReadReady + Write,
{
    pub fn new(serial: S) -> Self {
        Self {
            serial,
            line: LineAssembler::new(),
        }
    }

    /// The underlying byte stream.
    pub fn serial(&self) -> &S {
        &self.serial
    }

    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }
}

impl<S> Transport for SerialTransport<S>
where
    S: Read + ReadReady + Write,
{
    fn poll_request(&mut self) -> Option<RequestLine> {
        let mut byte = [0u8; 1];
        loop {
            let read = match self.serial.read_ready() {
                Ok(true) => self.serial.read(&mut byte),
                Ok(false) => return None,
                Err(e) => Err(e),
            };
            match read {
                Ok(0) => return None,
                Ok(_) => {
                    if let Some(line) = self.line.push(byte[0]) {
                        return Some(line);
                    }
                }
                Err(_) => {
                    // Bytes were lost; the partial line cannot be trusted
                    log_warn!("[NET] Serial read failed, dropping partial line");
                    self.line.discard();
                    return None;
                }
            }
        }
    }

    fn send_response(&mut self, body: &str) {
        let mut writer = FmtWriter { inner: &mut self.serial };
        let sent = write_http_response(&mut writer, body).is_ok() && self.serial.flush().is_ok();
        if !sent {
            log_warn!("[NET] Failed to send response");
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSerial;
    use std::string::String as StdString;
    use std::vec::Vec;

    fn feed<const N: usize>(asm: &mut LineAssembler<N>, bytes: &[u8]) -> Vec<StdString> {
        bytes
            .iter()
            .filter_map(|&b| asm.push(b))
            .map(|line| StdString::from(line.as_str()))
            .collect()
    }

    #[test]
    fn test_assembles_crlf_lines() {
        let mut asm: LineAssembler<64> = LineAssembler::new();
        let lines = feed(&mut asm, b"GET /tasks HTTP/1.1\r\nGET /tasks/status\n");
        assert_eq!(lines, ["GET /tasks HTTP/1.1", "GET /tasks/status"]);
    }

    #[test]
    fn test_skips_headers_and_blank_lines() {
        let mut asm: LineAssembler<64> = LineAssembler::new();
        let lines = feed(
            &mut asm,
            b"GET /tasks/info/1 HTTP/1.1\r\nHost: 192.48.56.2\r\nUser-Agent: curl/8.0\r\n\r\n",
        );
        assert_eq!(lines, ["GET /tasks/info/1 HTTP/1.1"]);
    }

    #[test]
    fn test_drops_overlong_line_and_recovers() {
        let mut asm: LineAssembler<8> = LineAssembler::new();
        let lines = feed(&mut asm, b"GET /tasks/status\r\nGET /a\r\n");
        assert_eq!(lines, ["GET /a"]);
    }

    #[test]
    fn test_discard_drops_line_up_to_terminator() {
        let mut asm: LineAssembler<64> = LineAssembler::new();
        assert!(feed(&mut asm, b"GET /tasks/st").is_empty());
        asm.discard();
        let lines = feed(&mut asm, b"op/\r\nGET /tasks\r\n");
        assert_eq!(lines, ["GET /tasks"]);
    }

    #[test]
    fn test_header_detection() {
        assert!(is_header_line("Host: example"));
        assert!(is_header_line("Connection:close"));
        assert!(!is_header_line("GET /tasks HTTP/1.1"));
        assert!(!is_header_line("GET http://host/tasks HTTP/1.1"));
        assert!(!is_header_line(": value"));
    }

    #[test]
    fn test_http_framing() {
        let mut out = StdString::new();
        write_http_response(&mut out, r#"{"tasks":[]}"#).unwrap();
        assert_eq!(
            out,
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n{\"tasks\":[]}\r\n"
        );
    }

    #[test]
    fn test_serial_transport_round_trip() {
        let mut transport = SerialTransport::new(MockSerial::new());
        assert_eq!(transport.poll_request(), None);

        transport.serial_mut().inject_rx(b"GET /tasks/st");
        assert_eq!(transport.poll_request(), None);

        // Second request stays queued until the next poll
        transport.serial_mut().inject_rx(b"atus HTTP/1.1\r\nGET /tasks\r\n");
        assert_eq!(transport.poll_request().as_deref(), Some("GET /tasks/status HTTP/1.1"));
        assert_eq!(transport.poll_request().as_deref(), Some("GET /tasks"));
        assert_eq!(transport.poll_request(), None);

        transport.send_response(r#"{"error":"unknown endpoint"}"#);
        let tx = transport.serial().tx_string();
        assert!(tx.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(tx.ends_with("\r\n\r\n{\"error\":\"unknown endpoint\"}\r\n"));
    }

    #[test]
    fn test_read_error_drops_partial_line() {
        let mut serial = MockSerial::new();
        // Overrun swallows the slot digit of "GET /tasks/stop/1"
        serial.inject_rx(b"GET /tasks/stop/");
        serial.inject_rx_error();
        serial.inject_rx(b"\r\nGET /tasks/stop/1\r\n");
        let mut transport = SerialTransport::new(serial);

        assert_eq!(transport.poll_request(), None);
        assert_eq!(transport.poll_request().as_deref(), Some("GET /tasks/stop/1"));
        assert_eq!(transport.poll_request(), None);
    }
}
