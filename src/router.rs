//! # Request Router
//!
//! Maps one request line to exactly one control-plane call and renders the
//! result as a single JSON object.
//!
//! ## Routes
//!
//! | Method | Pattern | Command | Body |
//! |--------|---------|---------|------|
//! | GET | `/tasks` | list | `{"tasks":[{"id","pid","name"},...]}` |
//! | GET | `/tasks/status` | status | `{"tasks":[{"id","pid","name","state","last_run_ms","next_run_ms"},...]}` |
//! | GET | `/tasks/start/{slot}` | start | `{"message":"Started task N"}` |
//! | GET | `/tasks/stop/{slot}` | stop | `{"message":"Stopped task N"}` |
//! | GET | `/tasks/toggle/{slot}` | toggle | `{"message":"Toggled task N"}` |
//! | GET | `/tasks/info/{slot}` | info | one task, or `{"error":"invalid id"}` |
//!
//! Anything else answers `{"error":"unknown endpoint"}`.
//!
//! A `{slot}` is the integer prefix of whatever follows the route's fixed
//! segments (leading blanks and a sign allowed); no digits reads as `0`. Mutating commands
//! answer with the same message whether or not the slot exists.

use core::fmt::Write;

use heapless::{String, Vec};
use serde::Serialize;

use crate::clock::Clock;
use crate::config::RESPONSE_CAPACITY;
use crate::scheduler::Scheduler;
use crate::task::{TaskIdentity, TaskSnapshot};
use crate::{log_debug, log_warn};

/// A rendered JSON response body.
pub type ResponseBody = String<RESPONSE_CAPACITY>;

const INVALID_ID: &str = "invalid id";
const UNKNOWN_ENDPOINT: &str = "unknown endpoint";
const RESPONSE_TOO_LARGE: &str = "response too large";

// ---------------------------------------------------------------------------
// Route table
// ---------------------------------------------------------------------------

/// Request method token. Only `GET` is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Other,
}

impl Method {
    fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            _ => Method::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    List,
    Status,
    Start,
    Stop,
    Toggle,
    Info,
}

struct Route {
    method: Method,
    pattern: &'static str,
    endpoint: Endpoint,
}

/// Path segment captured as the slot parameter.
const SLOT_PARAM: &str = "{slot}";

const ROUTES: &[Route] = &[
    Route { method: Method::Get, pattern: "/tasks", endpoint: Endpoint::List },
    Route { method: Method::Get, pattern: "/tasks/status", endpoint: Endpoint::Status },
    Route { method: Method::Get, pattern: "/tasks/start/{slot}", endpoint: Endpoint::Start },
    Route { method: Method::Get, pattern: "/tasks/stop/{slot}", endpoint: Endpoint::Stop },
    Route { method: Method::Get, pattern: "/tasks/toggle/{slot}", endpoint: Endpoint::Toggle },
    Route { method: Method::Get, pattern: "/tasks/info/{slot}", endpoint: Endpoint::Info },
];

/// A decoded request, ready to run against the task table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ListTasks,
    Status,
    Start(i32),
    Stop(i32),
    Toggle(i32),
    Info(i32),
}

/// Decode a request line (`METHOD SP TARGET [SP VERSION]`).
///
/// Returns `None` when no route matches.
pub fn resolve(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let method = Method::parse(parts.next()?);
    let target = parts.next()?;
    let path = target.split('?').next().unwrap_or(target);

    ROUTES
        .iter()
        .filter(|route| route.method == method)
        .find_map(|route| {
            let slot = match_pattern(route.pattern, path)?;
            Some(match route.endpoint {
                Endpoint::List => Command::ListTasks,
                Endpoint::Status => Command::Status,
                Endpoint::Start => Command::Start(slot?),
                Endpoint::Stop => Command::Stop(slot?),
                Endpoint::Toggle => Command::Toggle(slot?),
                Endpoint::Info => Command::Info(slot?),
            })
        })
}

/// Match `path` against `pattern` segment by segment.
///
/// `None` on mismatch; otherwise the captured slot, if the pattern has one.
/// A `{slot}` segment ends the pattern and takes the rest of the path, so
/// `/tasks/start/0/x` reads slot `0`. One trailing `/` is tolerated.
fn match_pattern(pattern: &str, path: &str) -> Option<Option<i32>> {
    let mut rest = Some(path);

    for expected in pattern.split('/') {
        let remaining = rest?;
        if expected == SLOT_PARAM {
            return Some(Some(parse_slot(remaining)));
        }
        let (segment, tail) = match remaining.split_once('/') {
            Some((segment, tail)) => (segment, Some(tail)),
            None => (remaining, None),
        };
        if segment != expected {
            return None;
        }
        rest = tail;
    }

    match rest {
        None | Some("") => Some(None),
        Some(_) => None,
    }
}

/// Integer prefix of the path after a route's fixed segments: optional
/// leading whitespace, optional sign, decimal digits. No digits reads as
/// `0`; overflow saturates.
pub fn parse_slot(segment: &str) -> i32 {
    let s = segment.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i32 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i32::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct TaskList<T, const N: usize> {
    tasks: Vec<T, N>,
}

#[derive(Serialize)]
struct Message<'m> {
    message: &'m str,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Decode `line`, run it against the table, and render the response.
pub fn handle<C: Clock, const N: usize>(sched: &mut Scheduler<'_, C, N>, line: &str) -> ResponseBody {
    match resolve(line) {
        Some(command) => {
            log_debug!("[HTTP] {}", line);
            execute(sched, command)
        }
        None => {
            log_warn!("[HTTP] Unknown endpoint: {}", line);
            error_body(UNKNOWN_ENDPOINT)
        }
    }
}

/// Run one decoded command against the table.
pub fn execute<C: Clock, const N: usize>(
    sched: &mut Scheduler<'_, C, N>,
    command: Command,
) -> ResponseBody {
    match command {
        Command::ListTasks => {
            let tasks: Vec<TaskIdentity, N> = sched.identities().collect();
            to_body(&TaskList { tasks })
        }
        Command::Status => {
            let tasks: Vec<TaskSnapshot, N> = sched.snapshot_all().collect();
            to_body(&TaskList { tasks })
        }
        Command::Start(slot) => {
            if let Ok(slot) = usize::try_from(slot) {
                sched.start(slot);
            }
            message_body("Started", slot)
        }
        Command::Stop(slot) => {
            if let Ok(slot) = usize::try_from(slot) {
                sched.stop(slot);
            }
            message_body("Stopped", slot)
        }
        Command::Toggle(slot) => {
            if let Ok(slot) = usize::try_from(slot) {
                sched.toggle(slot);
            }
            message_body("Toggled", slot)
        }
        Command::Info(slot) => match usize::try_from(slot).ok().and_then(|s| sched.snapshot(s)) {
            Some(snapshot) => to_body(&snapshot),
            None => error_body(INVALID_ID),
        },
    }
}

fn message_body(verb: &str, slot: i32) -> ResponseBody {
    let mut message: String<32> = String::new();
    // "Toggled task -2147483648" is 24 bytes; cannot overflow
    let _ = write!(message, "{} task {}", verb, slot);
    to_body(&Message { message: &message })
}

fn error_body(error: &'static str) -> ResponseBody {
    to_body(&ErrorBody { error })
}

fn to_body<T: Serialize>(value: &T) -> ResponseBody {
    match serde_json_core::to_string::<_, RESPONSE_CAPACITY>(value) {
        Ok(body) => body,
        Err(_) => {
            log_warn!("[HTTP] Response exceeds {} bytes", RESPONSE_CAPACITY);
            let mut body = ResponseBody::new();
            let _ = write!(body, "{{\"error\":\"{}\"}}", RESPONSE_TOO_LARGE);
            body
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
