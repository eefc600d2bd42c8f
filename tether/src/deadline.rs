//! Per-operation deadlines and readiness waits.
//!
//! A [`Deadline`] bounds a single connect, accept, send, or receive call;
//! it never spans operations, so each call gets a fresh budget. The wait
//! functions block on `poll(2)` for one descriptor and one direction.
//! Interrupted waits retry with the *remaining* time, measured against a
//! monotonic clock, so a signal storm cannot stretch the bound.

use std::fmt;
use std::os::fd::BorrowedFd;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::sys::{self, Interest};

/// Maximum wait for one operation, in whole seconds.
///
/// A value of 0 ([`Deadline::NONE`]) means no enforced bound: readiness
/// waits return immediately and the operation falls back to the plain
/// blocking behavior of the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deadline(u32);

impl Deadline {
    /// No enforced bound.
    pub const NONE: Self = Self(0);

    /// A bound of `secs` whole seconds.
    pub const fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    /// The bound in seconds; 0 means unbounded.
    pub const fn as_secs(self) -> u32 {
        self.0
    }

    /// Whether this deadline enforces no bound.
    pub const fn is_unbounded(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Deadline {
    fn from(secs: u32) -> Self {
        Self(secs)
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            f.write_str("unbounded")
        } else {
            write!(f, "{}s", self.0)
        }
    }
}

/// Blocks until `fd` is readable or the deadline elapses.
pub fn wait_readable(fd: BorrowedFd<'_>, deadline: Deadline) -> Result<()> {
    wait(fd, Interest::Read, deadline)
}

/// Blocks until `fd` is writable or the deadline elapses.
pub fn wait_writable(fd: BorrowedFd<'_>, deadline: Deadline) -> Result<()> {
    wait(fd, Interest::Write, deadline)
}

/// Blocks until a pending connection is queued on the listening `fd`.
///
/// A completed handshake makes the listener readable, so a blocking
/// `accept(2)` issued afterwards will not stall.
pub fn wait_acceptable(fd: BorrowedFd<'_>, deadline: Deadline) -> Result<()> {
    wait(fd, Interest::Read, deadline)
}

/// Single-descriptor readiness wait with deadline accounting.
///
/// Any poll event counts as ready, including error and hangup: the
/// follow-up read/write/socket-error query is what surfaces the actual
/// outcome.
fn wait(fd: BorrowedFd<'_>, interest: Interest, deadline: Deadline) -> Result<()> {
    if deadline.is_unbounded() {
        return Ok(());
    }

    let budget = Duration::from_secs(u64::from(deadline.as_secs()));
    let start = Instant::now();
    loop {
        let Some(remaining) = budget.checked_sub(start.elapsed()) else {
            return Err(Error::Timeout {
                secs: deadline.as_secs(),
            });
        };
        match sys::poll_one(fd, interest, timeout_ms(remaining)) {
            Ok(true) => return Ok(()),
            Ok(false) => {
                return Err(Error::Timeout {
                    secs: deadline.as_secs(),
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
}

/// Remaining budget as poll millis, rounded up so the bound is never cut
/// short by sub-millisecond truncation.
#[allow(clippy::cast_possible_truncation)]
fn timeout_ms(remaining: Duration) -> i32 {
    let ms = remaining.as_millis().saturating_add(1);
    ms.min(i32::MAX as u128) as i32
}
