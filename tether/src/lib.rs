//! Deadline-bounded framed messaging over TCP.
//!
//! `tether` wraps blocking TCP sockets in operations that (a) move exact
//! byte counts, masking short transfers and interrupted calls, (b) bound
//! connect, accept, send, and receive by a caller-supplied [`Deadline`],
//! and (c) delimit messages with a 4-byte big-endian length prefix so
//! frames never merge or split on the wire (see [`tether_proto`]).
//!
//! Everything is synchronous: no internal threads, no runtime. Distinct
//! connections are independent and may be driven from separate threads;
//! same-direction calls on one connection must be serialized by the
//! caller.
//!
//! # Quick start
//!
//! Serving process — accept one client and echo one frame back:
//!
//! ```no_run
//! use tether::{Deadline, server};
//!
//! # fn main() -> tether::Result<()> {
//! let listener = server::listen(7000)?;
//! let (mut peer, _addr) = server::accept(&listener, Deadline::from_secs(30))?;
//! let mut buf = [0u8; 1024];
//! let n = server::recv(&mut peer, &mut buf, Deadline::from_secs(5))?;
//! server::send(&mut peer, &buf[..n], Deadline::from_secs(5))?;
//! # Ok(())
//! # }
//! ```
//!
//! Client — connect, send, await the echo:
//!
//! ```no_run
//! use tether::{ClientConfig, Deadline};
//!
//! # fn main() -> tether::Result<()> {
//! let config = ClientConfig::new(
//!     Deadline::from_secs(10),
//!     Deadline::from_secs(5),
//!     Deadline::from_secs(5),
//! );
//! let mut stream = config.connect("127.0.0.1", 7000)?;
//! config.send(&mut stream, b"hello")?;
//! let mut buf = [0u8; 1024];
//! let n = config.recv(&mut stream, &mut buf)?;
//! assert_eq!(&buf[..n], b"hello");
//! # Ok(())
//! # }
//! ```

#[cfg(unix)]
mod client;
#[cfg(unix)]
mod conn;
#[cfg(unix)]
mod deadline;
mod error;
#[cfg(unix)]
pub mod server;
#[cfg(unix)]
mod sock;
#[cfg(unix)]
mod sys;

#[cfg(unix)]
pub use client::ClientConfig;
#[cfg(unix)]
pub use conn::{close, recv_framed, send_framed};
#[cfg(unix)]
pub use deadline::{Deadline, wait_acceptable, wait_readable, wait_writable};
pub use error::{Error, Result};
#[cfg(unix)]
pub use sock::{accept_with_timeout, connect_with_timeout};
pub use tether_proto::{FrameError, HEADER_LEN, MAX_FRAME};
