//! Server-side connection operations.
//!
//! Unlike the client, which groups its deadlines in a [`ClientConfig`],
//! server operations take a per-call [`Deadline`]: one listener commonly
//! serves connections with different patience for accept, send, and
//! receive.
//!
//! [`ClientConfig`]: crate::ClientConfig

use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};

use tracing::debug;

use crate::conn;
use crate::deadline::Deadline;
use crate::error::Result;
use crate::sock;

/// Binds a listening socket on `0.0.0.0:port`.
///
/// `SO_REUSEADDR` is set (by the standard library on Unix) so a restarted
/// server can rebind while old connections linger in TIME_WAIT. Port 0
/// asks the kernel for an ephemeral port; read it back via
/// [`TcpListener::local_addr`].
pub fn listen(port: u16) -> Result<TcpListener> {
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))?;
    debug!(addr = %listener.local_addr()?, "listening");
    Ok(listener)
}

/// Accepts one connection, bounded by `deadline`.
pub fn accept(listener: &TcpListener, deadline: Deadline) -> Result<(TcpStream, SocketAddr)> {
    sock::accept_with_timeout(listener, deadline)
}

/// Sends `payload` as one frame, bounded by `deadline`.
///
/// Returns the number of payload bytes written.
pub fn send(stream: &mut TcpStream, payload: &[u8], deadline: Deadline) -> Result<usize> {
    conn::send_framed(stream, payload, deadline)
}

/// Receives one frame into `out`, bounded by `deadline`.
///
/// Returns the payload length.
pub fn recv(stream: &mut TcpStream, out: &mut [u8], deadline: Deadline) -> Result<usize> {
    conn::recv_framed(stream, out, deadline)
}
