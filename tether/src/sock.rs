//! Timed connect and accept over raw TCP sockets.
//!
//! `connect(2)` and `accept(2)` have no per-call timeout of their own;
//! both are bounded here by a readiness wait. The connect path follows
//! the classic non-blocking dance: switch the descriptor to non-blocking,
//! issue the connect, wait for writability, then query the pending socket
//! error — writability alone only signals that the attempt *finished*,
//! not that it succeeded.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::os::fd::{AsFd, BorrowedFd};

use tracing::{debug, trace};

use crate::deadline::{self, Deadline};
use crate::error::{Error, Result};
use crate::sys;

/// Restores a descriptor's original file status flags when dropped.
///
/// The non-blocking toggle during a timed connect is transient state; tying
/// the restore to `Drop` guarantees it happens on every exit path,
/// success or failure.
struct FlagGuard<'fd> {
    /// The guarded descriptor.
    fd: BorrowedFd<'fd>,
    /// Flags as they were before the toggle.
    saved: libc::c_int,
}

impl<'fd> FlagGuard<'fd> {
    /// Switches `fd` to non-blocking mode, remembering the prior flags.
    fn nonblocking(fd: BorrowedFd<'fd>) -> io::Result<Self> {
        let saved = sys::file_status_flags(fd)?;
        sys::set_file_status_flags(fd, saved | libc::O_NONBLOCK)?;
        Ok(Self { fd, saved })
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        if sys::set_file_status_flags(self.fd, self.saved).is_err() {
            debug!("failed to restore file status flags after timed connect");
        }
    }
}

/// Connects to `host:port`, bounded by `deadline`.
///
/// The host is resolved via [`ToSocketAddrs`]; every resolved address is
/// tried in order and the last failure is returned if none succeeds. With
/// an unbounded deadline the plain blocking connect is used. On expiry the
/// result is [`Error::Timeout`], distinct from a refused or unreachable
/// connect which surfaces as [`Error::Io`].
pub fn connect_with_timeout(host: &str, port: u16, deadline: Deadline) -> Result<TcpStream> {
    if host.is_empty() {
        return Err(Error::InvalidArgument("empty host"));
    }
    let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
    if addrs.is_empty() {
        return Err(Error::InvalidArgument("host resolved to no addresses"));
    }

    let mut last = None;
    for addr in addrs {
        match connect_addr(addr, deadline) {
            Ok(stream) => {
                debug!(%addr, %deadline, "connected");
                return Ok(stream);
            }
            Err(e) => {
                trace!(%addr, error = %e, "connect attempt failed");
                last = Some(e);
            }
        }
    }
    // addrs was checked non-empty, so at least one attempt ran.
    Err(last.unwrap_or(Error::InvalidArgument("host resolved to no addresses")))
}

/// One connect attempt against a single resolved address.
fn connect_addr(addr: SocketAddr, deadline: Deadline) -> Result<TcpStream> {
    let fd = sys::tcp_socket(&addr)?;
    {
        let _guard = if deadline.is_unbounded() {
            None
        } else {
            Some(FlagGuard::nonblocking(fd.as_fd())?)
        };

        match sys::connect(fd.as_fd(), &addr) {
            // Completed immediately (loopback, or blocking mode).
            Ok(()) => {}
            Err(e) if e.raw_os_error() == Some(libc::EINPROGRESS) => {
                deadline::wait_writable(fd.as_fd(), deadline)?;
                if let Some(err) = sys::take_socket_error(fd.as_fd())? {
                    return Err(Error::Io(err));
                }
            }
            Err(e) => return Err(Error::Io(e)),
        }
        // Guard drops here: original blocking mode is back before the
        // stream is handed out.
    }
    Ok(TcpStream::from(fd))
}

/// Accepts one connection from `listener`, bounded by `deadline`.
///
/// Waits for accept-readiness first; the blocking `accept` that follows
/// cannot stall because a completed handshake is already queued.
pub fn accept_with_timeout(
    listener: &TcpListener,
    deadline: Deadline,
) -> Result<(TcpStream, SocketAddr)> {
    deadline::wait_acceptable(listener.as_fd(), deadline)?;
    loop {
        match listener.accept() {
            Ok((stream, peer)) => {
                debug!(%peer, "accepted connection");
                return Ok((stream, peer));
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
}
