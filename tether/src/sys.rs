//! Safe wrappers around the libc calls the timed socket paths need.
//!
//! Readiness polling, file-status-flag toggling, raw connect, and the
//! pending-socket-error query have no std equivalent at the granularity
//! required here. All `unsafe` code in the crate is confined to this
//! module.

#![allow(unsafe_code)]

use std::io;
use std::mem;
use std::net::SocketAddr;
use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd};

/// Readiness direction for [`poll_one`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interest {
    /// Wake when a read would not block (also used for accept).
    Read,
    /// Wake when a write would not block.
    Write,
}

impl Interest {
    /// The `poll(2)` event mask for this direction.
    const fn events(self) -> libc::c_short {
        match self {
            Self::Read => libc::POLLIN,
            Self::Write => libc::POLLOUT,
        }
    }
}

/// Polls one descriptor for one direction.
///
/// Returns `Ok(true)` when any event fired (including error/hangup,
/// which the caller disambiguates), `Ok(false)` when the timeout elapsed
/// with no event. `EINTR` is returned as an `Interrupted` error so the
/// caller can recompute its remaining budget.
pub(crate) fn poll_one(fd: BorrowedFd<'_>, interest: Interest, timeout_ms: i32) -> io::Result<bool> {
    let mut pfd = libc::pollfd {
        fd: fd.as_raw_fd(),
        events: interest.events(),
        revents: 0,
    };
    // SAFETY: pfd is a valid pollfd for the duration of the call.
    let ret = unsafe { libc::poll(&raw mut pfd, 1, timeout_ms) };
    match ret {
        -1 => Err(io::Error::last_os_error()),
        0 => Ok(false),
        _ => Ok(true),
    }
}

/// Creates a TCP socket for the address family of `addr`.
///
/// The descriptor has `FD_CLOEXEC` set and is returned in the default
/// blocking mode.
pub(crate) fn tcp_socket(addr: &SocketAddr) -> io::Result<OwnedFd> {
    let family = match addr {
        SocketAddr::V4(_) => libc::AF_INET,
        SocketAddr::V6(_) => libc::AF_INET6,
    };
    // SAFETY: socket() takes plain integer arguments.
    let raw = unsafe { libc::socket(family, libc::SOCK_STREAM, libc::IPPROTO_TCP) };
    if raw < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: raw is a freshly created, valid descriptor we own.
    let fd = unsafe { OwnedFd::from_raw_fd(raw) };

    // SAFETY: fcntl(F_SETFD) on a valid descriptor.
    let ret = unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFD, libc::FD_CLOEXEC) };
    if ret == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(fd)
}

/// Issues `connect(2)` toward `addr` on `fd`.
///
/// In non-blocking mode an in-flight handshake surfaces as
/// `EINPROGRESS`, which the caller turns into a writability wait.
pub(crate) fn connect(fd: BorrowedFd<'_>, addr: &SocketAddr) -> io::Result<()> {
    let (storage, len) = sockaddr_from(addr);
    // SAFETY: storage holds a properly initialized sockaddr of `len` bytes.
    let ret = unsafe { libc::connect(fd.as_raw_fd(), (&raw const storage).cast(), len) };
    if ret == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Reads the file status flags (`F_GETFL`) of `fd`.
pub(crate) fn file_status_flags(fd: BorrowedFd<'_>) -> io::Result<libc::c_int> {
    // SAFETY: fcntl(F_GETFL) on a valid descriptor.
    let flags = unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETFL) };
    if flags == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(flags)
    }
}

/// Replaces the file status flags (`F_SETFL`) of `fd`.
pub(crate) fn set_file_status_flags(fd: BorrowedFd<'_>, flags: libc::c_int) -> io::Result<()> {
    // SAFETY: fcntl(F_SETFL) on a valid descriptor.
    let ret = unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFL, flags) };
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Takes the pending socket error (`SO_ERROR`) off `fd`.
///
/// Writability after a non-blocking connect only means the attempt
/// finished; this query is what distinguishes success from failure.
pub(crate) fn take_socket_error(fd: BorrowedFd<'_>) -> io::Result<Option<io::Error>> {
    let mut err: libc::c_int = 0;
    let mut len = mem::size_of::<libc::c_int>() as libc::socklen_t;
    // SAFETY: err and len are valid out-pointers for a c_int-sized option.
    let ret = unsafe {
        libc::getsockopt(
            fd.as_raw_fd(),
            libc::SOL_SOCKET,
            libc::SO_ERROR,
            (&raw mut err).cast(),
            &raw mut len,
        )
    };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }
    if err == 0 {
        Ok(None)
    } else {
        Ok(Some(io::Error::from_raw_os_error(err)))
    }
}

/// Converts a std socket address into a `sockaddr_storage` + length pair.
#[allow(clippy::cast_possible_truncation)]
fn sockaddr_from(addr: &SocketAddr) -> (libc::sockaddr_storage, libc::socklen_t) {
    // SAFETY: an all-zero sockaddr_storage is a valid initial state.
    let mut storage: libc::sockaddr_storage = unsafe { mem::zeroed() };
    let len = match addr {
        SocketAddr::V4(v4) => {
            // SAFETY: sockaddr_storage is larger than sockaddr_in and zeroed.
            let sin = unsafe { &mut *(&raw mut storage).cast::<libc::sockaddr_in>() };
            sin.sin_family = libc::AF_INET as libc::sa_family_t;
            sin.sin_port = v4.port().to_be();
            // octets() is already network byte order; keep the memory layout.
            sin.sin_addr.s_addr = u32::from_ne_bytes(v4.ip().octets());
            mem::size_of::<libc::sockaddr_in>()
        }
        SocketAddr::V6(v6) => {
            // SAFETY: sockaddr_storage is larger than sockaddr_in6 and zeroed.
            let sin6 = unsafe { &mut *(&raw mut storage).cast::<libc::sockaddr_in6>() };
            sin6.sin6_family = libc::AF_INET6 as libc::sa_family_t;
            sin6.sin6_port = v6.port().to_be();
            sin6.sin6_flowinfo = v6.flowinfo();
            sin6.sin6_addr.s6_addr = v6.ip().octets();
            sin6.sin6_scope_id = v6.scope_id();
            mem::size_of::<libc::sockaddr_in6>()
        }
    };
    (storage, len as libc::socklen_t)
}
