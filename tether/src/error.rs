//! Error types for tether operations.

use std::collections::TryReserveError;
use std::io;

use tether_proto::FrameError;

/// Alias for `Result<T, tether::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by tether connection operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A caller-supplied input was unusable (e.g. a host that resolves
    /// to no addresses).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The frame buffer could not be allocated.
    #[error("could not allocate frame buffer")]
    Alloc(#[source] TryReserveError),

    /// The deadline elapsed before the descriptor became ready.
    #[error("timed out after {secs}s waiting for the peer")]
    Timeout {
        /// The deadline that elapsed, in seconds.
        secs: u32,
    },

    /// The peer shut down in the middle of a framed exchange.
    #[error("peer closed the connection: got {got} of {expected} bytes")]
    PeerClosed {
        /// Bytes the frame declared.
        expected: usize,
        /// Bytes actually received before end-of-stream.
        got: usize,
    },

    /// A declared frame length exceeds the destination buffer.
    #[error("frame of {declared} bytes exceeds buffer capacity {capacity}")]
    OversizedFrame {
        /// Length the sender declared.
        declared: usize,
        /// Capacity available to hold it.
        capacity: usize,
    },

    /// Any other transport-level failure, carrying the system error.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether this error is a deadline expiry.
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether this error is an orderly remote shutdown.
    pub const fn is_peer_closed(&self) -> bool {
        matches!(self, Self::PeerClosed { .. })
    }
}

impl From<FrameError> for Error {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::PeerClosed { expected, got } => Self::PeerClosed { expected, got },
            FrameError::Oversized { declared, capacity } => Self::OversizedFrame {
                declared,
                capacity,
            },
            FrameError::Alloc(e) => Self::Alloc(e),
            FrameError::Io(e) => Self::Io(e),
            _ => Self::Io(io::Error::other(err.to_string())),
        }
    }
}
