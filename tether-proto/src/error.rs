//! Error type for frame encoding and decoding.

use std::collections::TryReserveError;

/// Errors produced while encoding or decoding a frame.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FrameError {
    /// The peer shut down in the middle of a frame.
    ///
    /// `got` counts the bytes that arrived before end-of-stream; for a
    /// header this is less than [`crate::HEADER_LEN`], for a payload it is
    /// less than the declared length.
    #[error("peer closed mid-frame: got {got} of {expected} bytes")]
    PeerClosed {
        /// Bytes the frame declared.
        expected: usize,
        /// Bytes actually received before end-of-stream.
        got: usize,
    },

    /// The declared length does not fit the destination.
    ///
    /// Raised before any payload byte is read, either because the length
    /// exceeds the caller's buffer or the protocol ceiling
    /// [`crate::MAX_FRAME`].
    #[error("declared frame length {declared} exceeds capacity {capacity}")]
    Oversized {
        /// Length the sender declared (or tried to send).
        declared: usize,
        /// Capacity available to hold it.
        capacity: usize,
    },

    /// The combined header+payload buffer could not be allocated.
    #[error("could not allocate frame buffer")]
    Alloc(#[from] TryReserveError),

    /// Transport-level failure other than an orderly shutdown.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
