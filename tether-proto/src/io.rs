//! Exact-count reads and writes over a byte stream.
//!
//! Stream sockets are free to transfer fewer bytes than asked; these
//! helpers loop until the requested count has moved, retrying calls that
//! were interrupted by a signal. No readiness polling happens here — each
//! retry re-issues the underlying (possibly blocking) call.

use std::io::{self, ErrorKind, Read, Write};

/// Reads until `buf` is full or the stream reaches end-of-stream.
///
/// Returns the number of bytes read: `buf.len()` on a complete transfer,
/// or a smaller count if the peer performed an orderly shutdown first.
/// Callers that require the full count must treat a short return as a
/// peer-closed condition. `ErrorKind::Interrupted` is absorbed; any other
/// read failure is returned as-is.
pub fn read_full(r: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut nread = 0;
    while nread < buf.len() {
        match r.read(&mut buf[nread..]) {
            // Orderly shutdown: report how far we got.
            Ok(0) => break,
            Ok(n) => nread += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(nread)
}

/// Writes all of `buf`, retrying interrupted and zero-length writes.
///
/// Either every byte is written or an error is returned; there is no
/// partial-success return.
pub fn write_full(w: &mut impl Write, buf: &[u8]) -> io::Result<()> {
    let mut nwritten = 0;
    while nwritten < buf.len() {
        match w.write(&buf[nwritten..]) {
            Ok(0) => {}
            Ok(n) => nwritten += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
