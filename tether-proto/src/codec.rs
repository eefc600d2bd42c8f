//! Length-prefixed frame codec over any `Read`/`Write` stream.
//!
//! Each frame is: `[u32 big-endian length][payload bytes]`. The length
//! counts payload only; there is no magic number, version, or checksum.
//! Without the prefix, back-to-back messages on a stream socket merge and
//! split arbitrarily; with it, each [`read_frame`] yields exactly one
//! sender-side [`write_frame`].

use std::io::{Read, Write};

use crate::error::FrameError;
use crate::io::{read_full, write_full};

/// Maximum allowed frame payload (16 MiB).
pub const MAX_FRAME: u32 = 16 * 1024 * 1024;

/// Size of the length prefix in bytes.
pub const HEADER_LEN: usize = 4;

/// Encodes `payload` as a single contiguous frame: header plus payload.
///
/// The combined buffer is allocated fallibly so an unsatisfiable request
/// surfaces as [`FrameError::Alloc`] instead of aborting the process.
pub fn encode(payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|len| *len <= MAX_FRAME)
        .ok_or(FrameError::Oversized {
            declared: payload.len(),
            capacity: MAX_FRAME as usize,
        })?;

    let mut frame = Vec::new();
    frame.try_reserve_exact(HEADER_LEN + payload.len())?;
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Encodes `payload` and writes the whole frame to `w`.
///
/// Returns the number of payload bytes written. The encoded buffer is
/// scoped to this call and released on every path.
pub fn write_frame(w: &mut impl Write, payload: &[u8]) -> Result<usize, FrameError> {
    let frame = encode(payload)?;
    write_full(w, &frame)?;
    w.flush()?;
    Ok(payload.len())
}

/// Reads one frame from `r` into `out`, returning the payload length.
///
/// The declared length is validated against both `out.len()` and
/// [`MAX_FRAME`] before any payload byte is read; a length that does not
/// fit fails with [`FrameError::Oversized`] and leaves `out` untouched.
/// End-of-stream inside the header or the payload fails with
/// [`FrameError::PeerClosed`]. Bytes of `out` beyond the returned length
/// are left as they were.
pub fn read_frame(r: &mut impl Read, out: &mut [u8]) -> Result<usize, FrameError> {
    let mut header = [0u8; HEADER_LEN];
    let got = read_full(r, &mut header)?;
    if got < HEADER_LEN {
        return Err(FrameError::PeerClosed {
            expected: HEADER_LEN,
            got,
        });
    }

    let declared = u32::from_be_bytes(header) as usize;
    if declared > MAX_FRAME as usize {
        return Err(FrameError::Oversized {
            declared,
            capacity: MAX_FRAME as usize,
        });
    }
    if declared > out.len() {
        return Err(FrameError::Oversized {
            declared,
            capacity: out.len(),
        });
    }

    let received = read_full(r, &mut out[..declared])?;
    if received < declared {
        return Err(FrameError::PeerClosed {
            expected: declared,
            got: received,
        });
    }
    Ok(declared)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn header_is_big_endian() {
        let frame = encode(b"abc").unwrap();
        assert_eq!(&frame[..HEADER_LEN], &[0, 0, 0, 3]);
        assert_eq!(&frame[HEADER_LEN..], b"abc");
    }

    #[test]
    fn roundtrip() {
        for payload in [&b""[..], b"x", b"hello, peer", &[0u8; 4096]] {
            let frame = encode(payload).unwrap();
            let mut cursor = Cursor::new(frame);
            let mut out = vec![0u8; 8192];
            let n = read_frame(&mut cursor, &mut out).unwrap();
            assert_eq!(&out[..n], payload);
        }
    }

    #[test]
    fn empty_frame_is_valid() {
        let frame = encode(b"").unwrap();
        assert_eq!(frame, [0, 0, 0, 0]);
        let mut cursor = Cursor::new(frame);
        let mut out = [0u8; 4];
        assert_eq!(read_frame(&mut cursor, &mut out).unwrap(), 0);
    }

    #[test]
    fn consecutive_frames_do_not_merge() {
        let mut wire = Vec::new();
        write_frame(&mut wire, b"0123456789").unwrap();
        write_frame(&mut wire, b"abcdefghij").unwrap();

        let mut cursor = Cursor::new(wire);
        let mut out = [0u8; 64];
        assert_eq!(read_frame(&mut cursor, &mut out).unwrap(), 10);
        assert_eq!(&out[..10], b"0123456789");
        assert_eq!(read_frame(&mut cursor, &mut out).unwrap(), 10);
        assert_eq!(&out[..10], b"abcdefghij");
    }

    #[test]
    fn eof_mid_header_is_peer_closed() {
        let mut cursor = Cursor::new(vec![0u8, 0]);
        let mut out = [0u8; 8];
        let err = read_frame(&mut cursor, &mut out).unwrap_err();
        assert!(matches!(
            err,
            FrameError::PeerClosed {
                expected: HEADER_LEN,
                got: 2
            }
        ));
    }

    #[test]
    fn eof_mid_payload_is_peer_closed() {
        // Declares 10 payload bytes but carries only 2.
        let mut wire = vec![0, 0, 0, 10];
        wire.extend_from_slice(b"ab");
        let mut cursor = Cursor::new(wire);
        let mut out = [0u8; 64];
        let err = read_frame(&mut cursor, &mut out).unwrap_err();
        assert!(matches!(
            err,
            FrameError::PeerClosed {
                expected: 10,
                got: 2
            }
        ));
    }

    #[test]
    fn rejects_frame_larger_than_buffer() {
        let mut wire = vec![0, 0, 0, 64];
        wire.extend_from_slice(&[9u8; 64]);
        let mut cursor = Cursor::new(wire);
        let mut out = [0u8; 16];
        let err = read_frame(&mut cursor, &mut out).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Oversized {
                declared: 64,
                capacity: 16
            }
        ));
        // The undersized buffer was not written to.
        assert_eq!(out, [0u8; 16]);
        // Nor was any payload byte consumed from the stream.
        assert_eq!(cursor.position(), HEADER_LEN as u64);
    }

    #[test]
    fn rejects_frame_above_protocol_ceiling() {
        let header = (MAX_FRAME + 1).to_be_bytes();
        let mut cursor = Cursor::new(header.to_vec());
        let mut out = [0u8; 8];
        let err = read_frame(&mut cursor, &mut out).unwrap_err();
        assert!(matches!(err, FrameError::Oversized { .. }));
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let err = encode(&vec![0u8; MAX_FRAME as usize + 1]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Oversized { declared, .. } if declared == MAX_FRAME as usize + 1
        ));
    }
}
