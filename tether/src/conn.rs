//! Framed send and receive over a connected stream.
//!
//! Each operation is bounded by its own [`Deadline`] and moves exactly one
//! frame. Frames sent sequentially on one descriptor arrive in order and
//! never merge or split; concurrent same-direction calls on one descriptor
//! must be serialized by the caller. After a timeout the descriptor may
//! sit mid-frame and is unusable for further framed exchange — close it
//! and reconnect.

use std::net::{Shutdown, TcpStream};
use std::os::fd::AsFd;

use tracing::trace;

use crate::deadline::{self, Deadline};
use crate::error::Result;

/// Sends `payload` as one frame, bounded by `deadline`.
///
/// Waits for writability, then writes the whole encoded frame. Returns
/// the number of payload bytes written; the 4-byte header is protocol
/// overhead and not counted.
pub fn send_framed(stream: &mut TcpStream, payload: &[u8], deadline: Deadline) -> Result<usize> {
    deadline::wait_writable(stream.as_fd(), deadline)?;
    let n = tether_proto::write_frame(stream, payload)?;
    trace!(len = n, "frame sent");
    Ok(n)
}

/// Receives one frame into `out`, bounded by `deadline`.
///
/// Waits for readability, then decodes a single frame. Returns the
/// payload length; bytes of `out` beyond it are left untouched, so one
/// buffer can be reused across calls. A frame longer than `out` fails
/// with [`crate::Error::OversizedFrame`] before any payload is read.
pub fn recv_framed(stream: &mut TcpStream, out: &mut [u8], deadline: Deadline) -> Result<usize> {
    deadline::wait_readable(stream.as_fd(), deadline)?;
    let n = tether_proto::read_frame(stream, out)?;
    trace!(len = n, "frame received");
    Ok(n)
}

/// Shuts down and releases a connection.
///
/// Dropping the stream also closes it; this exists for callers that want
/// the shutdown to be explicit at the end of a connection's life.
pub fn close(stream: TcpStream) {
    let _ = stream.shutdown(Shutdown::Both);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::Write;
    use std::net::TcpListener;

    /// A connected loopback pair.
    fn pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    #[test]
    fn frames_round_trip() {
        let (mut client, mut server) = pair();
        let sent = send_framed(&mut client, b"hello, peer", Deadline::from_secs(5)).unwrap();
        assert_eq!(sent, 11);

        let mut out = [0u8; 64];
        let n = recv_framed(&mut server, &mut out, Deadline::from_secs(5)).unwrap();
        assert_eq!(&out[..n], b"hello, peer");
    }

    #[test]
    fn empty_payload_round_trips() {
        let (mut client, mut server) = pair();
        assert_eq!(send_framed(&mut client, b"", Deadline::NONE).unwrap(), 0);
        let mut out = [0u8; 8];
        assert_eq!(recv_framed(&mut server, &mut out, Deadline::NONE).unwrap(), 0);
    }

    #[test]
    fn back_to_back_frames_do_not_coalesce() {
        let (mut client, mut server) = pair();
        send_framed(&mut client, b"0123456789", Deadline::from_secs(5)).unwrap();
        send_framed(&mut client, b"abcdefghij", Deadline::from_secs(5)).unwrap();

        let mut out = [0u8; 64];
        let first = recv_framed(&mut server, &mut out, Deadline::from_secs(5)).unwrap();
        assert_eq!(first, 10);
        assert_eq!(&out[..10], b"0123456789");

        let second = recv_framed(&mut server, &mut out, Deadline::from_secs(5)).unwrap();
        assert_eq!(second, 10);
        assert_eq!(&out[..10], b"abcdefghij");
    }

    #[test]
    fn disconnect_mid_payload_is_peer_closed() {
        let (mut client, mut server) = pair();
        // Header declares 10 bytes; only 2 arrive before the close.
        client.write_all(&[0, 0, 0, 10]).unwrap();
        client.write_all(b"ab").unwrap();
        drop(client);

        let mut out = [0u8; 64];
        let err = recv_framed(&mut server, &mut out, Deadline::from_secs(5)).unwrap_err();
        assert!(
            matches!(
                err,
                Error::PeerClosed {
                    expected: 10,
                    got: 2
                }
            ),
            "got {err:?}"
        );
    }

    #[test]
    fn disconnect_mid_header_is_peer_closed() {
        let (mut client, mut server) = pair();
        client.write_all(&[0, 0]).unwrap();
        drop(client);

        let mut out = [0u8; 64];
        let err = recv_framed(&mut server, &mut out, Deadline::from_secs(5)).unwrap_err();
        assert!(err.is_peer_closed(), "got {err:?}");
    }

    #[test]
    fn oversized_frame_is_rejected_before_payload() {
        let (mut client, mut server) = pair();
        client.write_all(&[0, 0, 0, 64]).unwrap();
        client.write_all(&[9u8; 64]).unwrap();

        let mut out = [0u8; 16];
        let err = recv_framed(&mut server, &mut out, Deadline::from_secs(5)).unwrap_err();
        assert!(
            matches!(
                err,
                Error::OversizedFrame {
                    declared: 64,
                    capacity: 16
                }
            ),
            "got {err:?}"
        );
        assert_eq!(out, [0u8; 16], "payload leaked into undersized buffer");
    }

    #[test]
    fn recv_times_out_when_peer_is_silent() {
        let (_client, mut server) = pair();
        let mut out = [0u8; 16];
        let err = recv_framed(&mut server, &mut out, Deadline::from_secs(1)).unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn close_is_idempotent_with_drop() {
        let (client, _server) = pair();
        close(client);
    }
}
