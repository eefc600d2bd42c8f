//! Client-side connection operations.

use std::net::TcpStream;

use crate::conn;
use crate::deadline::Deadline;
use crate::error::Result;
use crate::sock;

/// Immutable per-client deadline configuration.
///
/// Passed by reference into every operation; there is no process-wide
/// state. Each field bounds one kind of call, and each call gets a fresh
/// budget — deadlines never carry over between operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClientConfig {
    /// Bound on [`ClientConfig::connect`].
    pub connect: Deadline,
    /// Bound on each [`ClientConfig::send`].
    pub send: Deadline,
    /// Bound on each [`ClientConfig::recv`].
    pub recv: Deadline,
}

impl ClientConfig {
    /// Builds a configuration from the three per-operation deadlines.
    pub const fn new(connect: Deadline, send: Deadline, recv: Deadline) -> Self {
        Self {
            connect,
            send,
            recv,
        }
    }

    /// Connects to `host:port`, bounded by the connect deadline.
    pub fn connect(&self, host: &str, port: u16) -> Result<TcpStream> {
        sock::connect_with_timeout(host, port, self.connect)
    }

    /// Sends `payload` as one frame, bounded by the send deadline.
    ///
    /// Returns the number of payload bytes written.
    pub fn send(&self, stream: &mut TcpStream, payload: &[u8]) -> Result<usize> {
        conn::send_framed(stream, payload, self.send)
    }

    /// Receives one frame into `out`, bounded by the receive deadline.
    ///
    /// Returns the payload length.
    pub fn recv(&self, stream: &mut TcpStream, out: &mut [u8]) -> Result<usize> {
        conn::recv_framed(stream, out, self.recv)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::server;
    use std::thread;

    #[test]
    fn client_server_echo_round_trip() {
        let listener = server::listen(0).unwrap();
        let port = listener.local_addr().unwrap().port();

        let echo = thread::spawn(move || {
            let (mut stream, _peer) = server::accept(&listener, Deadline::from_secs(5)).unwrap();
            let mut buf = [0u8; 128];
            let n = server::recv(&mut stream, &mut buf, Deadline::from_secs(5)).unwrap();
            server::send(&mut stream, &buf[..n], Deadline::from_secs(5)).unwrap();
        });

        let config = ClientConfig::new(
            Deadline::from_secs(5),
            Deadline::from_secs(5),
            Deadline::from_secs(5),
        );
        let mut stream = config.connect("127.0.0.1", port).unwrap();
        assert_eq!(config.send(&mut stream, b"echo me").unwrap(), 7);

        let mut out = [0u8; 128];
        let n = config.recv(&mut stream, &mut out).unwrap();
        assert_eq!(&out[..n], b"echo me");

        echo.join().unwrap();
    }

    #[test]
    fn default_config_is_unbounded() {
        let config = ClientConfig::default();
        assert!(config.connect.is_unbounded());
        assert!(config.send.is_unbounded());
        assert!(config.recv.is_unbounded());
    }
}
