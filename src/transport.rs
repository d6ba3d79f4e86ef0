use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

/// Fire-and-forget packet sender.
///
/// Implementations send with no acknowledgment, no retry, and no delivery
/// guarantee, and must not block beyond a best-effort write. A send failure
/// is reported to the caller, who decides whether it matters; for the
/// emitter it never does.
pub trait Transport {
    /// Sends a single packet, best effort.
    fn send(&self, packet: &[u8]) -> io::Result<()>;
}

/// UDP transport aimed at a statsd collector.
///
/// The socket is opened once at construction and shared thereafter;
/// `UdpSocket::send_to` takes `&self`, so concurrent sends need no extra
/// locking.
pub struct UdpTransport {
    socket: UdpSocket,
    addr: SocketAddr,
}

impl UdpTransport {
    /// Opens an unconnected UDP socket aimed at `addr`.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<UdpTransport> {
        let addr = addr.to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::Other, "statsd address did not resolve")
        })?;

        let bind_addr = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr)?;

        Ok(UdpTransport { socket, addr })
    }
}

impl Transport for UdpTransport {
    fn send(&self, packet: &[u8]) -> io::Result<()> {
        self.socket.send_to(packet, self.addr).map(|_| ())
    }
}
