use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use tracing::{debug, trace, warn};

use super::DatagramCodec;
use crate::{Error, Result};

/// Sends records encoded by `C` to a fixed destination, one per datagram.
///
/// Delivery is best effort. A send error is returned to the caller but the
/// socket stays usable.
#[derive(Debug)]
pub struct Sender<C> {
    socket: UdpSocket,
    dest: SocketAddr,
    codec: C,
}

impl<C: DatagramCodec> Sender<C> {
    /// Create a sender on an ephemeral local port of the same address family
    /// as `dest`.
    ///
    /// # Errors
    /// If the local socket cannot be bound.
    pub fn new(dest: SocketAddr, codec: C) -> Result<Self> {
        let local: SocketAddr = if dest.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        Ok(Sender {
            socket,
            dest,
            codec,
        })
    }

    #[must_use]
    pub fn dest(&self) -> SocketAddr {
        self.dest
    }

    /// Encode and send a single record. Nothing is sent if encoding fails or
    /// yields an empty datagram.
    ///
    /// # Errors
    /// If encoding fails, the encoding is empty, or the datagram could not
    /// be handed to the OS.
    pub fn send(&self, item: &C::Item) -> Result<()> {
        let dat = self.codec.encode(item)?;
        if dat.is_empty() {
            return Err(Error::EmptyDatagram);
        }
        trace!(len = dat.len(), dest = %self.dest, "sending datagram");
        self.socket.send_to(&dat, self.dest)?;
        Ok(())
    }

    /// Send the zero-length datagram receivers treat as end of stream.
    ///
    /// # Errors
    /// If the datagram could not be handed to the OS.
    pub fn finish(&self) -> Result<()> {
        self.socket.send_to(&[], self.dest)?;
        Ok(())
    }
}

/// Receives records encoded by `C`.
///
/// Datagrams that do not decode are dropped and receiving continues. A
/// zero-length datagram ends the stream.
///
/// As an [Iterator], a socket error also ends the stream.
#[derive(Debug)]
pub struct Receiver<C> {
    socket: UdpSocket,
    codec: C,
    buf: Vec<u8>,
    done: bool,
}

impl<C: DatagramCodec> Receiver<C> {
    /// Listen on `port` on all IPv4 interfaces.
    ///
    /// # Errors
    /// If the socket cannot be bound.
    pub fn bind(port: u16, codec: C) -> Result<Self> {
        Self::bind_addr((Ipv4Addr::UNSPECIFIED, port).into(), codec)
    }

    /// Listen on `addr`.
    ///
    /// # Errors
    /// If the socket cannot be bound.
    pub fn bind_addr(addr: SocketAddr, codec: C) -> Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        // one extra byte so oversize datagrams are not silently truncated to
        // the exact expected size
        let buf = vec![0u8; codec.max_len() + 1];
        Ok(Receiver {
            socket,
            codec,
            buf,
            done: false,
        })
    }

    /// # Errors
    /// If the local address cannot be determined.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Block until a record decodes, returning `None` at end of stream.
    ///
    /// # Errors
    /// If receiving from the socket fails.
    pub fn recv(&mut self) -> Result<Option<C::Item>> {
        loop {
            let (len, src) = self.socket.recv_from(&mut self.buf)?;
            if len == 0 {
                debug!(%src, "end of stream");
                return Ok(None);
            }
            match self.codec.decode(&self.buf[..len]) {
                Ok(item) => return Ok(Some(item)),
                Err(err) => {
                    debug!(%src, len, "dropping datagram: {err}");
                }
            }
        }
    }
}

impl<C: DatagramCodec> Iterator for Receiver<C> {
    type Item = C::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.recv() {
            Ok(Some(item)) => Some(item),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                warn!("receive failed, ending stream: {err}");
                self.done = true;
                None
            }
        }
    }
}
