//! Stream connections and their guaranteed teardown.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, SocketAddrV4, TcpStream};

use log::{debug, warn};

use crate::client::ExchangeSettings;

pub trait Connection: Read + Write {
    fn close(&mut self) -> io::Result<()>;
}

impl Connection for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        match self.shutdown(Shutdown::Both) {
            // Peer already hung up; nothing left to tear down.
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}

pub trait Connector {
    type Conn: Connection;

    fn connect(&self, addr: SocketAddrV4, settings: &ExchangeSettings) -> io::Result<Self::Conn>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Conn = TcpStream;

    fn connect(&self, addr: SocketAddrV4, settings: &ExchangeSettings) -> io::Result<TcpStream> {
        let stream = match settings.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&SocketAddr::V4(addr), timeout)?,
            None => TcpStream::connect(addr)?,
        };
        stream.set_read_timeout(settings.read_timeout)?;
        stream.set_write_timeout(settings.write_timeout)?;
        Ok(stream)
    }
}

/// Owns a connection for one exchange and closes it exactly once, either
/// through `finish` or when dropped on an error path.
pub struct ConnectionGuard<C: Connection> {
    conn: C,
    closed: bool,
}

impl<C: Connection> ConnectionGuard<C> {
    pub fn new(conn: C) -> Self {
        Self { conn, closed: false }
    }

    pub fn get_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    pub fn finish(mut self) -> io::Result<()> {
        self.closed = true;
        self.conn.close()
    }
}

impl<C: Connection> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        debug!("closing connection after failed exchange");
        if let Err(e) = self.conn.close() {
            warn!("error while closing connection: {}", e);
        }
    }
}
