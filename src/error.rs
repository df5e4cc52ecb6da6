use std::fmt;
use std::io;
use std::net::SocketAddrV4;

use thiserror::Error;

use crate::Stage;

/// Failures of a single remote-execute round trip.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("could not resolve '{host}' to an IPv4 address: {reason}")]
    Resolution { host: String, reason: String },

    #[error("could not connect to {addr}: {source}")]
    Connection {
        addr: SocketAddrV4,
        #[source]
        source: io::Error,
    },

    #[error("{stage} failed on {addr}: {source}")]
    Transfer {
        stage: Stage,
        addr: SocketAddrV4,
        #[source]
        source: io::Error,
    },
}

/// Coarse classification used to prefix messages written to an output sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ResolutionError,
    ConnectionError,
    TransferError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::ResolutionError => "ResolutionError",
            ErrorKind::ConnectionError => "ConnectionError",
            ErrorKind::TransferError => "TransferError",
        };
        f.write_str(name)
    }
}

impl ExecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecError::Resolution { .. } => ErrorKind::ResolutionError,
            ExecError::Connection { .. } => ErrorKind::ConnectionError,
            ExecError::Transfer { .. } => ErrorKind::TransferError,
        }
    }

    /// The line written to the output sink: `<Kind>: <message>`.
    pub fn sink_message(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }
}

pub type Result<T> = std::result::Result<T, ExecError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn sink_message_is_prefixed_with_kind() {
        let err = ExecError::Connection {
            addr: SocketAddrV4::new(Ipv4Addr::LOCALHOST, 9000),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        let msg = err.sink_message();
        assert!(msg.starts_with("ConnectionError: could not connect to 127.0.0.1:9000"));
    }

    #[test]
    fn transfer_names_the_stage() {
        let err = ExecError::Transfer {
            stage: Stage::Receiving,
            addr: SocketAddrV4::new(Ipv4Addr::LOCALHOST, 9000),
            source: io::Error::from(io::ErrorKind::ConnectionReset),
        };
        assert_eq!(err.kind(), ErrorKind::TransferError);
        assert!(err.to_string().starts_with("receive failed on 127.0.0.1:9000"));
    }
}
