//! The remote-execute round trip: resolve, connect, send once, read once, close.

use std::io::{self, Read, Write};
use std::net::SocketAddrV4;
use std::time::Duration;

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::error::{ExecError, Result};
use crate::preamble::{self, PreambleStyle};
use crate::resolve::{self, Resolver, SystemResolver};
use crate::sink::OutputSink;
use crate::transport::{ConnectionGuard, Connector, TcpConnector};
use crate::{ExecutionRequest, ExecutionResult, Stage, Target};

/// Size of the single receive buffer; longer replies are truncated.
pub const RECV_BUFFER_SIZE: usize = 4096;

/// Upper bound on what `ReceiveMode::UntilClose` collects before it stops reading.
pub const UNTIL_CLOSE_LIMIT: u64 = 16 * 1024 * 1024;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReceiveMode {
    /// Exactly one read of up to `RECV_BUFFER_SIZE` bytes.
    #[default]
    SingleRead,
    /// Keep reading until the listener closes its side, or until
    /// `UNTIL_CLOSE_LIMIT` bytes have arrived. The read timeout only fires
    /// when the peer goes quiet, not while it keeps streaming.
    UntilClose,
}

/// Per-exchange knobs. A `None` timeout blocks for as long as the OS allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeSettings {
    pub connect_timeout: Option<Duration>,
    pub read_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
    pub receive_mode: ReceiveMode,
    pub preamble_style: PreambleStyle,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Some(DEFAULT_TIMEOUT),
            read_timeout: Some(DEFAULT_TIMEOUT),
            write_timeout: Some(DEFAULT_TIMEOUT),
            receive_mode: ReceiveMode::SingleRead,
            preamble_style: PreambleStyle::Verbatim,
        }
    }
}

impl ExchangeSettings {
    /// No timeouts at all, matching a plain blocking socket.
    pub fn blocking() -> Self {
        Self {
            connect_timeout: None,
            read_timeout: None,
            write_timeout: None,
            ..Self::default()
        }
    }
}

/// Stateless client; every `execute` call opens and closes its own socket.
#[derive(Debug, Clone, Default)]
pub struct RemoteExecClient<R = SystemResolver, C = TcpConnector> {
    resolver: R,
    connector: C,
    settings: ExchangeSettings,
}

impl RemoteExecClient {
    pub fn new(settings: ExchangeSettings) -> Self {
        Self::with_parts(SystemResolver, TcpConnector, settings)
    }
}

impl<R: Resolver, C: Connector> RemoteExecClient<R, C> {
    pub fn with_parts(resolver: R, connector: C, settings: ExchangeSettings) -> Self {
        Self {
            resolver,
            connector,
            settings,
        }
    }

    pub fn execute(&self, request: &ExecutionRequest, target: &Target) -> Result<ExecutionResult> {
        debug!("[{}] {}", Stage::Resolving, target.hostname);
        let ip = resolve::resolve_ipv4(&self.resolver, &target.hostname)?;
        let addr = SocketAddrV4::new(ip, target.port);

        let text = preamble::build_payload(request, ip, self.settings.preamble_style);
        let bytes = preamble::encode_ascii(&text);

        debug!("[{}] {}", Stage::Connecting, addr);
        let conn = self
            .connector
            .connect(addr, &self.settings)
            .map_err(|source| ExecError::Connection { addr, source })?;
        let mut guard = ConnectionGuard::new(conn);

        debug!("[{}] {} bytes to {}", Stage::Sending, bytes.len(), addr);
        trace!("payload:\n{}", text);
        send(guard.get_mut(), &bytes).map_err(|source| ExecError::Transfer {
            stage: Stage::Sending,
            addr,
            source,
        })?;

        debug!("[{}] {:?} from {}", Stage::Receiving, self.settings.receive_mode, addr);
        let received = receive(guard.get_mut(), self.settings.receive_mode).map_err(|source| {
            ExecError::Transfer {
                stage: Stage::Receiving,
                addr,
                source,
            }
        })?;

        if let Err(e) = guard.finish() {
            warn!("error while closing connection to {}: {}", addr, e);
        }
        debug!("[{}] {}", Stage::Closed, addr);

        let response_text = preamble::decode_ascii(&received);
        info!("{} replied with {} bytes", addr, received.len());
        debug!("response:\n{}", response_text);
        Ok(ExecutionResult { response_text })
    }
}

fn send<W: Write + ?Sized>(conn: &mut W, bytes: &[u8]) -> io::Result<()> {
    conn.write_all(bytes)?;
    conn.flush()
}

fn receive<Rd: Read + ?Sized>(conn: &mut Rd, mode: ReceiveMode) -> io::Result<Vec<u8>> {
    match mode {
        ReceiveMode::SingleRead => {
            let mut buf = vec![0u8; RECV_BUFFER_SIZE];
            let n = loop {
                match conn.read(&mut buf) {
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    other => break other?,
                }
            };
            buf.truncate(n);
            Ok(buf)
        }
        ReceiveMode::UntilClose => {
            let mut buf = Vec::new();
            Read::take(&mut *conn, UNTIL_CLOSE_LIMIT).read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// One round trip described entirely by a `ClientConfig`.
pub fn execute_with_config(config: &ClientConfig, payload: impl Into<String>) -> Result<ExecutionResult> {
    let client = RemoteExecClient::new(config.settings());
    client.execute(&config.request(payload), &config.target())
}

/// Writes the response text, or `<Kind>: <message>` for a failure, to `sink`.
pub fn report<S: OutputSink + ?Sized>(result: &Result<ExecutionResult>, sink: &mut S) -> io::Result<()> {
    match result {
        Ok(res) => sink.write_text(&res.response_text),
        Err(e) => sink.write_text(&e.sink_message()),
    }
}
