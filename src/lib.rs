use std::fmt;

use serde::{Deserialize, Serialize};

pub mod client;
pub mod config;
pub mod error;
pub mod preamble;
pub mod resolve;
pub mod sink;
pub mod transport;

pub use client::{
    ExchangeSettings, RECV_BUFFER_SIZE, ReceiveMode, RemoteExecClient, UNTIL_CLOSE_LIMIT,
    execute_with_config, report,
};
pub use config::ClientConfig;
pub use error::{ErrorKind, ExecError};
pub use preamble::PreambleStyle;

/// Where the remote listener lives. Resolved on every call, never cached.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub hostname: String,
    pub port: u16,
}

impl Target {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugOptions {
    pub enabled: bool,
    pub debug_port: u16,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub payload: String,
    pub debug: DebugOptions,
}

impl ExecutionRequest {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            debug: DebugOptions::default(),
        }
    }

    /// Same payload, with the debugger-attach preamble on `debug_port`.
    pub fn with_debug(mut self, debug_port: u16) -> Self {
        self.debug = DebugOptions {
            enabled: true,
            debug_port,
        };
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub response_text: String,
}

/// Progress of one round trip. Nothing survives past `Closed`.
///
/// `Idle` is the entry of `RemoteExecClient::execute` and `Failed` is its
/// `Err` return, so neither has a variant here. `ExecError::Transfer` records
/// the stage a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolving,
    Connecting,
    Sending,
    Receiving,
    Closed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Resolving => "resolve",
            Stage::Connecting => "connect",
            Stage::Sending => "send",
            Stage::Receiving => "receive",
            Stage::Closed => "close",
        };
        f.write_str(name)
    }
}
