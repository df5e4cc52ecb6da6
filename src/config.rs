//! Client configuration.
//!
//! Stored as JSON; every field is optional and falls back to its default:
//!
//! ```json
//! {
//!   "hostname": "127.0.0.1",
//!   "port": 9000,
//!   "debug_port": 9001,
//!   "debug_enabled": false,
//!   "connect_timeout_ms": 5000,
//!   "io_timeout_ms": 5000,
//!   "receive_mode": "single_read",
//!   "preamble_style": "verbatim"
//! }
//! ```
//!
//! A timeout of `0` disables it.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::client::{ExchangeSettings, ReceiveMode};
use crate::preamble::PreambleStyle;
use crate::{DebugOptions, ExecutionRequest, Target};

const DEFAULT_HOSTNAME: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 9000;
const DEFAULT_DEBUG_PORT: u16 = 9001;
const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub hostname: String,
    pub port: u16,
    pub debug_port: u16,
    pub debug_enabled: bool,
    pub connect_timeout_ms: u64,
    pub io_timeout_ms: u64,
    pub receive_mode: ReceiveMode,
    pub preamble_style: PreambleStyle,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            port: DEFAULT_PORT,
            debug_port: DEFAULT_DEBUG_PORT,
            debug_enabled: false,
            connect_timeout_ms: DEFAULT_TIMEOUT_MS,
            io_timeout_ms: DEFAULT_TIMEOUT_MS,
            receive_mode: ReceiveMode::default(),
            preamble_style: PreambleStyle::default(),
        }
    }
}

fn timeout(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: ClientConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.hostname.trim().is_empty() {
            bail!("hostname must not be empty");
        }
        if self.port == 0 {
            bail!("port must be in 1-65535");
        }
        if self.debug_enabled && self.debug_port == 0 {
            bail!("debug_port must be in 1-65535 when debugging is enabled");
        }
        Ok(())
    }

    pub fn target(&self) -> Target {
        Target::new(self.hostname.clone(), self.port)
    }

    pub fn request(&self, payload: impl Into<String>) -> ExecutionRequest {
        ExecutionRequest {
            payload: payload.into(),
            debug: DebugOptions {
                enabled: self.debug_enabled,
                debug_port: self.debug_port,
            },
        }
    }

    pub fn settings(&self) -> ExchangeSettings {
        let io = timeout(self.io_timeout_ms);
        ExchangeSettings {
            connect_timeout: timeout(self.connect_timeout_ms),
            read_timeout: io,
            write_timeout: io,
            receive_mode: self.receive_mode,
            preamble_style: self.preamble_style,
        }
    }
}
