//! High-level OSC client for the Sonic Pi server.
//!
//! Wire format follows Sonic Pi's server interface: `/run-code` and
//! `/stop-all-jobs` carry the auth token as their first argument and go
//! to the command port; cues are plain OSC messages to the cue port.

use anyhow::{Context, Result};
use rosc::OscType;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::backend::Backend;
use crate::discovery;
use crate::osc::OscClient;

/// Default UDP port for `/run-code` and `/stop-all-jobs`.
pub const DEFAULT_COMMAND_PORT: u16 = 4557;
/// Default UDP port for external OSC cues.
pub const DEFAULT_CUE_PORT: u16 = 4560;

/// Wire endpoints and auth token for a Sonic Pi server.
///
/// The defaults target a local install on the classic ports; the
/// `initialize` handshake refreshes port and token from the server's
/// own log files.
#[derive(Debug, Clone)]
pub struct ServerParams {
    /// Host the server runs on.
    pub host: String,
    /// UDP port for commands.
    pub command_port: u16,
    /// UDP port for cues.
    pub cue_port: u16,
    /// Auth token sent as the first argument of each command.
    pub token: i32,
    /// Override for the log directory consulted during discovery.
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerParams {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            command_port: DEFAULT_COMMAND_PORT,
            cue_port: DEFAULT_CUE_PORT,
            token: 0,
            log_dir: None,
        }
    }
}

/// OSC-backed control channel to a Sonic Pi server.
pub struct SonicPi {
    osc: OscClient,
    params: Mutex<ServerParams>,
}

impl SonicPi {
    /// Create a client with the given parameters.
    ///
    /// Only binds the local socket; no traffic is sent until the first
    /// command.
    pub fn new(params: ServerParams) -> Result<Self> {
        Ok(Self {
            osc: OscClient::new().context("Failed to bind a local UDP socket")?,
            params: Mutex::new(params),
        })
    }

    /// Current command target ("host:port") and token.
    fn command_target(&self) -> (String, i32) {
        let p = self.params.lock().expect("not poisoned");
        (format!("{}:{}", p.host, p.command_port), p.token)
    }

    /// Current cue target ("host:port").
    fn cue_target(&self) -> String {
        let p = self.params.lock().expect("not poisoned");
        format!("{}:{}", p.host, p.cue_port)
    }

    /// Snapshot of the current parameters.
    pub fn params(&self) -> ServerParams {
        self.params.lock().expect("not poisoned").clone()
    }
}

impl Backend for SonicPi {
    fn configure(&self, host: &str) -> Result<()> {
        let log_dir = self.params.lock().expect("not poisoned").log_dir.clone();
        let discovered = discovery::discover(log_dir.as_deref())
            .context("Failed to read server parameters from the Sonic Pi logs")?;

        let mut p = self.params.lock().expect("not poisoned");
        p.host = host.to_string();
        if let Some(port) = discovered.port {
            p.command_port = port;
        }
        if let Some(token) = discovered.token {
            p.token = token;
        }
        log::info!(
            "Sonic Pi command channel configured: {}:{} (cue port {})",
            p.host,
            p.command_port,
            p.cue_port
        );
        Ok(())
    }

    fn run_code(&self, code: &str) -> Result<()> {
        let (target, token) = self.command_target();
        self.osc.send_msg(
            &target,
            "/run-code",
            vec![OscType::Int(token), OscType::String(code.to_string())],
        )
    }

    fn stop_all(&self) -> Result<()> {
        let (target, token) = self.command_target();
        self.osc
            .send_msg(&target, "/stop-all-jobs", vec![OscType::Int(token)])
    }

    fn cue(&self, address: &str, args: Vec<OscType>) -> Result<()> {
        self.osc.send_msg(&self.cue_target(), address, args)
    }
}

impl std::fmt::Debug for SonicPi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SonicPi")
            .field("params", &self.params())
            .finish_non_exhaustive()
    }
}
