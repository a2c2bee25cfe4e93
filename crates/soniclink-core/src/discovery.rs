//! Sonic Pi server parameter discovery.
//!
//! Sonic Pi does not advertise its OSC command port; it writes the port
//! and the auth token to its own log files under `~/.sonic-pi/log/`.
//! The `initialize` handshake re-reads those files, preferring the v4
//! daemon/spider logs and falling back to the v3 `server-output.log`.
//!
//! Parsing is split from file lookup so the text parsers can be tested
//! without a Sonic Pi installation.

use anyhow::{anyhow, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Server parameters extracted from Sonic Pi's logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveredParams {
    /// UDP port the server accepts `/run-code` on.
    pub port: Option<u16>,
    /// Auth token expected as the first argument of each command.
    pub token: Option<i32>,
}

impl DiscoveredParams {
    /// Fill fields still missing from a later discovery pass.
    fn fill_missing(&mut self, other: DiscoveredParams) {
        if self.port.is_none() {
            self.port = other.port;
        }
        if self.token.is_none() {
            self.token = other.token;
        }
    }

    fn is_complete(&self) -> bool {
        self.port.is_some() && self.token.is_some()
    }
}

/// Log files consulted for parameters, newest format first.
const LOG_CANDIDATES: &[&str] = &["daemon.log", "spider.log", "server-output.log"];

/// Default Sonic Pi log directory (`~/.sonic-pi/log`).
pub fn default_log_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".sonic-pi").join("log"))
}

/// Extract server parameters from one log file's text.
///
/// Recognizes the v3 server banner (`Listen port: N`), the v4 daemon
/// port table (`spider-listen-to-gui: N`), and the `Token:` line both
/// formats share. The last occurrence wins: the logs are append-only,
/// and a restarted server writes fresh values below stale ones.
pub fn parse_log(text: &str) -> Result<DiscoveredParams> {
    let port_re = Regex::new(r"(?:Listen port|spider-listen-to-gui):\s*([0-9]+)")?;
    let token_re = Regex::new(r"Token:\s*(-?[0-9]+)")?;

    let mut params = DiscoveredParams::default();
    for line in text.lines() {
        if let Some(caps) = port_re.captures(line) {
            if let Ok(port) = caps[1].parse::<u16>() {
                params.port = Some(port);
            }
        }
        if let Some(caps) = token_re.captures(line) {
            if let Ok(token) = caps[1].parse::<i32>() {
                params.token = Some(token);
            }
        }
    }
    Ok(params)
}

/// Discover server parameters from the Sonic Pi log directory.
///
/// Consults the candidate files in order and merges results, so a v4
/// install can contribute the port from `daemon.log` and the token from
/// `spider.log`. Errors when the log directory is missing or no file
/// yields a port: both mean Sonic Pi has never started here, and the
/// handshake must report that rather than target a guessed endpoint.
pub fn discover(log_dir: Option<&Path>) -> Result<DiscoveredParams> {
    let dir = match log_dir {
        Some(dir) => dir.to_path_buf(),
        None => default_log_dir().ok_or_else(|| anyhow!("Could not resolve home directory"))?,
    };

    if !dir.is_dir() {
        return Err(anyhow!(
            "Sonic Pi log directory not found at {}. Has Sonic Pi been started on this machine?",
            dir.display()
        ));
    }

    let mut params = DiscoveredParams::default();
    for name in LOG_CANDIDATES {
        let path = dir.join(name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                log::debug!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let found = parse_log(&text)?;
        log::debug!(
            "Parsed {}: port={:?} token={:?}",
            path.display(),
            found.port,
            found.token
        );
        params.fill_missing(found);
        if params.is_complete() {
            break;
        }
    }

    if params.port.is_none() {
        return Err(anyhow!(
            "No server port found in {} (looked at {})",
            dir.display(),
            LOG_CANDIDATES.join(", ")
        ));
    }

    Ok(params)
}
