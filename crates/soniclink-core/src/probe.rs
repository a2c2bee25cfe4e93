//! Liveness probing for the Sonic Pi process.
//!
//! Every dispatch call re-checks whether Sonic Pi is running; nothing is
//! cached. On macOS the check is `pgrep` against the exact process name.
//! Every other platform reports not-running without probing: the probe
//! fails closed.

use std::process::Command;

/// Exact process name Sonic Pi runs under on macOS.
pub const SONIC_PI_PROCESS: &str = "Sonic Pi";

/// Point-in-time check of whether the backend engine is running.
pub trait LivenessProbe: Send + Sync {
    /// Whether the engine process is currently active on this host.
    fn is_running(&self) -> bool;
}

/// Probe backed by OS process enumeration.
pub struct ProcessProbe {
    process_name: String,
}

impl ProcessProbe {
    /// Create a probe for the Sonic Pi process.
    pub fn new() -> Self {
        Self::for_process(SONIC_PI_PROCESS)
    }

    /// Create a probe for an arbitrary process name.
    pub fn for_process(name: impl Into<String>) -> Self {
        Self {
            process_name: name.into(),
        }
    }
}

impl Default for ProcessProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl LivenessProbe for ProcessProbe {
    fn is_running(&self) -> bool {
        if !cfg!(target_os = "macos") {
            return false;
        }

        // pgrep exits 0 iff at least one process matches the exact name.
        // Any failure to run the query itself counts as not running.
        match Command::new("pgrep")
            .arg("-x")
            .arg(&self.process_name)
            .output()
        {
            Ok(output) => output.status.success(),
            Err(e) => {
                log::debug!("pgrep failed: {}", e);
                false
            }
        }
    }
}
