//! The control-channel seam between the dispatcher and Sonic Pi.
//!
//! [`Backend`] is the operation surface the dispatcher drives; the
//! production implementation is [`SonicPi`](crate::sonicpi::SonicPi).
//! [`Binding`] holds "did the control channel come up" as an explicit
//! two-state value established once at process startup.

use anyhow::Result;
use rosc::OscType;
use std::sync::Arc;

use crate::sonicpi::{ServerParams, SonicPi};

/// Control channel to the backend engine.
pub trait Backend: Send + Sync {
    /// Handshake: refresh server parameters and point the channel at `host`.
    fn configure(&self, host: &str) -> Result<()>;

    /// Submit code for immediate execution.
    fn run_code(&self, code: &str) -> Result<()>;

    /// Stop everything currently playing.
    fn stop_all(&self) -> Result<()>;

    /// Send an OSC cue that running code can `sync` on.
    fn cue(&self, address: &str, args: Vec<OscType>) -> Result<()>;
}

/// Process-wide binding state for the control channel.
///
/// At most one binding exists per process lifetime. Once establishment
/// fails the binding stays [`Binding::Unbound`] until the process
/// restarts. A failed handshake inside `initialize` is reported per
/// call and never alters this state: the channel itself is still
/// usable, only the handshake attempt failed.
pub enum Binding {
    /// The control channel is up and usable.
    Bound(Arc<dyn Backend>),
    /// Establishment failed; the reason is surfaced to callers at call time.
    Unbound(String),
}

impl Binding {
    /// Attempt to establish the production control channel.
    ///
    /// Called exactly once at startup. Failures are logged here; the
    /// caller-facing report happens at dispatch time.
    pub fn establish(params: ServerParams) -> Self {
        match SonicPi::new(params) {
            Ok(client) => {
                log::info!("Sonic Pi control link established");
                Binding::Bound(Arc::new(client))
            }
            Err(e) => {
                log::error!("Error initializing the Sonic Pi control link: {}", e);
                Binding::Unbound(e.to_string())
            }
        }
    }

    /// Whether the control channel is usable.
    pub fn is_bound(&self) -> bool {
        matches!(self, Binding::Bound(_))
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Binding::Bound(_) => f.write_str("Binding::Bound"),
            Binding::Unbound(reason) => write!(f, "Binding::Unbound({:?})", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_establish_binds_with_default_params() {
        // Establishment only needs a local UDP socket; it must succeed
        // whether or not Sonic Pi is installed.
        let binding = Binding::establish(ServerParams::default());
        assert!(binding.is_bound());
    }
}
