//! OSC (Open Sound Control) client for Sonic Pi communication.
//!
//! Sonic Pi's server is controlled over UDP OSC: commands like `/run-code`
//! and `/stop-all-jobs` go to the command port, external cues go to the
//! cue port. This module provides the one UDP client both flows share.

use anyhow::Result;
use rosc::{encoder, OscMessage, OscPacket, OscType};
use std::net::UdpSocket;
use std::sync::Arc;

/// UDP-based OSC client for sending messages to Sonic Pi.
///
/// One ephemeral socket is bound at construction. The target address is
/// chosen per send: the command and cue ports differ, and both can be
/// re-pointed by the `initialize` handshake.
#[derive(Clone)]
pub struct OscClient {
    sock: Arc<UdpSocket>,
}

impl OscClient {
    /// Create a new OSC client bound to an ephemeral local port.
    pub fn new() -> Result<Self> {
        let sock = UdpSocket::bind("0.0.0.0:0")?;
        Ok(Self {
            sock: Arc::new(sock),
        })
    }

    /// Send an OSC message to `target` ("host:port" format).
    ///
    /// # Arguments
    /// * `target` - Destination address (e.g., "127.0.0.1:4557")
    /// * `path` - The OSC address pattern (e.g., "/run-code")
    /// * `args` - The message arguments
    pub fn send_msg(&self, target: &str, path: &str, args: Vec<OscType>) -> Result<()> {
        let msg = OscMessage {
            addr: path.into(),
            args,
        };
        let buf = encoder::encode(&OscPacket::Message(msg))?;
        self.sock.send_to(&buf, target)?;
        Ok(())
    }
}

impl std::fmt::Debug for OscClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OscClient").finish_non_exhaustive()
    }
}
