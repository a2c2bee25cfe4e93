//! SonicLink Core - command dispatch and liveness tracking for Sonic Pi.
//!
//! This crate is the protocol-independent core behind the SonicLink MCP
//! server:
//!
//! - **Probe** - point-in-time liveness checks of the Sonic Pi process
//! - **Backend** - the control-channel seam and the process-wide binding state
//! - **SonicPi** - the OSC client speaking Sonic Pi's server wire format
//! - **Discovery** - server port/token discovery from Sonic Pi's log files
//! - **Catalog** - canned beat patterns and the agent briefing text
//! - **Dispatch** - the four operations, their gates, and error folding
//!
//! # Architecture
//!
//! The [`Dispatcher`] owns its collaborators as injected dependencies:
//! a [`LivenessProbe`] consulted fresh on every call, and a [`Binding`]
//! established exactly once at startup. Every result it produces is a
//! plain string; failures are folded into descriptive messages at the
//! dispatch boundary and never propagate to the transport layer.

pub mod backend;
pub mod catalog;
pub mod discovery;
pub mod dispatch;
pub mod osc;
pub mod probe;
pub mod sonicpi;

pub use backend::{Backend, Binding};
pub use discovery::DiscoveredParams;
pub use dispatch::Dispatcher;
pub use osc::OscClient;
pub use probe::{LivenessProbe, ProcessProbe};
pub use sonicpi::{ServerParams, SonicPi};
