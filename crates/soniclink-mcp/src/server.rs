//! MCP tool surface for the SonicLink dispatcher.
//!
//! Each tool is a thin delegation: the dispatcher produces the plain
//! text result, and this layer wraps it in a `CallToolResult`. All
//! gating, ordering, and error folding live in `soniclink-core`.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::Deserialize;
use soniclink_core::Dispatcher;
use std::sync::Arc;

/// Arguments for the `run` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
pub struct RunRequest {
    /// Sonic Pi code to run immediately.
    pub code: String,
}

/// Arguments for the `get_beat_pattern` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
pub struct BeatPatternRequest {
    /// Style to fetch, e.g. "blues" or "hiphop". Case-insensitive.
    pub style: String,
}

/// MCP server handler exposing the dispatch operations as tools.
#[derive(Clone)]
pub struct SonicLinkServer {
    dispatcher: Arc<Dispatcher>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SonicLinkServer {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            tool_router: Self::tool_router(),
        }
    }

    fn text(result: String) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(result)]))
    }

    #[tool(
        description = "Initialize the Sonic Pi control channel. Returns a briefing on chord vocabulary, rhythm conventions, and synth names to use in code."
    )]
    fn initialize(&self) -> Result<CallToolResult, McpError> {
        Self::text(self.dispatcher.initialize())
    }

    #[tool(
        description = "Stop whatever is playing, then run the given Sonic Pi code immediately."
    )]
    fn run(
        &self,
        Parameters(RunRequest { code }): Parameters<RunRequest>,
    ) -> Result<CallToolResult, McpError> {
        Self::text(self.dispatcher.run(&code))
    }

    #[tool(description = "Stop all currently playing Sonic Pi music.")]
    fn stop(&self) -> Result<CallToolResult, McpError> {
        Self::text(self.dispatcher.stop())
    }

    #[tool(
        description = "Fetch a ready-to-run beat pattern for a style (blues, rock, hiphop, electronic, jazz, funk). Works without a running Sonic Pi."
    )]
    fn get_beat_pattern(
        &self,
        Parameters(BeatPatternRequest { style }): Parameters<BeatPatternRequest>,
    ) -> Result<CallToolResult, McpError> {
        Self::text(self.dispatcher.get_beat_pattern(&style))
    }
}

#[tool_handler]
impl ServerHandler for SonicLinkServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "SonicLink: drive a running Sonic Pi instance. Call initialize first for a \
                 briefing, run to play code (stops current playback first), stop to silence \
                 everything, and get_beat_pattern for canned rhythm starters."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
