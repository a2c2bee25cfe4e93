//! SonicLink - the `soniclink` command.
//!
//! MCP server for driving a running Sonic Pi instance. The default
//! subcommand serves MCP over stdio; `check` and `pattern` exist for
//! poking at the same core from a shell.

mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rmcp::{transport::stdio, ServiceExt};
use soniclink_core::{catalog, discovery, Binding, Dispatcher, LivenessProbe, ProcessProbe, ServerParams};
use std::path::PathBuf;
use std::sync::Arc;

use server::SonicLinkServer;

/// SonicLink - Sonic Pi MCP server
#[derive(Parser, Debug)]
#[command(name = "soniclink")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MCP server for driving Sonic Pi", long_about = None)]
struct Args {
    /// Host the Sonic Pi server runs on
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Override the Sonic Pi log directory used for parameter discovery
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve MCP over stdio (the default)
    Serve,

    /// Report liveness, binding, and discovered server parameters
    Check,

    /// Print a canned beat pattern, or list available styles
    Pattern {
        /// Style to print (omit to list all styles)
        style: Option<String>,
    },

    /// Show version information
    Version,
}

/// Initialize logging to stderr.
///
/// stdout carries the MCP protocol, so everything we log has to stay
/// off it. Default level Info, overridable via RUST_LOG.
fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(args.host, args.log_dir).await,
        Commands::Check => check(args.host, args.log_dir),
        Commands::Pattern { style } => {
            print_pattern(style);
            Ok(())
        }
        Commands::Version => {
            println!("soniclink {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("MCP server for driving Sonic Pi");
            println!();
            println!("Crates:");
            println!("  - soniclink-core: dispatch, liveness probing, pattern catalog");
            println!("  - soniclink-mcp:  MCP stdio transport and CLI");
            Ok(())
        }
    }
}

/// Build the dispatcher and block on the MCP serving loop.
async fn serve(host: String, log_dir: Option<PathBuf>) -> Result<()> {
    let probe = ProcessProbe::new();
    if probe.is_running() {
        log::info!("Sonic Pi is running");
    } else {
        log::warn!("Sonic Pi doesn't appear to be running; start it before calling tools");
    }

    let params = ServerParams {
        host: host.clone(),
        log_dir,
        ..ServerParams::default()
    };
    let binding = Binding::establish(params);

    let dispatcher = Arc::new(Dispatcher::new(binding, Arc::new(probe), host));
    log::info!("SonicLink MCP server listening on stdio");

    let service = SonicLinkServer::new(dispatcher)
        .serve(stdio())
        .await
        .inspect_err(|e| log::error!("Serving error: {}", e))?;
    service.waiting().await?;
    Ok(())
}

/// One-shot diagnostic: the same checks the dispatch gates make, as
/// human-readable output. Exits non-zero when the engine is down.
fn check(host: String, log_dir: Option<PathBuf>) -> Result<()> {
    let probe = ProcessProbe::new();
    let running = probe.is_running();
    println!(
        "Sonic Pi process:  {}",
        if running { "running" } else { "not running" }
    );

    match discovery::discover(log_dir.as_deref()) {
        Ok(params) => println!(
            "Server parameters: port {}, token {}",
            params
                .port
                .map(|p| p.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            params
                .token
                .map(|t| t.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        ),
        Err(e) => println!("Server parameters: discovery failed ({})", e),
    }

    let params = ServerParams {
        host,
        log_dir,
        ..ServerParams::default()
    };
    match Binding::establish(params) {
        Binding::Bound(_) => println!("Control link:      ok"),
        Binding::Unbound(reason) => println!("Control link:      unavailable ({})", reason),
    }

    if !running {
        anyhow::bail!("Sonic Pi is not running");
    }
    Ok(())
}

fn print_pattern(style: Option<String>) {
    match style {
        Some(style) => println!("{}", catalog::get_pattern(&style)),
        None => {
            println!("Available styles:");
            for name in catalog::style_names() {
                println!("  {}", name);
            }
        }
    }
}
