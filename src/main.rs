use clap::Parser;
use rust_mcp_sdk::schema::{
    Implementation, InitializeResult, LATEST_PROTOCOL_VERSION, ServerCapabilities,
    ServerCapabilitiesTools,
};
use rust_mcp_sdk::{
    McpServer, StdioTransport, TransportOptions, mcp_server::server_runtime,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use cpp_assist_bridge::config::BridgeConfig;
use cpp_assist_bridge::logging::{
    FileOutputChannel, LogConfig, OutputChannel, TracingOutputChannel, init_logging,
};
use cpp_assist_bridge::lsp::CppToolsClient;
use cpp_assist_bridge::mcp_server::BridgeServerHandler;
use cpp_assist_bridge::telemetry::TracingTelemetry;

/// CLI arguments for the C/C++ assistant bridge
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Language server executable (overrides CPP_ASSIST_SERVER_PATH env var)
    #[arg(long, value_name = "PATH")]
    server_path: Option<String>,

    /// Extra argument passed to the language server (repeatable)
    #[arg(long = "server-arg", value_name = "ARG", allow_hyphen_values = true)]
    server_args: Vec<String>,

    /// Workspace root (defaults to current directory)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (overrides RUST_LOG env var)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Log file path (overrides CPP_ASSIST_LOG_FILE env var)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// File receiving user-facing tool error lines (defaults to the log)
    #[arg(long, value_name = "FILE")]
    output_log: Option<PathBuf>,
}

/// Resolve the language server path from CLI args and environment
fn resolve_server_path(server_path_arg: Option<String>) -> String {
    // Priority: CLI arg > CPP_ASSIST_SERVER_PATH env var > "cpptools" default
    server_path_arg
        .or_else(|| std::env::var("CPP_ASSIST_SERVER_PATH").ok())
        .unwrap_or_else(|| "cpptools".to_string())
}

fn open_output_channel(path: Option<PathBuf>) -> Arc<dyn OutputChannel> {
    match path.map(FileOutputChannel::open) {
        Some(Ok(channel)) => Arc::new(channel),
        Some(Err(e)) => {
            warn!("Failed to open output log, using the process log instead: {}", e);
            Arc::new(TracingOutputChannel)
        }
        None => Arc::new(TracingOutputChannel),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_config = LogConfig::from_env().with_overrides(args.log_level, args.log_file);
    if let Err(e) = init_logging(log_config) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let config = BridgeConfig::load_or_default(args.config.as_deref())?;
    let server_path = resolve_server_path(args.server_path);

    info!(
        "Starting cpp-assist-bridge with root {} and language server {}",
        root.display(),
        server_path
    );

    let mut client = CppToolsClient::spawn(
        &server_path,
        &args.server_args,
        Some(&root),
        config.request_timeout(),
    )?;
    client.initialize(Some(&root)).await?;
    let client = Arc::new(client);

    let server_details = InitializeResult {
        server_info: Implementation {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: Some("C/C++ Assistant Bridge".to_string()),
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools { list_changed: None }),
            ..Default::default()
        },
        meta: None,
        instructions: Some(
            "Use cpp_configuration for a prose summary of how a C/C++ file is compiled and \
             cpp_project_context for the same data as JSON. Use hover on a position, then \
             generate_hover_description, to get an assistant description of the symbol there."
                .to_string(),
        ),
        protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
    };

    let served = {
        let handler = BridgeServerHandler::new(
            client.clone(),
            config,
            root,
            Arc::new(TracingTelemetry),
            open_output_channel(args.output_log),
        );
        let transport = StdioTransport::new(TransportOptions::default())?;
        let server = server_runtime::create_server(server_details, transport, handler);
        server.start().await
    };

    match Arc::try_unwrap(client) {
        Ok(mut client) => {
            if let Err(e) = client.shutdown().await {
                warn!("Language server shutdown failed: {}", e);
            }
        }
        Err(_) => warn!("Language server still in use at exit; it will be killed"),
    }

    served?;
    info!("cpp-assist-bridge stopped");
    Ok(())
}
