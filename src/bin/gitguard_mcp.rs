use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use tracing_subscriber::{self, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use gitguard_mcp::config::ServerConfig;
use gitguard_mcp::tools::GitGuardTools;

#[derive(Parser)]
#[command(author, version = "0.1.0", about, long_about = None)]
#[command(propagate_version = true)]
#[command(disable_version_flag = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server in stdin/stdout mode
    Stdio {
        /// Enable debug logging
        #[arg(short, long)]
        debug: bool,

        #[command(flatten)]
        config: ServerConfig,
    },
    /// Run the server with HTTP/SSE interface
    Http {
        /// Address to bind the HTTP server to
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        address: String,

        /// Enable debug logging
        #[arg(short, long)]
        debug: bool,

        #[command(flatten)]
        config: ServerConfig,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Stdio { debug, config } => run_stdio_server(debug, config).await,
        Commands::Http {
            address,
            debug,
            config,
        } => run_http_server(address, debug, config).await,
    }
}

fn log_config(config: &ServerConfig) {
    if config.github_token.is_some() {
        tracing::info!("Using GitHub token from command line arguments or environment");
    } else {
        tracing::warn!("No GitHub token configured; destructive tools will refuse to run");
    }

    if let Some(repo) = &config.default_repository {
        tracing::info!("Using default repository: {}", repo);
    }

    tracing::info!(
        "Confirmation tokens are valid for {} seconds{}",
        config.gate.validity_secs,
        if config.gate.single_use_tokens {
            " and can be used once"
        } else {
            ""
        }
    );
}

async fn run_stdio_server(debug: bool, config: ServerConfig) -> Result<()> {
    // Initialize the tracing subscriber with stderr logging
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr) // stdout carries the MCP protocol
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .init();

    tracing::info!("Starting GitGuard MCP server in STDIN/STDOUT mode");
    log_config(&config);

    let tools = GitGuardTools::new(&config)?;

    gitguard_mcp::transport::stdio::run_stdio_server(tools)
        .await
        .map_err(|e| anyhow::anyhow!("Error running STDIO server: {}", e))
}

async fn run_http_server(address: String, debug: bool, config: ServerConfig) -> Result<()> {
    let level = if debug { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},{}", level, env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(false))
        .init();

    let addr: SocketAddr = address.parse()?;

    tracing::debug!("GitGuard MCP server listening on {}", addr);
    tracing::info!("Access the GitGuard MCP server at http://{}/sse", addr);
    log_config(&config);

    let tools = GitGuardTools::new(&config)?;

    let app = gitguard_mcp::transport::sse_server::SseServerApp::new(addr, tools);
    app.serve().await?;

    Ok(())
}
