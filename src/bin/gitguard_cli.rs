use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{self, EnvFilter};

use gitguard_mcp::config::ServerConfig;
use gitguard_mcp::tools::responses;

#[derive(Parser)]
#[command(author, version = "0.1.0", about = "GitGuard CLI for confirmation-gated GitHub deletions", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(flatten)]
    config: ServerConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete a branch
    DeleteBranch {
        /// Branch to delete
        branch: String,

        /// Repository ('owner/repo'); falls back to --repo
        #[arg(long = "target")]
        repo: Option<String>,

        /// Token printed by a previous call without it
        #[arg(long)]
        confirmation_token: Option<String>,
    },
    /// Delete one or more files on a branch
    DeleteFiles {
        /// Branch the files are deleted from (default: main)
        #[arg(short, long)]
        branch: Option<String>,

        /// Paths of the files to delete
        #[arg(required = true)]
        file_paths: Vec<String>,

        /// Repository ('owner/repo'); falls back to --repo
        #[arg(long = "target")]
        repo: Option<String>,

        /// Token printed by a previous call without it
        #[arg(long)]
        confirmation_token: Option<String>,
    },
    /// Delete a repository
    DeleteRepository {
        /// Repository ('owner/repo'); falls back to --repo
        repo: Option<String>,

        /// Token printed by a previous call without it
        #[arg(long)]
        confirmation_token: Option<String>,
    },
    /// Delete an issue or pull request comment
    DeleteIssueComment {
        /// ID of the comment to delete
        comment_id: u64,

        /// Repository ('owner/repo'); falls back to --repo
        #[arg(long = "target")]
        repo: Option<String>,

        /// Token printed by a previous call without it
        #[arg(long)]
        confirmation_token: Option<String>,
    },
}

impl Commands {
    fn confirmation_token(&self) -> Option<&str> {
        match self {
            Commands::DeleteBranch {
                confirmation_token, ..
            }
            | Commands::DeleteFiles {
                confirmation_token, ..
            }
            | Commands::DeleteRepository {
                confirmation_token, ..
            }
            | Commands::DeleteIssueComment {
                confirmation_token, ..
            } => confirmation_token.as_deref(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr) // Use stderr for logging
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("GitGuard CLI initialized");

    // Each invocation is a separate process
    cli.config
        .gate
        .validate_one_shot(cli.command.confirmation_token().is_some())?;

    let actions = cli.config.destructive_actions()?;
    let session = cli.config.session();

    let output = match cli.command {
        Commands::DeleteBranch {
            branch,
            repo,
            confirmation_token,
        } => responses::render_message(
            actions
                .delete_branch(
                    &session,
                    repo.as_deref(),
                    &branch,
                    confirmation_token.as_deref(),
                )
                .await,
        ),
        Commands::DeleteFiles {
            branch,
            file_paths,
            repo,
            confirmation_token,
        } => responses::render_file_deletions(
            actions
                .delete_files(
                    &session,
                    repo.as_deref(),
                    branch.as_deref(),
                    &file_paths,
                    confirmation_token.as_deref(),
                )
                .await,
        ),
        Commands::DeleteRepository {
            repo,
            confirmation_token,
        } => responses::render_message(
            actions
                .delete_repository(&session, repo.as_deref(), confirmation_token.as_deref())
                .await,
        ),
        Commands::DeleteIssueComment {
            comment_id,
            repo,
            confirmation_token,
        } => responses::render_message(
            actions
                .delete_issue_comment(
                    &session,
                    repo.as_deref(),
                    comment_id,
                    confirmation_token.as_deref(),
                )
                .await,
        ),
    };

    // Pretty-print when the response is valid JSON
    match serde_json::from_str::<serde_json::Value>(&output) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", output),
    }

    Ok(())
}
