//! GitGuard MCP: confirmation-gated destructive GitHub tools
//!
//! This library provides Model Context Protocol (MCP) tools that delete
//! GitHub resources only after an explicit two-step confirmation:
//!
//! - `delete_branch`
//! - `delete_files`
//! - `delete_repository`
//! - `delete_issue_comment`
//!
//! ## Confirmation protocol
//!
//! The first call of a destructive tool never mutates anything. It returns a
//! signed confirmation token bound to the operation and its exact target,
//! plus a human-readable summary. A second call carrying the token and the
//! same parameters performs the deletion, provided the token has not expired
//! (five minutes by default). See [`confirmation`] for the token format and
//! validation rules.
//!
//! ## Authentication
//!
//! All destructive tools require a GitHub token, supplied through the
//! `GITGUARD_GITHUB_TOKEN` environment variable or `--github-token`.
//! Unauthenticated calls fail before any confirmation token is issued.
//!
//! ```bash
//! export GITGUARD_GITHUB_TOKEN=your_github_token
//! # Share the signing secret between instances that must accept each other's tokens
//! export GITGUARD_CONFIRMATION_SECRET=some_long_random_value
//! ```
//!
//! ## Usage
//!
//! - As an MCP server (HTTP/SSE mode or STDIN/STDOUT mode): `gitguard-mcp`
//! - From the command line: `gitguard-cli`
//! - Directly as a Rust library through [`services::DestructiveActions`]

pub mod config;
pub mod confirmation;
pub mod error;
pub mod github;
pub mod services;
pub mod session;
pub mod tools;
pub mod transport;
