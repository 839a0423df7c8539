//! Command-line argument definitions using clap derive.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Operator CLI for the Stockroom parts store.
#[derive(Parser, Debug)]
#[command(name = "stockroom")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON config file; flags below override its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    pub log_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the core library is linked
    Ping,
    /// Show the SKU the next created part will receive
    NextSku,
    /// Create parts, each with a freshly allocated SKU
    CreatePart {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value_t = 0)]
        quantity: i64,
        /// Number of identical parts to create
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
    /// List parts ordered by SKU
    ListParts {
        #[arg(long)]
        include_deleted: bool,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Look up one active part by SKU
    GetPart {
        #[arg(long)]
        sku: String,
    },
}
