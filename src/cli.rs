use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hotelier")]
#[command(author, version, about = "Hotel listing backend with ordered picture galleries")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    #[command(alias = "start")]
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses --config if not specified)
        config: Option<PathBuf>,
    },

    /// Compare stored picture files with picture rows
    AuditStorage {
        /// Delete files no picture row references
        #[arg(long)]
        purge_orphans: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a random API key for `auth.api_key`
    GenerateApiKey,

    /// Display version information
    Version,
}
