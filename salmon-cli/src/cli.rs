use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "salmon")]
#[command(about = "Fetch Salmon Run results and upload them to Salmon Stats")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Salmon Stats api token, overriding the stored one
    #[arg(long, global = true, env = "SALMON_STATS_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print one result by job id
    Result {
        /// Game job id
        job_id: u64,
    },

    /// Print one page of results
    Page {
        /// 1-based page index
        page: u32,

        /// Results per page (defaults to the configured page size)
        #[arg(long)]
        count: Option<u32>,
    },

    /// Print pages `from..=to`, concatenated
    Range {
        from: u32,
        to: u32,

        /// Keep going past failed pages and report them
        #[arg(long)]
        best_effort: bool,
    },

    /// Upload one result by job id
    Upload {
        /// Game job id
        job_id: u64,
    },

    /// Upload every stored result newer than a job id
    UploadSince {
        /// Last job id already uploaded
        job_id: u64,
    },

    /// Show Salmon Stats metadata for a player
    Metadata {
        /// NSA account id
        nsaid: String,
    },

    /// Show a player's Salmon Stats profile
    Player {
        /// NSA account id
        nsaid: String,
    },

    /// Manage the Salmon Stats api token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum TokenAction {
    /// Store a new api token
    Set { token: String },
    /// Print the api token currently in use
    Show,
}
