use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::McpServerConfig;
use crate::pipeline_config::{DEFAULT_MAX_CONTEXT_CHARS, DEFAULT_PAGE_BUDGET};

pub const DEFAULT_TOPIC: &str = "Security and Privacy in Connected and Autonomous Vehicles";

#[derive(Parser, Debug)]
#[command(name = "scholarscout")]
#[command(about = "Author/affiliation extraction and researcher discovery", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract author/affiliation records from a directory of papers
    Extract {
        /// Directory holding .pdf and .txt papers
        #[arg(long, default_value = "papers")]
        corpus: PathBuf,

        /// Output CSV file
        #[arg(short, long, default_value = "affiliations.csv")]
        output: PathBuf,

        /// Pages read from the start of each paper
        #[arg(long, default_value_t = DEFAULT_PAGE_BUDGET)]
        pages: usize,

        /// Characters of paper text sent to the model
        #[arg(long, default_value_t = DEFAULT_MAX_CONTEXT_CHARS)]
        max_chars: usize,

        /// Delay after each paper, in milliseconds
        #[arg(long = "pacing-ms", default_value_t = 2000)]
        pacing_ms: u64,

        /// Model name (defaults to SCHOLARSCOUT_MODEL, then gpt-4o-mini)
        #[arg(long)]
        model: Option<String>,
    },

    /// Discover researchers on a topic, look up their emails, save to CSV
    Scout {
        /// Research topic to search for
        #[arg(default_value = DEFAULT_TOPIC)]
        topic: String,

        /// Output CSV file
        #[arg(short, long, default_value = "candidates.csv")]
        output: PathBuf,

        /// Keep at most this many discovered candidates
        #[arg(long)]
        max_candidates: Option<usize>,

        /// Delay between contact lookups, in milliseconds
        #[arg(long = "lookup-delay-ms", default_value_t = 0)]
        lookup_delay_ms: u64,

        /// Print the state after each stage
        #[arg(long)]
        trace_stages: bool,

        #[command(flatten)]
        server: ServerArgs,
    },

    /// Verify the search server starts, lists tools and answers one call
    CheckServer {
        /// Author name used for the sample call
        #[arg(long, default_value = "Geoffrey Hinton")]
        author: String,

        #[command(flatten)]
        server: ServerArgs,
    },

    /// Run one topic search and pretty-print the raw result
    TestSearch {
        /// Search text
        #[arg(default_value = "machine learning")]
        topic: String,

        #[command(flatten)]
        server: ServerArgs,
    },
}

/// How to start the search server.
#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Project directory of the Google Scholar MCP server
    #[arg(long, env = "SCHOLARSCOUT_SERVER_DIR", default_value = "./gs_MCP")]
    pub server_dir: PathBuf,

    /// Launch this command instead of `uv --directory <server-dir> run google_scholar_server.py`
    #[arg(long)]
    pub server_command: Option<String>,

    /// Argument for --server-command (repeatable)
    #[arg(long = "server-arg", allow_hyphen_values = true)]
    pub server_args: Vec<String>,
}

impl ServerArgs {
    pub fn to_config(&self) -> McpServerConfig {
        match &self.server_command {
            Some(command) => McpServerConfig {
                name: "custom".to_string(),
                command: command.clone(),
                args: self.server_args.clone(),
                env: Vec::new(),
            },
            None => McpServerConfig::scholar_default(self.server_dir.clone()),
        }
    }
}
