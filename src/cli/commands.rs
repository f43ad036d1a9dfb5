//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "docchat")]
#[command(about = "Chat with your documents: upload PDFs or text files and ask questions about them")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a config file (default: ./config.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host address to bind (default: from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS for browser clients
        #[arg(long)]
        cors: bool,
    },
    /// Interactive chat over one or more documents
    Chat {
        /// PDF or text files to load
        #[arg(short, long = "file", num_args = 1.., required = true)]
        files: Vec<PathBuf>,
    },
    /// Ask a single question about one or more documents
    Ask {
        /// The question to ask
        question: String,
        /// PDF or text files to load
        #[arg(short, long = "file", num_args = 1.., required = true)]
        files: Vec<PathBuf>,
        /// Show the passages the answer was based on
        #[arg(short, long)]
        sources: bool,
    },
    /// Show current configuration
    Config,
}
