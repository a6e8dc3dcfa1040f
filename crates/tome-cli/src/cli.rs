use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tome", about = "Tome: a wiki stored as versioned files", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Working directory of the repository
    #[arg(long, global = true, default_value = ".")]
    pub repo: PathBuf,

    /// Config file (default: <repo>/.tome/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty wiki repository
    Init(InitArgs),
    /// Print a page, or list a directory
    Show(ShowArgs),
    /// List a directory
    Ls(LsArgs),
    /// Save a page from a file or stdin
    Write(WriteArgs),
    /// Show the commits that changed a path
    Log(LogArgs),
    /// Show changes to a path between two versions
    Diff(DiffArgs),
    /// Export a directory as .tar.gz
    Archive(ArchiveArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (default: --repo)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub path: String,
    /// Version id (5 to 40 hex characters)
    #[arg(short = 'r', long = "rev")]
    pub version: Option<String>,
    /// Print metadata instead of content
    #[arg(long)]
    pub meta: bool,
}

#[derive(Args)]
pub struct LsArgs {
    #[arg(default_value = "")]
    pub path: String,
    #[arg(short = 'r', long = "rev")]
    pub version: Option<String>,
}

#[derive(Args)]
pub struct WriteArgs {
    pub path: String,
    #[arg(short, long, default_value = "")]
    pub message: String,
    /// Read content from this file instead of stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(default_value = "")]
    pub path: String,
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

#[derive(Args)]
pub struct DiffArgs {
    pub path: String,
    pub from: String,
    pub to: String,
}

#[derive(Args)]
pub struct ArchiveArgs {
    #[arg(default_value = "")]
    pub path: String,
    #[arg(short = 'r', long = "rev")]
    pub version: Option<String>,
    /// Output file (default: <name>.tar.gz)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
