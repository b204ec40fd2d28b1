//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use docagram_domain::Direction;
use std::path::PathBuf;

/// Docagram - Extract entity relationships from page text and draw them.
#[derive(Debug, Parser)]
#[command(name = "docagram")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DOCAGRAM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Session file (defaults to ~/.docagram/session.json)
    #[arg(short, long, global = true, env = "DOCAGRAM_SESSION")]
    pub session: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (one item per line)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze page text into a fresh session
    Analyze(AnalyzeArgs),

    /// List entities in the session
    Entities(EntitiesArgs),

    /// Show relationships, optionally for one entity
    Relationships,

    /// Focus the session on one entity
    Select(SelectArgs),

    /// Delete an entity and its relationships
    Delete(DeleteArgs),

    /// Print a Mermaid diagram of the session
    Diagram(DiagramArgs),

    /// Summarize text with the model
    Summarize(InputArgs),

    /// Write the session to an export file
    Export(FileArgs),

    /// Replace the session with an export file
    Import(FileArgs),

    /// Clear the session
    Reset,

    /// Show or change analysis options
    Options(OptionsArgs),

    /// Enter interactive REPL mode
    Repl,
}

/// Text input from a file or stdin.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Text file to read (reads stdin when omitted or `-`)
    pub file: Option<PathBuf>,
}

/// Arguments for the analyze command.
#[derive(Debug, Clone, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Source URL recorded on every relationship
    #[arg(short, long)]
    pub url: Option<String>,

    /// Summarize long text before analyzing it
    #[arg(long)]
    pub summarize: bool,

    /// Analyze each chunk separately and merge the sections
    #[arg(long, conflicts_with = "summarize")]
    pub sections: bool,

    /// Also write the resulting session to this file
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Print the Mermaid diagram after the run
    #[arg(long)]
    pub diagram: bool,
}

/// Arguments for the entities command.
#[derive(Debug, Clone, Args)]
pub struct EntitiesArgs {
    /// Minimum count (defaults to the minimumEntityCount option)
    #[arg(short, long)]
    pub min: Option<usize>,
}

/// Arguments for the select command.
#[derive(Debug, Clone, Args)]
pub struct SelectArgs {
    /// Entity name; `all` clears the selection
    pub entity: String,
}

/// Arguments for the delete command.
#[derive(Debug, Clone, Args)]
pub struct DeleteArgs {
    /// Entity name
    pub entity: String,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the diagram command.
#[derive(Debug, Clone, Args)]
pub struct DiagramArgs {
    /// Layout direction (LR, RL, TD, BT)
    #[arg(short, long, default_value = "LR")]
    pub direction: Direction,

    /// Draw only this entity's relationships (defaults to the selection)
    #[arg(short, long)]
    pub entity: Option<String>,
}

/// A session export file.
#[derive(Debug, Clone, Args)]
pub struct FileArgs {
    /// Path of the export JSON file
    pub file: PathBuf,
}

/// Arguments for the options command.
#[derive(Debug, Clone, Args)]
pub struct OptionsArgs {
    #[command(subcommand)]
    pub action: Option<OptionsAction>,
}

/// Option management actions.
#[derive(Debug, Clone, Subcommand)]
pub enum OptionsAction {
    /// Show current options
    Show,

    /// Set one option
    Set {
        /// Option name (temperature, topK, minimumEntityCount, chunkSize, systemPrompt)
        key: String,
        /// New value
        value: String,
    },

    /// Restore default options
    Reset,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
