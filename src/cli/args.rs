//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

use crate::application::format::FormatKind;
use crate::domain::{MovePosition, NodePath};

/// Outline trees: navigate, edit and restructure outline documents
#[derive(Parser, Debug)]
#[command(name = "outliner")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file layered over the global config
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Document format (default: from file extension, then config)
    #[arg(long, global = true)]
    pub format: Option<FormatKind>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where an edited document goes.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Write the result to this file instead of stdout
    #[arg(short, long, value_hint = ValueHint::FilePath, conflicts_with = "in_place")]
    pub output: Option<PathBuf>,

    /// Overwrite the input file
    #[arg(short, long)]
    pub in_place: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the outline as a tree with node paths
    Show {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// List every node path in document order
    Paths {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print the path following PATH in document order
    Next {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        path: NodePath,
    },

    /// Print the path preceding PATH in document order
    Prev {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        path: NodePath,
    },

    /// Set a node attribute (title or collapsed)
    Set {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        path: NodePath,
        key: String,
        value: String,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Insert a new leaf node
    Insert {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Position among the siblings
        index: usize,
        title: String,
        /// Parent node (default: insert among the roots)
        #[arg(short, long)]
        parent: Option<NodePath>,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Delete a node and its subtree
    Delete {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        path: NodePath,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Move a subtree relative to a target node
    Move {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        source: NodePath,
        target: NodePath,
        /// adopt, adopt-last, before or after
        position: MovePosition,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Classify a pointer position over a drop target
    Classify {
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
        #[arg(long, allow_negative_numbers = true)]
        left: f64,
        #[arg(long, allow_negative_numbers = true)]
        top: f64,
        #[arg(long, allow_negative_numbers = true)]
        width: f64,
        #[arg(long, allow_negative_numbers = true)]
        height: f64,
        /// Adoption zone width (default: from config)
        #[arg(long)]
        zone_width: Option<f64>,
    },

    /// Check whether SOURCE may be dropped onto TARGET
    CheckMove { source: NodePath, target: NodePath },

    /// Convert a document between formats
    Convert {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        #[arg(value_hint = ValueHint::FilePath)]
        output: PathBuf,
        /// Input format (default: from extension)
        #[arg(long)]
        from: Option<FormatKind>,
        /// Output format (default: from extension)
        #[arg(long)]
        to: Option<FormatKind>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create global config template
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
