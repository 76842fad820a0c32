//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Binary tree teaching client: sync with a tree service, lay out and draw snapshots
#[derive(Parser, Debug)]
#[command(name = "treeviz")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Base url of the tree service (overrides config)
    #[arg(short, long, global = true, value_hint = ValueHint::Url)]
    pub server: Option<String>,

    /// Tree kind, e.g. abb or avl (overrides config)
    #[arg(short, long, global = true)]
    pub kind: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Insert a value
    Insert {
        /// Value to insert
        #[arg(allow_negative_numbers = true)]
        value: String,
    },

    /// Delete a value
    Delete {
        /// Value to delete
        #[arg(allow_negative_numbers = true)]
        value: String,
    },

    /// Print a traversal (order names are defined by the service)
    Traverse {
        /// Traversal order, e.g. inorden, preorden, postorden, amplitud
        order: String,
    },

    /// Remove all values
    Clear,

    /// Show the current tree
    Show {
        /// Also draw the tree into this SVG file
        #[arg(long, value_hint = ValueHint::FilePath)]
        svg: Option<PathBuf>,
        /// Print the snapshot as JSON instead of an outline
        #[arg(long)]
        json: bool,
        /// Drawing width (overrides config)
        #[arg(long)]
        width: Option<u32>,
        /// Drawing height (overrides config)
        #[arg(long)]
        height: Option<u32>,
    },

    /// Show size, height and shape checks of the current tree
    Stats,

    /// Interactive session
    Shell,

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

    /// Show config paths
    Path,

    /// Create config template
    Init {
        /// Create global config instead of ./.treeviz.toml
        #[arg(short, long)]
        global: bool,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
