use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use dungeongen::LayoutType;

#[derive(Parser)]
#[command(name = "dungeongen")]
#[command(author, version, about)]
#[command(long_about = "Procedural dungeon layouts for tabletop games.\n\n\
    Describe the dungeon you want and get rooms, doors and corridors as JSON.\n\n\
    Examples:\n  \
    dungeongen generate \"a haunted castle with 8 rooms\"     Print a layout\n  \
    dungeongen generate --rooms 12 --seed 7 -o keep.json    Reproducible layout to a file\n  \
    dungeongen generate --layout-type line_graph --summary  Rooms in a row, with a summary\n  \
    dungeongen config set generation.margin 8               Change a default")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a dungeon layout
    Generate(GenerateArgs),

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Free-text description, e.g. "a deadly crypt with 6 rooms"
    pub prompt: Option<String>,

    /// Number of rooms to place (overrides the prompt)
    #[arg(long)]
    pub rooms: Option<usize>,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Room placement strategy
    #[arg(long, value_enum)]
    pub layout_type: Option<LayoutType>,

    /// Dungeon theme (overrides the prompt)
    #[arg(long)]
    pub theme: Option<String>,

    /// Dungeon atmosphere (overrides the prompt)
    #[arg(long)]
    pub atmosphere: Option<String>,

    /// Cells of margin around the rooms in the viewport
    #[arg(long, value_parser = clap::value_parser!(i32).range(0..))]
    pub margin: Option<i32>,

    /// Minimum free cells kept around every room
    #[arg(long, value_parser = clap::value_parser!(i32).range(0..))]
    pub separation: Option<i32>,

    /// JSON file with room content keyed by room id
    #[arg(long, value_name = "FILE")]
    pub content: Option<PathBuf>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Emit compact JSON
    #[arg(long)]
    pub compact: bool,

    /// Print a human-readable summary to stderr
    #[arg(long)]
    pub summary: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. generation.margin, generation.loop_ratio)
        key: String,

        /// Value to set
        value: String,
    },

    /// Print the configuration file location
    Path,
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Generate(args)) => crate::commands::generate::run(args, self.quiet),
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                crate::commands::version::run();
                Ok(())
            }
            None => {
                use clap::CommandFactory;
                let mut cmd = Self::command();
                cmd.print_help()?;
                println!();
                Ok(())
            }
        }
    }
}
