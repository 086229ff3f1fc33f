//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// OvenCraft - visitor tracking and dashboard analytics
#[derive(Parser, Debug)]
#[command(name = "ovencraft")]
#[command(version)]
#[command(about = "Visitor tracking and dashboard analytics service", long_about = None)]
pub struct Cli {
    /// Path to config.toml (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Print the dashboard snapshot for now
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ConfigCommands {
    /// Generate a sample configuration file
    Generate {
        /// Output path (prints to stdout when omitted)
        #[arg(long, short = 'o')]
        output: Option<String>,
    },
}

impl Cli {
    /// 未指定子命令时运行服务器
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}
