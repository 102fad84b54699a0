use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dealboard::validation::clap_id_validator;

const HELP_TEMPLATE: &str = "
   ┌┬┐┌─┐┌─┐┬  ┌┐ ┌─┐┌─┐┬─┐┌┬┐
    ││├┤ ├─┤│  ├┴┐│ │├─┤├┬┘ ││
   ─┴┘└─┘┴ ┴┴─┘└─┘└─┘┴ ┴┴└──┴┘

{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}";

#[derive(Parser)]
#[command(name = "dealboard")]
#[command(about = "Kanban pipeline board for CRM deals", long_about = None)]
#[command(version)]
#[command(help_template = HELP_TEMPLATE)]
#[command(subcommand_help_heading = "Commands")]
pub struct Cli {
    /// Path to config.toml (default: <config dir>/dealboard/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive pipeline board
    Board {
        /// Use the built-in demo pipeline instead of the backend
        #[arg(long)]
        demo: bool,

        /// Start with the owner filter set to this user ID
        #[arg(long, value_parser = clap_id_validator)]
        owner: Option<String>,

        /// Start with the account filter set to this account ID
        #[arg(long, value_parser = clap_id_validator)]
        account: Option<String>,
    },

    /// List or move deals
    Deals {
        #[command(subcommand)]
        command: DealsCommands,
    },

    /// Show the stage catalog in board order
    Stages {
        /// Use the built-in demo pipeline instead of the backend
        #[arg(long)]
        demo: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish)
        shell: String,
    },
}

#[derive(Subcommand)]
pub enum DealsCommands {
    /// Print deals grouped by stage, with counts and totals
    List {
        /// Use the built-in demo pipeline instead of the backend
        #[arg(long)]
        demo: bool,

        /// Only deals owned by this user ID
        #[arg(long, value_parser = clap_id_validator)]
        owner: Option<String>,

        /// Only deals for this account ID
        #[arg(long, value_parser = clap_id_validator)]
        account: Option<String>,

        /// Only this stage (ID or key)
        #[arg(long, value_parser = clap_id_validator)]
        stage: Option<String>,
    },

    /// Move a deal to another stage
    Move {
        /// Deal ID (alphanumeric, dash, underscore only; max 128 characters)
        #[arg(value_parser = clap_id_validator)]
        deal_id: String,

        /// Target stage ID or key
        #[arg(value_parser = clap_id_validator)]
        stage: String,

        /// Use the built-in demo pipeline instead of the backend
        #[arg(long)]
        demo: bool,
    },
}
