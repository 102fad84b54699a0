use std::io;
use std::str::FromStr;

use anyhow::{Context, Result};
use dealboard::commands::{board, deals, stages};
use dealboard::completions::{generate_completions, Shell};
use dealboard::config::Config;
use dealboard::logging;

use super::types::{Cli, Commands, DealsCommands};

pub fn dispatch(cli: Cli) -> Result<()> {
    let Cli { config, command } = cli;

    if let Commands::Completions { shell } = &command {
        let shell = Shell::from_str(shell)?;
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate_completions(&mut cmd, shell, &mut io::stdout());
        return Ok(());
    }

    let config = Config::load(config.as_deref()).context("Failed to load configuration")?;

    match command {
        Commands::Board {
            demo,
            owner,
            account,
        } => {
            // The board owns the screen; logs go to a file instead.
            let _log_guard =
                logging::init_board(config.log.file_path().as_deref(), &config.log.level);
            board::execute(&config, demo, owner, account)
        }
        Commands::Deals { command } => {
            logging::init_stderr()?;
            match command {
                DealsCommands::List {
                    demo,
                    owner,
                    account,
                    stage,
                } => deals::list(&config, demo, owner, account, stage),
                DealsCommands::Move {
                    deal_id,
                    stage,
                    demo,
                } => deals::move_deal(&config, demo, &deal_id, &stage),
            }
        }
        Commands::Stages { demo } => {
            logging::init_stderr()?;
            stages::execute(&config, demo)
        }
        // Handled before config loading.
        Commands::Completions { .. } => Ok(()),
    }
}
