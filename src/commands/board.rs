//! `dealboard board`: the interactive pipeline board.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::pipeline::{Board, Filter};
use crate::store::DealQuery;
use crate::tui::run_board;

use super::common::open_store;

pub fn execute(
    config: &Config,
    demo: bool,
    owner: Option<String>,
    account: Option<String>,
) -> Result<()> {
    let store = open_store(config, demo)?;
    let settings = config.board_settings(DealQuery::default());
    let mut board = Board::load(store, &settings).context("Failed to load pipeline")?;

    board.state_mut().set_owner_filter(Filter::from(owner));
    board.state_mut().set_account_filter(Filter::from(account));

    run_board(board)
}
