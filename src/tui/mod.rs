//! Terminal pipeline board.
//!
//! Layout:
//! - Filter bar with the active owner and account filters
//! - One column per stage in catalog order, with count and EUR total
//! - Footer with keybinds, saving indicator and the last reload error
//!
//! Cards are dragged with the mouse; a click opens the deal detail popup.

mod app;
mod event_handler;
pub mod layout;
mod renderer;
pub mod theme;

use anyhow::Result;

use crate::pipeline::Board;

pub use app::TuiApp;

/// Entry point for the interactive board.
pub fn run_board(board: Board) -> Result<()> {
    let mut app = TuiApp::new(board)?;
    app.run()
}
