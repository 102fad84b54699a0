//! Event handling for TUI keyboard and mouse input.

use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::pipeline::{Board, PointerRelease};

use super::layout::{cell_to_point, BoardLayout};

/// Result of handling a key event.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyEventResult {
    /// User requested exit.
    Exit,
    /// Continue running.
    Continue,
}

/// Screen state that is not part of the board itself.
#[derive(Debug, Default)]
pub struct UiState {
    /// Deal shown in the detail popup.
    pub detail: Option<String>,
    /// Geometry of the last frame, for hit-testing.
    pub layout: BoardLayout,
}

/// Handle keyboard events.
pub fn handle_key_event(
    code: KeyCode,
    modifiers: KeyModifiers,
    board: &mut Board,
    ui: &mut UiState,
) -> KeyEventResult {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => KeyEventResult::Exit,
        KeyCode::Char('q') => KeyEventResult::Exit,

        KeyCode::Esc => {
            if board.cancel_drag() {
                KeyEventResult::Continue
            } else if ui.detail.take().is_some() {
                KeyEventResult::Continue
            } else {
                KeyEventResult::Exit
            }
        }
        KeyCode::Enter => {
            ui.detail = None;
            KeyEventResult::Continue
        }

        KeyCode::Char('o') => {
            board.state_mut().cycle_owner_filter(true);
            KeyEventResult::Continue
        }
        KeyCode::Char('O') => {
            board.state_mut().cycle_owner_filter(false);
            KeyEventResult::Continue
        }
        KeyCode::Char('a') => {
            board.state_mut().cycle_account_filter(true);
            KeyEventResult::Continue
        }
        KeyCode::Char('A') => {
            board.state_mut().cycle_account_filter(false);
            KeyEventResult::Continue
        }
        KeyCode::Char('c') => {
            if board.state().filters().is_active() {
                board.state_mut().clear_filters();
            }
            KeyEventResult::Continue
        }
        KeyCode::Char('r') => {
            board.refresh();
            KeyEventResult::Continue
        }

        _ => KeyEventResult::Continue,
    }
}

/// Handle mouse events: press/drag/release drive the drag controller.
pub fn handle_mouse_event(mouse: MouseEvent, board: &mut Board, ui: &mut UiState) {
    let (col, row) = (mouse.column, mouse.row);
    let point = cell_to_point(col, row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if ui.detail.take().is_some() {
                return;
            }
            if let Some(deal_id) = ui.layout.card_at(col, row) {
                board.pointer_down(deal_id, point);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            let hover = ui.layout.column_at(col, row);
            board.pointer_move(point, hover);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let target = ui.layout.column_at(col, row);
            if let PointerRelease::Click(deal_id) = board.pointer_up(target) {
                ui.detail = Some(deal_id);
            }
        }
        _ => {}
    }
}
