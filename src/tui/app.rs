//! TUI application state and main loop.

use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use super::event_handler::{handle_key_event, handle_mouse_event, KeyEventResult, UiState};
use super::layout::BoardLayout;
use super::renderer::render_board;
use crate::pipeline::Board;

/// Poll timeout for event loop (100ms for responsive UI).
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// TUI application state.
pub struct TuiApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    running: Arc<AtomicBool>,
    board: Board,
    ui: UiState,
    mouse_enabled: bool,
    /// Flag to prevent double cleanup in Drop.
    cleaned_up: bool,
}

impl TuiApp {
    /// Take over the terminal.
    pub fn new(board: Board) -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

        crate::utils::install_crossterm_panic_hook();

        let mouse_enabled =
            crossterm::execute!(stdout, crossterm::event::EnableMouseCapture).is_ok();

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;

        Ok(Self {
            terminal,
            running: Arc::new(AtomicBool::new(true)),
            board,
            ui: UiState::default(),
            mouse_enabled,
            cleaned_up: false,
        })
    }

    /// Run the TUI event loop until the user quits.
    pub fn run(&mut self) -> Result<()> {
        let running = self.running.clone();
        ctrlc::set_handler(move || {
            running.store(false, Ordering::SeqCst);
            // Drop may not run on process exit.
            crate::utils::cleanup_terminal_crossterm();
            std::process::exit(0);
        })
        .context("Failed to set Ctrl+C handler")?;

        let result = self.run_event_loop();
        self.cleanup_terminal();
        info!("board closed");
        result
    }

    fn run_event_loop(&mut self) -> Result<()> {
        while self.running.load(Ordering::SeqCst) {
            self.board.process_pending();
            self.board.expire_toasts(Instant::now());
            self.render()?;

            if event::poll(POLL_TIMEOUT)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        match handle_key_event(key.code, key.modifiers, &mut self.board, &mut self.ui)
                        {
                            KeyEventResult::Exit => break,
                            KeyEventResult::Continue => {}
                        }
                    }
                    Event::Mouse(mouse) => {
                        handle_mouse_event(mouse, &mut self.board, &mut self.ui);
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Cleanup terminal state (leave alternate screen, disable raw mode).
    /// Sets cleaned_up flag to prevent double cleanup in Drop.
    fn cleanup_terminal(&mut self) {
        if self.cleaned_up {
            return;
        }
        self.cleaned_up = true;

        let _ = disable_raw_mode();
        if self.mouse_enabled {
            let _ = crossterm::execute!(
                self.terminal.backend_mut(),
                crossterm::event::DisableMouseCapture
            );
        }
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }

    fn render(&mut self) -> Result<()> {
        let board = &self.board;
        let detail = self.ui.detail.as_deref();
        let mut layout = BoardLayout::default();
        self.terminal.draw(|frame| {
            layout = render_board(frame, board, detail);
        })?;
        self.ui.layout = layout;
        Ok(())
    }
}

impl Drop for TuiApp {
    fn drop(&mut self) {
        self.cleanup_terminal();
    }
}
