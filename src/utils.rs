use std::io;
use std::sync::Once;

use crossterm::{
    event::DisableMouseCapture,
    execute,
    terminal::{disable_raw_mode, LeaveAlternateScreen},
};

static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Restore the terminal after the board: raw mode off, mouse capture off,
/// main screen back, cursor visible.
///
/// Best effort. Safe to call from a signal handler or panic hook, and safe
/// to call more than once.
pub fn cleanup_terminal_crossterm() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(
        stdout,
        DisableMouseCapture,
        LeaveAlternateScreen,
        crossterm::cursor::Show
    );
}

/// Install a panic hook that restores the terminal before the default
/// handler prints the panic message.
///
/// Only installs once.
pub fn install_crossterm_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            cleanup_terminal_crossterm();
            default_hook(panic_info);
        }));
    });
}

/// Truncate a string safely by character count, not byte count.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        ".".repeat(max_chars)
    } else {
        let truncated: String = s.chars().take(max_chars - 3).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("Renovación flota", 40), "Renovación flota");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_utf8() {
        let result = truncate("Señalización Norte", 8);
        assert_eq!(result, "Señal...");
        assert_eq!(result.chars().count(), 8);
    }

    #[test]
    fn test_truncate_never_exceeds_width() {
        assert_eq!(truncate("hello", 3), "...");
        assert_eq!(truncate("hello", 1), ".");
        assert_eq!(truncate("hello", 0), "");
    }
}
