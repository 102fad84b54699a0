pub mod commands;
pub mod completions;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod tui;
pub mod utils;
pub mod validation;

/// ASCII art logo for the dealboard CLI
pub const LOGO: &str = "\
   ┌┬┐┌─┐┌─┐┬  ┌┐ ┌─┐┌─┐┬─┐┌┬┐
    ││├┤ ├─┤│  ├┴┐│ │├─┤├┬┘ ││
   ─┴┘└─┘┴ ┴┴─┘└─┘└─┘┴ ┴┴└──┴┘";
