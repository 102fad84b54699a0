//! Deal pipeline board core.
//!
//! Headless: nothing here knows about terminals or rendering. A renderer
//! feeds pointer events into [`Board`] and draws [`PipelineState::group_by_stage`].

pub mod board;
pub mod drag;
pub mod filter;
pub mod notify;
pub mod persist;
pub mod state;

pub use board::{Board, BoardSettings};
pub use drag::{DragController, DropOutcome, MoveRequest, Point, PointerRelease, StageMover};
pub use filter::Filter;
pub use notify::{Toast, ToastKind, Toasts};
pub use persist::{BoardEvent, RefreshCause, StageTransitionPersister};
pub use state::{Filters, Grouping, PipelineState, StageColumn};
