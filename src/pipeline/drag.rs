//! Pointer-drag state machine for moving deal cards between columns.
//!
//! State machine transitions:
//! - `Idle` → `Pressed` (pointer down on a card)
//! - `Pressed` → `Dragging` (pointer moved past the activation distance and
//!   the deal is still visible)
//! - `Pressed` → `Idle` (released before activation: a click)
//! - `Dragging` → `Idle` (drop or cancel, whatever the outcome)
//!
//! The controller never touches the deal list. The dragged deal is a copy
//! held only for the floating overlay.

use tracing::debug;

use crate::models::Deal;

use super::state::PipelineState;

/// Pointer travel, in logical pixels, at which a press becomes a drag.
///
/// Reaching the distance is enough, so one terminal cell sideways (8px)
/// starts a drag.
pub const DEFAULT_ACTIVATION_DISTANCE: f64 = 8.0;

/// Pointer position in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The card currently being dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDrag {
    pub deal: Deal,
    pub pointer: Point,
    /// Column under the pointer, if any.
    pub hover: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    /// Pointer is down on a card but has not travelled far enough yet.
    Pressed { deal_id: String, origin: Point },
    Dragging(ActiveDrag),
}

/// A stage change to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub deal_id: String,
    pub from_stage: String,
    pub to_stage: String,
}

/// What a drop resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Released over empty space.
    NoTarget,
    /// Dropped on the column it already belongs to.
    SameStage,
    /// The deal is no longer among the visible deals.
    Stale,
    /// A persistence request was issued.
    Dispatched(MoveRequest),
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerRelease {
    /// No gesture was in progress.
    Ignored,
    /// Released before the activation distance: open the deal.
    Click(String),
    Drop(DropOutcome),
}

/// Receives stage changes resolved from drops.
///
/// Implementations must return immediately; the gesture does not wait for
/// the write.
pub trait StageMover {
    fn move_deal(&self, request: MoveRequest);
}

/// Drag controller for a single pointer.
#[derive(Debug, Clone)]
pub struct DragController {
    phase: DragPhase,
    activation_distance: f64,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVATION_DISTANCE)
    }
}

impl DragController {
    pub fn new(activation_distance: f64) -> Self {
        Self {
            phase: DragPhase::Idle,
            activation_distance: activation_distance.max(0.0),
        }
    }

    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, DragPhase::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging(_))
    }

    pub fn active(&self) -> Option<&ActiveDrag> {
        match &self.phase {
            DragPhase::Dragging(drag) => Some(drag),
            _ => None,
        }
    }

    pub fn hovered(&self) -> Option<&str> {
        self.active().and_then(|d| d.hover.as_deref())
    }

    /// Pointer pressed on a card. Ignored while another gesture is live.
    pub fn pointer_down(&mut self, deal_id: &str, at: Point) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.phase = DragPhase::Pressed {
            deal_id: deal_id.to_string(),
            origin: at,
        };
        true
    }

    /// Pointer moved. Returns `true` when this move started a drag.
    pub fn pointer_move(
        &mut self,
        at: Point,
        hover: Option<&str>,
        state: &PipelineState,
    ) -> bool {
        match &mut self.phase {
            DragPhase::Idle => false,
            DragPhase::Dragging(drag) => {
                drag.pointer = at;
                drag.hover = hover.map(str::to_string);
                false
            }
            DragPhase::Pressed { deal_id, origin } => {
                if origin.distance_to(at) < self.activation_distance {
                    return false;
                }
                let deal_id = deal_id.clone();
                self.phase = DragPhase::Idle;
                if !self.on_drag_start(&deal_id, state) {
                    return false;
                }
                if let DragPhase::Dragging(drag) = &mut self.phase {
                    drag.pointer = at;
                    drag.hover = hover.map(str::to_string);
                }
                true
            }
        }
    }

    /// Enter `Dragging` for a visible deal. Stale ids leave the controller idle.
    pub fn on_drag_start(&mut self, deal_id: &str, state: &PipelineState) -> bool {
        if self.is_dragging() {
            return false;
        }
        match state.find_filtered(deal_id) {
            Some(deal) => {
                debug!(deal_id, stage = deal.stage_id(), "drag started");
                self.phase = DragPhase::Dragging(ActiveDrag {
                    deal: deal.clone(),
                    pointer: Point::default(),
                    hover: None,
                });
                true
            }
            None => {
                debug!(deal_id, "drag ignored: deal not visible");
                self.phase = DragPhase::Idle;
                false
            }
        }
    }

    /// Pointer released over `target` (a stage id) or over nothing.
    pub fn pointer_up(
        &mut self,
        target: Option<&str>,
        state: &PipelineState,
        mover: &dyn StageMover,
    ) -> PointerRelease {
        match std::mem::take(&mut self.phase) {
            DragPhase::Idle => PointerRelease::Ignored,
            DragPhase::Pressed { deal_id, .. } => PointerRelease::Click(deal_id),
            DragPhase::Dragging(drag) => {
                PointerRelease::Drop(self.on_drag_end(&drag.deal.id, target, state, mover))
            }
        }
    }

    /// Finish a drag. Always returns the controller to `Idle`.
    pub fn on_drag_end(
        &mut self,
        deal_id: &str,
        target: Option<&str>,
        state: &PipelineState,
        mover: &dyn StageMover,
    ) -> DropOutcome {
        self.phase = DragPhase::Idle;

        let Some(target) = target else {
            debug!(deal_id, "drop outside any column");
            return DropOutcome::NoTarget;
        };
        let Some(deal) = state.find_filtered(deal_id) else {
            debug!(deal_id, "drop ignored: deal no longer visible");
            return DropOutcome::Stale;
        };
        if deal.stage_id() == target {
            debug!(deal_id, target, "drop on current stage");
            return DropOutcome::SameStage;
        }

        let request = MoveRequest {
            deal_id: deal_id.to_string(),
            from_stage: deal.stage_id().to_string(),
            to_stage: target.to_string(),
        };
        mover.move_deal(request.clone());
        DropOutcome::Dispatched(request)
    }

    /// Abort the current gesture.
    pub fn cancel(&mut self) -> bool {
        let was_active = !self.is_idle();
        if was_active {
            debug!("drag cancelled");
        }
        self.phase = DragPhase::Idle;
        was_active
    }
}
