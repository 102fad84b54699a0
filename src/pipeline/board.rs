//! The pipeline board: view state, drag gestures and persistence wired together.

use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::BoardError;
use crate::models::BoardData;
use crate::store::{fetch_board_data, DealQuery, DealStore};

use super::drag::{DragController, DropOutcome, Point, PointerRelease, DEFAULT_ACTIVATION_DISTANCE};
use super::notify::{Toasts, DEFAULT_TOAST_TTL};
use super::persist::{BoardEvent, RefreshCause, StageTransitionPersister};
use super::state::PipelineState;

pub const MOVE_SUCCESS_TITLE: &str = "Stage updated";
pub const MOVE_SUCCESS_DESCRIPTION: &str = "The deal was moved successfully";
pub const MOVE_FAILURE_TITLE: &str = "Error";
pub const MOVE_FAILURE_DESCRIPTION: &str = "An error occurred while updating the stage";
pub const RELOAD_FAILURE_TITLE: &str = "Reload failed";

#[derive(Debug, Clone)]
pub struct BoardSettings {
    pub activation_distance: f64,
    pub toast_ttl: Duration,
    pub query: DealQuery,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            activation_distance: DEFAULT_ACTIVATION_DISTANCE,
            toast_ttl: DEFAULT_TOAST_TTL,
            query: DealQuery::default(),
        }
    }
}

pub struct Board {
    state: PipelineState,
    drag: DragController,
    toasts: Toasts,
    persister: StageTransitionPersister,
    events: Receiver<BoardEvent>,
    in_flight: usize,
    last_refresh_error: Option<String>,
}

impl Board {
    /// Initial page load. A failure here is a page-level error.
    pub fn load(store: Arc<dyn DealStore>, settings: &BoardSettings) -> Result<Self, BoardError> {
        let data = fetch_board_data(store.as_ref(), &settings.query)
            .map_err(|source| BoardError::FetchFailed { source })?;
        info!(
            stages = data.snapshot.stages.len(),
            deals = data.snapshot.deals.len(),
            "board loaded"
        );
        Ok(Self::from_data(store, data, settings))
    }

    pub fn from_data(store: Arc<dyn DealStore>, data: BoardData, settings: &BoardSettings) -> Self {
        let (persister, events) = StageTransitionPersister::new(store, settings.query.clone());
        Self {
            state: PipelineState::new(data),
            drag: DragController::new(settings.activation_distance),
            toasts: Toasts::new(settings.toast_ttl),
            persister,
            events,
            in_flight: 0,
            last_refresh_error: None,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Filters are the only state the user edits directly.
    pub fn state_mut(&mut self) -> &mut PipelineState {
        &mut self.state
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn expire_toasts(&mut self, now: Instant) {
        self.toasts.expire(now);
    }

    /// Moves whose write/reconcile cycle has not finished.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn last_refresh_error(&self) -> Option<&str> {
        self.last_refresh_error.as_deref()
    }

    pub fn pointer_down(&mut self, deal_id: &str, at: Point) -> bool {
        self.drag.pointer_down(deal_id, at)
    }

    pub fn pointer_move(&mut self, at: Point, hover: Option<&str>) -> bool {
        self.drag.pointer_move(at, hover, &self.state)
    }

    pub fn pointer_up(&mut self, target: Option<&str>) -> PointerRelease {
        let release = self.drag.pointer_up(target, &self.state, &self.persister);
        if let PointerRelease::Drop(outcome) = &release {
            self.track(outcome);
        }
        release
    }

    /// Run a full pick-up/drop without pointer travel.
    pub fn drop_on(&mut self, deal_id: &str, target: Option<&str>) -> DropOutcome {
        if !self.drag.on_drag_start(deal_id, &self.state) {
            return DropOutcome::Stale;
        }
        let outcome = self
            .drag
            .on_drag_end(deal_id, target, &self.state, &self.persister);
        self.track(&outcome);
        outcome
    }

    pub fn cancel_drag(&mut self) -> bool {
        self.drag.cancel()
    }

    fn track(&mut self, outcome: &DropOutcome) {
        match outcome {
            DropOutcome::Dispatched(request) => {
                self.in_flight += 1;
                info!(
                    deal_id = %request.deal_id,
                    from = %request.from_stage,
                    to = %request.to_stage,
                    "move dispatched"
                );
            }
            other => debug!(?other, "drop resolved without a write"),
        }
    }

    /// Manual reload.
    pub fn refresh(&self) {
        self.persister.refresh();
    }

    /// Fold one worker event into the board.
    pub fn apply(&mut self, event: BoardEvent) {
        match event {
            BoardEvent::MoveSucceeded(_) => {
                self.toasts
                    .success(MOVE_SUCCESS_TITLE, MOVE_SUCCESS_DESCRIPTION);
            }
            BoardEvent::MoveFailed { .. } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.toasts.error(MOVE_FAILURE_TITLE, MOVE_FAILURE_DESCRIPTION);
            }
            BoardEvent::Refreshed { cause, snapshot } => {
                if cause == RefreshCause::AfterMove {
                    self.in_flight = self.in_flight.saturating_sub(1);
                }
                debug!(?cause, deals = snapshot.deals.len(), "snapshot replaced");
                self.state.replace_snapshot(snapshot);
                self.last_refresh_error = None;
            }
            BoardEvent::RefreshFailed { cause, reason } => {
                match cause {
                    RefreshCause::AfterMove => {
                        self.in_flight = self.in_flight.saturating_sub(1);
                    }
                    RefreshCause::Manual => {
                        self.toasts.error(RELOAD_FAILURE_TITLE, &reason);
                    }
                }
                self.last_refresh_error = Some(reason);
            }
        }
    }

    /// Apply every event already waiting, without blocking.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.apply(event);
                    applied += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// Block up to `timeout` for one event. Returns `false` on timeout.
    pub fn process_next(&mut self, timeout: Duration) -> bool {
        match self.events.recv_timeout(timeout) {
            Ok(event) => {
                self.apply(event);
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Block until every dispatched move has finished reconciling.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !self.process_next(remaining) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Deal, Stage, StageRef};
    use crate::pipeline::notify::ToastKind;
    use crate::store::InMemoryStore;

    const WAIT: Duration = Duration::from_secs(5);

    fn board(store: Arc<InMemoryStore>) -> Board {
        Board::load(store, &BoardSettings::default()).expect("board loads")
    }

    fn store() -> Arc<InMemoryStore> {
        Arc::new(InMemoryStore::new(
            vec![
                Stage::new("s1", "lead", "Lead").with_sort(1),
                Stage::new("s2", "won", "Won").with_sort(2),
            ],
            vec![
                Deal::new("d1", "First", StageRef::new("s1", "lead", "Lead")),
                Deal::new("d2", "Second", StageRef::new("s1", "lead", "Lead")),
            ],
        ))
    }

    #[test]
    fn test_load_failure_is_fetch_failed() {
        let store = store();
        store.set_fail_fetches(true);
        let result = Board::load(store, &BoardSettings::default());
        assert!(matches!(result, Err(BoardError::FetchFailed { .. })));
    }

    #[test]
    fn test_successful_move_toasts_and_reconciles() {
        let store = store();
        let mut board = board(Arc::clone(&store));

        let outcome = board.drop_on("d1", Some("s2"));
        assert!(matches!(outcome, DropOutcome::Dispatched(_)));
        assert_eq!(board.in_flight(), 1);

        assert!(board.settle(WAIT));
        assert_eq!(board.in_flight(), 0);
        assert_eq!(board.state().group_by_stage().deal_ids("s2"), vec!["d1"]);
        assert_eq!(
            board.toasts().latest().map(|t| t.kind),
            Some(ToastKind::Success)
        );
    }

    #[test]
    fn test_failed_move_leaves_state_untouched() {
        let store = store();
        store.set_fail_updates(true);
        let mut board = board(Arc::clone(&store));
        let before = board.state().group_by_stage();

        board.drop_on("d1", Some("s2"));
        assert!(board.settle(WAIT));

        assert_eq!(board.state().group_by_stage(), before);
        let toast = board.toasts().latest().expect("failure toast");
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.description, MOVE_FAILURE_DESCRIPTION);
    }

    #[test]
    fn test_failed_refresh_after_move_keeps_stale_view() {
        let store = store();
        let mut board = board(Arc::clone(&store));
        store.set_fail_fetches(true);
        let before = board.state().group_by_stage();

        board.drop_on("d1", Some("s2"));
        assert!(board.settle(WAIT));

        assert_eq!(board.state().group_by_stage(), before);
        assert!(board.last_refresh_error().is_some());
        assert_eq!(store.stage_of("d1").as_deref(), Some("s2"));

        store.set_fail_fetches(false);
        board.refresh();
        assert!(board.process_next(WAIT));
        assert!(board.last_refresh_error().is_none());
        assert_eq!(board.state().group_by_stage().deal_ids("s2"), vec!["d1"]);
    }

    #[test]
    fn test_manual_refresh_failure_raises_toast() {
        let store = store();
        let mut board = board(Arc::clone(&store));
        store.set_fail_fetches(true);

        board.refresh();
        assert!(board.process_next(WAIT));
        assert_eq!(
            board.toasts().latest().map(|t| t.title.as_str()),
            Some(RELOAD_FAILURE_TITLE)
        );
    }

    #[test]
    fn test_pointer_gesture_end_to_end() {
        let store = store();
        let mut board = board(Arc::clone(&store));

        assert!(board.pointer_down("d2", Point::new(0.0, 0.0)));
        assert!(board.pointer_move(Point::new(16.0, 0.0), Some("s1")));
        board.pointer_move(Point::new(300.0, 0.0), Some("s2"));
        let release = board.pointer_up(Some("s2"));

        assert!(matches!(release, PointerRelease::Drop(DropOutcome::Dispatched(_))));
        assert!(board.drag().is_idle());
        assert!(board.settle(WAIT));
        assert_eq!(store.update_calls(), 1);
        assert_eq!(board.state().group_by_stage().deal_ids("s1"), vec!["d1"]);
    }
}
