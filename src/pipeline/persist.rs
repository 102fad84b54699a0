//! Stage writes and snapshot reconciliation.
//!
//! A move is persisted first and then reconciled by re-fetching the whole
//! snapshot; the local deal list is never patched. Each request runs on its
//! own worker thread and reports back through a channel, so a drop returns
//! immediately. Refreshes are applied in arrival order: when two moves are
//! in flight, whichever refresh lands last wins.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{mpsc, Arc};
use std::thread;

use tracing::{info, warn};

use crate::error::BoardError;
use crate::models::BoardSnapshot;
use crate::store::{fetch_snapshot, DealQuery, DealStore};

use super::drag::{MoveRequest, StageMover};

/// Why a snapshot was re-fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshCause {
    AfterMove,
    Manual,
}

/// Messages from persistence workers to the board.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    MoveSucceeded(MoveRequest),
    MoveFailed {
        request: MoveRequest,
        reason: String,
    },
    Refreshed {
        cause: RefreshCause,
        snapshot: BoardSnapshot,
    },
    RefreshFailed {
        cause: RefreshCause,
        reason: String,
    },
}

/// Persist one move and reconcile, synchronously.
///
/// Emits `MoveSucceeded` then `Refreshed`/`RefreshFailed` on success, or a
/// single `MoveFailed`. No retry.
pub fn persist_move(
    store: &dyn DealStore,
    query: &DealQuery,
    request: &MoveRequest,
    mut emit: impl FnMut(BoardEvent),
) -> Result<(), BoardError> {
    match store.update_deal_stage(&request.deal_id, &request.to_stage) {
        Ok(confirmed) => {
            info!(
                deal_id = %confirmed.deal_id,
                from = %request.from_stage,
                to = %confirmed.stage_id,
                "deal stage updated"
            );
            emit(BoardEvent::MoveSucceeded(request.clone()));
            emit(refresh_event(store, query, RefreshCause::AfterMove));
            Ok(())
        }
        Err(source) => {
            warn!(deal_id = %request.deal_id, to = %request.to_stage, error = %source, "stage update failed");
            let err = BoardError::PersistenceFailed {
                deal_id: request.deal_id.clone(),
                stage_id: request.to_stage.clone(),
                source,
            };
            emit(BoardEvent::MoveFailed {
                request: request.clone(),
                reason: err.to_string(),
            });
            Err(err)
        }
    }
}

fn refresh_event(store: &dyn DealStore, query: &DealQuery, cause: RefreshCause) -> BoardEvent {
    match fetch_snapshot(store, query) {
        Ok(snapshot) => BoardEvent::Refreshed { cause, snapshot },
        Err(source) => {
            let err = BoardError::FetchFailed { source };
            warn!(?cause, error = %err, "snapshot refresh failed");
            BoardEvent::RefreshFailed {
                cause,
                reason: err.to_string(),
            }
        }
    }
}

/// Runs moves and refreshes in the background.
pub struct StageTransitionPersister {
    store: Arc<dyn DealStore>,
    query: DealQuery,
    events: Sender<BoardEvent>,
}

impl StageTransitionPersister {
    /// Create a persister and the receiver its workers report to.
    pub fn new(store: Arc<dyn DealStore>, query: DealQuery) -> (Self, Receiver<BoardEvent>) {
        let (events, rx) = mpsc::channel();
        (
            Self {
                store,
                query,
                events,
            },
            rx,
        )
    }

    /// Re-fetch the snapshot without a preceding write.
    pub fn refresh(&self) {
        let store = Arc::clone(&self.store);
        let query = self.query.clone();
        let events = self.events.clone();
        thread::spawn(move || {
            // The board may be gone by the time the fetch completes.
            let _ = events.send(refresh_event(store.as_ref(), &query, RefreshCause::Manual));
        });
    }
}

impl StageMover for StageTransitionPersister {
    fn move_deal(&self, request: MoveRequest) {
        let store = Arc::clone(&self.store);
        let query = self.query.clone();
        let events = self.events.clone();
        thread::spawn(move || {
            let _ = persist_move(store.as_ref(), &query, &request, |event| {
                let _ = events.send(event);
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::{Deal, Stage, StageRef};
    use crate::store::InMemoryStore;

    fn store() -> InMemoryStore {
        InMemoryStore::new(
            vec![
                Stage::new("s1", "lead", "Lead").with_sort(1),
                Stage::new("s2", "won", "Won").with_sort(2),
            ],
            vec![Deal::new("d1", "First", StageRef::new("s1", "lead", "Lead"))],
        )
    }

    fn request() -> MoveRequest {
        MoveRequest {
            deal_id: "d1".to_string(),
            from_stage: "s1".to_string(),
            to_stage: "s2".to_string(),
        }
    }

    #[test]
    fn test_persist_move_success_emits_success_then_refresh() {
        let store = store();
        let mut events = Vec::new();
        persist_move(&store, &DealQuery::default(), &request(), |e| events.push(e))
            .expect("move succeeds");

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], BoardEvent::MoveSucceeded(request()));
        match &events[1] {
            BoardEvent::Refreshed { cause, snapshot } => {
                assert_eq!(*cause, RefreshCause::AfterMove);
                assert_eq!(snapshot.deal("d1").map(Deal::stage_id), Some("s2"));
            }
            other => panic!("expected refresh, got {other:?}"),
        }
        assert_eq!(store.update_calls(), 1);
    }

    #[test]
    fn test_persist_move_failure_emits_single_failure() {
        let store = store();
        store.set_fail_updates(true);
        let mut events = Vec::new();
        let result = persist_move(&store, &DealQuery::default(), &request(), |e| events.push(e));

        assert!(matches!(result, Err(BoardError::PersistenceFailed { .. })));
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], BoardEvent::MoveFailed { .. }));
        assert_eq!(store.fetch_calls(), 0);
    }

    #[test]
    fn test_refresh_failure_after_successful_move() {
        let store = store();
        store.set_fail_fetches(true);
        let mut events = Vec::new();
        persist_move(&store, &DealQuery::default(), &request(), |e| events.push(e))
            .expect("write itself succeeds");

        assert_eq!(events[0], BoardEvent::MoveSucceeded(request()));
        assert!(matches!(
            events[1],
            BoardEvent::RefreshFailed {
                cause: RefreshCause::AfterMove,
                ..
            }
        ));
    }

    #[test]
    fn test_background_move_reports_through_channel() {
        let store: Arc<dyn DealStore> = Arc::new(store());
        let (persister, rx) = StageTransitionPersister::new(store, DealQuery::default());

        persister.move_deal(request());

        let first = rx.recv_timeout(Duration::from_secs(5)).expect("success event");
        assert_eq!(first, BoardEvent::MoveSucceeded(request()));
        let second = rx.recv_timeout(Duration::from_secs(5)).expect("refresh event");
        assert!(matches!(second, BoardEvent::Refreshed { .. }));
    }

    #[test]
    fn test_manual_refresh() {
        let store: Arc<dyn DealStore> = Arc::new(store());
        let (persister, rx) = StageTransitionPersister::new(store, DealQuery::default());
        persister.refresh();
        let event = rx.recv_timeout(Duration::from_secs(5)).expect("refresh event");
        assert!(matches!(
            event,
            BoardEvent::Refreshed {
                cause: RefreshCause::Manual,
                ..
            }
        ));
    }
}
