//! Per-event operator sessions.
//!
//! An [`EventSession`] holds what the operator is looking at but has not
//! committed yet: the running-order editor and the last heat preview of each
//! (cell, phase). Sessions live in memory only; the store never sees them.

use std::collections::HashMap;
use std::sync::Arc;
use tanda_core::reducer::Reducer;
use tanda_core::schedule::{ScheduleEditorAction, ScheduleEditorEffect, ScheduleEditorReducer, ScheduleEditorState};
use tanda_core::SmallVec;
use tanda_core::types::{EventId, LiveCompetitionId, Phase, ScheduleItem, Tanda};
use tokio::sync::{Mutex, RwLock};

/// Uncommitted state of one event
#[derive(Clone, Debug, Default)]
pub struct EventSession {
    editor: ScheduleEditorState,
    previews: HashMap<(LiveCompetitionId, Phase), Vec<Tanda>>,
}

impl EventSession {
    /// Session opened on a stored running order
    #[must_use]
    pub fn opened(schedule: Vec<ScheduleItem>) -> Self {
        Self {
            editor: ScheduleEditorState::loaded(schedule),
            previews: HashMap::new(),
        }
    }

    /// Running-order editor state
    #[must_use]
    pub const fn editor(&self) -> &ScheduleEditorState {
        &self.editor
    }

    /// Feed an action to the running-order editor
    pub fn dispatch(&mut self, action: ScheduleEditorAction) -> SmallVec<[ScheduleEditorEffect; 4]> {
        ScheduleEditorReducer::new().reduce(&mut self.editor, action, &())
    }

    /// Remember the preview shown for (cell, phase), replacing any earlier one
    pub fn remember_preview(&mut self, cell: LiveCompetitionId, phase: Phase, tandas: Vec<Tanda>) {
        self.previews.insert((cell, phase), tandas);
    }

    /// Last preview shown for (cell, phase)
    #[must_use]
    pub fn preview(&self, cell: &LiveCompetitionId, phase: Phase) -> Option<&[Tanda]> {
        self.previews
            .get(&(cell.clone(), phase))
            .map(Vec::as_slice)
    }

    /// Drop the preview for (cell, phase)
    pub fn forget_preview(&mut self, cell: &LiveCompetitionId, phase: Phase) {
        self.previews.remove(&(cell.clone(), phase));
    }

    /// Drop every held preview
    pub fn forget_previews(&mut self) {
        self.previews.clear();
    }

    /// Number of held previews
    #[must_use]
    pub fn preview_count(&self) -> usize {
        self.previews.len()
    }
}

/// Sessions keyed by event.
///
/// Each session sits behind its own mutex so a slow save on one event does
/// not hold up another.
#[derive(Debug, Default)]
pub struct SessionMap {
    sessions: RwLock<HashMap<EventId, Arc<Mutex<EventSession>>>>,
}

impl SessionMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The open session of `event_id`, if any
    pub async fn get(&self, event_id: &EventId) -> Option<Arc<Mutex<EventSession>>> {
        self.sessions.read().await.get(event_id).cloned()
    }

    /// The session of `event_id`, inserting `session` if none is open
    pub async fn get_or_insert(&self, event_id: EventId, session: EventSession) -> Arc<Mutex<EventSession>> {
        Arc::clone(
            self.sessions
                .write()
                .await
                .entry(event_id)
                .or_insert_with(|| Arc::new(Mutex::new(session))),
        )
    }

    /// Close the session of `event_id`
    pub async fn close(&self, event_id: &EventId) {
        self.sessions.write().await.remove(event_id);
    }

    /// Number of open sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no session is open
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn previews_are_kept_per_cell_and_phase() {
        let cell = LiveCompetitionId::from_key("Seriado_Adulto_Mixto");
        let mut session = EventSession::default();

        session.remember_preview(cell.clone(), Phase::Final, Vec::new());
        assert!(session.preview(&cell, Phase::Final).is_some());
        assert!(session.preview(&cell, Phase::Semifinal).is_none());

        session.forget_preview(&cell, Phase::Final);
        assert!(session.preview(&cell, Phase::Final).is_none());
    }

    #[test]
    fn forget_previews_drops_every_cell() {
        let adulto = LiveCompetitionId::from_key("Seriado_Adulto_Mixto");
        let baby = LiveCompetitionId::from_key("Seriado_Baby_Mixto");
        let mut session = EventSession::opened(Vec::new());
        session.remember_preview(adulto, Phase::Final, Vec::new());
        session.remember_preview(baby, Phase::Semifinal, Vec::new());
        assert_eq!(session.preview_count(), 2);

        session.forget_previews();

        assert_eq!(session.preview_count(), 0);
    }

    #[test]
    fn dispatch_runs_the_editor() {
        let mut session = EventSession::opened(Vec::new());
        let effects = session.dispatch(ScheduleEditorAction::Save);
        assert!(effects.is_empty());
        assert!(!session.editor().dirty);
    }

    #[tokio::test]
    async fn get_or_insert_keeps_first_session() {
        let sessions = SessionMap::new();
        let event_id = EventId::new();
        let cell = LiveCompetitionId::from_key("Seriado_Adulto_Mixto");

        let first = sessions.get_or_insert(event_id, EventSession::default()).await;
        first.lock().await.remember_preview(cell.clone(), Phase::Final, Vec::new());
        let second = sessions.get_or_insert(event_id, EventSession::default()).await;

        assert!(second.lock().await.preview(&cell, Phase::Final).is_some());
        assert_eq!(sessions.len().await, 1);

        sessions.close(&event_id).await;
        assert!(sessions.is_empty().await);
    }
}
