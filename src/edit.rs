use crate::cell::{CellCoord, CellStore};

/// One in-progress edit. The store already holds the live buffer, so the pre-edit text is
/// snapshotted here for cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    coord: CellCoord,
    buffer: String,
    original: Option<String>,
    touched: bool,
}

impl EditSession {
    pub fn coord(&self) -> CellCoord {
        self.coord
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Text written; carries the committed value.
    Written { coord: CellCoord, text: String },
    /// Buffer was blank, text removed.
    Cleared { coord: CellCoord },
    /// Session ended without a keystroke; store left as it was.
    Untouched { coord: CellCoord },
}

impl CommitOutcome {
    pub fn coord(&self) -> CellCoord {
        match self {
            CommitOutcome::Written { coord, .. }
            | CommitOutcome::Cleared { coord }
            | CommitOutcome::Untouched { coord } => *coord,
        }
    }
}

/// Idle / Editing state machine. At most one session exists.
#[derive(Debug, Clone, Default)]
pub enum EditState {
    #[default]
    Idle,
    Editing(EditSession),
}

impl EditState {
    pub fn is_editing(&self) -> bool {
        matches!(self, EditState::Editing(_))
    }

    pub fn session(&self) -> Option<&EditSession> {
        match self {
            EditState::Editing(session) => Some(session),
            EditState::Idle => None,
        }
    }

    pub fn editing_coord(&self) -> Option<CellCoord> {
        self.session().map(|s| s.coord)
    }

    /// Starts a session on `coord`. A non-empty seed is written to the store immediately. Any
    /// session already running is committed first and its outcome returned.
    pub fn begin(&mut self, store: &mut CellStore, coord: CellCoord, seed: &str) -> Option<CommitOutcome> {
        let previous = self.commit(store);
        let original = store.get(coord).text.clone();
        let touched = !seed.is_empty();
        if touched {
            store.set_text(coord, seed);
        }
        *self = EditState::Editing(EditSession { coord, buffer: seed.to_string(), original, touched });
        previous
    }

    /// Appends typed text and mirrors the buffer into the store (live preview).
    pub fn append(&mut self, store: &mut CellStore, text: &str) -> bool {
        match self {
            EditState::Editing(session) => {
                session.buffer.push_str(text);
                session.touched = true;
                store.set_text(session.coord, session.buffer.clone());
                true
            }
            EditState::Idle => false,
        }
    }

    pub fn commit(&mut self, store: &mut CellStore) -> Option<CommitOutcome> {
        let EditState::Editing(session) = std::mem::take(self) else {
            return None;
        };
        let coord = session.coord;
        if !session.touched {
            return Some(CommitOutcome::Untouched { coord });
        }
        if session.buffer.trim().is_empty() {
            store.clear(coord);
            return Some(CommitOutcome::Cleared { coord });
        }
        store.set_text(coord, session.buffer.clone());
        Some(CommitOutcome::Written { coord, text: session.buffer })
    }

    /// Restores the snapshotted pre-session text and returns to Idle.
    pub fn cancel(&mut self, store: &mut CellStore) -> Option<CellCoord> {
        let EditState::Editing(session) = std::mem::take(self) else {
            return None;
        };
        match session.original {
            Some(text) => store.set_text(session.coord, text),
            None => store.clear(session.coord),
        }
        Some(session.coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_is_visible_before_commit() {
        let mut store = CellStore::new();
        let mut edit = EditState::default();
        edit.begin(&mut store, CellCoord::ORIGIN, "4");
        edit.append(&mut store, "2");
        assert_eq!(store.text(CellCoord::ORIGIN), "42");
        let outcome = edit.commit(&mut store);
        assert_eq!(outcome, Some(CommitOutcome::Written { coord: CellCoord::ORIGIN, text: "42".into() }));
        assert!(!edit.is_editing());
    }

    #[test]
    fn cancel_restores_the_snapshot() {
        let mut store = CellStore::new();
        store.set_text(CellCoord::ORIGIN, "A1");
        let mut edit = EditState::default();
        edit.begin(&mut store, CellCoord::ORIGIN, "A1");
        edit.append(&mut store, "BC");
        assert_eq!(edit.session().map(|s| s.buffer()), Some("A1BC"));
        assert_eq!(store.text(CellCoord::ORIGIN), "A1BC");
        assert_eq!(edit.cancel(&mut store), Some(CellCoord::ORIGIN));
        assert_eq!(store.text(CellCoord::ORIGIN), "A1");
    }

    #[test]
    fn cancel_of_a_new_cell_leaves_it_empty() {
        let mut store = CellStore::new();
        let mut edit = EditState::default();
        edit.begin(&mut store, CellCoord::new(2, 0, 0), "x");
        edit.cancel(&mut store);
        assert_eq!(store.get(CellCoord::new(2, 0, 0)).text, None);
    }

    #[test]
    fn blank_commit_clears_text() {
        let mut store = CellStore::new();
        store.set_text(CellCoord::ORIGIN, "old");
        let mut edit = EditState::default();
        edit.begin(&mut store, CellCoord::ORIGIN, " ");
        edit.append(&mut store, "  ");
        assert_eq!(edit.commit(&mut store), Some(CommitOutcome::Cleared { coord: CellCoord::ORIGIN }));
        assert_eq!(store.get(CellCoord::ORIGIN).text, None);
    }

    #[test]
    fn untouched_session_keeps_existing_text() {
        let mut store = CellStore::new();
        store.set_text(CellCoord::ORIGIN, "keep");
        let mut edit = EditState::default();
        edit.begin(&mut store, CellCoord::ORIGIN, "");
        assert_eq!(edit.commit(&mut store), Some(CommitOutcome::Untouched { coord: CellCoord::ORIGIN }));
        assert_eq!(store.text(CellCoord::ORIGIN), "keep");
    }

    #[test]
    fn begin_commits_a_running_session() {
        let mut store = CellStore::new();
        let mut edit = EditState::default();
        edit.begin(&mut store, CellCoord::ORIGIN, "1");
        let previous = edit.begin(&mut store, CellCoord::new(0, 1, 0), "2");
        assert_eq!(previous.map(|o| o.coord()), Some(CellCoord::ORIGIN));
        assert_eq!(edit.editing_coord(), Some(CellCoord::new(0, 1, 0)));
    }
}
