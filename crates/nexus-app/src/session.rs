// In-memory registry of open draft sessions.

use std::collections::HashMap;

use nexus_draft::DraftState;

/// One open draft.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub state: DraftState,
    /// Actions accepted since the session was created; the next action is
    /// stored under this sequence number.
    pub recorded: usize,
}

impl Session {
    pub fn new(state: DraftState) -> Self {
        Session { state, recorded: 0 }
    }
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, session_id: impl Into<String>, session: Session) {
        self.sessions.insert(session_id.into(), session);
    }

    pub fn get(&self, session_id: &str) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    /// Swap in the state produced by an accepted action.
    pub fn advance(&mut self, session_id: &str, next: DraftState) -> bool {
        match self.sessions.get_mut(session_id) {
            Some(session) => {
                session.state = next;
                session.recorded += 1;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, session_id: &str) -> Option<Session> {
        self.sessions.remove(session_id)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Open session ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.keys().cloned().collect();
        ids.sort();
        ids
    }
}
