use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

#[derive(Debug, Clone)]
pub struct SessionOutput {
    pub session_id: SessionId,
    pub text: String,
    /// When true, the transport closes the connection after delivering this
    /// message.
    pub disconnect: bool,
}

impl SessionOutput {
    pub fn new(session_id: SessionId, text: impl Into<String>) -> Self {
        Self {
            session_id,
            text: text.into(),
            disconnect: false,
        }
    }

    /// Create a final message that will disconnect the session after delivery.
    pub fn with_disconnect(session_id: SessionId, text: impl Into<String>) -> Self {
        Self {
            session_id,
            text: text.into(),
            disconnect: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, running the login dialogue.
    Unauthenticated,
    /// Logged in to an account, not puppeting anything.
    OutOfCharacter,
    /// Logged in and running the character-creation dialogue.
    CreatingCharacter { character_id: i64 },
    Playing { character_id: i64 },
    Disconnected,
}

#[derive(Debug, Clone)]
pub struct PlayerSession {
    pub session_id: SessionId,
    pub address: String,
    pub state: SessionState,
    pub account_id: Option<i64>,
    pub account_name: Option<String>,
    pub character_name: Option<String>,
}

impl PlayerSession {
    pub fn new(session_id: SessionId, address: impl Into<String>) -> Self {
        Self {
            session_id,
            address: address.into(),
            state: SessionState::Unauthenticated,
            account_id: None,
            account_name: None,
            character_name: None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.account_id.is_some() && self.state != SessionState::Disconnected
    }

    /// Attach an authenticated account to this session.
    pub fn login(&mut self, account_id: i64, account_name: &str) {
        tracing::info!(session = self.session_id.0, account_id, account = account_name, "session logged in");
        self.account_id = Some(account_id);
        self.account_name = Some(account_name.to_string());
        self.character_name = None;
        self.state = SessionState::OutOfCharacter;
    }

    pub fn begin_creation(&mut self, character_id: i64) {
        self.state = SessionState::CreatingCharacter { character_id };
    }

    /// Start puppeting a character.
    pub fn puppet(&mut self, character_id: i64, name: &str) {
        self.character_name = Some(name.to_string());
        self.state = SessionState::Playing { character_id };
    }

    /// Return to the account level without logging out.
    pub fn unpuppet(&mut self) {
        self.character_name = None;
        if self.account_id.is_some() {
            self.state = SessionState::OutOfCharacter;
        }
    }

    /// Tear the session down. Returns the farewell message for the transport.
    pub fn disconnect(&mut self, reason: &str) -> SessionOutput {
        tracing::info!(session = self.session_id.0, reason, "session disconnected");
        self.state = SessionState::Disconnected;
        self.character_name = None;
        SessionOutput::with_disconnect(self.session_id, reason)
    }
}

/// Manages active player sessions.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: BTreeMap<SessionId, PlayerSession>,
    next_id: u64,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new session for a connection from `address`, returning its ID.
    pub fn create_session(&mut self, address: &str) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        self.sessions.insert(id, PlayerSession::new(id, address));
        id
    }

    pub fn get_session(&self, id: SessionId) -> Option<&PlayerSession> {
        self.sessions.get(&id)
    }

    pub fn get_session_mut(&mut self, id: SessionId) -> Option<&mut PlayerSession> {
        self.sessions.get_mut(&id)
    }

    /// Mark a session as disconnected.
    pub fn disconnect(&mut self, id: SessionId, reason: &str) -> Option<SessionOutput> {
        self.sessions.get_mut(&id).map(|s| s.disconnect(reason))
    }

    /// Remove a session entirely.
    pub fn remove_session(&mut self, id: SessionId) -> Option<PlayerSession> {
        self.sessions.remove(&id)
    }

    /// Count of active (non-disconnected) sessions.
    pub fn active_count(&self) -> usize {
        self.sessions
            .values()
            .filter(|s| s.state != SessionState::Disconnected)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_session_increments_id() {
        let mut mgr = SessionManager::new();
        let s1 = mgr.create_session("127.0.0.1");
        let s2 = mgr.create_session("127.0.0.1");
        assert_eq!(s1, SessionId(0));
        assert_eq!(s2, SessionId(1));
    }

    #[test]
    fn session_lifecycle() {
        let mut mgr = SessionManager::new();
        let sid = mgr.create_session("10.0.0.2");

        let session = mgr.get_session(sid).unwrap();
        assert_eq!(session.state, SessionState::Unauthenticated);
        assert!(!session.is_logged_in());

        let session = mgr.get_session_mut(sid).unwrap();
        session.login(7, "Printer");
        assert_eq!(session.state, SessionState::OutOfCharacter);
        assert!(session.is_logged_in());

        session.begin_creation(3);
        assert_eq!(session.state, SessionState::CreatingCharacter { character_id: 3 });

        session.puppet(3, "Ada Vance");
        assert_eq!(session.state, SessionState::Playing { character_id: 3 });
        assert_eq!(session.character_name.as_deref(), Some("Ada Vance"));

        session.unpuppet();
        assert_eq!(session.state, SessionState::OutOfCharacter);
        assert!(session.character_name.is_none());

        let out = mgr.disconnect(sid, "bye").unwrap();
        assert!(out.disconnect);
        assert_eq!(out.text, "bye");
        assert_eq!(mgr.get_session(sid).unwrap().state, SessionState::Disconnected);
    }

    #[test]
    fn unpuppet_without_account_stays_put() {
        let mut session = PlayerSession::new(SessionId(0), "::1");
        session.unpuppet();
        assert_eq!(session.state, SessionState::Unauthenticated);
    }

    #[test]
    fn active_count_skips_disconnected() {
        let mut mgr = SessionManager::new();
        let s1 = mgr.create_session("a");
        let s2 = mgr.create_session("b");
        mgr.get_session_mut(s1).unwrap().login(1, "one");
        assert_eq!(mgr.active_count(), 2);

        mgr.disconnect(s2, "gone");
        assert_eq!(mgr.active_count(), 1);
    }

    #[test]
    fn remove_session_returns_record() {
        let mut mgr = SessionManager::new();
        let sid = mgr.create_session("a");
        assert!(mgr.remove_session(sid).is_some());
        assert!(mgr.get_session(sid).is_none());
    }
}
