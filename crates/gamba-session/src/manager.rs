//! The session manager: owns the one active session.
//!
//! `SessionManager` is not thread-safe by itself. It lives inside the
//! engine's shared table and is only touched under that lock.

use crate::{Session, SessionError};

/// Holds at most one [`Session`].
///
/// ```text
/// start() ──→ [Active] ──→ end() ──→ [None]
///               │
///               └── start() again ──→ AlreadyActive
/// ```
#[derive(Debug, Default)]
pub struct SessionManager {
    active: Option<Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session for `player` wagering `count` × `item`.
    ///
    /// # Errors
    /// - [`SessionError::AlreadyActive`] if a session exists
    /// - [`SessionError::InvalidWager`] if the item is empty or the count zero
    pub fn start(
        &mut self,
        player: impl Into<String>,
        item: impl Into<String>,
        count: u32,
    ) -> Result<&Session, SessionError> {
        if let Some(existing) = &self.active {
            return Err(SessionError::AlreadyActive(existing.player.clone()));
        }
        let item = item.into().trim().to_lowercase();
        if item.is_empty() {
            return Err(SessionError::InvalidWager("no item".into()));
        }
        if count == 0 {
            return Err(SessionError::InvalidWager("count must be positive".into()));
        }

        let session = Session::new(player.into(), item, count);
        tracing::info!(player = %session.player, item = %session.item, count, "session started");
        Ok(self.active.insert(session))
    }

    /// Like [`start`](Self::start), with the count still as typed in chat.
    pub fn start_manual(
        &mut self,
        player: &str,
        item: &str,
        count: &str,
    ) -> Result<&Session, SessionError> {
        let count: u32 = count
            .parse()
            .map_err(|_| SessionError::InvalidWager(format!("{count:?} is not a count")))?;
        self.start(player, item, count)
    }

    /// Ends the active session and returns it.
    ///
    /// # Errors
    /// Returns [`SessionError::NoActiveSession`] if there is none.
    pub fn end(&mut self) -> Result<Session, SessionError> {
        let session = self.active.take().ok_or(SessionError::NoActiveSession)?;
        tracing::info!(player = %session.player, "session ended");
        Ok(session)
    }

    pub fn active(&self) -> Option<&Session> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_creates_session_with_defaults() {
        let mut manager = SessionManager::new();
        let session = manager.start("Bob", "Throne", 3).expect("start");
        assert_eq!(session.player, "Bob");
        assert_eq!(session.item, "throne");
        assert_eq!(session.count, 3);
        assert_eq!(session.balance, 0);
        assert!(session.awaiting_game_choice);
        assert!(!session.in_game);
    }

    #[test]
    fn test_start_while_active_returns_already_active() {
        let mut manager = SessionManager::new();
        manager.start("Bob", "throne", 3).expect("start");
        assert_eq!(
            manager.start("Eve", "sofa", 1).unwrap_err(),
            SessionError::AlreadyActive("Bob".into())
        );
        assert_eq!(manager.active().expect("still active").player, "Bob");
    }

    #[test]
    fn test_start_zero_count_is_invalid() {
        let mut manager = SessionManager::new();
        assert!(matches!(
            manager.start("Bob", "throne", 0),
            Err(SessionError::InvalidWager(_))
        ));
        assert!(!manager.is_active());
    }

    #[test]
    fn test_start_manual_parses_count() {
        let mut manager = SessionManager::new();
        assert!(matches!(
            manager.start_manual("Bob", "throne", "three"),
            Err(SessionError::InvalidWager(_))
        ));
        assert_eq!(
            manager.start_manual("Bob", "throne", "4").expect("start").count,
            4
        );
    }

    #[test]
    fn test_end_clears_and_returns_session() {
        let mut manager = SessionManager::new();
        manager.start("Bob", "throne", 2).expect("start");
        assert_eq!(manager.end().expect("end").player, "Bob");
        assert!(!manager.is_active());
        assert_eq!(manager.end(), Err(SessionError::NoActiveSession));
    }
}
