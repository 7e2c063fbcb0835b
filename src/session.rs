//! In-memory cookie sessions.
//!
//! A session carries the logged-in username, the chosen language and flash
//! values: one-shot state set before a redirect and consumed by the next page
//! that reads it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::i18n::Language;
use crate::model::ValidationErrors;

pub const COOKIE_NAME: &str = "MVCBLOG_SESSION";

#[derive(Clone, Debug, Default)]
pub struct Flash {
    pub message: Option<String>,
    /// Text of a rejected comment, to refill the form.
    pub comment_draft: Option<String>,
    pub errors: Option<ValidationErrors>,
}

#[derive(Clone, Debug)]
pub struct Session {
    pub current_user: Option<String>,
    pub language: Language,
    pub flash: Flash,
}

impl Session {
    fn new(language: Language) -> Self {
        Self { current_user: None, language, flash: Flash::default() }
    }

    /// Takes the flash values, leaving them empty.
    pub fn take_flash(&mut self) -> Flash {
        std::mem::take(&mut self.flash)
    }
}

/// Idle time after which a session is dropped.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Clone, Debug)]
struct Entry {
    session: Session,
    last_seen: Instant,
}

/// Concurrent session table keyed by the cookie value.
///
/// A session enters the table only when it is saved, which is when its
/// cookie goes out. Entries idle for longer than the TTL are treated as
/// unknown and pruned whenever a new session is stored.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<Uuid, Entry>>,
    default_language: Language,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(default_language: Language) -> Self {
        Self { sessions: Arc::new(DashMap::new()), default_language, ttl: DEFAULT_TTL }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns the id and a snapshot of the session named by `cookie`, or a
    /// fresh, not yet stored session when the cookie is missing, unknown or
    /// expired. The flag is true for a fresh session whose cookie still has
    /// to be sent.
    pub fn load(&self, cookie: Option<&str>) -> (Uuid, Session, bool) {
        if let Some(id) = cookie.and_then(|c| Uuid::parse_str(c).ok()) {
            if let Some(entry) = self.sessions.get(&id) {
                if entry.last_seen.elapsed() < self.ttl {
                    return (id, entry.session.clone(), false);
                }
            }
        }
        (Uuid::new_v4(), Session::new(self.default_language), true)
    }

    pub fn save(&self, id: Uuid, session: Session) {
        let now = Instant::now();
        if let Some(mut entry) = self.sessions.get_mut(&id) {
            *entry = Entry { session, last_seen: now };
            return;
        }
        self.prune();
        self.sessions.insert(id, Entry { session, last_seen: now });
        debug!(%id, "session opened");
    }

    pub fn destroy(&self, id: Uuid) {
        self.sessions.remove(&id);
        debug!(%id, "session destroyed");
    }

    /// Drops every session idle for at least the TTL.
    pub fn prune(&self) {
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.last_seen.elapsed() < self.ttl);
        let pruned = before.saturating_sub(self.sessions.len());
        if pruned > 0 {
            debug!(pruned, "expired sessions dropped");
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// `Set-Cookie` value for session `id`.
pub fn cookie_header(id: Uuid) -> String {
    format!("{COOKIE_NAME}={id}; Path=/; HttpOnly; SameSite=Lax")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_are_stored_only_once_saved() {
        let store = SessionStore::new(Language::En);
        let (id, session, fresh) = store.load(None);
        assert!(fresh);
        assert_eq!(session.language, Language::En);
        assert!(store.is_empty());

        store.save(id, session);
        let (again, _, fresh) = store.load(Some(&id.to_string()));
        assert_eq!(again, id);
        assert!(!fresh);

        let (_, _, fresh) = store.load(Some("not-a-uuid"));
        assert!(fresh);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn flash_is_read_once() {
        let store = SessionStore::new(Language::Es);
        let (id, mut session, _) = store.load(None);
        session.flash.message = Some("saved".into());
        store.save(id, session);

        let (_, mut session, _) = store.load(Some(&id.to_string()));
        assert_eq!(session.take_flash().message.as_deref(), Some("saved"));
        assert!(session.take_flash().message.is_none());
    }

    #[test]
    fn destroyed_sessions_are_gone() {
        let store = SessionStore::new(Language::Es);
        let (id, session, _) = store.load(None);
        store.save(id, session);
        store.destroy(id);
        assert!(store.is_empty());
        assert!(cookie_header(id).starts_with("MVCBLOG_SESSION="));
    }

    #[test]
    fn expired_sessions_are_unknown_and_pruned() {
        let store = SessionStore::new(Language::Es).with_ttl(Duration::ZERO);
        let (first, session, _) = store.load(None);
        store.save(first, session);

        let (_, _, fresh) = store.load(Some(&first.to_string()));
        assert!(fresh);

        let (second, session, _) = store.load(None);
        store.save(second, session);
        assert_eq!(store.len(), 1);
    }
}
