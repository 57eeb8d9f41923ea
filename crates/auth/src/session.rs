use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
    time::{Duration, Instant},
};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;

use crate::identity::Principal;

/// How long a login may take between the redirect to the provider and the callback.
pub const LOGIN_STATE_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug)]
struct Entry<T> {
    value: T,
    expires_at: Instant,
}

impl<T> Entry<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }
    fn is_alive(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Sessions of logged in principals, and states of logins in progress.
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    max_pending: usize,
    sessions: RwLock<HashMap<String, Entry<Arc<Principal>>>>,
    pending: RwLock<HashMap<String, Entry<String>>>,
}

/// A random url safe token.
pub fn random_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

impl SessionStore {
    pub fn new(ttl: Duration, max_pending: usize) -> Self {
        Self {
            ttl,
            max_pending,
            sessions: RwLock::default(),
            pending: RwLock::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a login at `registration`, returns the state to send to the provider.
    ///
    /// None when `max_pending` logins are already waiting for their callback.
    pub fn begin_login(&self, registration: &str) -> Option<String> {
        let mut pending = self.pending.write().expect("session store poisoned");
        pending.retain(|_, entry| entry.is_alive());
        if pending.len() >= self.max_pending {
            return None;
        }
        let state = random_token();
        pending.insert(state.clone(), Entry::new(registration.to_string(), LOGIN_STATE_TTL));
        Some(state)
    }

    /// Consume a login state, returns the registration it was issued for.
    pub fn take_login(&self, state: &str) -> Option<String> {
        let entry = self.pending.write().expect("session store poisoned").remove(state)?;
        entry.is_alive().then_some(entry.value)
    }

    /// Open a session, returns its id.
    pub fn create(&self, principal: Principal) -> String {
        let id = random_token();
        let mut sessions = self.sessions.write().expect("session store poisoned");
        sessions.retain(|_, entry| entry.is_alive());
        sessions.insert(id.clone(), Entry::new(Arc::new(principal), self.ttl));
        id
    }

    pub fn get(&self, id: &str) -> Option<Arc<Principal>> {
        let sessions = self.sessions.read().expect("session store poisoned");
        sessions.get(id).filter(|entry| entry.is_alive()).map(|entry| entry.value.clone())
    }

    pub fn remove(&self, id: &str) -> Option<Arc<Principal>> {
        self.sessions.write().expect("session store poisoned").remove(id).map(|entry| entry.value)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().expect("session store poisoned").values().filter(|entry| entry.is_alive()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use campusgate_model::Role;

    use super::*;
    use crate::identity::Identity;

    fn principal() -> Principal {
        Principal {
            identity: Identity::new("ana@gmail.com"),
            roles: BTreeSet::from([Role::Student]),
            access_token: "token".to_string(),
        }
    }

    #[test]
    fn test_login_state_is_single_use() {
        let store = SessionStore::new(Duration::from_secs(60), 16);
        let state = store.begin_login("google").expect("below the limit");
        assert_eq!(store.take_login(&state).as_deref(), Some("google"));
        assert_eq!(store.take_login(&state), None);
        assert_eq!(store.take_login("forged"), None);
    }

    #[test]
    fn test_pending_logins_are_bounded() {
        let store = SessionStore::new(Duration::from_secs(60), 2);
        let first = store.begin_login("google").expect("below the limit");
        assert!(store.begin_login("google").is_some());
        assert!(store.begin_login("google").is_none());
        // a finished login frees its slot
        assert!(store.take_login(&first).is_some());
        assert!(store.begin_login("google").is_some());
    }

    #[test]
    fn test_sessions_expire() {
        let store = SessionStore::new(Duration::from_secs(60), 16);
        let id = store.create(principal());
        assert_ne!(id, store.create(principal()));
        assert_eq!(store.get(&id).map(|p| p.identity.email.clone()).as_deref(), Some("ana@gmail.com"));
        assert_eq!(store.len(), 2);
        assert!(store.remove(&id).is_some());
        assert!(store.get(&id).is_none());

        let expired = SessionStore::new(Duration::ZERO, 16);
        let id = expired.create(principal());
        assert!(expired.get(&id).is_none());
        assert!(expired.is_empty());
    }
}
