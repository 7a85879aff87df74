//! In-memory storage of uploaded ledgers, one per browser session.
//!
//! Uploads never touch the disk. A session is identified by a random ID in an
//! HTTP-only cookie and is dropped when the user discards it or when it has
//! been idle for longer than the configured TTL.

use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    Error,
    expenses::{FacetOptions, IndexedRecord},
};

/// The name of the cookie holding the session ID.
pub(crate) const SESSION_COOKIE: &str = "sapo_session";

/// Identifies one browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A parsed upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    /// The name of the uploaded file.
    pub file_name: String,
    /// When the file was uploaded.
    pub uploaded_at: OffsetDateTime,
    /// Every record of the file, sorted by date.
    pub records: Vec<IndexedRecord>,
    /// The distinct facet values of `records`.
    pub facets: FacetOptions,
}

impl Ledger {
    /// Create a ledger from freshly parsed records.
    pub fn new(file_name: String, records: Vec<IndexedRecord>) -> Self {
        let facets = FacetOptions::from_records(&records);

        Self {
            file_name,
            uploaded_at: OffsetDateTime::now_utc(),
            records,
            facets,
        }
    }
}

#[derive(Debug)]
struct Session {
    ledger: Arc<Ledger>,
    last_access: Instant,
}

/// The uploads of every active session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    /// Create an empty store whose sessions expire after being idle for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<SessionId, Session>>, Error> {
        self.sessions.lock().map_err(|error| {
            tracing::error!("could not acquire session store lock: {error}");
            Error::SessionLock
        })
    }

    /// Store `ledger` under `id`, replacing any previous upload of that session.
    ///
    /// # Errors
    ///
    /// Returns [Error::SessionLock] if the store lock is poisoned.
    pub fn insert(&self, id: SessionId, ledger: Ledger) -> Result<(), Error> {
        self.insert_at(id, ledger, Instant::now())
    }

    fn insert_at(&self, id: SessionId, ledger: Ledger, now: Instant) -> Result<(), Error> {
        let mut sessions = self.lock()?;
        purge_expired(&mut sessions, self.ttl, now);

        sessions.insert(
            id,
            Session {
                ledger: Arc::new(ledger),
                last_access: now,
            },
        );

        Ok(())
    }

    /// Get the upload of session `id`, refreshing its idle timer.
    ///
    /// # Errors
    ///
    /// Returns [Error::SessionLock] if the store lock is poisoned.
    pub fn get(&self, id: SessionId) -> Result<Option<Arc<Ledger>>, Error> {
        self.get_at(id, Instant::now())
    }

    fn get_at(&self, id: SessionId, now: Instant) -> Result<Option<Arc<Ledger>>, Error> {
        let mut sessions = self.lock()?;
        purge_expired(&mut sessions, self.ttl, now);

        Ok(sessions.get_mut(&id).map(|session| {
            session.last_access = now;
            session.ledger.clone()
        }))
    }

    /// Drop the upload of session `id`.
    ///
    /// Returns whether there was an upload to drop.
    ///
    /// # Errors
    ///
    /// Returns [Error::SessionLock] if the store lock is poisoned.
    pub fn remove(&self, id: SessionId) -> Result<bool, Error> {
        let mut sessions = self.lock()?;
        purge_expired(&mut sessions, self.ttl, Instant::now());

        Ok(sessions.remove(&id).is_some())
    }

    /// The number of sessions currently held.
    #[cfg(test)]
    fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

fn purge_expired(sessions: &mut HashMap<SessionId, Session>, ttl: Duration, now: Instant) {
    let count_before = sessions.len();

    sessions.retain(|_, session| now.saturating_duration_since(session.last_access) <= ttl);

    let purged = count_before - sessions.len();
    if purged > 0 {
        tracing::info!("Discarded {purged} expired upload session(s)");
    }
}

/// Get the session ID from the session cookie, if present and well formed.
pub(crate) fn session_id_from_jar(jar: &CookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse().ok())
}

/// Create the session cookie for `id`.
///
/// The cookie has no expiry so the browser drops it when it closes.
pub(crate) fn session_cookie(id: SessionId) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .build()
}

/// Set the session cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub(crate) fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "deleted"))
        .path("/")
        .expires(OffsetDateTime::UNIX_EPOCH)
        .max_age(time::Duration::ZERO)
        .http_only(true)
        .same_site(SameSite::Strict)
        .build()
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use axum_extra::extract::{CookieJar, cookie::Cookie};

    use crate::expenses::{RawTable, load};

    use super::{
        Ledger, SESSION_COOKIE, SessionId, SessionStore, expired_session_cookie,
        session_cookie, session_id_from_jar,
    };

    fn ledger() -> Ledger {
        let table = RawTable {
            headers: vec![
                "Data".to_owned(),
                "Descrição".to_owned(),
                "Tipo".to_owned(),
                "Valor".to_owned(),
            ],
            rows: vec![vec![
                "01/01/2000".to_owned(),
                "Almoço".to_owned(),
                "Alimentação".to_owned(),
                "100.00".to_owned(),
            ]],
        };

        Ledger::new("gastos.csv".to_owned(), load(&table).unwrap())
    }

    #[test]
    fn stores_and_returns_ledger() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = SessionId::new();

        store.insert(id, ledger()).unwrap();
        let got = store.get(id).unwrap().expect("session should exist");

        assert_eq!(got.file_name, "gastos.csv");
        assert_eq!(got.records.len(), 1);
        assert_eq!(got.facets.categories, vec!["Alimentação"]);
    }

    #[test]
    fn unknown_session_has_no_ledger() {
        let store = SessionStore::new(Duration::from_secs(60));

        assert_eq!(store.get(SessionId::new()).unwrap(), None);
    }

    #[test]
    fn sessions_are_isolated() {
        let store = SessionStore::new(Duration::from_secs(60));
        let first = SessionId::new();
        let second = SessionId::new();

        store.insert(first, ledger()).unwrap();

        assert!(store.get(first).unwrap().is_some());
        assert!(store.get(second).unwrap().is_none());
    }

    #[test]
    fn remove_discards_upload() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = SessionId::new();
        store.insert(id, ledger()).unwrap();

        assert!(store.remove(id).unwrap());
        assert!(!store.remove(id).unwrap());
        assert_eq!(store.get(id).unwrap(), None);
    }

    #[test]
    fn idle_sessions_expire() {
        let ttl = Duration::from_secs(60);
        let store = SessionStore::new(ttl);
        let id = SessionId::new();
        let start = Instant::now();
        store.insert_at(id, ledger(), start).unwrap();

        assert!(store.get_at(id, start + ttl).unwrap().is_some());
        assert_eq!(store.len(), 1);

        let much_later = start + ttl + ttl + Duration::from_secs(1);
        assert_eq!(store.get_at(id, much_later).unwrap(), None);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn access_refreshes_idle_timer() {
        let ttl = Duration::from_secs(60);
        let store = SessionStore::new(ttl);
        let id = SessionId::new();
        let start = Instant::now();
        store.insert_at(id, ledger(), start).unwrap();

        let halfway = start + Duration::from_secs(40);
        assert!(store.get_at(id, halfway).unwrap().is_some());

        let after_original_expiry = start + Duration::from_secs(80);
        assert!(store.get_at(id, after_original_expiry).unwrap().is_some());
    }

    #[test]
    fn reads_session_id_from_cookie() {
        let id = SessionId::new();
        let jar = CookieJar::new().add(session_cookie(id));

        assert_eq!(session_id_from_jar(&jar), Some(id));
    }

    #[test]
    fn ignores_malformed_session_cookie() {
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "not-a-uuid"));

        assert_eq!(session_id_from_jar(&jar), None);
        assert_eq!(session_id_from_jar(&CookieJar::new()), None);
    }

    #[test]
    fn session_cookie_is_http_only() {
        let cookie = session_cookie(SessionId::new());

        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.name(), SESSION_COOKIE);
    }

    #[test]
    fn expired_cookie_has_zero_max_age() {
        let cookie = expired_session_cookie();

        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.value(), "deleted");
    }
}
