//! Server-side sessions
//!
//! Keyed by session id. Holds the signed-in user, per-view page numbers and
//! a short-lived copy of the annotation statistics.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use qaeval_core::Role;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};
use uuid::Uuid;

use crate::db::repos::AnnotationStats;

/// Annotation statistics are recomputed after this long
pub const STATS_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUser {
    pub user_id: i64,
    pub username: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
struct Session {
    user: SessionUser,
    expires_at: DateTime<Utc>,
    pages: HashMap<String, u32>,
    stats: Option<(Instant, AnnotationStats)>,
}

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, user: SessionUser, expires_at: DateTime<Utc>) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(
            id,
            Session {
                user,
                expires_at,
                pages: HashMap::new(),
                stats: None,
            },
        );
        id
    }

    /// The session's user; expired sessions are dropped.
    pub async fn user(&self, id: Uuid) -> Option<SessionUser> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(&id) {
                Some(s) if s.expires_at > Utc::now() => return Some(s.user.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        self.sessions.write().await.remove(&id);
        None
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drop every session of a user. Returns how many were removed.
    pub async fn remove_user(&self, user_id: i64) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user.user_id != user_id);
        before - sessions.len()
    }

    /// Remembered page for `view`, 1 when none.
    pub async fn page(&self, id: Uuid, view: &str) -> Option<u32> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .map(|s| s.pages.get(view).copied().unwrap_or(1))
    }

    pub async fn set_page(&self, id: Uuid, view: &str, page: u32) -> bool {
        match self.sessions.write().await.get_mut(&id) {
            Some(s) => {
                s.pages.insert(view.to_owned(), page.max(1));
                true
            }
            None => false,
        }
    }

    /// Cached statistics younger than [`STATS_TTL`].
    pub async fn cached_stats(&self, id: Uuid) -> Option<AnnotationStats> {
        let sessions = self.sessions.read().await;
        let (at, stats) = sessions.get(&id)?.stats.as_ref()?;
        (at.elapsed() < STATS_TTL).then(|| stats.clone())
    }

    pub async fn cache_stats(&self, id: Uuid, stats: AnnotationStats) {
        if let Some(s) = self.sessions.write().await.get_mut(&id) {
            s.stats = Some((Instant::now(), stats));
        }
    }

    /// Forget cached statistics in every session, after data changes.
    pub async fn invalidate_stats(&self) {
        for s in self.sessions.write().await.values_mut() {
            s.stats = None;
        }
    }

    pub async fn prune_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn alice() -> SessionUser {
        SessionUser {
            user_id: 1,
            username: "alice".into(),
            name: "Alice".into(),
            role: Role::Evaluator,
        }
    }

    fn later() -> DateTime<Utc> {
        Utc::now() + chrono::Duration::hours(1)
    }

    #[tokio::test]
    async fn create_lookup_remove() {
        let store = SessionStore::new();
        let id = store.create(alice(), later()).await;
        assert_eq!(store.user(id).await, Some(alice()));
        assert!(store.remove(id).await);
        assert_eq!(store.user(id).await, None);
        assert!(!store.remove(id).await);
    }

    #[tokio::test]
    async fn expired_session_is_gone() {
        let store = SessionStore::new();
        let id = store
            .create(alice(), Utc::now() - chrono::Duration::seconds(1))
            .await;
        assert_eq!(store.user(id).await, None);
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn pages_are_per_session_and_view() {
        let store = SessionStore::new();
        let a = store.create(alice(), later()).await;
        let b = store.create(alice(), later()).await;
        assert_eq!(store.page(a, "raw-answers").await, Some(1));
        assert!(store.set_page(a, "raw-answers", 4).await);
        assert_eq!(store.page(a, "raw-answers").await, Some(4));
        assert_eq!(store.page(b, "raw-answers").await, Some(1));
        assert_eq!(store.page(Uuid::new_v4(), "raw-answers").await, None);
    }

    #[tokio::test]
    async fn deactivation_drops_all_user_sessions() {
        let store = SessionStore::new();
        store.create(alice(), later()).await;
        store.create(alice(), later()).await;
        assert_eq!(store.remove_user(1).await, 2);
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stats_cache_expires() {
        let store = SessionStore::new();
        let id = store.create(alice(), later()).await;
        store
            .cache_stats(id, AnnotationStats::new(4, 1, BTreeMap::new()))
            .await;
        assert!(store.cached_stats(id).await.is_some());

        tokio::time::advance(STATS_TTL + Duration::from_secs(1)).await;
        assert!(store.cached_stats(id).await.is_none());
    }
}
