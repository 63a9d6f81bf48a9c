//! # Tracker
//!
//! [`GoalTracker`] is the context of one open goal page: the signed-in
//! session, the latest progress snapshot, and the view that owns the chart.
//!
//! ```text
//! authenticate ──▶ subscribe ──▶ snapshot ──▶ render
//!                                   ▲            │
//!                                   └── write ◀──┘ (complete_goal)
//! ```
//!
//! Without a session the tracker never touches the store.

mod error;

pub use error::{TrackerError, TrackerResult};

use std::sync::Arc;

use crate::auth::{self, AuthProvider, Session};
use crate::objectives;
use crate::progress::{ProgressStore, ProgressSubscription, UserProgress};
use crate::view::{GoalView, RenderedView};

/// Result of a completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// One merge-write was issued
    Written,
    /// The objective was already complete; nothing was written
    AlreadyCompleted,
}

/// Session, progress and view for one user
pub struct GoalTracker<S> {
    store: Arc<S>,
    session: Option<Session>,
    progress: UserProgress,
    view: GoalView,
}

impl<S: ProgressStore> GoalTracker<S> {
    /// A tracker that has not signed in yet
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            session: None,
            progress: UserProgress::empty(),
            view: GoalView::new(),
        }
    }

    /// A tracker for an existing session
    pub fn with_session(store: Arc<S>, session: Session) -> Self {
        let mut tracker = Self::new(store);
        tracker.session = Some(session);
        tracker
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    fn user_id(&self) -> TrackerResult<&str> {
        self.session
            .as_ref()
            .map(|s| s.user_id.as_str())
            .ok_or(TrackerError::NotAuthenticated)
    }

    /// Sign in with `token` when present, anonymously otherwise
    pub async fn authenticate<A: AuthProvider + ?Sized>(
        &mut self,
        provider: &A,
        token: Option<&str>,
    ) -> TrackerResult<&Session> {
        let session = auth::authenticate(provider, token).await?;
        Ok(self.session.insert(session))
    }

    /// Register the live listener on this user's progress document
    pub async fn subscribe(&self) -> TrackerResult<ProgressSubscription> {
        let user_id = self.user_id()?;
        self.store
            .subscribe(user_id)
            .await
            .map_err(TrackerError::SubscriptionError)
    }

    /// Replace the current state and re-render
    pub fn apply_snapshot(&mut self, progress: UserProgress) -> RenderedView {
        self.progress = progress;
        self.view.render(&self.progress)
    }

    /// Render the current state without changing it
    pub fn render(&mut self) -> RenderedView {
        self.view.render(&self.progress)
    }

    /// Mark an objective complete
    ///
    /// Already-completed objectives are left untouched, so a completion
    /// timestamp is never overwritten by this tracker.
    pub async fn complete_goal(&self, objective_id: &str) -> TrackerResult<Completion> {
        let user_id = self.user_id()?;

        if objectives::find(objective_id).is_none() {
            return Err(TrackerError::UnknownObjective(objective_id.to_string()));
        }

        if self.progress.is_completed(objective_id) {
            tracing::debug!(objective_id = %objective_id, "Objective already complete, ignoring");
            return Ok(Completion::AlreadyCompleted);
        }

        self.store
            .write(user_id, objective_id)
            .await
            .map_err(TrackerError::WriteFailure)?;

        Ok(Completion::Written)
    }

    /// Consume snapshots until the subscription ends or fails
    ///
    /// Each snapshot replaces the state and the fresh view is handed to
    /// `on_render`. An error is logged and ends the loop.
    pub async fn run<F>(
        &mut self,
        mut subscription: ProgressSubscription,
        mut on_render: F,
    ) -> TrackerResult<()>
    where
        F: FnMut(&RenderedView),
    {
        while let Some(next) = subscription.next().await {
            match next {
                Ok(progress) => {
                    let rendered = self.apply_snapshot(progress);
                    on_render(&rendered);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Error fetching user progress");
                    return Err(TrackerError::SubscriptionError(e));
                }
            }
        }
        Ok(())
    }
}

/// Authenticate and subscribe
///
/// Any failure is logged and yields `None`, leaving nothing subscribed.
pub async fn setup<S, A>(
    store: Arc<S>,
    provider: &A,
    token: Option<&str>,
) -> Option<(GoalTracker<S>, ProgressSubscription)>
where
    S: ProgressStore,
    A: AuthProvider + ?Sized,
{
    let mut tracker = GoalTracker::new(store);

    if let Err(e) = tracker.authenticate(provider, token).await {
        tracing::error!(error = %e, "Authentication failed. Cannot access the database.");
        return None;
    }

    match tracker.subscribe().await {
        Ok(subscription) => Some((tracker, subscription)),
        Err(e) => {
            tracing::error!(error = %e, "Error subscribing to user progress");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthError, AuthUser, LocalAuthProvider};
    use crate::progress::DocumentProgressStore;
    use crate::store::{
        DocumentSnapshot, ListenerRegistry, MemoryDocumentStore, StoreError, StoreResult,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Records every call before delegating to an in-memory store
    struct RecordingStore {
        inner: DocumentProgressStore<MemoryDocumentStore>,
        subscribes: Mutex<Vec<String>>,
        writes: Mutex<Vec<(String, String)>>,
        fail_writes: bool,
    }

    impl RecordingStore {
        fn new() -> Self {
            Self {
                inner: DocumentProgressStore::new(Arc::new(MemoryDocumentStore::new()), "test-app"),
                subscribes: Mutex::new(Vec::new()),
                writes: Mutex::new(Vec::new()),
                fail_writes: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail_writes: true,
                ..Self::new()
            }
        }

        fn write_count(&self) -> usize {
            self.writes.lock().unwrap().len()
        }

        fn subscribe_count(&self) -> usize {
            self.subscribes.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProgressStore for RecordingStore {
        async fn subscribe(&self, user_id: &str) -> StoreResult<ProgressSubscription> {
            self.subscribes.lock().unwrap().push(user_id.to_string());
            self.inner.subscribe(user_id).await
        }

        async fn write(&self, user_id: &str, objective_id: &str) -> StoreResult<()> {
            self.writes
                .lock()
                .unwrap()
                .push((user_id.to_string(), objective_id.to_string()));
            if self.fail_writes {
                return Err(StoreError::Lock("unavailable".to_string()));
            }
            self.inner.write(user_id, objective_id).await
        }
    }

    /// Provider that always refuses
    struct RejectingProvider;

    #[async_trait]
    impl AuthProvider for RejectingProvider {
        async fn sign_in_with_custom_token(&self, _token: &str) -> Result<AuthUser, AuthError> {
            Err(AuthError::InvalidToken)
        }

        async fn sign_in_anonymously(&self) -> Result<AuthUser, AuthError> {
            Err(AuthError::AnonymousDisabled)
        }
    }

    fn provider() -> LocalAuthProvider {
        let mut tokens = HashMap::new();
        tokens.insert("tok".to_string(), "alice".to_string());
        LocalAuthProvider::new(tokens, true)
    }

    async fn signed_in(store: Arc<RecordingStore>) -> GoalTracker<RecordingStore> {
        let mut tracker = GoalTracker::new(store);
        tracker.authenticate(&provider(), Some("tok")).await.unwrap();
        tracker
    }

    #[tokio::test]
    async fn test_unauthenticated_never_touches_store() {
        let store = Arc::new(RecordingStore::new());
        let tracker = GoalTracker::new(Arc::clone(&store));

        assert!(matches!(
            tracker.subscribe().await,
            Err(TrackerError::NotAuthenticated)
        ));
        assert!(matches!(
            tracker.complete_goal("goal_listen").await,
            Err(TrackerError::NotAuthenticated)
        ));
        assert_eq!(store.subscribe_count(), 0);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_setup_with_failed_auth_is_inert() {
        let store = Arc::new(RecordingStore::new());
        let result = setup(Arc::clone(&store), &RejectingProvider, None).await;

        assert!(result.is_none());
        assert_eq!(store.subscribe_count(), 0);
    }

    #[tokio::test]
    async fn test_setup_subscribes_once_for_user() {
        let store = Arc::new(RecordingStore::new());
        let (tracker, _sub) = setup(Arc::clone(&store), &provider(), Some("tok"))
            .await
            .unwrap();

        assert_eq!(tracker.session().unwrap().user_id, "alice");
        assert_eq!(*store.subscribes.lock().unwrap(), vec!["alice".to_string()]);
    }

    #[tokio::test]
    async fn test_complete_incomplete_goal_writes_once() {
        let store = Arc::new(RecordingStore::new());
        let mut tracker = signed_in(Arc::clone(&store)).await;
        let mut sub = tracker.subscribe().await.unwrap();
        tracker.apply_snapshot(sub.next().await.unwrap().unwrap());

        let outcome = tracker.complete_goal("goal_repeat").await.unwrap();

        assert_eq!(outcome, Completion::Written);
        assert_eq!(
            *store.writes.lock().unwrap(),
            vec![("alice".to_string(), "goal_repeat".to_string())]
        );
    }

    #[tokio::test]
    async fn test_complete_completed_goal_is_noop() {
        let store = Arc::new(RecordingStore::new());
        let mut tracker = signed_in(Arc::clone(&store)).await;
        tracker.apply_snapshot(
            UserProgress::empty().with_completed("goal_listen", chrono::Utc::now()),
        );

        let outcome = tracker.complete_goal("goal_listen").await.unwrap();

        assert_eq!(outcome, Completion::AlreadyCompleted);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_objective_is_rejected() {
        let store = Arc::new(RecordingStore::new());
        let tracker = signed_in(Arc::clone(&store)).await;

        assert!(matches!(
            tracker.complete_goal("goal_fly").await,
            Err(TrackerError::UnknownObjective(_))
        ));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let store = Arc::new(RecordingStore::failing());
        let tracker = signed_in(Arc::clone(&store)).await;

        assert!(matches!(
            tracker.complete_goal("goal_new").await,
            Err(TrackerError::WriteFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_snapshot_after_write_matches_direct_render() {
        let store = Arc::new(RecordingStore::new());
        let mut tracker = signed_in(Arc::clone(&store)).await;
        let mut sub = tracker.subscribe().await.unwrap();
        tracker.apply_snapshot(sub.next().await.unwrap().unwrap());

        tracker.complete_goal("goal_listen").await.unwrap();
        let snapshot = sub.next().await.unwrap().unwrap();
        let from_subscription = tracker.apply_snapshot(snapshot);

        let stored = store.inner.read("alice").await.unwrap();
        let direct = GoalView::new().render(&stored);

        assert_eq!(from_subscription, direct);
        assert!(from_subscription.chart.revision > direct.chart.revision);
        assert_eq!(from_subscription.chart.title, "Total goals completed: 1 / 3");
    }

    #[tokio::test]
    async fn test_run_renders_each_snapshot_until_error() {
        let store = Arc::new(RecordingStore::new());
        let mut tracker = signed_in(Arc::clone(&store)).await;

        let path = store.inner.path_for("alice").unwrap();
        let mut registry = ListenerRegistry::new();
        let sub = ProgressSubscription::new(registry.add(DocumentSnapshot {
            path: path.clone(),
            data: None,
        }));

        let data = serde_json::json!({"completed": {"goal_new": true}});
        registry.notify(&DocumentSnapshot {
            path: path.clone(),
            data: data.as_object().cloned(),
        });
        registry.notify_error(&path, || StoreError::Lock("closed".to_string()));

        let mut renders = Vec::new();
        let result = tracker
            .run(sub, |view| renders.push(view.chart.data.total_completed))
            .await;

        assert!(matches!(result, Err(TrackerError::SubscriptionError(_))));
        assert_eq!(renders, vec![0, 1]);
        assert!(tracker.progress().is_completed("goal_new"));
    }

    #[tokio::test]
    async fn test_run_ends_when_store_goes_away() {
        let mut tracker = signed_in(Arc::new(RecordingStore::new())).await;

        let source = DocumentProgressStore::new(Arc::new(MemoryDocumentStore::new()), "test-app");
        let sub = source.subscribe("alice").await.unwrap();
        source.write("alice", "goal_listen").await.unwrap();
        drop(source);

        let mut renders = Vec::new();
        let result = tracker
            .run(sub, |view| renders.push(view.chart.data.total_completed))
            .await;

        assert!(result.is_ok());
        assert_eq!(renders, vec![0, 1]);
    }
}
