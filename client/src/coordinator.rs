//! SyncCoordinator - keeps an [`EntityCache`] in step with a remote collection.
//!
//! Every operation suspends only while waiting on the remote collaborator. All
//! cache mutation happens in short synchronous sections under a mutex that is
//! never held across an await, so several operations may be in flight at once
//! while their effects are applied one at a time.
//!
//! Mutation policy per operation class:
//! - `create` is optimistic: the entity is inserted and selected before the
//!   remote call, and rolled back from a [`Checkpoint`] if the call fails.
//! - `update` and `delete` are pessimistic: the cache changes only after the
//!   remote call succeeds.
//!
//! Each operation draws an [`OpToken`] when it is issued. Results are applied
//! through the cache's sequenced operations, so when two operations on the same
//! id race, the one issued last wins regardless of completion order.
//!
//! Remote failures never cross the operation boundary as errors. They are
//! logged, published on the failure channel, and the operation returns a
//! plain status value.
//!
//! Dropping an operation's future mid-call (a timeout, a losing `select!`
//! branch) is treated like a failure: its loading counter is released, an
//! optimistic create is rolled back and [`SyncError::Cancelled`] is
//! published.

use crate::error::RemoteError;
use crate::status::{OperationKind, SyncFailure, SyncStatus};
use crate::{RemoteCollection, SyncError};
use gather_engine::{Checkpoint, Entity, EntityCache, OpToken, Sequencer};
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};

/// Capacity of the failure broadcast channel.
const FAILURE_CHANNEL_CAPACITY: usize = 64;

/// Mutable state guarded by the coordinator's mutex.
#[derive(Debug)]
struct State<E: Entity> {
    cache: EntityCache<E>,
    sequencer: Sequencer,
    /// In-flight create/update/delete calls
    mutations: usize,
    /// In-flight load-all and load-one-miss calls
    initial_loads: usize,
    revision: u64,
}

impl<E: Entity> State<E> {
    fn touch(&mut self) {
        self.revision += 1;
    }

    fn status(&self) -> SyncStatus {
        SyncStatus {
            loading: self.mutations > 0,
            loading_initial: self.initial_loads > 0,
            revision: self.revision,
        }
    }
}

/// Which loading counter an operation holds.
#[derive(Debug, Clone, Copy)]
enum Counter {
    Mutations,
    InitialLoads,
}

impl Counter {
    fn of(operation: OperationKind) -> Self {
        match operation {
            OperationKind::LoadAll | OperationKind::LoadOne => Counter::InitialLoads,
            OperationKind::Create | OperationKind::Update | OperationKind::Delete => {
                Counter::Mutations
            }
        }
    }

    fn enter<E: Entity>(self, state: &mut State<E>) {
        *self.slot(state) += 1;
    }

    fn leave<E: Entity>(self, state: &mut State<E>) {
        let slot = self.slot(state);
        *slot = slot.saturating_sub(1);
    }

    fn slot<E: Entity>(self, state: &mut State<E>) -> &mut usize {
        match self {
            Counter::Mutations => &mut state.mutations,
            Counter::InitialLoads => &mut state.initial_loads,
        }
    }
}

/// Everything but the remote: state plus the channels that publish it.
struct Shared<E: Entity> {
    state: Mutex<State<E>>,
    status: watch::Sender<SyncStatus>,
    failures: broadcast::Sender<SyncFailure>,
}

impl<E: Entity> Shared<E> {
    /// Run `f` under the lock and publish the status if it changed.
    fn update_state<T>(&self, f: impl FnOnce(&mut State<E>) -> T) -> T {
        let mut state = self.state.lock();
        let out = f(&mut *state);
        let next = state.status();

        // Published before unlocking so observers see statuses in apply order
        self.status.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        out
    }

    fn report(&self, operation: OperationKind, id: Option<&str>, error: SyncError) {
        tracing::warn!(%operation, id = ?id, error = %error, "operation failed");

        // No subscribers is fine
        let _ = self.failures.send(SyncFailure {
            operation,
            id: id.map(str::to_string),
            error,
        });
    }

    /// Take a loading counter and issue a token for `operation`.
    fn begin(
        &self,
        operation: OperationKind,
        id: Option<&str>,
        prepare: impl FnOnce(&mut State<E>, OpToken) -> Option<Checkpoint<E>>,
    ) -> InFlight<'_, E> {
        let counter = Counter::of(operation);
        let (token, rollback) = self.update_state(|state| {
            counter.enter(state);
            let token = state.sequencer.issue();
            (token, prepare(state, token))
        });

        InFlight {
            shared: self,
            operation,
            id: id.map(str::to_string),
            counter,
            token,
            rollback,
            armed: true,
        }
    }
}

/// An operation between issue and completion.
///
/// Releases its loading counter exactly once. If the operation's future is
/// dropped before [`finish`](Self::finish) or [`fail`](Self::fail) runs, the
/// drop releases the counter, undoes any optimistic change and reports
/// [`SyncError::Cancelled`].
struct InFlight<'a, E: Entity> {
    shared: &'a Shared<E>,
    operation: OperationKind,
    id: Option<String>,
    counter: Counter,
    token: OpToken,
    rollback: Option<Checkpoint<E>>,
    armed: bool,
}

impl<E: Entity> InFlight<'_, E> {
    fn token(&self) -> OpToken {
        self.token
    }

    /// Complete successfully, applying `f` in the same critical section that
    /// releases the counter.
    fn finish<T>(mut self, f: impl FnOnce(&mut State<E>, OpToken) -> T) -> T {
        self.armed = false;
        let (counter, token) = (self.counter, self.token);
        self.shared.update_state(|state| {
            counter.leave(state);
            f(state, token)
        })
    }

    /// Complete with a remote failure: release, roll back and report.
    fn fail(mut self, err: RemoteError) {
        self.armed = false;
        let rolled_back = self.release_and_roll_back();
        tracing::debug!(token = %self.token, rolled_back, "operation rejected");
        self.shared
            .report(self.operation, self.id.as_deref(), SyncError::from(err));
    }

    fn release_and_roll_back(&mut self) -> bool {
        let (counter, token) = (self.counter, self.token);
        let rollback = self.rollback.take();
        self.shared.update_state(|state| {
            counter.leave(state);
            let restored = rollback.is_some_and(|checkpoint| state.cache.restore(checkpoint, token));
            if restored {
                state.touch();
            }
            restored
        })
    }
}

impl<E: Entity> Drop for InFlight<'_, E> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let rolled_back = self.release_and_roll_back();
        tracing::debug!(token = %self.token, rolled_back, "operation dropped in flight");
        self.shared
            .report(self.operation, self.id.as_deref(), SyncError::Cancelled);
    }
}

/// Coordinates load/create/update/delete between a local cache and a remote.
pub struct SyncCoordinator<E: Entity, R> {
    remote: R,
    shared: Shared<E>,
}

impl<E, R> SyncCoordinator<E, R>
where
    E: Entity + Send + Sync,
    R: RemoteCollection<E>,
{
    /// Create a coordinator with an empty cache.
    pub fn new(remote: R) -> Self {
        Self::with_cache(remote, EntityCache::new())
    }

    /// Create a coordinator around an existing cache.
    pub fn with_cache(remote: R, cache: EntityCache<E>) -> Self {
        let state = State {
            cache,
            sequencer: Sequencer::new(),
            mutations: 0,
            initial_loads: 0,
            revision: 0,
        };
        let (status, _) = watch::channel(state.status());
        let (failures, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);

        Self {
            remote,
            shared: Shared {
                state: Mutex::new(state),
                status,
                failures,
            },
        }
    }

    /// The remote collaborator.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Current flags.
    pub fn status(&self) -> SyncStatus {
        *self.shared.status.borrow()
    }

    /// Watch flag and revision changes.
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.shared.status.subscribe()
    }

    /// Receive failures as they happen.
    pub fn subscribe_failures(&self) -> broadcast::Receiver<SyncFailure> {
        self.shared.failures.subscribe()
    }

    /// Read the cache.
    ///
    /// `f` runs while the coordinator's lock is held. The lock is not
    /// reentrant: calling back into this coordinator from `f` deadlocks.
    pub fn read<T>(&self, f: impl FnOnce(&EntityCache<E>) -> T) -> T {
        f(&self.shared.state.lock().cache)
    }

    /// A copy of the cached entity with this id.
    pub fn get(&self, id: &str) -> Option<E> {
        self.read(|cache| cache.get(id).cloned())
    }

    /// A copy of the selected entity.
    pub fn selected(&self) -> Option<E> {
        self.read(|cache| cache.selected().cloned())
    }

    /// Clear the selection.
    pub fn clear_selection(&self) {
        self.shared.update_state(|state| {
            if state.cache.selected_id().is_some() {
                state.cache.clear_selection();
                state.touch();
            }
        });
    }

    /// Load every entity from the remote into the cache.
    ///
    /// Returns whether the remote call succeeded. On failure the cache is left
    /// as it was.
    pub async fn load_all(&self) -> bool {
        let op = self
            .shared
            .begin(OperationKind::LoadAll, None, |_, _| None);

        match self.remote.list().await {
            Ok(entities) => {
                let received = entities.len();
                let token = op.token();
                let applied = op.finish(|state, token| {
                    let mut applied = 0;
                    for entity in entities {
                        if state.cache.apply_upsert(entity, token) {
                            applied += 1;
                        }
                    }
                    if applied > 0 {
                        state.touch();
                    }
                    applied
                });
                tracing::debug!(%token, received, applied, "loaded all entities");
                true
            }
            Err(err) => {
                op.fail(err);
                false
            }
        }
    }

    /// Select an entity, fetching it from the remote if it is not cached.
    ///
    /// A cache hit returns immediately without a remote call or a flag
    /// change. Returns `None` if the remote call fails or answers with a
    /// different entity; the selection is then left unchanged.
    pub async fn load_one(&self, id: &str) -> Option<E> {
        let hit = self.shared.update_state(|state| {
            let hit = state.cache.get(id).cloned()?;
            if state.cache.selected_id() != Some(id) {
                state.cache.select(id);
                state.touch();
            }
            Some(hit)
        });
        if let Some(entity) = hit {
            tracing::trace!(id, "cache hit");
            return Some(entity);
        }

        let op = self
            .shared
            .begin(OperationKind::LoadOne, Some(id), |_, _| None);

        match self.remote.get(id).await {
            Ok(entity) if entity.id() != id => {
                let got = entity.id().to_string();
                op.fail(RemoteError::InvalidResponse(format!(
                    "requested {}, received {}",
                    id, got
                )));
                None
            }
            Ok(entity) => {
                let token = op.token();
                let loaded = op.finish(|state, token| {
                    state.cache.apply_upsert(entity, token);
                    state.cache.select(id);
                    state.touch();
                    state.cache.get(id).cloned()
                });
                tracing::debug!(%token, id, found = loaded.is_some(), "loaded entity");
                loaded
            }
            Err(err) => {
                op.fail(err);
                None
            }
        }
    }

    /// Create an entity, showing it locally before the remote confirms.
    ///
    /// The entity's id must already be known. If the remote call fails, or
    /// the returned future is dropped before it completes, the speculative
    /// insert and selection are rolled back, unless an operation issued
    /// later has touched the same id in the meantime.
    pub async fn create(&self, entity: E) -> bool {
        let id = entity.id().to_string();

        let op = self
            .shared
            .begin(OperationKind::Create, Some(&id), |state, token| {
                let checkpoint = state.cache.checkpoint(&id);
                state.cache.apply_upsert(entity.clone(), token);
                state.cache.select(&id);
                state.touch();
                Some(checkpoint)
            });

        match self.remote.create(&entity).await {
            Ok(()) => {
                let token = op.token();
                op.finish(|_, _| ());
                tracing::debug!(%token, id = %id, "created entity");
                true
            }
            Err(err) => {
                op.fail(err);
                false
            }
        }
    }

    /// Update an entity once the remote has accepted it.
    ///
    /// On success the cached entry is replaced and selected. The local change
    /// is skipped if an operation issued later has already been applied to
    /// the same id.
    pub async fn update(&self, entity: E) -> bool {
        let op = self
            .shared
            .begin(OperationKind::Update, Some(entity.id()), |_, _| None);

        match self.remote.update(&entity).await {
            Ok(()) => {
                let id = entity.id().to_string();
                let token = op.token();
                let applied = op.finish(|state, token| {
                    let applied = state.cache.apply_upsert(entity, token);
                    if applied {
                        state.cache.select(&id);
                        state.touch();
                    }
                    applied
                });
                tracing::debug!(%token, id = %id, applied, "updated entity");
                true
            }
            Err(err) => {
                op.fail(err);
                false
            }
        }
    }

    /// Delete an entity once the remote has accepted the deletion.
    pub async fn delete(&self, id: &str) -> bool {
        let op = self
            .shared
            .begin(OperationKind::Delete, Some(id), |_, _| None);

        match self.remote.delete(id).await {
            Ok(()) => {
                let token = op.token();
                let applied = op.finish(|state, token| {
                    let applied = state.cache.apply_remove(id, token);
                    if applied {
                        state.touch();
                    }
                    applied
                });
                tracing::debug!(%token, id, applied, "deleted entity");
                true
            }
            Err(err) => {
                op.fail(err);
                false
            }
        }
    }
}

impl<E: Entity, R> std::fmt::Debug for SyncCoordinator<E, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("status", &*self.shared.status.borrow())
            .finish_non_exhaustive()
    }
}
