//! The state store, its selections and subscriptions.
//!
//! A [`StateStore`] owns one current state behind an `Arc`. Writes build a
//! new state and swap the `Arc`; nothing is ever mutated in place, which is
//! what makes identity comparison of projections a valid change check.
//!
//! # Dispatch
//!
//! Each write commits the new state and queues it for delivery inside the
//! same critical section. Whoever finds no dispatch in progress becomes the
//! dispatcher and drains the queue, one committed state at a time, visiting
//! subscribers in registration order. A write made from inside a subscriber
//! callback is committed at once (`state()` reflects it) and is delivered
//! when the current round finishes, still before the outermost write
//! returns. This keeps every subscriber's view in commit order.

use crate::metrics::{
    NOTIFICATIONS_DELIVERED, NOTIFICATIONS_SUPPRESSED, SUBSCRIBERS, UPDATES_TOTAL, counter, gauge,
};
use crate::stream::SelectionStream;
use crate::{StoreConfig, lock};
use composable_state_core::{Identity, Projector, StateShape, whole_state};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Observable holder of one current state
///
/// Cloning a `StateStore` yields another handle to the same store.
///
/// # Example
///
/// ```ignore
/// let store = StateStore::new(TodosState::default());
///
/// let sub = store.select(|s| s.loading).subscribe(|loading| {
///     println!("loading changed to {loading}");
/// });
///
/// store.patch_state(TodosStatePatch::default().with_loading(true));
/// sub.unsubscribe();
/// ```
pub struct StateStore<S> {
    inner: Arc<StoreInner<S>>,
}

struct StoreInner<S> {
    config: StoreConfig,
    core: Mutex<Core<S>>,
}

/// Everything guarded by the store lock
struct Core<S> {
    current: Arc<S>,
    version: u64,
    pending: VecDeque<Committed<S>>,
    dispatching: bool,
    listeners: Vec<Arc<dyn Listener<S>>>,
    next_id: u64,
}

/// A replacement waiting to be delivered
struct Committed<S> {
    version: u64,
    state: Arc<S>,
}

/// Outcome of offering a committed state to one listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Delivered,
    Suppressed,
    Inactive,
}

trait Listener<S>: Send + Sync {
    fn id(&self) -> u64;

    /// Store version at registration; only later commits are delivered
    fn since(&self) -> u64;

    fn deliver(&self, state: &Arc<S>) -> Delivery;
}

/// A subscriber with a projection and its last-seen projected value
struct ProjectedListener<S, T> {
    id: u64,
    since: u64,
    active: Arc<AtomicBool>,
    projector: Projector<S, T>,
    last: Mutex<T>,
    callback: Box<dyn Fn(T) + Send + Sync>,
}

impl<S, T> Listener<S> for ProjectedListener<S, T>
where
    S: Send + Sync + 'static,
    T: Identity + Clone + Send + 'static,
{
    fn id(&self) -> u64 {
        self.id
    }

    fn since(&self) -> u64 {
        self.since
    }

    fn deliver(&self, state: &Arc<S>) -> Delivery {
        if !self.active.load(Ordering::Acquire) {
            return Delivery::Inactive;
        }

        let projected = (self.projector)(state);
        {
            let mut last = lock(&self.last);
            if last.same(&projected) {
                return Delivery::Suppressed;
            }
            *last = projected.clone();
        }

        // Re-checked so an unsubscribe made by an earlier callback in this
        // round still wins.
        if !self.active.load(Ordering::Acquire) {
            return Delivery::Inactive;
        }
        (self.callback)(projected);
        Delivery::Delivered
    }
}

/// Clears the dispatching flag if a subscriber callback panics
struct DispatchGuard<'a, S> {
    inner: &'a StoreInner<S>,
    armed: bool,
}

impl<S> Drop for DispatchGuard<'_, S> {
    fn drop(&mut self) {
        if self.armed {
            lock(&self.inner.core).dispatching = false;
        }
    }
}

impl<S> StateStore<S>
where
    S: Send + Sync + 'static,
{
    /// Create a new store with the given initial state and default configuration
    #[must_use]
    pub fn new(initial_state: S) -> Self {
        Self::with_config(initial_state, StoreConfig::default())
    }

    /// Create a new store with custom configuration
    ///
    /// # Arguments
    ///
    /// - `initial_state`: The starting state; a current value exists from here on
    /// - `config`: Label and subscriber-leak threshold
    #[must_use]
    pub fn with_config(initial_state: S, config: StoreConfig) -> Self {
        tracing::debug!(store = %config.label, "Store created");

        Self {
            inner: Arc::new(StoreInner {
                config,
                core: Mutex::new(Core {
                    current: Arc::new(initial_state),
                    version: 0,
                    pending: VecDeque::new(),
                    dispatching: false,
                    listeners: Vec::new(),
                    next_id: 0,
                }),
            }),
        }
    }

    /// The store's configuration
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Current state, synchronously
    ///
    /// Never fails and has no side effects. The returned `Arc` is a snapshot;
    /// later writes swap in a new value and leave it untouched.
    #[must_use]
    pub fn state(&self) -> Arc<S> {
        Arc::clone(&lock(&self.inner.core).current)
    }

    /// Read current state via a closure
    ///
    /// ```ignore
    /// let count = store.with_state(|s| s.todos.len());
    /// ```
    pub fn with_state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state();
        f(&state)
    }

    /// Number of replacements committed so far
    #[must_use]
    pub fn version(&self) -> u64 {
        lock(&self.inner.core).version
    }

    /// Number of registered subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.core).listeners.len()
    }

    /// Returns true if both handles refer to the same store
    #[must_use]
    pub fn same_store(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Replace the current state wholesale
    ///
    /// Every active subscriber whose projection of `new_state` is not the
    /// same as its last delivered value is notified, in registration order,
    /// before this call returns (unless called from inside a callback, see
    /// the module docs).
    pub fn update_state(&self, new_state: S) {
        self.commit(|_| new_state, "update");
    }

    /// Apply a partial update
    ///
    /// For a record state the partial is shallow-merged over the current
    /// state: fields set in the partial override, all others carry over
    /// with their identity intact. For a scalar state the partial *is* the
    /// new state and this behaves as [`update_state`](Self::update_state).
    ///
    /// Always produces a new state value.
    pub fn patch_state(&self, partial: S::Partial)
    where
        S: StateShape,
    {
        tracing::trace!(store = %self.inner.config.label, shape = %S::KIND, "Patching state");
        self.commit(|current| current.merge(partial), "patch");
    }

    /// Select a projected slice of the state
    ///
    /// The returned [`Selection`] is a description; nothing is registered
    /// until it is subscribed to.
    #[must_use]
    pub fn select<T, F>(&self, projector: F) -> Selection<S, T>
    where
        F: Fn(&Arc<S>) -> T + Send + Sync + 'static,
        T: Identity + Clone + Send + 'static,
    {
        self.select_with(Arc::new(projector))
    }

    /// Select using an existing shared projector
    #[must_use]
    pub fn select_with<T>(&self, projector: Projector<S, T>) -> Selection<S, T>
    where
        T: Identity + Clone + Send + 'static,
    {
        Selection {
            store: self.clone(),
            projector,
        }
    }

    /// Select the whole state
    ///
    /// Equivalent to `select(|s| Arc::clone(s))`: emits the state handle
    /// itself whenever it is replaced.
    #[must_use]
    pub fn select_all(&self) -> Selection<S, Arc<S>> {
        self.select_with(whole_state())
    }

    /// Build the next state from the current one and queue it for delivery
    ///
    /// `build` runs under the store lock, so concurrent patches never merge
    /// onto the same base. It must not call back into the store.
    fn commit<F>(&self, build: F, op: &'static str)
    where
        F: FnOnce(&Arc<S>) -> S,
    {
        let label = &self.inner.config.label;
        let (version, start_dispatch) = {
            let mut core = lock(&self.inner.core);
            let next = Arc::new(build(&core.current));
            core.version += 1;
            let version = core.version;
            core.current = Arc::clone(&next);
            core.pending.push_back(Committed {
                version,
                state: next,
            });

            let start_dispatch = !core.dispatching;
            core.dispatching = true;
            (version, start_dispatch)
        };

        tracing::debug!(store = %label, version, op, "State replaced");
        counter!(UPDATES_TOTAL, "store" => label.clone()).increment(1);

        if start_dispatch {
            self.dispatch();
        } else {
            tracing::trace!(store = %label, version, "Delivery queued behind active dispatch");
        }
    }

    fn dispatch(&self) {
        let label = &self.inner.config.label;
        let mut guard = DispatchGuard {
            inner: &self.inner,
            armed: true,
        };

        loop {
            let (committed, listeners) = {
                let mut core = lock(&self.inner.core);
                let Some(committed) = core.pending.pop_front() else {
                    // Cleared in the same critical section that saw the queue
                    // empty, so a concurrent commit either lands before this
                    // or starts its own dispatch.
                    core.dispatching = false;
                    guard.armed = false;
                    return;
                };
                let listeners: SmallVec<[Arc<dyn Listener<S>>; 8]> =
                    core.listeners.iter().cloned().collect();
                (committed, listeners)
            };

            let mut delivered = 0_u64;
            let mut suppressed = 0_u64;
            for listener in &listeners {
                if listener.since() >= committed.version {
                    continue;
                }
                match listener.deliver(&committed.state) {
                    Delivery::Delivered => delivered += 1,
                    Delivery::Suppressed => suppressed += 1,
                    Delivery::Inactive => {}
                }
                tracing::trace!(
                    store = %label,
                    subscriber = listener.id(),
                    version = committed.version,
                    "Offered state to subscriber"
                );
            }

            counter!(NOTIFICATIONS_DELIVERED, "store" => label.clone()).increment(delivered);
            counter!(NOTIFICATIONS_SUPPRESSED, "store" => label.clone()).increment(suppressed);
        }
    }

    /// Register a projected listener; returns the handle and the seed value
    ///
    /// The seed is the projection of the state current at registration and
    /// becomes the listener's change-detection baseline. It is not delivered.
    pub(crate) fn register<T, C>(
        &self,
        projector: Projector<S, T>,
        callback: C,
    ) -> (Subscription, T)
    where
        T: Identity + Clone + Send + 'static,
        C: Fn(T) + Send + Sync + 'static,
    {
        let label = &self.inner.config.label;
        let active = Arc::new(AtomicBool::new(true));

        let (id, seed, count) = {
            let mut core = lock(&self.inner.core);
            let id = core.next_id;
            core.next_id += 1;

            let seed = projector(&core.current);
            let listener = ProjectedListener {
                id,
                since: core.version,
                active: Arc::clone(&active),
                projector,
                last: Mutex::new(seed.clone()),
                callback: Box::new(callback),
            };
            core.listeners.push(Arc::new(listener));
            (id, seed, core.listeners.len())
        };

        tracing::debug!(store = %label, subscriber = id, "Subscribed");
        #[allow(clippy::cast_precision_loss)]
        gauge!(SUBSCRIBERS, "store" => label.clone()).set(count as f64);
        if count > self.inner.config.subscriber_warn_threshold {
            tracing::warn!(
                store = %label,
                subscribers = count,
                threshold = self.inner.config.subscriber_warn_threshold,
                "Subscriber count above threshold, subscriptions may be leaking"
            );
        }

        let weak: Weak<StoreInner<S>> = Arc::downgrade(&self.inner);
        let teardown = Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                // The removed listener is dropped after the lock is released,
                // since its callback may own handles into this store.
                let (removed, count) = {
                    let mut core = lock(&inner.core);
                    let removed = core
                        .listeners
                        .iter()
                        .position(|listener| listener.id() == id)
                        .map(|index| core.listeners.remove(index));
                    (removed, core.listeners.len())
                };
                drop(removed);
                tracing::debug!(store = %inner.config.label, subscriber = id, "Unsubscribed");
                #[allow(clippy::cast_precision_loss)]
                gauge!(SUBSCRIBERS, "store" => inner.config.label.clone()).set(count as f64);
            }
        });

        (
            Subscription {
                active,
                teardown: Some(teardown),
            },
            seed,
        )
    }
}

impl<S> Clone for StateStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for StateStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = lock(&self.inner.core);
        f.debug_struct("StateStore")
            .field("label", &self.inner.config.label)
            .field("version", &core.version)
            .field("subscribers", &core.listeners.len())
            .field("state", &core.current)
            .finish()
    }
}

/// A projected, duplicate-suppressing view of a store
///
/// Subscribing registers a callback that receives every projected value
/// that is not the [`same`](Identity::same) as the previous one. Nothing is
/// replayed on subscribe: read [`current`](Self::current) first when an
/// initial value is needed.
pub struct Selection<S, T> {
    store: StateStore<S>,
    projector: Projector<S, T>,
}

impl<S, T> Selection<S, T>
where
    S: Send + Sync + 'static,
    T: Identity + Clone + Send + 'static,
{
    /// Projection of the current state
    #[must_use]
    pub fn current(&self) -> T {
        (self.projector)(&self.store.state())
    }

    /// The store this selection reads from
    #[must_use]
    pub const fn store(&self) -> &StateStore<S> {
        &self.store
    }

    /// The projector this selection applies
    #[must_use]
    pub const fn projector(&self) -> &Projector<S, T> {
        &self.projector
    }

    /// Start observing; `callback` runs for every changed projection
    ///
    /// The returned [`Subscription`] unsubscribes when dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<C>(&self, callback: C) -> Subscription
    where
        C: Fn(T) + Send + Sync + 'static,
    {
        self.store
            .register(Arc::clone(&self.projector), callback)
            .0
    }

    /// Start observing and also return the baseline value
    ///
    /// The baseline is the projection at registration time, read in the
    /// same critical section that registers the callback, so no change can
    /// fall between the two.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe_seeded<C>(&self, callback: C) -> (Subscription, T)
    where
        C: Fn(T) + Send + Sync + 'static,
    {
        self.store.register(Arc::clone(&self.projector), callback)
    }

    /// Observe as an async [`Stream`](futures::Stream)
    #[must_use]
    pub fn into_stream(self) -> SelectionStream<T> {
        SelectionStream::new(&self)
    }
}

impl<S, T> Clone for Selection<S, T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            projector: Arc::clone(&self.projector),
        }
    }
}

/// Handle to an active subscription
///
/// Dropping the handle unsubscribes. Once [`unsubscribe`](Self::unsubscribe)
/// returns (or the handle is dropped) the callback is never invoked again
/// from this thread, including for a delivery round already in progress.
pub struct Subscription {
    active: Arc<AtomicBool>,
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Returns true until the subscription is torn down
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stop observing
    pub fn unsubscribe(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
