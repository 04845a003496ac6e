//! View binding between a store selection and a rendering component.
//!
//! A rendering component pulls its data when it paints; the store pushes
//! changes when they happen. [`ViewBinding`] bridges the two:
//!
//! 1. On construction it reads `projector(store.state())` synchronously, so
//!    the first paint is never blank.
//! 2. [`mount`](ViewBinding::mount) subscribes to the selection; every
//!    changed value is stored and the component's invalidation callback is
//!    invoked to request a re-render.
//! 3. [`unmount`](ViewBinding::unmount), drop, or
//!    [`rebind`](ViewBinding::rebind) tear the subscription down before
//!    anything else happens, so a torn-down component is never notified.
//!
//! `rebind` compares the store and projector by identity and does nothing
//! when both are unchanged. Keep projectors in a long-lived
//! [`Projector`] rather than building a fresh closure on every render.

use crate::lock;
use crate::store::{StateStore, Subscription};
use composable_state_core::{Identity, Projector};
use std::sync::{Arc, Mutex};

type Invalidate = Arc<dyn Fn() + Send + Sync>;

/// Live, projected value for a rendering component
///
/// # Example
///
/// ```ignore
/// let loading = projector(|s: &Arc<TodosState>| s.loading);
/// let mut binding = ViewBinding::new(store.clone(), loading);
///
/// // First paint
/// render(binding.get());
///
/// // Re-render on change
/// let notify = Arc::new(tokio::sync::Notify::new());
/// let signal = Arc::clone(&notify);
/// binding.mount(move || signal.notify_one());
/// ```
pub struct ViewBinding<S, T> {
    store: StateStore<S>,
    projector: Projector<S, T>,
    value: Arc<Mutex<T>>,
    on_change: Option<Invalidate>,
    subscription: Option<Subscription>,
}

impl<S, T> ViewBinding<S, T>
where
    S: Send + Sync + 'static,
    T: Identity + Clone + Send + 'static,
{
    /// Create an unmounted binding, initialized from the current state
    #[must_use]
    pub fn new(store: StateStore<S>, projector: Projector<S, T>) -> Self {
        let initial = projector(&store.state());

        Self {
            store,
            projector,
            value: Arc::new(Mutex::new(initial)),
            on_change: None,
            subscription: None,
        }
    }

    /// The value to render
    #[must_use]
    pub fn get(&self) -> T {
        lock(&self.value).clone()
    }

    /// Returns true while subscribed
    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// The store this binding observes
    #[must_use]
    pub const fn store(&self) -> &StateStore<S> {
        &self.store
    }

    /// Subscribe; `on_change` runs after every value change
    ///
    /// Mounting an already mounted binding replaces the callback and
    /// re-subscribes. If the state moved between construction and mount,
    /// the value is refreshed and `on_change` runs once immediately.
    pub fn mount<F>(&mut self, on_change: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.unmount();
        self.on_change = Some(Arc::new(on_change));
        self.subscribe();
    }

    /// Unsubscribe; no notification reaches this binding afterwards
    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            tracing::trace!(store = %self.store.config().label, "View binding unmounted");
        }
    }

    /// Point the binding at another store and/or projector
    ///
    /// Returns `false` without touching the subscription when both are the
    /// same as before. Otherwise the old subscription is torn down first,
    /// the value is re-read synchronously, and the binding re-subscribes if
    /// it was mounted.
    pub fn rebind(&mut self, store: StateStore<S>, projector: Projector<S, T>) -> bool {
        if self.store.same_store(&store) && Arc::ptr_eq(&self.projector, &projector) {
            return false;
        }

        let was_mounted = self.is_mounted();
        self.unmount();

        self.store = store;
        self.projector = projector;
        let fresh = (self.projector)(&self.store.state());
        *lock(&self.value) = fresh;

        if was_mounted {
            self.subscribe();
        }
        true
    }

    fn subscribe(&mut self) {
        let Some(on_change) = self.on_change.clone() else {
            return;
        };

        let value = Arc::clone(&self.value);
        let notify = Arc::clone(&on_change);
        let (subscription, seed) = self
            .store
            .select_with(Arc::clone(&self.projector))
            .subscribe_seeded(move |next| {
                *lock(&value) = next;
                notify();
            });

        let changed = {
            let mut current = lock(&self.value);
            let changed = !current.same(&seed);
            *current = seed;
            changed
        };

        self.subscription = Some(subscription);
        tracing::trace!(store = %self.store.config().label, "View binding mounted");
        if changed {
            on_change();
        }
    }
}
