//! Subscription management for live queries.
//!
//! This module provides subscription IDs, a manager for tracking registered
//! callbacks, and the `Subscription` handle returned to subscribers.
//!
//! Delivery never holds the registry lock, so callbacks may subscribe or
//! cancel (including their own subscription) while being notified. Each slot
//! carries a reentrant delivery guard: cancelling from another thread waits
//! for an in-flight delivery to finish, and once `cancel()` returns the
//! callback is never invoked again.

use parking_lot::{Mutex, ReentrantMutex};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Unique identifier for a subscription.
pub type SubscriptionId = u64;

/// Callback type for change notifications.
///
/// Returning `ControlFlow::Break(())` ends the subscription.
pub type ChangeCallback<T> = Box<dyn Fn(&T) -> ControlFlow<()> + Send + Sync>;

struct Slot<T> {
    active: Arc<AtomicBool>,
    delivery: ReentrantMutex<()>,
    callback: ChangeCallback<T>,
}

impl<T> Slot<T> {
    fn deliver(&self, value: &T) -> ControlFlow<()> {
        let _guard = self.delivery.lock();
        if !self.active.load(Ordering::Acquire) {
            return ControlFlow::Continue(());
        }
        let flow = (self.callback)(value);
        if flow.is_break() {
            self.active.store(false, Ordering::Release);
        }
        flow
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
        // Wait out a delivery running on another thread.
        drop(self.delivery.lock());
    }
}

struct Registry<T> {
    slots: BTreeMap<SubscriptionId, Arc<Slot<T>>>,
    next_id: SubscriptionId,
}

/// Manages the subscriptions of one observable source.
///
/// Cloning a manager yields another handle to the same registry.
pub struct SubscriptionManager<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T> Clone for SubscriptionManager<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T: 'static> Default for SubscriptionManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> SubscriptionManager<T> {
    /// Creates a new subscription manager.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                slots: BTreeMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Subscribes to notifications with the given callback.
    ///
    /// The subscription lives until the returned handle is cancelled or
    /// dropped, or until the callback returns `ControlFlow::Break`.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) -> ControlFlow<()> + Send + Sync + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let slot = Arc::new(Slot {
            active: Arc::clone(&active),
            delivery: ReentrantMutex::new(()),
            callback: Box::new(callback),
        });

        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.slots.insert(id, Arc::clone(&slot));
            id
        };
        debug!(subscription = id, "subscription opened");

        let registry = Arc::downgrade(&self.registry);
        Subscription::new(id, active, move || {
            slot.deactivate();
            remove_slot(&registry, id);
            debug!(subscription = id, "subscription cancelled");
        })
    }

    /// Notifies a specific subscription.
    ///
    /// Returns false if the subscription does not exist or has ended.
    pub fn notify(&self, id: SubscriptionId, value: &T) -> bool {
        let slot = self.registry.lock().slots.get(&id).cloned();
        match slot {
            Some(slot) => {
                if slot.deliver(value).is_break() {
                    self.unsubscribe(id);
                    return false;
                }
                true
            }
            None => false,
        }
    }

    /// Notifies all active subscriptions in subscription order.
    pub fn notify_all(&self, value: &T) {
        let slots: Vec<(SubscriptionId, Arc<Slot<T>>)> = self
            .registry
            .lock()
            .slots
            .iter()
            .map(|(id, slot)| (*id, Arc::clone(slot)))
            .collect();

        for (id, slot) in slots {
            if slot.deliver(value).is_break() {
                self.unsubscribe(id);
            }
        }
    }

    /// Removes a subscription by ID without waiting for in-flight deliveries.
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.registry.lock().slots.remove(&id);
        match removed {
            Some(slot) => {
                slot.active.store(false, Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// Returns the number of active subscriptions.
    #[inline]
    pub fn len(&self) -> usize {
        self.registry.lock().slots.len()
    }

    /// Returns true if there are no subscriptions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registry.lock().slots.is_empty()
    }

    /// Returns all subscription IDs.
    pub fn subscription_ids(&self) -> Vec<SubscriptionId> {
        self.registry.lock().slots.keys().copied().collect()
    }

    /// Ends every subscription.
    pub fn clear(&self) {
        let slots = std::mem::take(&mut self.registry.lock().slots);
        for slot in slots.values() {
            slot.active.store(false, Ordering::Release);
        }
    }
}

fn remove_slot<T>(registry: &Weak<Mutex<Registry<T>>>, id: SubscriptionId) {
    if let Some(registry) = registry.upgrade() {
        registry.lock().slots.remove(&id);
    }
}

/// Handle to a live subscription.
///
/// Cancelling (explicitly or by dropping the handle) is synchronous: once it
/// returns, the callback will not run again and the registration is released.
#[must_use = "dropping a Subscription cancels it"]
pub struct Subscription {
    id: SubscriptionId,
    active: Arc<AtomicBool>,
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Creates a handle that runs `cancel` once when cancelled or dropped.
    pub fn new<F>(id: SubscriptionId, active: Arc<AtomicBool>, cancel: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            id,
            active,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Returns the subscription ID.
    #[inline]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns whether the subscription can still deliver.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Cancels the subscription.
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
