//! Inbound fan-out.
//!
//! Frames are resolved to a [`Route`] and handed to every handler registered
//! under the resulting [`Discriminator`], in registration order.

pub mod route;

pub use route::{CONFIG_CHANGED, Discriminator, Route, ServerAction};

use models::ServerFrame;

use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use log::{debug, error, trace};

pub type Handler = Arc<dyn Fn(&ServerFrame) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Default)]
struct SubscriptionTable {
    next_id: u64,
    handlers: HashMap<Discriminator, Vec<(SubscriptionId, Handler)>>,
}

impl SubscriptionTable {
    fn remove(&mut self, id: SubscriptionId) -> bool {
        let mut emptied = None;
        let mut removed = false;

        for (discriminator, entries) in self.handlers.iter_mut() {
            if let Some(index) = entries.iter().position(|(entry_id, _)| *entry_id == id) {
                entries.remove(index);
                removed = true;
                if entries.is_empty() {
                    emptied = Some(discriminator.clone());
                }
                break;
            }
        }

        if let Some(discriminator) = emptied {
            self.handlers.remove(&discriminator);
        }
        removed
    }
}

/// Subscription table shared between callers and the connection task.
///
/// Cloning is cheap; every clone sees the same table.
#[derive(Clone, Default)]
pub struct MessageRouter {
    table: Arc<RwLock<SubscriptionTable>>,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `discriminator`, after any existing handlers.
    ///
    /// Dropping the returned [`Subscription`] keeps the handler registered.
    pub fn subscribe<F>(&self, discriminator: impl Into<Discriminator>, handler: F) -> Subscription
    where
        F: Fn(&ServerFrame) + Send + Sync + 'static,
    {
        let discriminator = discriminator.into();
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);

        table.next_id += 1;
        let id = SubscriptionId(table.next_id);
        table
            .handlers
            .entry(discriminator.clone())
            .or_default()
            .push((id, Arc::new(handler)));

        debug!("Subscribed {} to '{}'", id, discriminator);

        Subscription {
            id,
            discriminator,
            table: Arc::downgrade(&self.table),
        }
    }

    /// Remove every handler registered under `discriminator`.
    ///
    /// Returns the number of handlers removed.
    pub fn unsubscribe(&self, discriminator: &str) -> usize {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let removed = table
            .handlers
            .remove(discriminator)
            .map_or(0, |entries| entries.len());

        debug!("Unsubscribed {} handler(s) from '{}'", removed, discriminator);
        removed
    }

    /// Remove exactly one handler. Returns false if it was already gone.
    pub fn unsubscribe_handle(&self, id: SubscriptionId) -> bool {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let removed = table.remove(id);
        if removed {
            debug!("Unsubscribed {}", id);
        }
        removed
    }

    pub fn handler_count(&self, discriminator: &str) -> usize {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.handlers.get(discriminator).map_or(0, Vec::len)
    }

    /// Invoke every handler for `discriminator` with `frame`.
    ///
    /// Handlers run on a snapshot of the table, so they may subscribe or
    /// unsubscribe while being called. A panicking handler is logged and the
    /// remaining handlers still run. Returns the number of handlers invoked.
    pub fn dispatch(&self, discriminator: &Discriminator, frame: &ServerFrame) -> usize {
        let snapshot: Vec<(SubscriptionId, Handler)> = {
            let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
            match table.handlers.get(discriminator.as_str()) {
                Some(entries) => entries.clone(),
                None => Vec::new(),
            }
        };

        if snapshot.is_empty() {
            trace!("No subscribers for '{}'", discriminator);
            return 0;
        }

        for (id, handler) in &snapshot {
            if catch_unwind(AssertUnwindSafe(|| handler(frame))).is_err() {
                error!("Handler {} for '{}' panicked", id, discriminator);
            }
        }

        snapshot.len()
    }
}

impl fmt::Debug for MessageRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<&str> = table.handlers.keys().map(Discriminator::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("MessageRouter")
            .field("discriminators", &keys)
            .finish()
    }
}

/// Handle for one registered handler.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: SubscriptionId,
    discriminator: Discriminator,
    table: Weak<RwLock<SubscriptionTable>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn discriminator(&self) -> &Discriminator {
        &self.discriminator
    }

    /// Remove this handler only. Returns false if it was already removed.
    pub fn cancel(self) -> bool {
        let Some(table) = self.table.upgrade() else {
            return false;
        };
        let mut table = table.write().unwrap_or_else(PoisonError::into_inner);
        let removed = table.remove(self.id);
        if removed {
            debug!("Cancelled {} on '{}'", self.id, self.discriminator);
        }
        removed
    }
}
