use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{error::CatalogError, models::CatalogItem};

/// Request status of the current load cycle.
///
/// Within one cycle the only legal transitions are
/// `Idle -> Loading -> (Succeeded | Failed)`. Cancelling an in-flight
/// cycle returns the store to `Idle` so a remounted view may start a
/// fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// No load has been started (or the previous one was cancelled).
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The catalog holds the most recent successful payload.
    Succeeded,
    /// The fetch failed; `error()` carries the message.
    Failed,
}

/// Change notifications published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The load status changed.
    StatusChanged(LoadStatus),
    /// The catalog was replaced; carries the new item count.
    CatalogReplaced(usize),
    /// The cart grew; carries the new length.
    CartChanged(usize),
}

/// Handle tied to one load cycle.
///
/// The view layer keeps the token while its screen is mounted and calls
/// [`CatalogStore::cancel_load`] on unmount; a completion arriving with
/// a cancelled or superseded token never touches the store.
#[derive(Debug, Clone)]
pub struct LoadToken {
    generation: u64,
    cancelled: Arc<AtomicBool>,
}

impl LoadToken {
    /// Whether the owning view has cancelled this cycle.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Process-wide storefront state: catalog, cart, and load status.
///
/// Constructed once at startup and handed to the view layer; cloning
/// shares the same underlying state.
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    items: Vec<CatalogItem>,
    cart: Vec<CatalogItem>,
    status: LoadStatus,
    error: Option<String>,
    loaded_at: Option<DateTime<Utc>>,
    generation: u64,
    subscribers: Vec<mpsc::UnboundedSender<StoreEvent>>,
}

impl Inner {
    fn publish(&mut self, event: StoreEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    /// Create an empty store with status [`LoadStatus::Idle`].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                items: Vec::new(),
                cart: Vec::new(),
                status: LoadStatus::Idle,
                error: None,
                loaded_at: None,
                generation: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Current load status.
    pub fn status(&self) -> LoadStatus {
        self.inner.read().status
    }

    /// Failure message of the last cycle, present iff status is `Failed`.
    pub fn error(&self) -> Option<String> {
        self.inner.read().error.clone()
    }

    /// Snapshot of the loaded catalog.
    pub fn items(&self) -> Vec<CatalogItem> {
        self.inner.read().items.clone()
    }

    /// Snapshot of the cart, in add order.
    pub fn cart(&self) -> Vec<CatalogItem> {
        self.inner.read().cart.clone()
    }

    /// Number of items in the cart.
    pub fn cart_len(&self) -> usize {
        self.inner.read().cart.len()
    }

    /// When the catalog was last replaced by a successful load.
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().loaded_at
    }

    /// Register a change listener. Dropping the receiver unregisters;
    /// closed channels are pruned on the next publish.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<StoreEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.write().subscribers.push(tx);
        rx
    }

    /// Start a load cycle.
    ///
    /// Only one cycle may ever be in flight: the call refuses unless the
    /// status is `Idle`. On success the status moves to `Loading`, any
    /// previous error is cleared, and the returned token must accompany
    /// the eventual [`complete_load`](Self::complete_load).
    pub fn begin_load(&self) -> Option<LoadToken> {
        let mut inner = self.inner.write();
        if inner.status != LoadStatus::Idle {
            debug!(status = ?inner.status, "begin_load refused; store not idle");
            return None;
        }
        inner.generation += 1;
        inner.status = LoadStatus::Loading;
        inner.error = None;
        let token = LoadToken {
            generation: inner.generation,
            cancelled: Arc::new(AtomicBool::new(false)),
        };
        info!(generation = token.generation, "catalog load started");
        inner.publish(StoreEvent::StatusChanged(LoadStatus::Loading));
        Some(token)
    }

    /// Apply the outcome of a load cycle.
    ///
    /// The outcome is dropped when the token was cancelled, belongs to a
    /// superseded cycle, or the store is no longer `Loading`. Returns
    /// whether the outcome was applied.
    pub fn complete_load(
        &self,
        token: &LoadToken,
        result: Result<Vec<CatalogItem>, CatalogError>,
    ) -> bool {
        let mut inner = self.inner.write();
        if token.is_cancelled()
            || token.generation != inner.generation
            || inner.status != LoadStatus::Loading
        {
            warn!(
                generation = token.generation,
                cancelled = token.is_cancelled(),
                status = ?inner.status,
                "dropping stale load completion"
            );
            return false;
        }

        match result {
            Ok(items) => {
                let count = items.len();
                inner.items = items;
                inner.loaded_at = Some(Utc::now());
                inner.status = LoadStatus::Succeeded;
                info!(count, "catalog load succeeded");
                inner.publish(StoreEvent::CatalogReplaced(count));
                inner.publish(StoreEvent::StatusChanged(LoadStatus::Succeeded));
            }
            Err(err) => {
                let message = err.message().to_string();
                info!(error = %message, "catalog load failed");
                inner.error = Some(message);
                inner.status = LoadStatus::Failed;
                inner.publish(StoreEvent::StatusChanged(LoadStatus::Failed));
            }
        }
        true
    }

    /// Cancel an in-flight cycle from the view layer.
    ///
    /// The token is marked so a late completion becomes a no-op; when
    /// the cycle is still the current one the store returns to `Idle`.
    pub fn cancel_load(&self, token: &LoadToken) {
        token.cancel();
        let mut inner = self.inner.write();
        if token.generation == inner.generation && inner.status == LoadStatus::Loading {
            info!(generation = token.generation, "catalog load cancelled");
            inner.status = LoadStatus::Idle;
            inner.publish(StoreEvent::StatusChanged(LoadStatus::Idle));
        }
    }

    /// Append an item to the cart. Always succeeds; duplicates are kept.
    pub fn add_to_cart(&self, item: CatalogItem) {
        let mut inner = self.inner.write();
        inner.cart.push(item);
        let len = inner.cart.len();
        debug!(len, "item added to cart");
        inner.publish(StoreEvent::CartChanged(len));
    }

    /// Look up a catalog item by id. `None` is the normal not-found
    /// outcome, not an error.
    pub fn select_by_id(&self, id: &str) -> Option<CatalogItem> {
        self.inner
            .read()
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, price: f64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: name.to_string(),
            price,
            description: String::new(),
            image: String::new(),
        }
    }

    #[test]
    fn load_cycle_success_replaces_catalog() {
        let store = CatalogStore::new();
        assert_eq!(store.status(), LoadStatus::Idle);

        let token = store.begin_load().expect("idle store accepts load");
        assert_eq!(store.status(), LoadStatus::Loading);

        let payload = vec![item("1", "Roadster", 500.0)];
        assert!(store.complete_load(&token, Ok(payload.clone())));
        assert_eq!(store.status(), LoadStatus::Succeeded);
        assert_eq!(store.items(), payload);
        assert!(store.error().is_none());
        assert!(store.loaded_at().is_some());
    }

    #[test]
    fn load_cycle_failure_stores_message_verbatim() {
        let store = CatalogStore::new();
        let token = store.begin_load().expect("begin");
        assert!(store.complete_load(
            &token,
            Err(CatalogError::Http("Network Error".to_string()))
        ));
        assert_eq!(store.status(), LoadStatus::Failed);
        assert_eq!(store.error().as_deref(), Some("Network Error"));
        assert!(store.items().is_empty());
    }

    #[test]
    fn begin_load_refuses_unless_idle() {
        let store = CatalogStore::new();
        let token = store.begin_load().expect("begin");
        assert!(store.begin_load().is_none(), "loading store refuses");

        store.complete_load(&token, Ok(Vec::new()));
        assert!(store.begin_load().is_none(), "terminal store refuses");
    }

    #[test]
    fn cancelled_token_never_mutates() {
        let store = CatalogStore::new();
        let token = store.begin_load().expect("begin");
        store.cancel_load(&token);
        assert_eq!(store.status(), LoadStatus::Idle);

        // The late completion arrives after the view unmounted.
        assert!(!store.complete_load(&token, Ok(vec![item("1", "Ghost", 1.0)])));
        assert!(store.items().is_empty());
        assert_eq!(store.status(), LoadStatus::Idle);
    }

    #[test]
    fn superseded_token_is_dropped() {
        let store = CatalogStore::new();
        let first = store.begin_load().expect("begin");
        store.cancel_load(&first);
        let second = store.begin_load().expect("fresh cycle after cancel");

        assert!(!store.complete_load(&first, Ok(vec![item("1", "Stale", 1.0)])));
        assert!(store.complete_load(&second, Ok(vec![item("2", "Fresh", 2.0)])));
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].name, "Fresh");
    }

    #[test]
    fn cancel_after_completion_keeps_terminal_state() {
        let store = CatalogStore::new();
        let token = store.begin_load().expect("begin");
        store.complete_load(&token, Ok(vec![item("1", "Roadster", 500.0)]));
        store.cancel_load(&token);
        assert_eq!(store.status(), LoadStatus::Succeeded);
        assert_eq!(store.items().len(), 1);
    }

    #[test]
    fn cart_grows_by_one_per_add_in_fifo_order() {
        let store = CatalogStore::new();
        assert_eq!(store.cart_len(), 0);

        for idx in 0..4 {
            store.add_to_cart(item(&idx.to_string(), &format!("Bike {idx}"), 10.0));
            assert_eq!(store.cart_len(), idx + 1);
        }
        let names: Vec<String> = store.cart().into_iter().map(|entry| entry.name).collect();
        assert_eq!(names, ["Bike 0", "Bike 1", "Bike 2", "Bike 3"]);

        // Duplicates are accepted as-is.
        store.add_to_cart(item("0", "Bike 0", 10.0));
        assert_eq!(store.cart_len(), 5);
    }

    #[test]
    fn select_by_id_finds_loaded_items_only() {
        let store = CatalogStore::new();
        let token = store.begin_load().expect("begin");
        store.complete_load(
            &token,
            Ok(vec![item("1", "Roadster", 500.0), item("2", "Gravel", 800.0)]),
        );

        assert_eq!(store.select_by_id("2").map(|i| i.name).as_deref(), Some("Gravel"));
        assert!(store.select_by_id("99").is_none());
        assert!(store.select_by_id("").is_none());
    }

    #[test]
    fn subscribers_observe_changes_and_are_pruned() {
        let store = CatalogStore::new();
        let mut rx = store.subscribe();
        let dropped = store.subscribe();
        drop(dropped);

        let token = store.begin_load().expect("begin");
        assert_eq!(
            rx.try_recv().ok(),
            Some(StoreEvent::StatusChanged(LoadStatus::Loading))
        );

        store.complete_load(&token, Ok(vec![item("1", "Roadster", 500.0)]));
        assert_eq!(rx.try_recv().ok(), Some(StoreEvent::CatalogReplaced(1)));
        assert_eq!(
            rx.try_recv().ok(),
            Some(StoreEvent::StatusChanged(LoadStatus::Succeeded))
        );

        store.add_to_cart(item("1", "Roadster", 500.0));
        assert_eq!(rx.try_recv().ok(), Some(StoreEvent::CartChanged(1)));
        assert!(rx.try_recv().is_err());

        // Publishing pruned the closed subscriber.
        assert_eq!(store.inner.read().subscribers.len(), 1);
    }
}
