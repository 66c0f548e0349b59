//! # Home Controller
//!
//! Keeps the latest snapshot of both collections and turns user intent into
//! gateway calls.
//!
//! ## Flow
//! intent → gateway mutation → full refresh of that collection → publish
//!
//! ## Publishing
//! - Every refresh takes a sequence number from its collection when issued
//! - A result only replaces the snapshot when its number is newer than the published one,
//!   so a slow stale refresh never overwrites a newer one
//! - Tasks only keep a weak handle on the controller; once it is dropped, results are discarded
//! - Overlapping calls are allowed, nothing is cancelled
use std::sync::{
    Arc, Weak,
    atomic::{AtomicU64, Ordering},
};

use records::{Note, NoteDraft, PriceOrder, Product, ProductDraft, Record, sort_by_price};
use tokio::{sync::watch, task::JoinHandle};
use tracing::debug;

use crate::documents::RecordStore;

/// Collection contents as of refresh `seq`. Zero before the first refresh lands.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot<T> {
    pub seq: u64,
    pub items: Vec<T>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            seq: 0,
            items: Vec::new(),
        }
    }
}

struct Cell<T> {
    issued: AtomicU64,
    tx: watch::Sender<Snapshot<T>>,
}

impl<T> Cell<T> {
    fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            tx: watch::Sender::new(Snapshot::default()),
        }
    }

    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn publish(&self, seq: u64, items: Vec<T>) -> bool {
        self.tx.send_if_modified(|current| {
            if seq <= current.seq {
                return false;
            }

            current.seq = seq;
            current.items = items;
            true
        })
    }
}

struct Shared {
    notes: Cell<Note>,
    products: Cell<Product>,
}

trait Slot: Record {
    fn cell(shared: &Shared) -> &Cell<Self>;
}

impl Slot for Note {
    fn cell(shared: &Shared) -> &Cell<Self> {
        &shared.notes
    }
}

impl Slot for Product {
    fn cell(shared: &Shared) -> &Cell<Self> {
        &shared.products
    }
}

pub struct HomeController {
    store: RecordStore,
    shared: Arc<Shared>,
}

impl HomeController {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            shared: Arc::new(Shared {
                notes: Cell::new(),
                products: Cell::new(),
            }),
        }
    }

    pub fn load_data(&self) -> JoinHandle<()> {
        let notes = self.refresh::<Note>();
        let products = self.refresh::<Product>();

        tokio::spawn(async move {
            let _ = tokio::join!(notes, products);
        })
    }

    pub fn reload_notes(&self) -> JoinHandle<()> {
        self.refresh::<Note>()
    }

    pub fn reload_products(&self) -> JoinHandle<()> {
        self.refresh::<Product>()
    }

    pub fn add_note(&self, draft: NoteDraft) -> JoinHandle<()> {
        self.mutate::<Note, _, _>(move |store| async move {
            let _ = store.add::<Note>(&draft).await;
        })
    }

    pub fn add_product(&self, draft: ProductDraft) -> JoinHandle<()> {
        self.mutate::<Product, _, _>(move |store| async move {
            let _ = store.add::<Product>(&draft).await;
        })
    }

    pub fn edit_note(&self, id: impl Into<String>, draft: NoteDraft) -> JoinHandle<()> {
        let id = id.into();
        self.mutate::<Note, _, _>(move |store| async move {
            let _ = store.update::<Note>(&id, &draft).await;
        })
    }

    pub fn edit_product(&self, id: impl Into<String>, draft: ProductDraft) -> JoinHandle<()> {
        let id = id.into();
        self.mutate::<Product, _, _>(move |store| async move {
            let _ = store.update::<Product>(&id, &draft).await;
        })
    }

    pub fn delete_note(&self, id: impl Into<String>) -> JoinHandle<()> {
        let id = id.into();
        self.mutate::<Note, _, _>(move |store| async move {
            let _ = store.delete::<Note>(&id).await;
        })
    }

    pub fn delete_product(&self, id: impl Into<String>) -> JoinHandle<()> {
        let id = id.into();
        self.mutate::<Product, _, _>(move |store| async move {
            let _ = store.delete::<Product>(&id).await;
        })
    }

    pub fn notes(&self) -> Vec<Note> {
        self.shared.notes.tx.borrow().items.clone()
    }

    pub fn products(&self) -> Vec<Product> {
        self.shared.products.tx.borrow().items.clone()
    }

    pub fn products_sorted(&self, order: PriceOrder) -> Vec<Product> {
        let mut products = self.products();
        sort_by_price(&mut products, order);
        products
    }

    pub fn subscribe_notes(&self) -> watch::Receiver<Snapshot<Note>> {
        self.shared.notes.tx.subscribe()
    }

    pub fn subscribe_products(&self) -> watch::Receiver<Snapshot<Product>> {
        self.shared.products.tx.subscribe()
    }

    /// Issues a refresh now; the returned handle resolves once it has landed or been discarded.
    fn refresh<R: Slot>(&self) -> JoinHandle<()> {
        let seq = R::cell(&self.shared).issue();
        let store = self.store.clone();
        let shared = Arc::downgrade(&self.shared);

        tokio::spawn(async move {
            let items = store.get_all::<R>().await;
            publish::<R>(&shared, seq, items);
        })
    }

    fn mutate<R, F, Fut>(&self, op: F) -> JoinHandle<()>
    where
        R: Slot,
        F: FnOnce(RecordStore) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let store = self.store.clone();
        let shared = Arc::downgrade(&self.shared);

        tokio::spawn(async move {
            op(store.clone()).await;

            // the refresh is numbered once the mutation is done
            let Some(seq) = shared.upgrade().map(|shared| R::cell(&shared).issue()) else {
                debug!("Controller dropped, skipping {} refresh", R::COLLECTION);
                return;
            };

            let items = store.get_all::<R>().await;
            publish::<R>(&shared, seq, items);
        })
    }
}

fn publish<R: Slot>(shared: &Weak<Shared>, seq: u64, items: Vec<R>) {
    let Some(shared) = shared.upgrade() else {
        debug!("Controller dropped, discarding {} #{seq}", R::COLLECTION);
        return;
    };

    if !R::cell(&shared).publish(seq, items) {
        debug!("Discarding stale {} #{seq}", R::COLLECTION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_last_issued_wins() {
        let cell: Cell<u32> = Cell::new();
        let first = cell.issue();
        let second = cell.issue();

        assert!(cell.publish(second, vec![2]));
        assert!(!cell.publish(first, vec![1]));
        assert_eq!(cell.tx.borrow().items, vec![2]);
        assert_eq!(cell.tx.borrow().seq, second);
    }

    #[test]
    fn test_cell_in_order() {
        let cell: Cell<u32> = Cell::new();
        let first = cell.issue();
        let second = cell.issue();

        assert!(cell.publish(first, vec![1]));
        assert!(cell.publish(second, vec![2, 3]));
        assert_eq!(cell.tx.borrow().items, vec![2, 3]);
    }
}
