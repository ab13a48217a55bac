//! Cart service
//!
//! Every mutation runs load → apply → compare-and-swap save. A lost race
//! reloads and reapplies against the winner's state, so a merge is never
//! applied twice to the same stored version.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::aggregates::{Cart, CartLine, CartLinePatch, NewCartLine};
use crate::store::CartStore;
use crate::{CatalogError, Result};

/// The stored line after add-to-cart. `merged` is set when the candidate
/// was folded into a line that already had its identity.
#[derive(Clone, Debug)]
pub struct AddedLine {
    pub line: CartLine,
    pub merged: bool,
}

pub struct CartService {
    store: Arc<dyn CartStore>,
    max_attempts: u32,
}

impl CartService {
    pub fn new(store: Arc<dyn CartStore>, max_attempts: u32) -> Self {
        Self { store, max_attempts: max_attempts.max(1) }
    }

    /// Lines newest first.
    pub fn get_cart(&self, customer_id: &str) -> Result<Vec<CartLine>> {
        Ok(self.store.load(customer_id)?.newest_first())
    }

    pub fn add_item(&self, customer_id: &str, candidate: NewCartLine) -> Result<AddedLine> {
        let added = self.mutate(customer_id, |cart| {
            let merged = cart.find_line(&candidate.sku_id, &candidate.color_scheme).is_some();
            Ok(AddedLine { line: cart.add_item(candidate.clone())?, merged })
        })?;
        let line = &added.line;
        info!(customer_id, line_id = %line.id, sku_id = %line.sku_id, quantity = line.quantity, merged = added.merged, "cart item added");
        Ok(added)
    }

    pub fn update_item(&self, customer_id: &str, line_id: &str, patch: CartLinePatch) -> Result<CartLine> {
        self.mutate(customer_id, |cart| Ok(cart.update_item(line_id, patch.clone())?))
    }

    pub fn remove_item(&self, customer_id: &str, line_id: &str) -> Result<CartLine> {
        self.mutate(customer_id, |cart| Ok(cart.remove_item(line_id)?))
    }

    pub fn clear_cart(&self, customer_id: &str) -> Result<usize> {
        self.mutate(customer_id, |cart| Ok(cart.clear()))
    }

    /// Replaces the whole cart with a guest session's lines.
    pub fn sync_cart(&self, customer_id: &str, lines: Vec<NewCartLine>) -> Result<Vec<CartLine>> {
        let count = self.mutate(customer_id, |cart| Ok(cart.replace_all(lines.clone())?))?;
        info!(customer_id, lines = count, "cart synced");
        self.get_cart(customer_id)
    }

    fn mutate<T>(&self, customer_id: &str, apply: impl Fn(&mut Cart) -> Result<T>) -> Result<T> {
        for attempt in 1..=self.max_attempts {
            let mut cart = self.store.load(customer_id)?;
            let outcome = apply(&mut cart)?;
            match self.store.save(customer_id, cart.version(), cart.lines().to_vec()) {
                Ok(version) => {
                    for event in cart.take_events() { debug!(?event, version, "cart event"); }
                    return Ok(outcome);
                }
                Err(CatalogError::VersionConflict) => {
                    warn!(customer_id, attempt, "cart changed concurrently, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(CatalogError::VersionConflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{ColorSelection, ExtendedOrderFields};
    use crate::domain::value_objects::Money;
    use crate::store::MemoryCartStore;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn candidate(sku: &str, quantity: u32) -> NewCartLine {
        NewCartLine {
            sku_id: sku.into(), product_code: "MP007".into(), product_name: "Mop".into(), color_scheme: ColorSelection::new(),
            quantity, price: Money::cny(Decimal::new(10, 0)), extended: ExtendedOrderFields::default(),
        }
    }

    fn service() -> CartService { CartService::new(Arc::new(MemoryCartStore::new()), 3) }

    #[test]
    fn test_add_update_remove() {
        let carts = service();
        assert!(!carts.add_item("C1", candidate("X", 2)).unwrap().merged);
        let AddedLine { line, merged } = carts.add_item("C1", candidate("X", 3)).unwrap();
        assert!(merged);
        assert_eq!(line.quantity, 5);
        assert_eq!(carts.get_cart("C1").unwrap().len(), 1);

        let patch = CartLinePatch { quantity: Some(1), ..Default::default() };
        assert_eq!(carts.update_item("C1", &line.id, patch).unwrap().quantity, 1);
        assert!(matches!(carts.remove_item("C1", "nope"), Err(CatalogError::CartItemNotFound)));
        carts.remove_item("C1", &line.id).unwrap();
        assert!(carts.get_cart("C1").unwrap().is_empty());
    }

    #[test]
    fn test_sync_replaces_cart() {
        let carts = service();
        carts.add_item("C1", candidate("OLD", 1)).unwrap();
        let lines = carts.sync_cart("C1", vec![candidate("A", 1), candidate("B", 2)]).unwrap();
        assert_eq!(lines.iter().map(|l| l.sku_id.as_str()).collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(carts.clear_cart("C1").unwrap(), 2);
        assert!(matches!(carts.sync_cart("C1", vec![candidate("A", 0)]), Err(CatalogError::Validation(_))));
    }

    /// Loses the first `conflicts` saves to a competing writer.
    struct Contended { inner: MemoryCartStore, conflicts: AtomicU32 }

    impl CartStore for Contended {
        fn load(&self, customer_id: &str) -> Result<Cart> { self.inner.load(customer_id) }
        fn save(&self, customer_id: &str, expected: u64, lines: Vec<CartLine>) -> Result<u64> {
            if self.conflicts.load(Ordering::SeqCst) > 0 {
                self.conflicts.fetch_sub(1, Ordering::SeqCst);
                let mut rival = self.inner.load(customer_id)?;
                rival.add_item(candidate("X", 1)).unwrap();
                self.inner.save(customer_id, rival.version(), rival.lines().to_vec())?;
                return Err(CatalogError::VersionConflict);
            }
            self.inner.save(customer_id, expected, lines)
        }
    }

    #[test]
    fn test_retry_reapplies_on_winner_state() {
        let store = Arc::new(Contended { inner: MemoryCartStore::new(), conflicts: AtomicU32::new(1) });
        let carts = CartService::new(store.clone(), 3);
        let added = carts.add_item("C1", candidate("X", 2)).unwrap();
        // the retry sees the rival's line and merges into it
        assert!(added.merged);
        assert_eq!(added.line.quantity, 3);
        assert_eq!(carts.get_cart("C1").unwrap().len(), 1);

        store.conflicts.store(5, Ordering::SeqCst);
        assert!(matches!(carts.add_item("C1", candidate("X", 1)), Err(CatalogError::VersionConflict)));
    }
}
