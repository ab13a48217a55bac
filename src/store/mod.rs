//! Persistence seams
//!
//! [`Repository`] is plain id-keyed CRUD with owner filtering. Carts go
//! through [`CartStore`], whose `save` is a compare-and-swap on the cart
//! version so concurrent mutations for one customer cannot interleave.

mod memory;

pub use memory::{MemoryCartStore, MemoryRepository};

use crate::domain::aggregates::{Cart, CartLine, Component, ProductGroup, Sku};
use crate::Result;

pub trait Entity: Clone + Send + Sync + 'static {
    const KIND: &'static str;
    fn id(&self) -> &str;
}

impl Entity for Component {
    const KIND: &'static str = "Component";
    fn id(&self) -> &str { Component::id(self) }
}

impl Entity for ProductGroup {
    const KIND: &'static str = "Product group";
    fn id(&self) -> &str { ProductGroup::id(self) }
}

impl Entity for Sku {
    const KIND: &'static str = "SKU";
    fn id(&self) -> &str { Sku::id(self) }
}

pub trait Repository<T: Entity>: Send + Sync {
    fn find(&self, id: &str) -> Result<Option<T>>;
    fn create(&self, entity: T) -> Result<T>;
    /// Errors with `NotFound` when no entity has the id.
    fn update(&self, entity: T) -> Result<T>;
    fn delete(&self, id: &str) -> Result<Option<T>>;
    /// Insertion order.
    fn list(&self) -> Result<Vec<T>>;
    fn filter(&self, predicate: &dyn Fn(&T) -> bool) -> Result<Vec<T>>;

    fn get(&self, id: &str) -> Result<T> {
        self.find(id)?.ok_or_else(|| crate::CatalogError::not_found(T::KIND, id))
    }
}

pub trait CartStore: Send + Sync {
    /// The customer's cart, or an empty cart at version 0.
    fn load(&self, customer_id: &str) -> Result<Cart>;
    /// Stores `lines` if the stored version still equals `expected_version`
    /// and returns the new version; otherwise `VersionConflict`.
    fn save(&self, customer_id: &str, expected_version: u64, lines: Vec<CartLine>) -> Result<u64>;
}
