//! In-memory stores

use std::collections::HashMap;
use std::sync::RwLock;

use super::{CartStore, Entity, Repository};
use crate::domain::aggregates::{Cart, CartLine};
use crate::{CatalogError, Result};

fn poisoned<E>(_: E) -> CatalogError { CatalogError::StorageError("lock poisoned".into()) }

pub struct MemoryRepository<T> {
    rows: RwLock<Vec<T>>,
}

impl<T> MemoryRepository<T> {
    pub fn new() -> Self { Self { rows: RwLock::new(vec![]) } }
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self { Self::new() }
}

impl<T: Entity> Repository<T> for MemoryRepository<T> {
    fn find(&self, id: &str) -> Result<Option<T>> {
        Ok(self.rows.read().map_err(poisoned)?.iter().find(|r| r.id() == id).cloned())
    }

    fn create(&self, entity: T) -> Result<T> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        if rows.iter().any(|r| r.id() == entity.id()) {
            return Err(CatalogError::StorageError(format!("duplicate {} id {}", T::KIND, entity.id())));
        }
        rows.push(entity.clone());
        Ok(entity)
    }

    fn update(&self, entity: T) -> Result<T> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        let slot = rows.iter_mut().find(|r| r.id() == entity.id()).ok_or_else(|| CatalogError::not_found(T::KIND, entity.id()))?;
        *slot = entity.clone();
        Ok(entity)
    }

    fn delete(&self, id: &str) -> Result<Option<T>> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        Ok(rows.iter().position(|r| r.id() == id).map(|i| rows.remove(i)))
    }

    fn list(&self) -> Result<Vec<T>> { Ok(self.rows.read().map_err(poisoned)?.clone()) }

    fn filter(&self, predicate: &dyn Fn(&T) -> bool) -> Result<Vec<T>> {
        Ok(self.rows.read().map_err(poisoned)?.iter().filter(|r| predicate(r)).cloned().collect())
    }
}

#[derive(Default)]
pub struct MemoryCartStore {
    carts: RwLock<HashMap<String, (u64, Vec<CartLine>)>>,
}

impl MemoryCartStore {
    pub fn new() -> Self { Self::default() }
}

impl CartStore for MemoryCartStore {
    fn load(&self, customer_id: &str) -> Result<Cart> {
        let carts = self.carts.read().map_err(poisoned)?;
        Ok(match carts.get(customer_id) {
            Some((version, lines)) => Cart::restore(customer_id, *version, lines.clone()),
            None => Cart::new(customer_id),
        })
    }

    fn save(&self, customer_id: &str, expected_version: u64, lines: Vec<CartLine>) -> Result<u64> {
        let mut carts = self.carts.write().map_err(poisoned)?;
        let current = carts.get(customer_id).map_or(0, |(v, _)| *v);
        if current != expected_version { return Err(CatalogError::VersionConflict); }
        let next = current + 1;
        carts.insert(customer_id.to_string(), (next, lines));
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Component, Part};

    fn component(code: &str) -> Component {
        Component::create(code, code, code, vec![Part::new("Pole", "杆")]).unwrap()
    }

    #[test]
    fn test_repository_crud() {
        let repo = MemoryRepository::new();
        let a = repo.create(component("A")).unwrap();
        repo.create(component("B")).unwrap();
        assert!(repo.create(a.clone()).is_err());
        assert_eq!(repo.get(a.id()).unwrap().code(), "A");
        assert_eq!(repo.list().unwrap().iter().map(|c| c.code().to_string()).collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(repo.filter(&|c: &Component| c.code() == "B").unwrap().len(), 1);

        let mut renamed = a.clone();
        renamed.rename("杆组", "Pole set");
        assert_eq!(repo.update(renamed).unwrap().name_alt(), "Pole set");

        assert!(repo.delete(a.id()).unwrap().is_some());
        assert!(repo.delete(a.id()).unwrap().is_none());
        assert!(matches!(repo.get(a.id()), Err(CatalogError::NotFound { kind: "Component", .. })));
    }

    #[test]
    fn test_cart_store_compare_and_swap() {
        let store = MemoryCartStore::new();
        let cart = store.load("C1").unwrap();
        assert_eq!(cart.version(), 0);
        assert_eq!(store.save("C1", 0, vec![]).unwrap(), 1);
        assert!(matches!(store.save("C1", 0, vec![]), Err(CatalogError::VersionConflict)));
        assert_eq!(store.load("C1").unwrap().version(), 1);
    }
}
