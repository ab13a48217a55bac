//! Domain events
use crate::domain::value_objects::Money;

#[derive(Clone, Debug)]
pub enum DomainEvent {
    Catalog(CatalogEvent),
    Cart(CartEvent),
}

#[derive(Clone, Debug)]
pub enum CatalogEvent {
    GroupCreated { group_id: String },
    ComponentsSelected { group_id: String, components: Vec<String> },
    SchemeSaved { group_id: String, component_code: String, scheme_name: String },
    SchemeDeleted { group_id: String, component_code: String, scheme_name: String },
}

#[derive(Clone, Debug)]
pub enum CartEvent {
    ItemAdded { customer_id: String, line_id: String, sku_id: String, quantity: u32 },
    ItemMerged { customer_id: String, line_id: String, added: u32, quantity: u32, price: Money },
    ItemUpdated { customer_id: String, line_id: String },
    ItemRemoved { customer_id: String, line_id: String },
    Cleared { customer_id: String, removed: usize },
    Synced { customer_id: String, lines: usize },
}
