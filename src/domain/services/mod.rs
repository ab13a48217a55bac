//! Domain services: pure functions over aggregates
pub mod variant;

pub use variant::{find_collision, resolve_sku, Selection};
