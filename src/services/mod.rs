//! Application services over the domain and the stores
pub mod cart;
pub mod catalog;

pub use cart::{AddedLine, CartService};
pub use catalog::{CatalogService, ImportPreview};
