//! Aggregates module
pub mod cart;
pub mod component;
pub mod product_group;
pub mod scheme;
pub mod sku;

pub use cart::{
    Cart, CartError, CartLine, CartLinePatch, ColorSelection, ExtendedOrderFields, ExtendedOrderPatch, NewCartLine,
    RawColorSelection, SchemeChoice,
};
pub use component::{Component, ComponentError, Part};
pub use product_group::ProductGroup;
pub use scheme::{
    sync_component_schemes, validate_configuration, ColorAssignment, ColorScheme, ComponentColorSchemes, ConfigurationReport,
    SchemeError,
};
pub use sku::{ColorCombination, Sku, SkuError};
