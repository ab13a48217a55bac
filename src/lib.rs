//! OpenSASE Catalog
//!
//! Variant configuration and resolution for multi-part products.
//!
//! ## Features
//! - Color resolution from hex, rgb, color-card codes and import labels
//! - Components, parts and per-component color schemes
//! - SKU resolution from a buyer's color selection
//! - Cart consolidation (merge on SKU + color scheme identity)
//! - Catalog import text parsing

pub mod api;
pub mod config;
pub mod domain;
pub mod services;
pub mod store;

use thiserror::Error;

use crate::domain::aggregates::{CartError, ComponentError, SchemeError, SkuError};

pub use crate::domain::color::{ColorCardRegistry, ColorLabel, ColorResolver};
pub use crate::domain::value_objects::{ColorValue, Money};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Cart item not found")]
    CartItemNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid color scheme: {0}")]
    InvalidScheme(#[from] SchemeError),

    #[error("Invalid component: {0}")]
    InvalidComponent(#[from] ComponentError),

    #[error("Color combination already used by SKU {existing_sku}")]
    CombinationConflict { existing_sku: String },

    #[error("Concurrent modification, retries exhausted")]
    VersionConflict,

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl CatalogError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }
}

impl From<CartError> for CatalogError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::ItemNotFound => Self::CartItemNotFound,
            CartError::InvalidQuantity => Self::Validation(e.to_string()),
        }
    }
}

impl From<SkuError> for CatalogError {
    fn from(e: SkuError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<validator::ValidationErrors> for CatalogError {
    fn from(e: validator::ValidationErrors) -> Self {
        Self::Validation(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
