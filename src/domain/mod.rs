//! Domain layer: aggregates, value objects, events and pure domain services

pub mod aggregates;
pub mod color;
pub mod events;
pub mod import;
pub mod services;
pub mod value_objects;
