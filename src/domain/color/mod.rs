//! Color resolution: card registry, free-text resolver, import labels

pub mod card;
pub mod label;
pub mod resolve;

pub use card::{ColorCardEntry, ColorCardRegistry, ColorFamily};
pub use label::{decompose, ColorLabel, LabelRule, DEFAULT_MATERIAL};
pub use resolve::{ColorResolver, ResolveRule};
