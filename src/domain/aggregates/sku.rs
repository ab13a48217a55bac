//! SKU entity and its realized color combination

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

use super::component::Component;
use super::product_group::ProductGroup;
use super::scheme::{ColorAssignment, ColorScheme, SchemeError};
use crate::domain::value_objects::{ColorValue, Money};

/// Component code → the concrete part colors a SKU realizes.
/// Components a SKU does not use are simply absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorCombination(BTreeMap<String, Vec<ColorAssignment>>);

impl ColorCombination {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, component_code: impl Into<String>, assignments: Vec<ColorAssignment>) -> Self {
        self.0.insert(component_code.into(), assignments);
        self
    }

    pub fn from_schemes<'a>(schemes: impl IntoIterator<Item = (&'a str, &'a ColorScheme)>) -> Self {
        Self(schemes.into_iter().map(|(code, s)| (code.to_string(), s.assignments.clone())).collect())
    }

    pub fn get(&self, component_code: &str) -> Option<&[ColorAssignment]> { self.0.get(component_code).map(Vec::as_slice) }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ColorAssignment])> { self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice())) }

    pub fn color_of(&self, component_code: &str, part_name: &str) -> Option<&ColorValue> {
        self.0.get(component_code)?.iter().find(|a| a.part_name == part_name).map(|a| &a.color)
    }

    /// Every component must be declared by the group and fully colored.
    pub fn validate_against(&self, group: &ProductGroup, components: &[Component]) -> Result<(), SkuError> {
        for (code, assignments) in &self.0 {
            if !group.declares(code) { return Err(SkuError::UndeclaredComponent(code.clone())); }
            let component = components.iter().find(|c| c.code() == code).ok_or_else(|| SkuError::UnknownComponent(code.clone()))?;
            let as_scheme = ColorScheme::new(code.clone(), assignments.clone());
            as_scheme.check_coverage(component).map_err(|source| SkuError::Coverage { component: code.clone(), source })?;
            if let Some(part) = as_scheme.unconfigured_parts().into_iter().next() {
                return Err(SkuError::Coverage { component: code.clone(), source: SchemeError::Unconfigured(vec![part]) });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sku {
    id: String,
    group_id: String,
    product_code: String,
    price: Money,
    color_combination: ColorCombination,
    created_at: DateTime<Utc>,
}

impl Sku {
    pub fn create(group_id: impl Into<String>, product_code: impl Into<String>, price: Money, color_combination: ColorCombination) -> Result<Self, SkuError> {
        let product_code = product_code.into().trim().to_string();
        if product_code.is_empty() { return Err(SkuError::EmptyProductCode); }
        if price.is_negative() { return Err(SkuError::NegativePrice); }
        Ok(Self {
            id: Uuid::new_v4().to_string(), group_id: group_id.into(), product_code, price,
            color_combination, created_at: Utc::now(),
        })
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn group_id(&self) -> &str { &self.group_id }
    pub fn product_code(&self) -> &str { &self.product_code }
    pub fn price(&self) -> &Money { &self.price }
    pub fn color_combination(&self) -> &ColorCombination { &self.color_combination }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkuError {
    #[error("product code is empty")]
    EmptyProductCode,
    #[error("price is negative")]
    NegativePrice,
    #[error("component '{0}' is not part of the product group")]
    UndeclaredComponent(String),
    #[error("component '{0}' does not exist")]
    UnknownComponent(String),
    #[error("component '{component}': {source}")]
    Coverage { component: String, source: SchemeError },
}
