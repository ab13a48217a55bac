//! Variant resolution
//!
//! A SKU satisfies a selection when, for every component both constrain,
//! each selected part's color name equals the SKU's stored color name.
//! SKU creation keeps the SKUs of a group mutually exclusive under that
//! same rule, so a selection sampled from one SKU's schemes finds only it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::aggregates::{ColorCombination, ColorScheme, Sku};

/// Component code → part name → chosen color name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeMap<String, BTreeMap<String, String>>);

impl Selection {
    pub fn new() -> Self { Self::default() }

    pub fn choose(mut self, component_code: impl Into<String>, part_name: impl Into<String>, color_name: impl Into<String>) -> Self {
        self.0.entry(component_code.into()).or_default().insert(part_name.into(), color_name.into());
        self
    }

    /// One scheme per component, every part constrained.
    pub fn from_schemes<'a>(schemes: impl IntoIterator<Item = (&'a str, &'a ColorScheme)>) -> Self {
        Self(schemes.into_iter()
            .map(|(code, s)| (code.to_string(), s.assignments.iter().map(|a| (a.part_name.clone(), a.color.name().to_string())).collect()))
            .collect())
    }

    /// Components both sides mention must agree part by part. A part the
    /// SKU does not color never matches.
    pub fn matches(&self, combination: &ColorCombination) -> bool {
        self.0.iter().all(|(code, parts)| match combination.get(code) {
            None => true,
            Some(_) => parts.iter().all(|(part, wanted)| {
                combination.color_of(code, part).is_some_and(|c| c.name() == wanted)
            }),
        })
    }
}

/// Every part of every component the combination colors, keyed by name.
impl From<&ColorCombination> for Selection {
    fn from(combination: &ColorCombination) -> Self {
        Self(combination.iter()
            .map(|(code, assignments)| (code.to_string(), assignments.iter().map(|a| (a.part_name.clone(), a.color.name().to_string())).collect()))
            .collect())
    }
}

/// First SKU whose combination satisfies `selection`; `None` means the
/// combination is unavailable.
pub fn resolve_sku<'a>(skus: impl IntoIterator<Item = &'a Sku>, selection: &Selection) -> Option<&'a Sku> {
    skus.into_iter().find(|sku| selection.matches(sku.color_combination()))
}

/// An existing SKU that `resolve_sku` could not tell apart from
/// `combination`: either one's full selection is satisfied by the other.
pub fn find_collision<'a>(skus: impl IntoIterator<Item = &'a Sku>, combination: &ColorCombination) -> Option<&'a Sku> {
    let incoming = Selection::from(combination);
    skus.into_iter().find(|sku| {
        let existing = sku.color_combination();
        incoming.matches(existing) || Selection::from(existing).matches(combination)
    })
}
