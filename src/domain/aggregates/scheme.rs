//! Color schemes
//!
//! A scheme names one complete color assignment across every part of a
//! component. Stored payloads use the `{part, color, hexColor}` shape.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use super::component::Component;
use crate::domain::value_objects::{ColorValue, ColorValueError};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AssignmentRecord", into = "AssignmentRecord")]
pub struct ColorAssignment {
    pub part_name: String,
    pub color: ColorValue,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignmentRecord {
    part: String,
    color: String,
    #[serde(alias = "hex")]
    hex_color: String,
}

impl TryFrom<AssignmentRecord> for ColorAssignment {
    type Error = ColorValueError;
    fn try_from(r: AssignmentRecord) -> Result<Self, Self::Error> {
        Ok(Self { part_name: r.part, color: ColorValue::new(r.color, &r.hex_color)? })
    }
}

impl From<ColorAssignment> for AssignmentRecord {
    fn from(a: ColorAssignment) -> Self {
        Self { part: a.part_name, color: a.color.name().to_string(), hex_color: a.color.hex().to_string() }
    }
}

impl ColorAssignment {
    pub fn new(part_name: impl Into<String>, color: ColorValue) -> Self { Self { part_name: part_name.into(), color } }
    pub fn placeholder(part_name: impl Into<String>) -> Self { Self::new(part_name, ColorValue::placeholder()) }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    #[serde(rename = "schemeName", alias = "name")]
    pub name: String,
    #[serde(rename = "colors")]
    pub assignments: Vec<ColorAssignment>,
}

impl ColorScheme {
    pub fn new(name: impl Into<String>, assignments: Vec<ColorAssignment>) -> Self {
        Self { name: name.into(), assignments }
    }

    /// Every part of `component`, all placeholders.
    pub fn template(component: &Component, name: impl Into<String>) -> Self {
        Self::new(name, component.part_names().map(ColorAssignment::placeholder).collect())
    }

    pub fn color_for(&self, part_name: &str) -> Option<&ColorValue> {
        self.assignments.iter().find(|a| a.part_name == part_name).map(|a| &a.color)
    }

    /// Aligns the assignments with the component's current parts, in part
    /// order: new parts get a placeholder, removed parts are dropped.
    pub fn reconcile(&self, component: &Component) -> ColorScheme {
        let assignments = component.part_names()
            .map(|part| match self.color_for(part) {
                Some(color) => ColorAssignment::new(part, color.clone()),
                None => ColorAssignment::placeholder(part),
            })
            .collect();
        ColorScheme::new(self.name.clone(), assignments)
    }

    /// Exactly one assignment per part of `component`.
    pub fn check_coverage(&self, component: &Component) -> Result<(), SchemeError> {
        let mut seen = HashSet::new();
        for a in &self.assignments {
            if !component.has_part(&a.part_name) { return Err(SchemeError::UnknownPart(a.part_name.clone())); }
            if !seen.insert(a.part_name.as_str()) { return Err(SchemeError::DuplicatePart(a.part_name.clone())); }
        }
        match component.part_names().find(|p| !seen.contains(p)) {
            Some(missing) => Err(SchemeError::MissingPart(missing.to_string())),
            None => Ok(()),
        }
    }

    pub fn unconfigured_parts(&self) -> Vec<String> {
        self.assignments.iter().filter(|a| a.color.is_placeholder()).map(|a| a.part_name.clone()).collect()
    }

    pub fn is_complete_for(&self, component: &Component) -> bool {
        self.check_coverage(component).is_ok() && self.unconfigured_parts().is_empty()
    }

    /// Gate applied before a scheme is stored.
    pub fn validate_for_save(&self, component: &Component) -> Result<(), SchemeError> {
        if self.name.trim().is_empty() { return Err(SchemeError::EmptyName); }
        self.check_coverage(component)?;
        let unconfigured = self.unconfigured_parts();
        if !unconfigured.is_empty() { return Err(SchemeError::Unconfigured(unconfigured)); }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentColorSchemes {
    pub component_code: String,
    pub schemes: Vec<ColorScheme>,
}

impl ComponentColorSchemes {
    pub fn empty(component_code: impl Into<String>) -> Self { Self { component_code: component_code.into(), schemes: vec![] } }
}

/// Keeps one entry per selected component: appends empty entries for new
/// selections (in selection order) and drops deselected ones. Returns
/// whether anything changed.
pub fn sync_in_place(entries: &mut Vec<ComponentColorSchemes>, selected: &[String]) -> bool {
    let before = entries.len();
    entries.retain(|e| selected.contains(&e.component_code));
    let mut changed = entries.len() != before;
    for code in selected {
        if !entries.iter().any(|e| &e.component_code == code) {
            entries.push(ComponentColorSchemes::empty(code.clone()));
            changed = true;
        }
    }
    changed
}

pub fn sync_component_schemes(selected: &[String], existing: &[ComponentColorSchemes]) -> Vec<ComponentColorSchemes> {
    let mut entries = existing.to_vec();
    sync_in_place(&mut entries, selected);
    entries
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConfigurationReport {
    pub complete: bool,
    pub missing: Vec<String>,
}

/// A selected component is missing when it has no definition, no schemes,
/// or any scheme that does not color every part.
pub fn validate_configuration(selected: &[String], entries: &[ComponentColorSchemes], components: &[Component]) -> ConfigurationReport {
    let missing: Vec<String> = selected.iter()
        .filter(|code| {
            let component = components.iter().find(|c| c.code() == code.as_str());
            let entry = entries.iter().find(|e| &e.component_code == *code);
            match (component, entry) {
                (Some(component), Some(entry)) => entry.schemes.is_empty() || !entry.schemes.iter().all(|s| s.is_complete_for(component)),
                _ => true,
            }
        })
        .cloned()
        .collect();
    ConfigurationReport { complete: missing.is_empty(), missing }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemeError {
    #[error("scheme name is empty")]
    EmptyName,
    #[error("parts without a color: {}", .0.join(", "))]
    Unconfigured(Vec<String>),
    #[error("part '{0}' has no color assignment")]
    MissingPart(String),
    #[error("part '{0}' is not on the component")]
    UnknownPart(String),
    #[error("part '{0}' is assigned twice")]
    DuplicatePart(String),
    #[error("component '{0}' is not selected")]
    ComponentNotSelected(String),
    #[error("component '{0}' has no parts defined")]
    NoParts(String),
    #[error("no scheme at index {0}")]
    IndexOutOfRange(usize),
}
