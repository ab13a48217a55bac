//! Product Group Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::component::Component;
use super::scheme::{sync_in_place, validate_configuration, ColorScheme, ComponentColorSchemes, ConfigurationReport, SchemeError};
use crate::domain::events::{CatalogEvent, DomainEvent};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductGroup {
    id: String,
    name_local: String,
    name_alt: String,
    selected_components: Vec<String>,
    color_schemes: Vec<ComponentColorSchemes>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl ProductGroup {
    pub fn create(name_local: impl Into<String>, name_alt: impl Into<String>) -> Self {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut group = Self {
            id: id.clone(), name_local: name_local.into(), name_alt: name_alt.into(),
            selected_components: vec![], color_schemes: vec![], created_at: now, updated_at: now, events: vec![],
        };
        group.raise_event(DomainEvent::Catalog(CatalogEvent::GroupCreated { group_id: id }));
        group
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn name_local(&self) -> &str { &self.name_local }
    pub fn name_alt(&self) -> &str { &self.name_alt }
    pub fn selected_components(&self) -> &[String] { &self.selected_components }
    pub fn color_schemes(&self) -> &[ComponentColorSchemes] { &self.color_schemes }
    pub fn declares(&self, code: &str) -> bool { self.selected_components.iter().any(|c| c == code) }

    pub fn schemes_for(&self, code: &str) -> Option<&ComponentColorSchemes> {
        self.color_schemes.iter().find(|e| e.component_code == code)
    }

    /// Replaces the selection (duplicates dropped, order kept) and syncs the
    /// scheme book. Returns false when nothing changed.
    pub fn select_components(&mut self, codes: Vec<String>) -> bool {
        let mut selection: Vec<String> = Vec::with_capacity(codes.len());
        for code in codes.into_iter().map(|c| c.trim().to_string()).filter(|c| !c.is_empty()) {
            if !selection.contains(&code) { selection.push(code); }
        }
        let selection_changed = selection != self.selected_components;
        self.selected_components = selection;
        let book_changed = sync_in_place(&mut self.color_schemes, &self.selected_components);
        if selection_changed || book_changed {
            self.touch();
            self.raise_event(DomainEvent::Catalog(CatalogEvent::ComponentsSelected {
                group_id: self.id.clone(), components: self.selected_components.clone(),
            }));
        }
        selection_changed || book_changed
    }

    /// Fresh all-placeholder scheme named after the next free slot.
    pub fn new_scheme(&self, component: &Component) -> Result<ColorScheme, SchemeError> {
        let entry = self.entry(component.code())?;
        if component.parts().is_empty() { return Err(SchemeError::NoParts(component.code().to_string())); }
        Ok(ColorScheme::template(component, format!("Scheme{}", entry.schemes.len() + 1)))
    }

    /// Copy of a stored scheme reconciled against the component's parts.
    pub fn edit_scheme(&self, component: &Component, index: usize) -> Result<ColorScheme, SchemeError> {
        let entry = self.entry(component.code())?;
        let scheme = entry.schemes.get(index).ok_or(SchemeError::IndexOutOfRange(index))?;
        Ok(scheme.reconcile(component))
    }

    /// Appends (`index == None`) or replaces a scheme after validation.
    pub fn save_scheme(&mut self, component: &Component, index: Option<usize>, scheme: ColorScheme) -> Result<(), SchemeError> {
        scheme.validate_for_save(component)?;
        let entry = self.entry_mut(component.code())?;
        match index {
            Some(i) => *entry.schemes.get_mut(i).ok_or(SchemeError::IndexOutOfRange(i))? = scheme.clone(),
            None => entry.schemes.push(scheme.clone()),
        }
        self.touch();
        self.raise_event(DomainEvent::Catalog(CatalogEvent::SchemeSaved {
            group_id: self.id.clone(), component_code: component.code().to_string(), scheme_name: scheme.name,
        }));
        Ok(())
    }

    pub fn delete_scheme(&mut self, code: &str, index: usize) -> Result<ColorScheme, SchemeError> {
        let entry = self.entry_mut(code)?;
        if index >= entry.schemes.len() { return Err(SchemeError::IndexOutOfRange(index)); }
        let removed = entry.schemes.remove(index);
        self.touch();
        self.raise_event(DomainEvent::Catalog(CatalogEvent::SchemeDeleted {
            group_id: self.id.clone(), component_code: code.to_string(), scheme_name: removed.name.clone(),
        }));
        Ok(removed)
    }

    pub fn validate(&self, components: &[Component]) -> ConfigurationReport {
        validate_configuration(&self.selected_components, &self.color_schemes, components)
    }

    fn entry(&self, code: &str) -> Result<&ComponentColorSchemes, SchemeError> {
        self.schemes_for(code).ok_or_else(|| SchemeError::ComponentNotSelected(code.to_string()))
    }

    fn entry_mut(&mut self, code: &str) -> Result<&mut ComponentColorSchemes, SchemeError> {
        self.color_schemes.iter_mut().find(|e| e.component_code == code)
            .ok_or_else(|| SchemeError::ComponentNotSelected(code.to_string()))
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}
