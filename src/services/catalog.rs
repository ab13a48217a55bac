//! Catalog service: components, product groups, schemes and SKUs

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::aggregates::{
    ColorCombination, ColorScheme, Component, ComponentColorSchemes, ConfigurationReport, Part, ProductGroup, Sku,
};
use crate::domain::color::{decompose, ColorCardRegistry, ColorLabel, ColorResolver};
use crate::domain::import::{self, ComponentSpec};
use crate::domain::services::variant::{self, Selection};
use crate::domain::value_objects::{ColorValue, Money};
use crate::store::{MemoryRepository, Repository};
use crate::{CatalogError, Result};

/// What a catalog import sheet would produce, before anything is stored.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub components: Vec<ComponentSpec>,
    pub color_schemes: Vec<ComponentColorSchemes>,
    /// Color lines naming a component the product sheet does not list.
    pub unknown_codes: Vec<String>,
    pub set_type: Option<String>,
    /// Color texts nothing resolved; they carry the neutral gray.
    pub unresolved_colors: Vec<String>,
}

pub struct CatalogService {
    registry: Arc<ColorCardRegistry>,
    components: Arc<dyn Repository<Component>>,
    groups: Arc<dyn Repository<ProductGroup>>,
    skus: Arc<dyn Repository<Sku>>,
}

impl CatalogService {
    /// In-memory repositories.
    pub fn new(registry: Arc<ColorCardRegistry>) -> Self {
        Self::with_repositories(
            registry,
            Arc::new(MemoryRepository::new()),
            Arc::new(MemoryRepository::new()),
            Arc::new(MemoryRepository::new()),
        )
    }

    pub fn with_repositories(
        registry: Arc<ColorCardRegistry>,
        components: Arc<dyn Repository<Component>>,
        groups: Arc<dyn Repository<ProductGroup>>,
        skus: Arc<dyn Repository<Sku>>,
    ) -> Self {
        Self { registry, components, groups, skus }
    }

    pub fn registry(&self) -> &ColorCardRegistry { &self.registry }
    fn resolver(&self) -> ColorResolver<'_> { ColorResolver::new(&self.registry) }

    // =========================================================================
    // Colors
    // =========================================================================

    pub fn resolve_color(&self, text: &str) -> Option<ColorValue> {
        let color = self.resolver().resolve(text);
        debug!(input = text, resolved = ?color, "resolve color");
        color
    }

    pub fn decompose_color_label(&self, text: &str) -> ColorLabel { decompose(&self.resolver(), text) }

    // =========================================================================
    // Components
    // =========================================================================

    pub fn create_component(&self, code: &str, name_local: &str, name_alt: &str, parts: Vec<Part>) -> Result<Component> {
        let component = Component::create(code, name_local, name_alt, parts)?;
        if self.find_component(component.code())?.is_some() {
            return Err(CatalogError::Validation(format!("component code {} already exists", component.code())));
        }
        let component = self.components.create(component)?;
        info!(code = component.code(), parts = component.parts().len(), "component created");
        Ok(component)
    }

    pub fn list_components(&self) -> Result<Vec<Component>> { self.components.list() }

    pub fn find_component(&self, code: &str) -> Result<Option<Component>> {
        Ok(self.components.filter(&|c: &Component| c.code() == code)?.into_iter().next())
    }

    pub fn component(&self, code: &str) -> Result<Component> {
        self.find_component(code)?.ok_or_else(|| CatalogError::not_found("Component", code))
    }

    pub fn update_component(&self, code: &str, name_local: &str, name_alt: &str, parts: Vec<Part>) -> Result<Component> {
        let mut component = self.component(code)?;
        component.replace_parts(parts)?;
        component.rename(name_local, name_alt);
        self.components.update(component)
    }

    /// Refused while any product group still selects the component.
    pub fn delete_component(&self, code: &str) -> Result<Component> {
        let component = self.component(code)?;
        let users = self.groups.filter(&|g: &ProductGroup| g.declares(code))?;
        if let Some(group) = users.first() {
            return Err(CatalogError::Validation(format!("component {} is used by product group {}", code, group.id())));
        }
        self.components.delete(component.id())?;
        info!(code, "component deleted");
        Ok(component)
    }

    // =========================================================================
    // Product groups and schemes
    // =========================================================================

    pub fn create_group(&self, name_local: &str, name_alt: &str) -> Result<ProductGroup> {
        let group = ProductGroup::create(name_local, name_alt);
        let group = self.groups.create(self.drain(group))?;
        info!(group_id = group.id(), "product group created");
        Ok(group)
    }

    pub fn group(&self, id: &str) -> Result<ProductGroup> { self.groups.get(id) }
    pub fn list_groups(&self) -> Result<Vec<ProductGroup>> { self.groups.list() }

    /// Every code must name an existing component.
    pub fn select_components(&self, group_id: &str, codes: Vec<String>) -> Result<ProductGroup> {
        for code in &codes { self.component(code.trim())?; }
        let mut group = self.group(group_id)?;
        if group.select_components(codes) {
            group = self.groups.update(self.drain(group))?;
        }
        Ok(group)
    }

    pub fn new_scheme_template(&self, group_id: &str, code: &str) -> Result<ColorScheme> {
        Ok(self.group(group_id)?.new_scheme(&self.component(code)?)?)
    }

    pub fn edit_scheme(&self, group_id: &str, code: &str, index: usize) -> Result<ColorScheme> {
        Ok(self.group(group_id)?.edit_scheme(&self.component(code)?, index)?)
    }

    /// Appends when `index` is `None`, otherwise replaces.
    pub fn save_scheme(&self, group_id: &str, code: &str, index: Option<usize>, scheme: ColorScheme) -> Result<ProductGroup> {
        let component = self.component(code)?;
        let mut group = self.group(group_id)?;
        group.save_scheme(&component, index, scheme)?;
        self.groups.update(self.drain(group))
    }

    pub fn delete_scheme(&self, group_id: &str, code: &str, index: usize) -> Result<ColorScheme> {
        let mut group = self.group(group_id)?;
        let removed = group.delete_scheme(code, index)?;
        self.groups.update(self.drain(group))?;
        Ok(removed)
    }

    pub fn validate_group(&self, group_id: &str) -> Result<ConfigurationReport> {
        let group = self.group(group_id)?;
        Ok(group.validate(&self.group_components(&group)?))
    }

    fn group_components(&self, group: &ProductGroup) -> Result<Vec<Component>> {
        self.components.filter(&|c: &Component| group.declares(c.code()))
    }

    fn drain(&self, mut group: ProductGroup) -> ProductGroup {
        for event in group.take_events() { debug!(?event, "catalog event"); }
        group
    }

    // =========================================================================
    // SKUs
    // =========================================================================

    /// Rejects combinations that are structurally incomplete or that
    /// `resolve_sku` could not tell apart from another SKU of the group.
    pub fn create_sku(&self, group_id: &str, product_code: &str, price: Money, combination: ColorCombination) -> Result<Sku> {
        let group = self.group(group_id)?;
        combination.validate_against(&group, &self.group_components(&group)?)?;
        let existing = self.skus_of(group_id)?;
        if let Some(clash) = variant::find_collision(&existing, &combination) {
            return Err(CatalogError::CombinationConflict { existing_sku: clash.product_code().to_string() });
        }
        let sku = self.skus.create(Sku::create(group_id, product_code, price, combination)?)?;
        info!(group_id, sku_id = sku.id(), product_code = sku.product_code(), "sku created");
        Ok(sku)
    }

    pub fn skus_of(&self, group_id: &str) -> Result<Vec<Sku>> {
        self.skus.filter(&|s: &Sku| s.group_id() == group_id)
    }

    /// `None` is a normal outcome: the combination is not offered.
    pub fn resolve_sku(&self, group_id: &str, selection: &Selection) -> Result<Option<Sku>> {
        self.group(group_id)?;
        let skus = self.skus_of(group_id)?;
        let found = variant::resolve_sku(&skus, selection).cloned();
        debug!(group_id, found = ?found.as_ref().map(Sku::id), "resolve sku");
        Ok(found)
    }

    // =========================================================================
    // Import
    // =========================================================================

    pub fn preview_import(&self, spec_text: &str, color_text: &str, product_name: &str) -> ImportPreview {
        let resolver = self.resolver();
        let components = import::parse_product_spec(spec_text);
        let color_schemes = import::parse_color_attributes(&resolver, color_text);
        let unknown_codes = import::validate_component_codes(&components, &color_schemes);

        let mut seen = HashSet::new();
        let unresolved_colors: Vec<String> = color_schemes.iter()
            .flat_map(|entry| entry.schemes.iter())
            .flat_map(|scheme| scheme.assignments.iter())
            .map(|a| a.color.name())
            .filter(|name| decompose(&resolver, name).color == ColorValue::neutral_gray())
            .map(str::to_string)
            .filter(|name| seen.insert(name.clone()))
            .collect();
        for text in &unresolved_colors { warn!(color = %text, "import color not resolved"); }
        if !unknown_codes.is_empty() { warn!(codes = ?unknown_codes, "color lines reference unknown components"); }

        ImportPreview { components, color_schemes, unknown_codes, set_type: import::extract_set_type(product_name), unresolved_colors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::ColorAssignment;
    use rust_decimal::Decimal;

    fn color(name: &str, hex: &str) -> ColorValue { ColorValue::new(name, hex).unwrap() }

    fn scheme(name: &str, pole: (&str, &str), handle: (&str, &str)) -> ColorScheme {
        ColorScheme::new(name, vec![
            ColorAssignment::new("Pole", color(pole.0, pole.1)),
            ColorAssignment::new("Handle", color(handle.0, handle.1)),
        ])
    }

    fn seeded() -> (CatalogService, ProductGroup) {
        let catalog = CatalogService::new(Arc::new(ColorCardRegistry::standard()));
        catalog.create_component("A", "伸缩杆", "Pole set", vec![Part::new("Pole", "杆"), Part::new("Handle", "手柄")]).unwrap();
        let group = catalog.create_group("拖把", "Mop").unwrap();
        let group = catalog.select_components(group.id(), vec!["A".into()]).unwrap();
        (catalog, group)
    }

    #[test]
    fn test_component_rules() {
        let (catalog, _) = seeded();
        assert!(matches!(catalog.create_component("A", "x", "x", vec![Part::new("P", "P")]), Err(CatalogError::Validation(_))));
        assert!(matches!(catalog.create_component("B", "x", "x", vec![]), Err(CatalogError::InvalidComponent(_))));
        assert!(matches!(catalog.delete_component("A"), Err(CatalogError::Validation(_))));
        assert!(matches!(catalog.component("Z"), Err(CatalogError::NotFound { .. })));
    }

    #[test]
    fn test_select_unknown_component() {
        let (catalog, group) = seeded();
        assert!(matches!(catalog.select_components(group.id(), vec!["Z".into()]), Err(CatalogError::NotFound { .. })));
    }

    #[test]
    fn test_scheme_authoring_and_validation() {
        let (catalog, group) = seeded();
        assert!(!catalog.validate_group(group.id()).unwrap().complete);

        let template = catalog.new_scheme_template(group.id(), "A").unwrap();
        assert!(matches!(catalog.save_scheme(group.id(), "A", None, template), Err(CatalogError::InvalidScheme(_))));

        catalog.save_scheme(group.id(), "A", None, scheme("Scheme1", ("Black", "#000000"), ("White", "#FFFFFF"))).unwrap();
        assert!(catalog.validate_group(group.id()).unwrap().complete);

        let mut edited = catalog.edit_scheme(group.id(), "A", 0).unwrap();
        edited.name = "Classic".into();
        let stored = catalog.save_scheme(group.id(), "A", Some(0), edited).unwrap();
        assert_eq!(stored.schemes_for("A").unwrap().schemes[0].name, "Classic");

        assert_eq!(catalog.delete_scheme(group.id(), "A", 0).unwrap().name, "Classic");
        assert!(!catalog.validate_group(group.id()).unwrap().complete);
    }

    #[test]
    fn test_sku_creation_and_resolution() {
        let (catalog, group) = seeded();
        let s1 = scheme("Scheme1", ("Black", "#000000"), ("White", "#FFFFFF"));
        let s2 = scheme("Scheme2", ("Red", "#FF0000"), ("Blue", "#0000FF"));
        let price = Money::cny(Decimal::new(2990, 2));
        catalog.create_sku(group.id(), "MP007-1", price.clone(), ColorCombination::from_schemes([("A", &s1)])).unwrap();
        catalog.create_sku(group.id(), "MP007-2", price.clone(), ColorCombination::from_schemes([("A", &s2)])).unwrap();

        let clash = catalog.create_sku(group.id(), "MP007-3", price.clone(), ColorCombination::from_schemes([("A", &s1)]));
        assert!(matches!(clash, Err(CatalogError::CombinationConflict { existing_sku }) if existing_sku == "MP007-1"));

        let partial = ColorCombination::new().with("A", vec![ColorAssignment::new("Pole", color("Black", "#000000"))]);
        assert!(matches!(catalog.create_sku(group.id(), "MP007-4", price, partial), Err(CatalogError::Validation(_))));

        let hit = catalog.resolve_sku(group.id(), &Selection::new().choose("A", "Pole", "Red").choose("A", "Handle", "Blue")).unwrap();
        assert_eq!(hit.unwrap().product_code(), "MP007-2");
        let miss = catalog.resolve_sku(group.id(), &Selection::new().choose("A", "Pole", "Black").choose("A", "Handle", "Blue")).unwrap();
        assert!(miss.is_none());
    }

    #[test]
    fn test_sku_conflicts_follow_resolution_rule() {
        let (catalog, group) = seeded();
        let price = Money::cny(Decimal::new(2990, 2));
        let black = scheme("Scheme1", ("Black", "#000000"), ("White", "#FFFFFF"));
        catalog.create_sku(group.id(), "S1", price.clone(), ColorCombination::from_schemes([("A", &black)])).unwrap();

        // same names, different hex
        let near_black = scheme("Scheme2", ("Black", "#111111"), ("White", "#FFFFFF"));
        let clash = catalog.create_sku(group.id(), "S2", price.clone(), ColorCombination::from_schemes([("A", &near_black)]));
        assert!(matches!(clash, Err(CatalogError::CombinationConflict { existing_sku }) if existing_sku == "S1"));

        // a wider SKU repeating S1's colors on A
        catalog.create_component("B", "拖头", "Mop head", vec![Part::new("Head", "头")]).unwrap();
        catalog.select_components(group.id(), vec!["A".into(), "B".into()]).unwrap();
        let head = ColorScheme::new("Scheme1", vec![ColorAssignment::new("Head", color("Red", "#FF0000"))]);
        let wide = ColorCombination::from_schemes([("A", &black), ("B", &head)]);
        let clash = catalog.create_sku(group.id(), "S3", price.clone(), wide);
        assert!(matches!(clash, Err(CatalogError::CombinationConflict { existing_sku }) if existing_sku == "S1"));

        let red = scheme("Scheme3", ("Red", "#FF0000"), ("Blue", "#0000FF"));
        catalog.create_sku(group.id(), "S4", price, ColorCombination::from_schemes([("A", &red), ("B", &head)])).unwrap();
        let full = Selection::from_schemes([("A", &red), ("B", &head)]);
        assert_eq!(catalog.resolve_sku(group.id(), &full).unwrap().unwrap().product_code(), "S4");
        let full = Selection::from_schemes([("A", &black), ("B", &head)]);
        assert_eq!(catalog.resolve_sku(group.id(), &full).unwrap().unwrap().product_code(), "S1");
    }

    #[test]
    fn test_preview_import() {
        let catalog = CatalogService::new(Arc::new(ColorCardRegistry::standard()));
        let preview = catalog.preview_import(
            "[A] 伸缩铁杆 | φ19/22*0.27mm*1200mm | 意标螺纹\n[B] 拖把 | 39*9cm",
            "[A] 喷塑:3C冷灰+塑件:10C冷灰 | 喷塑:黑色+塑件:白色\n[C] 塑件:glitter",
            "MP007-清洁四件套",
        );
        assert_eq!(preview.components.len(), 2);
        assert_eq!(preview.color_schemes.len(), 2);
        assert_eq!(preview.unknown_codes, vec!["C".to_string()]);
        assert_eq!(preview.set_type.as_deref(), Some("四件套"));
        assert_eq!(preview.unresolved_colors, vec!["glitter".to_string()]);
    }

    #[test]
    fn test_unresolved_colors_listed_once() {
        let catalog = CatalogService::new(Arc::new(ColorCardRegistry::standard()));
        let preview = catalog.preview_import("[A] 杆\n[B] 拖把", "[A] 塑件:glitter | 塑件:黑色\n[B] 塑件:glitter", "拖把");
        assert_eq!(preview.unresolved_colors, vec!["glitter".to_string()]);
    }
}
