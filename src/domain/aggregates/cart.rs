//! Cart Aggregate
//!
//! A customer's lines are identified by `(sku_id, color_scheme)`. Adding a
//! line with an existing identity merges into it; updates overwrite exactly
//! the fields they carry.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::scheme::ColorAssignment;
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{ColorValue, Money};

/// Key used when a legacy flat `{hex, name}` color is migrated.
pub const LEGACY_COMPONENT_KEY: &str = "default";

// =============================================================================
// Color selection
// =============================================================================

/// The scheme a buyer picked for one component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeChoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    pub scheme_name: String,
    pub colors: Vec<ColorAssignment>,
}

impl SchemeChoice {
    pub fn new(scheme_name: impl Into<String>, colors: Vec<ColorAssignment>) -> Self {
        Self { component_name: None, scheme_name: scheme_name.into(), colors }
    }
}

/// Component code → chosen scheme. Compared by value, key order irrelevant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorSelection(BTreeMap<String, SchemeChoice>);

impl ColorSelection {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, component_code: impl Into<String>, choice: SchemeChoice) -> Self {
        self.0.insert(component_code.into(), choice);
        self
    }

    pub fn get(&self, component_code: &str) -> Option<&SchemeChoice> { self.0.get(component_code) }
}

/// Every shape a stored or submitted color selection has taken.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RawColorSelection {
    /// JSON text of any of the other shapes.
    Encoded(String),
    /// Flat `{hex, name}` from before schemes existed.
    LegacyFlat(LegacyColor),
    Components(BTreeMap<String, RawComponentChoice>),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyColor { pub hex: String, pub name: String }

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RawComponentChoice {
    Scheme(SchemeChoice),
    #[serde(rename_all = "camelCase")]
    LegacyColors { #[serde(default)] component_name: Option<String>, colors: Vec<ColorAssignment> },
}

impl RawColorSelection {
    /// Migrates any accepted shape to the canonical map. Unparseable encoded
    /// text becomes an empty selection.
    pub fn normalize(self) -> ColorSelection {
        match self {
            Self::Encoded(text) if text.trim().is_empty() => ColorSelection::new(),
            Self::Encoded(text) => serde_json::from_str::<RawColorSelection>(&text)
                .map(RawColorSelection::normalize)
                .unwrap_or_default(),
            Self::LegacyFlat(LegacyColor { hex, name }) => {
                let color = ColorValue::new(name.clone(), &hex).unwrap_or_else(|_| ColorValue::neutral_gray());
                ColorSelection::new().with(LEGACY_COMPONENT_KEY, SchemeChoice::new(name, vec![ColorAssignment::new(LEGACY_COMPONENT_KEY, color)]))
            }
            Self::Components(map) => ColorSelection(map.into_iter().map(|(code, choice)| {
                let choice = match choice {
                    RawComponentChoice::Scheme(s) => s,
                    RawComponentChoice::LegacyColors { component_name, colors } => SchemeChoice { component_name, scheme_name: "Scheme1".into(), colors },
                };
                (code, choice)
            }).collect()),
        }
    }
}

impl From<RawColorSelection> for ColorSelection {
    fn from(raw: RawColorSelection) -> Self { raw.normalize() }
}

// =============================================================================
// Extended order fields
// =============================================================================

/// Deserializes a present field (even `null`) as `Some(..)`, leaving absent
/// fields to `#[serde(default)]`.
fn explicit<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

macro_rules! order_fields {
    ($($field:ident: $ty:ty),* $(,)?) => {
        /// Optional order attributes carried on a cart line.
        #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct ExtendedOrderFields {
            $( #[serde(default, skip_serializing_if = "Option::is_none")] pub $field: Option<$ty>, )*
        }

        /// Field-wise update: outer `None` leaves a field alone, `Some(None)` clears it.
        #[derive(Clone, Debug, Default, PartialEq, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct ExtendedOrderPatch {
            $( #[serde(default, deserialize_with = "explicit")] pub $field: Option<Option<$ty>>, )*
        }

        impl ExtendedOrderFields {
            /// Takes every field `incoming` defines and keeps the rest.
            pub fn coalesce(&mut self, incoming: ExtendedOrderFields) {
                $( if incoming.$field.is_some() { self.$field = incoming.$field; } )*
            }
        }

        impl ExtendedOrderPatch {
            pub fn apply_to(self, target: &mut ExtendedOrderFields) {
                $( if let Some(value) = self.$field { target.$field = value; } )*
            }
        }
    };
}

order_fields! {
    customer_product_code: String,
    packaging_conversion: Decimal,
    packaging_unit: String,
    weight_unit: String,
    net_weight: Decimal,
    gross_weight: Decimal,
    packaging_type: String,
    packaging_size: String,
    supplier_note: String,
    expected_delivery_date: NaiveDate,
    untaxed_local_currency: Decimal,
    packing_quantity: u32,
    carton_quantity: u32,
    packaging_method: String,
    paper_card_code: String,
    wash_label_code: String,
    outer_carton_code: String,
    carton_specification: String,
    volume: Decimal,
    summary: String,
}

// =============================================================================
// Lines
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: String,
    pub customer_id: String,
    pub sku_id: String,
    pub product_code: String,
    pub product_name: String,
    pub color_scheme: ColorSelection,
    pub quantity: u32,
    pub price: Money,
    #[serde(flatten)]
    pub extended: ExtendedOrderFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartLine {
    pub fn line_total(&self) -> Money { self.price.multiply(self.quantity) }

    pub fn same_identity(&self, sku_id: &str, color_scheme: &ColorSelection) -> bool {
        self.sku_id == sku_id && &self.color_scheme == color_scheme
    }
}

/// A line as submitted by add-to-cart or a session sync.
#[derive(Clone, Debug, PartialEq)]
pub struct NewCartLine {
    pub sku_id: String,
    pub product_code: String,
    pub product_name: String,
    pub color_scheme: ColorSelection,
    pub quantity: u32,
    pub price: Money,
    pub extended: ExtendedOrderFields,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CartLinePatch {
    pub quantity: Option<u32>,
    pub price: Option<Money>,
    pub extended: ExtendedOrderPatch,
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Clone, Debug)]
pub struct Cart {
    customer_id: String,
    lines: Vec<CartLine>,
    version: u64,
    events: Vec<DomainEvent>,
}

impl Cart {
    pub fn new(customer_id: impl Into<String>) -> Self { Self::restore(customer_id, 0, vec![]) }

    /// Rebuilds a cart as loaded from storage at `version`.
    pub fn restore(customer_id: impl Into<String>, version: u64, lines: Vec<CartLine>) -> Self {
        Self { customer_id: customer_id.into(), lines, version, events: vec![] }
    }

    pub fn customer_id(&self) -> &str { &self.customer_id }
    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn version(&self) -> u64 { self.version }
    pub fn item_count(&self) -> usize { self.lines.len() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    pub fn newest_first(&self) -> Vec<CartLine> { self.lines.iter().rev().cloned().collect() }

    pub fn subtotal(&self, currency: &str) -> Money {
        self.lines.iter().fold(Money::zero(currency), |acc, l| acc.add(&l.line_total()).unwrap_or(acc))
    }

    pub fn find_line(&self, sku_id: &str, color_scheme: &ColorSelection) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.same_identity(sku_id, color_scheme))
    }

    /// Merges into the line with the same identity (quantity summed, price
    /// replaced, extended fields coalesced) or appends a new line.
    pub fn add_item(&mut self, candidate: NewCartLine) -> Result<CartLine, CartError> {
        if candidate.quantity == 0 { return Err(CartError::InvalidQuantity); }
        let now = Utc::now();
        if let Some(existing) = self.lines.iter_mut().find(|l| l.same_identity(&candidate.sku_id, &candidate.color_scheme)) {
            existing.quantity = existing.quantity.saturating_add(candidate.quantity);
            existing.price = candidate.price;
            existing.extended.coalesce(candidate.extended);
            existing.updated_at = now;
            let merged = existing.clone();
            self.raise_event(DomainEvent::Cart(CartEvent::ItemMerged {
                customer_id: self.customer_id.clone(), line_id: merged.id.clone(),
                added: candidate.quantity, quantity: merged.quantity, price: merged.price.clone(),
            }));
            return Ok(merged);
        }
        let line = self.open_line(candidate, now);
        self.raise_event(DomainEvent::Cart(CartEvent::ItemAdded {
            customer_id: self.customer_id.clone(), line_id: line.id.clone(), sku_id: line.sku_id.clone(), quantity: line.quantity,
        }));
        Ok(line)
    }

    /// Overwrites each field the patch carries, including explicit clears.
    pub fn update_item(&mut self, line_id: &str, patch: CartLinePatch) -> Result<CartLine, CartError> {
        if patch.quantity == Some(0) { return Err(CartError::InvalidQuantity); }
        let line = self.lines.iter_mut().find(|l| l.id == line_id).ok_or(CartError::ItemNotFound)?;
        if let Some(quantity) = patch.quantity { line.quantity = quantity; }
        if let Some(price) = patch.price { line.price = price; }
        patch.extended.apply_to(&mut line.extended);
        line.updated_at = Utc::now();
        let updated = line.clone();
        self.raise_event(DomainEvent::Cart(CartEvent::ItemUpdated { customer_id: self.customer_id.clone(), line_id: updated.id.clone() }));
        Ok(updated)
    }

    pub fn remove_item(&mut self, line_id: &str) -> Result<CartLine, CartError> {
        let index = self.lines.iter().position(|l| l.id == line_id).ok_or(CartError::ItemNotFound)?;
        let removed = self.lines.remove(index);
        self.raise_event(DomainEvent::Cart(CartEvent::ItemRemoved { customer_id: self.customer_id.clone(), line_id: removed.id.clone() }));
        Ok(removed)
    }

    pub fn clear(&mut self) -> usize {
        let removed = self.lines.len();
        self.lines.clear();
        self.raise_event(DomainEvent::Cart(CartEvent::Cleared { customer_id: self.customer_id.clone(), removed }));
        removed
    }

    /// Drops every line and inserts `incoming` as new lines without merging.
    /// Nothing changes if any incoming line is invalid.
    pub fn replace_all(&mut self, incoming: Vec<NewCartLine>) -> Result<usize, CartError> {
        if incoming.iter().any(|l| l.quantity == 0) { return Err(CartError::InvalidQuantity); }
        self.lines.clear();
        let now = Utc::now();
        for candidate in incoming { self.open_line(candidate, now); }
        self.raise_event(DomainEvent::Cart(CartEvent::Synced { customer_id: self.customer_id.clone(), lines: self.lines.len() }));
        Ok(self.lines.len())
    }

    fn open_line(&mut self, c: NewCartLine, now: DateTime<Utc>) -> CartLine {
        let line = CartLine {
            id: Uuid::new_v4().to_string(), customer_id: self.customer_id.clone(), sku_id: c.sku_id,
            product_code: c.product_code, product_name: c.product_name, color_scheme: c.color_scheme,
            quantity: c.quantity, price: c.price, extended: c.extended, created_at: now, updated_at: now,
        };
        self.lines.push(line.clone());
        line
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CartError { ItemNotFound, InvalidQuantity }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::ItemNotFound => write!(f, "Item not found"), Self::InvalidQuantity => write!(f, "Quantity must be at least 1") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheme(name: &str, pole: (&str, &str)) -> ColorSelection {
        ColorSelection::new().with("A", SchemeChoice::new(name, vec![ColorAssignment::new("Pole", ColorValue::new(pole.0, pole.1).unwrap())]))
    }

    fn candidate(sku: &str, colors: ColorSelection, quantity: u32) -> NewCartLine {
        NewCartLine {
            sku_id: sku.into(), product_code: "MP007".into(), product_name: "Mop".into(), color_scheme: colors,
            quantity, price: Money::cny(Decimal::new(10, 0)), extended: ExtendedOrderFields::default(),
        }
    }

    #[test]
    fn test_cart_operations() {
        let mut cart = Cart::new("C1");
        cart.add_item(candidate("X", scheme("Scheme1", ("Black", "#000000")), 2)).unwrap();
        let merged = cart.add_item(candidate("X", scheme("Scheme1", ("Black", "#000000")), 3)).unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(merged.quantity, 5); // Merged
        assert_eq!(cart.subtotal("CNY").amount(), Decimal::new(50, 0));

        cart.add_item(candidate("X", scheme("Scheme2", ("Red", "#FF0000")), 1)).unwrap();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.newest_first()[0].color_scheme, scheme("Scheme2", ("Red", "#FF0000")));
    }

    #[test]
    fn test_merge_takes_latest_price() {
        let mut cart = Cart::new("C1");
        cart.add_item(candidate("X", ColorSelection::new(), 1)).unwrap();
        let mut again = candidate("X", ColorSelection::new(), 1);
        again.price = Money::cny(Decimal::new(12, 0));
        assert_eq!(cart.add_item(again).unwrap().price.amount(), Decimal::new(12, 0));
    }

    #[test]
    fn test_merge_coalesces_extended_fields() {
        let mut cart = Cart::new("C1");
        let mut first = candidate("X", ColorSelection::new(), 1);
        first.extended.packing_quantity = Some(10);
        first.extended.packaging_unit = Some("box".into());
        cart.add_item(first).unwrap();

        let merged = cart.add_item(candidate("X", ColorSelection::new(), 1)).unwrap();
        assert_eq!(merged.extended.packing_quantity, Some(10));

        let mut second = candidate("X", ColorSelection::new(), 1);
        second.extended.packing_quantity = Some(7);
        let merged = cart.add_item(second).unwrap();
        assert_eq!(merged.extended.packing_quantity, Some(7));
        assert_eq!(merged.extended.packaging_unit.as_deref(), Some("box"));
    }

    #[test]
    fn test_update_overwrites_present_fields() {
        let mut cart = Cart::new("C1");
        let mut first = candidate("X", ColorSelection::new(), 1);
        first.extended.packing_quantity = Some(10);
        first.extended.summary = Some("rush".into());
        let line = cart.add_item(first).unwrap();

        let extended: ExtendedOrderPatch = serde_json::from_str(r#"{"packingQuantity": null, "cartonQuantity": 4}"#).unwrap();
        let updated = cart.update_item(&line.id, CartLinePatch { quantity: Some(9), price: None, extended }).unwrap();
        assert_eq!(updated.quantity, 9);
        assert_eq!(updated.extended.packing_quantity, None);
        assert_eq!(updated.extended.carton_quantity, Some(4));
        assert_eq!(updated.extended.summary.as_deref(), Some("rush"));

        assert_eq!(cart.update_item("missing", CartLinePatch::default()), Err(CartError::ItemNotFound));
        assert_eq!(cart.update_item(&line.id, CartLinePatch { quantity: Some(0), ..Default::default() }), Err(CartError::InvalidQuantity));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new("C1");
        let a = cart.add_item(candidate("X", ColorSelection::new(), 1)).unwrap();
        cart.add_item(candidate("Y", ColorSelection::new(), 1)).unwrap();
        assert_eq!(cart.remove_item(&a.id).unwrap().sku_id, "X");
        assert_eq!(cart.remove_item(&a.id), Err(CartError::ItemNotFound));
        assert_eq!(cart.clear(), 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_replace_all_does_not_merge() {
        let mut cart = Cart::new("C1");
        cart.add_item(candidate("OLD", ColorSelection::new(), 4)).unwrap();
        let n = cart.replace_all(vec![candidate("X", ColorSelection::new(), 1), candidate("X", ColorSelection::new(), 2)]).unwrap();
        assert_eq!(n, 2);
        assert!(cart.lines().iter().all(|l| l.sku_id == "X"));

        assert_eq!(cart.replace_all(vec![candidate("Z", ColorSelection::new(), 0)]), Err(CartError::InvalidQuantity));
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_selection_shapes_normalize() {
        let canonical: RawColorSelection = serde_json::from_str(
            r##"{"A": {"schemeName": "Scheme1", "colors": [{"part": "Pole", "color": "Black", "hexColor": "#000000"}]}}"##,
        ).unwrap();
        let expected = scheme("Scheme1", ("Black", "#000000"));
        assert_eq!(canonical.normalize(), expected);

        let legacy_list: RawColorSelection = serde_json::from_str(
            r##"{"A": {"colors": [{"part": "Pole", "color": "Black", "hexColor": "#000000"}]}}"##,
        ).unwrap();
        assert_eq!(legacy_list.normalize(), expected);

        let encoded = RawColorSelection::Encoded(serde_json::to_string(&expected).unwrap());
        assert_eq!(encoded.normalize(), expected);
        assert_eq!(RawColorSelection::Encoded("{not json".into()).normalize(), ColorSelection::new());

        let flat: RawColorSelection = serde_json::from_str(r##"{"hex": "#ff0000", "name": "Red"}"##).unwrap();
        let migrated = flat.normalize();
        let choice = migrated.get(LEGACY_COMPONENT_KEY).unwrap();
        assert_eq!(choice.scheme_name, "Red");
        assert_eq!(choice.colors[0].color.hex(), "#FF0000");
    }

    #[test]
    fn test_identity_is_order_independent() {
        let choice = SchemeChoice::new("S", vec![]);
        let a = ColorSelection::new().with("A", choice.clone()).with("B", choice.clone());
        let b = ColorSelection::new().with("B", choice.clone()).with("A", choice);
        assert_eq!(a, b);
    }
}
