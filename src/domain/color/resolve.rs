//! Free-text color resolution
//!
//! Rules are tried in [`ResolveRule::ORDER`]; the first one producing a
//! color wins. Unresolvable input yields `None`, never an error.

use regex::Regex;
use std::sync::LazyLock;

use super::card::ColorCardRegistry;
use crate::domain::value_objects::{normalize_hex, rgb_to_hex, ColorValue};

static RGB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)rgb\s*\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*\)").expect("valid regex")
});

/// 1-3 digits followed by a single letter, e.g. `3C`, `217C`.
pub(crate) static CARD_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}[A-Za-z]").expect("valid regex"));

static FAMILY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(cool\s*gr[ae]y|rose|冷灰|玫红)\s*(\d{1,3})").expect("valid regex")
});

// (accepted spellings, display name, hex)
const NAMED_COLORS: &[(&[&str], &str, &str)] = &[
    (&["black", "黑色"], "Black", "#000000"),
    (&["white", "白色"], "White", "#FFFFFF"),
    (&["red", "红色"], "Red", "#E4002B"),
    (&["blue", "蓝色"], "Blue", "#0084CA"),
    (&["green", "绿色"], "Green", "#00B140"),
    (&["yellow", "黄色"], "Yellow", "#FEDD00"),
    (&["orange", "橙色"], "Orange", "#FF6900"),
    (&["purple", "紫色"], "Purple", "#7B3294"),
    (&["pink", "粉色"], "Pink", "#FFB3D9"),
    (&["gray", "grey", "灰色"], "Gray", "#888B8D"),
    (&["silver", "银色"], "Silver", "#85878B"),
    (&["gold", "金色"], "Gold", "#85754E"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveRule {
    HexLiteral,
    RgbLiteral,
    EmbeddedCardCode,
    FamilyIdiom,
    NamedColor,
    RegistrySearch,
}

impl ResolveRule {
    pub const ORDER: [ResolveRule; 6] = [
        Self::HexLiteral,
        Self::RgbLiteral,
        Self::EmbeddedCardCode,
        Self::FamilyIdiom,
        Self::NamedColor,
        Self::RegistrySearch,
    ];

    /// Input is expected trimmed and non-empty.
    pub fn apply(self, registry: &ColorCardRegistry, input: &str) -> Option<ColorValue> {
        match self {
            Self::HexLiteral => {
                let hex = normalize_hex(input)?;
                ColorValue::new(hex.clone(), &hex).ok()
            }
            Self::RgbLiteral => {
                let caps = RGB_RE.captures(input)?;
                let channel = |i: usize| caps[i].parse::<u8>().ok();
                let hex = rgb_to_hex(channel(1)?, channel(2)?, channel(3)?);
                ColorValue::new(hex.clone(), &hex).ok()
            }
            Self::EmbeddedCardCode => CARD_CODE_RE
                .find_iter(input)
                .find_map(|m| registry.get(m.as_str()))
                .map(|entry| entry.color.clone()),
            Self::FamilyIdiom => {
                let caps = FAMILY_RE.captures(input)?;
                registry.get(&format!("{}C", &caps[2])).map(|entry| entry.color.clone())
            }
            Self::NamedColor => named_color(input),
            Self::RegistrySearch => registry
                .get(input)
                .or_else(|| registry.search_display_name(input))
                .map(|entry| entry.color.clone()),
        }
    }
}

fn named_color(input: &str) -> Option<ColorValue> {
    let lowered = input.to_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(spellings, _, _)| spellings.contains(&lowered.as_str()))
        .map(|&(_, name, hex)| ColorValue::from_static(name, hex))
}

/// Resolver over a shared registry.
#[derive(Clone, Copy, Debug)]
pub struct ColorResolver<'a> {
    registry: &'a ColorCardRegistry,
}

impl<'a> ColorResolver<'a> {
    pub fn new(registry: &'a ColorCardRegistry) -> Self { Self { registry } }

    pub fn registry(&self) -> &'a ColorCardRegistry { self.registry }

    pub fn resolve(&self, input: &str) -> Option<ColorValue> { self.resolve_by(&ResolveRule::ORDER, input) }

    /// Runs only the given rules, in the given order.
    pub fn resolve_by(&self, rules: &[ResolveRule], input: &str) -> Option<ColorValue> {
        let input = input.trim();
        if input.is_empty() { return None; }
        rules.iter().find_map(|rule| rule.apply(self.registry, input))
    }

    pub fn card_color(&self, code: &str) -> Option<ColorValue> {
        self.registry.get(code).map(|entry| entry.color.clone())
    }
}
