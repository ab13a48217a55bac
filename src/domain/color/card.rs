//! Color-card registry
//!
//! Fixed table of coated card swatches, built once at startup and shared
//! read-only. Codes are looked up case-insensitively after trimming.

use serde::Serialize;
use std::collections::HashMap;

use crate::domain::value_objects::ColorValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorFamily { CoolGray, Pink, Red, Orange, Yellow, Green, Blue, Purple, Neutral, Metallic }

impl ColorFamily {
    pub const ALL: [ColorFamily; 10] = [
        Self::CoolGray, Self::Pink, Self::Red, Self::Orange, Self::Yellow,
        Self::Green, Self::Blue, Self::Purple, Self::Neutral, Self::Metallic,
    ];

    /// Wire name, as serialized.
    pub fn key(self) -> &'static str {
        match self {
            Self::CoolGray => "cool_gray", Self::Pink => "pink", Self::Red => "red", Self::Orange => "orange",
            Self::Yellow => "yellow", Self::Green => "green", Self::Blue => "blue", Self::Purple => "purple",
            Self::Neutral => "neutral", Self::Metallic => "metallic",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorCardEntry {
    pub code: String,
    pub display_name: String,
    pub family: ColorFamily,
    pub color: ColorValue,
}

// (code, display name, color name, hex, family)
const STANDARD_CARDS: &[(&str, &str, &str, &str, ColorFamily)] = &[
    ("1C", "Cool Gray 1 C", "Cool Gray", "#D9D9D6", ColorFamily::CoolGray),
    ("2C", "Cool Gray 2 C", "Cool Gray", "#D0D0CE", ColorFamily::CoolGray),
    ("3C", "Cool Gray 3 C", "Cool Gray", "#C8C9C7", ColorFamily::CoolGray),
    ("4C", "Cool Gray 4 C", "Cool Gray", "#BBBCBC", ColorFamily::CoolGray),
    ("5C", "Cool Gray 5 C", "Cool Gray", "#B1B3B3", ColorFamily::CoolGray),
    ("6C", "Cool Gray 6 C", "Cool Gray", "#A7A8AA", ColorFamily::CoolGray),
    ("7C", "Cool Gray 7 C", "Cool Gray", "#97999B", ColorFamily::CoolGray),
    ("8C", "Cool Gray 8 C", "Cool Gray", "#888B8D", ColorFamily::CoolGray),
    ("9C", "Cool Gray 9 C", "Cool Gray", "#75787B", ColorFamily::CoolGray),
    ("10C", "Cool Gray 10 C", "Cool Gray", "#63666A", ColorFamily::CoolGray),
    ("11C", "Cool Gray 11 C", "Cool Gray", "#53565A", ColorFamily::CoolGray),
    ("110C", "Pantone 110 C", "Mustard", "#DADD98", ColorFamily::Yellow),
    ("219C", "Pantone 219 C", "Light Pink", "#F8BBD0", ColorFamily::Pink),
    ("225C", "Pantone 225 C", "Rose Pink", "#FFB3D9", ColorFamily::Pink),
    ("226C", "Pantone 226 C", "Rose", "#F999CD", ColorFamily::Pink),
    ("227C", "Pantone 227 C", "Magenta", "#EC008C", ColorFamily::Pink),
    ("185C", "Pantone 185 C", "Bright Red", "#E4002B", ColorFamily::Red),
    ("186C", "Pantone 186 C", "Red", "#C8102E", ColorFamily::Red),
    ("187C", "Pantone 187 C", "Dark Red", "#A6192E", ColorFamily::Red),
    ("021C", "Pantone 021 C", "Orange", "#FE5000", ColorFamily::Orange),
    ("165C", "Pantone 165 C", "Bright Orange", "#FF6720", ColorFamily::Orange),
    ("102C", "Pantone 102 C", "Yellow", "#F9E814", ColorFamily::Yellow),
    ("109C", "Pantone 109 C", "Golden Yellow", "#FFD100", ColorFamily::Yellow),
    ("354C", "Pantone 354 C", "Green", "#00B140", ColorFamily::Green),
    ("355C", "Pantone 355 C", "Deep Green", "#009639", ColorFamily::Green),
    ("217C", "Pantone 217 C", "Orchid", "#DA1884", ColorFamily::Pink),
    ("285C", "Pantone 285 C", "Blue", "#0084CA", ColorFamily::Blue),
    ("286C", "Pantone 286 C", "Royal Blue", "#0033A0", ColorFamily::Blue),
    ("299C", "Pantone 299 C", "Sky Blue", "#00A3E0", ColorFamily::Blue),
    ("266C", "Pantone 266 C", "Purple", "#7B3294", ColorFamily::Purple),
    ("265C", "Pantone 265 C", "Lavender", "#9678D3", ColorFamily::Purple),
    ("419C", "Pantone 419 C", "Black", "#212322", ColorFamily::Neutral),
    ("705C", "Pantone 705 C", "Off White", "#F5DADF", ColorFamily::Neutral),
    ("871C", "Pantone 871 C (Gold)", "Gold", "#85754E", ColorFamily::Metallic),
    ("877C", "Pantone 877 C (Silver)", "Silver", "#85878B", ColorFamily::Metallic),
];

/// Immutable code → entry lookup. Iteration follows seed order.
#[derive(Clone, Debug)]
pub struct ColorCardRegistry {
    entries: Vec<ColorCardEntry>,
    by_code: HashMap<String, usize>,
}

impl ColorCardRegistry {
    pub fn standard() -> Self {
        Self::from_entries(STANDARD_CARDS.iter().map(|&(code, display, name, hex, family)| ColorCardEntry {
            code: code.to_string(),
            display_name: display.to_string(),
            family,
            color: ColorValue::from_static(name, hex),
        }))
    }

    /// Later duplicates of a code are ignored.
    pub fn from_entries(entries: impl IntoIterator<Item = ColorCardEntry>) -> Self {
        let mut registry = Self { entries: Vec::new(), by_code: HashMap::new() };
        for mut entry in entries {
            entry.code = normalize_code(&entry.code);
            if registry.by_code.contains_key(&entry.code) { continue; }
            registry.by_code.insert(entry.code.clone(), registry.entries.len());
            registry.entries.push(entry);
        }
        registry
    }

    pub fn get(&self, code: &str) -> Option<&ColorCardEntry> {
        self.by_code.get(&normalize_code(code)).map(|&i| &self.entries[i])
    }

    /// First entry whose display name contains `needle`, ignoring case.
    pub fn search_display_name(&self, needle: &str) -> Option<&ColorCardEntry> {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() { return None; }
        self.entries.iter().find(|e| e.display_name.to_lowercase().contains(&needle))
    }

    pub fn entries(&self) -> &[ColorCardEntry] { &self.entries }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn by_family(&self) -> Vec<(ColorFamily, Vec<&ColorCardEntry>)> {
        ColorFamily::ALL.iter()
            .map(|&family| (family, self.entries.iter().filter(|e| e.family == family).collect::<Vec<_>>()))
            .filter(|(_, group)| !group.is_empty())
            .collect()
    }
}

impl Default for ColorCardRegistry { fn default() -> Self { Self::standard() } }

pub fn normalize_code(code: &str) -> String { code.trim().to_uppercase() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = ColorCardRegistry::standard();
        let entry = registry.get(" 3c ").unwrap();
        assert_eq!(entry.code, "3C");
        assert_eq!(entry.color.name(), "Cool Gray");
        assert_eq!(entry.color.hex(), "#C8C9C7");
        assert!(registry.get("999C").is_none());
    }

    #[test]
    fn test_codes_unique() {
        let registry = ColorCardRegistry::standard();
        assert_eq!(registry.len(), STANDARD_CARDS.len());
        let dup = ColorCardRegistry::from_entries(registry.entries().iter().cloned().chain(registry.entries().iter().cloned()));
        assert_eq!(dup.len(), registry.len());
    }

    #[test]
    fn test_display_name_search() {
        let registry = ColorCardRegistry::standard();
        assert_eq!(registry.search_display_name("silver").unwrap().code, "877C");
        assert!(registry.search_display_name("").is_none());
    }

    #[test]
    fn test_by_family() {
        let registry = ColorCardRegistry::standard();
        let groups = registry.by_family();
        let (family, grays) = &groups[0];
        assert_eq!(*family, ColorFamily::CoolGray);
        assert_eq!(grays.len(), 11);
        assert_eq!(groups.iter().map(|(_, g)| g.len()).sum::<usize>(), registry.len());
    }
}
