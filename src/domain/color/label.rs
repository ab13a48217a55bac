//! Import label decomposition
//!
//! Catalog sheets pack material, card code and description into one token,
//! e.g. `SprayCoat3Cgray` or `Plastic white`. [`decompose`] always returns a
//! usable record, falling back to a neutral gray.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::resolve::{ColorResolver, ResolveRule, CARD_CODE_RE};
use crate::domain::value_objects::ColorValue;

/// Material reported when the label does not name one.
pub const DEFAULT_MATERIAL: &str = "Default";

static CODED_MATERIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^([^0-9]+?)(\d{1,3}[A-Za-z])(.*)$").expect("valid regex"));

const MATERIAL_KEYWORDS: &[&str] = &[
    "SprayCoat", "Spray Coat", "Plastic", "Chenille", "PocketCloth", "Pocket Cloth",
    "TPR Scraper", "Scraper", "Metal", "Fabric", "Sponge", "Rubber", "Silicone",
    "喷塑", "塑件", "雪尼尔", "口袋布", "TPR刮条", "刮条", "金属", "布料", "海绵", "橡胶", "硅胶",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorLabel {
    pub material: String,
    pub code: String,
    pub description: String,
    pub color: ColorValue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelRule {
    /// `<material><code><description>`
    CodedMaterial,
    /// `<known material><description>`, longest keyword wins
    MaterialKeyword,
    /// a card code anywhere in the text
    BareCardCode,
    Fallback,
}

impl LabelRule {
    pub const ORDER: [LabelRule; 4] = [Self::CodedMaterial, Self::MaterialKeyword, Self::BareCardCode, Self::Fallback];

    pub fn apply(self, resolver: &ColorResolver<'_>, input: &str) -> Option<ColorLabel> {
        match self {
            Self::CodedMaterial => {
                let caps = CODED_MATERIAL_RE.captures(input)?;
                let material = caps[1].trim();
                if material.is_empty() { return None; }
                let code = caps[2].to_uppercase();
                Some(ColorLabel {
                    material: material.to_string(),
                    color: resolver.card_color(&code).unwrap_or_else(ColorValue::neutral_gray),
                    code,
                    description: caps[3].trim().to_string(),
                })
            }
            Self::MaterialKeyword => {
                let keyword = longest_material_prefix(input)?;
                let description = input[keyword.len()..].trim();
                Some(ColorLabel {
                    material: keyword.to_string(),
                    code: String::new(),
                    description: description.to_string(),
                    color: resolver
                        .resolve_by(&[ResolveRule::NamedColor, ResolveRule::RegistrySearch], description)
                        .unwrap_or_else(ColorValue::neutral_gray),
                })
            }
            Self::BareCardCode => {
                let code = CARD_CODE_RE.find(input)?.as_str().to_uppercase();
                Some(ColorLabel {
                    material: DEFAULT_MATERIAL.to_string(),
                    color: resolver.card_color(&code).unwrap_or_else(ColorValue::neutral_gray),
                    code,
                    description: input.to_string(),
                })
            }
            Self::Fallback => Some(fallback(resolver, input)),
        }
    }
}

fn fallback(resolver: &ColorResolver<'_>, input: &str) -> ColorLabel {
    ColorLabel {
        material: DEFAULT_MATERIAL.to_string(),
        code: String::new(),
        description: input.to_string(),
        color: resolver.resolve(input).unwrap_or_else(ColorValue::neutral_gray),
    }
}

fn longest_material_prefix(input: &str) -> Option<&'static str> {
    MATERIAL_KEYWORDS
        .iter()
        .filter(|kw| input.get(..kw.len()).is_some_and(|head| head.eq_ignore_ascii_case(kw)))
        .max_by_key(|kw| kw.len())
        .copied()
}

pub fn decompose(resolver: &ColorResolver<'_>, input: &str) -> ColorLabel {
    let input = input.trim();
    LabelRule::ORDER
        .iter()
        .find_map(|rule| rule.apply(resolver, input))
        .unwrap_or_else(|| fallback(resolver, input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::color::ColorCardRegistry;

    fn label(input: &str) -> ColorLabel {
        let registry = ColorCardRegistry::standard();
        decompose(&ColorResolver::new(&registry), input)
    }

    #[test]
    fn test_coded_material() {
        let l = label("SprayCoat3Cgray");
        assert_eq!(l.material, "SprayCoat");
        assert_eq!(l.code, "3C");
        assert_eq!(l.description, "gray");
        assert_eq!(l.color, ColorValue::new("Cool Gray", "#C8C9C7").unwrap());

        let l = label("塑件217c蓝");
        assert_eq!((l.material.as_str(), l.code.as_str(), l.description.as_str()), ("塑件", "217C", "蓝"));
        assert_eq!(l.color.hex(), "#DA1884");
    }

    #[test]
    fn test_unregistered_code_defaults_gray() {
        let l = label("Plastic404Zblue");
        assert_eq!(l.code, "404Z");
        assert_eq!(l.color, ColorValue::neutral_gray());
    }

    #[test]
    fn test_material_keyword() {
        let l = label("口袋布白色");
        assert_eq!((l.material.as_str(), l.code.as_str(), l.description.as_str()), ("口袋布", "", "白色"));
        assert_eq!(l.color.hex(), "#FFFFFF");

        let l = label("tpr scraper black");
        assert_eq!(l.material, "TPR Scraper");
        assert_eq!(l.description, "black");
        assert_eq!(l.color.hex(), "#000000");
    }

    #[test]
    fn test_longest_keyword_wins() {
        assert_eq!(longest_material_prefix("TPR刮条黑色"), Some("TPR刮条"));
        assert_eq!(longest_material_prefix("Scraper red"), Some("Scraper"));
        assert_eq!(longest_material_prefix("Wood red"), None);
    }

    #[test]
    fn test_bare_code() {
        let l = label("10C");
        assert_eq!(l.material, DEFAULT_MATERIAL);
        assert_eq!(l.code, "10C");
        assert_eq!(l.description, "10C");
        assert_eq!(l.color.hex(), "#63666A");
    }

    #[test]
    fn test_fallback() {
        let l = label("rgb(1, 2, 3)");
        assert_eq!(l.material, DEFAULT_MATERIAL);
        assert_eq!(l.code, "");
        assert_eq!(l.color.hex(), "#010203");

        let l = label("mystery");
        assert_eq!(l.description, "mystery");
        assert_eq!(l.color.hex(), "#CCCCCC");

        assert_eq!(label("").color, ColorValue::neutral_gray());
    }
}
