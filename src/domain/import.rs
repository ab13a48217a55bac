//! Catalog import text
//!
//! Spreadsheet cells describe components as `[A] name | spec | note` lines
//! and their color options as `[A] part:color + part:color | ...` lines.
//! Lines are separated by newlines or `<br>` tags; lines that do not fit
//! the format are skipped.

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::domain::aggregates::{ColorAssignment, ColorScheme, ComponentColorSchemes};
use crate::domain::color::{decompose, ColorResolver, DEFAULT_MATERIAL};
use crate::domain::value_objects::ColorValue;

static LINE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\r?\n|<br\s*/?>").expect("valid regex"));

static CODED_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([A-Z0-9]+)\]\s*(.+)$").expect("valid regex"));

static PLUS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*[+＋]\s*").expect("valid regex"));

static SET_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([二三四五六七八九十]件套|\b(?:two|three|four|five|six|seven|eight|nine|ten|[2-9]|10)[-\s]piece\s+set)")
        .expect("valid regex")
});

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComponentSpec {
    pub code: String,
    pub name: String,
    pub spec: String,
    pub description: String,
}

fn lines(text: &str) -> impl Iterator<Item = &str> {
    LINE_BREAK_RE.split(text).map(str::trim).filter(|l| !l.is_empty())
}

fn coded_line(line: &str) -> Option<(&str, &str)> {
    let caps = CODED_LINE_RE.captures(line)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str().trim()))
}

/// `[CODE] name | spec | description`; spec and description are optional.
pub fn parse_product_spec(text: &str) -> Vec<ComponentSpec> {
    lines(text)
        .filter_map(coded_line)
        .filter_map(|(code, rest)| {
            let mut fields = rest.splitn(3, '|').map(str::trim);
            let name = fields.next().filter(|n| !n.is_empty())?;
            Some(ComponentSpec {
                code: code.to_string(),
                name: name.to_string(),
                spec: fields.next().unwrap_or_default().to_string(),
                description: fields.next().unwrap_or_default().to_string(),
            })
        })
        .collect()
}

/// `[CODE] scheme | scheme | ...` where each scheme is `part:color` tokens
/// joined by `+`. A token without a colon colors the default part. Colors
/// keep their text as the name and take the hex `decompose` finds.
pub fn parse_color_attributes(resolver: &ColorResolver<'_>, text: &str) -> Vec<ComponentColorSchemes> {
    lines(text)
        .filter_map(coded_line)
        .filter_map(|(code, rest)| {
            let schemes: Vec<ColorScheme> = rest.split('|')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .enumerate()
                .map(|(i, option)| ColorScheme::new(format!("Scheme{}", i + 1), parse_assignments(resolver, option)))
                .filter(|s| !s.assignments.is_empty())
                .collect();
            (!schemes.is_empty()).then(|| ComponentColorSchemes { component_code: code.to_string(), schemes })
        })
        .collect()
}

fn parse_assignments(resolver: &ColorResolver<'_>, option: &str) -> Vec<ColorAssignment> {
    PLUS_RE.split(option)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|token| {
            let (part, color_text) = match token.split_once([':', '：']) {
                Some((part, color)) => (part.trim(), color.trim()),
                None => (DEFAULT_MATERIAL, token),
            };
            ColorAssignment::new(part, import_color(resolver, color_text))
        })
        .collect()
}

fn import_color(resolver: &ColorResolver<'_>, text: &str) -> ColorValue {
    let label = decompose(resolver, text);
    ColorValue::new(text, label.color.hex()).unwrap_or(label.color)
}

/// Color-attribute component codes that have no matching spec line.
pub fn validate_component_codes(specs: &[ComponentSpec], colors: &[ComponentColorSchemes]) -> Vec<String> {
    let known: HashSet<&str> = specs.iter().map(|s| s.code.as_str()).collect();
    colors.iter()
        .map(|c| c.component_code.as_str())
        .filter(|code| !known.contains(code))
        .map(str::to_string)
        .collect()
}

/// The "N-piece set" marker in a product name, two through ten pieces.
pub fn extract_set_type(product_name: &str) -> Option<String> {
    SET_TYPE_RE.find(product_name).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::color::ColorCardRegistry;

    #[test]
    fn test_parse_product_spec() {
        let text = "[A] 伸缩铁杆 | φ19/22*0.27mm*1200mm | 意标螺纹<br/>[B] 拖把 | 39*9cm\n[C] Scraper\nnot a component\n[d] lowercase";
        let specs = parse_product_spec(text);
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0], ComponentSpec {
            code: "A".into(), name: "伸缩铁杆".into(), spec: "φ19/22*0.27mm*1200mm".into(), description: "意标螺纹".into(),
        });
        assert_eq!(specs[1].spec, "39*9cm");
        assert_eq!(specs[1].description, "");
        assert_eq!(specs[2].name, "Scraper");
        assert!(parse_product_spec("   ").is_empty());
    }

    #[test]
    fn test_parse_color_attributes() {
        let registry = ColorCardRegistry::standard();
        let resolver = ColorResolver::new(&registry);
        let text = "[A] 喷塑:3C冷灰+塑件:10C冷灰 | 喷塑:black + 塑件:white\n[B] white\n[C] |";
        let parsed = parse_color_attributes(&resolver, text);
        assert_eq!(parsed.len(), 2);

        let a = &parsed[0];
        assert_eq!(a.component_code, "A");
        assert_eq!(a.schemes.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(), vec!["Scheme1", "Scheme2"]);
        let first = &a.schemes[0].assignments;
        assert_eq!(first[0].part_name, "喷塑");
        assert_eq!(first[0].color.name(), "3C冷灰");
        assert_eq!(first[0].color.hex(), "#C8C9C7");
        assert_eq!(first[1].color.hex(), "#63666A");
        assert_eq!(a.schemes[1].assignments[0].color.hex(), "#000000");

        let b = &parsed[1];
        assert_eq!(b.schemes[0].assignments[0].part_name, DEFAULT_MATERIAL);
    }

    #[test]
    fn test_validate_component_codes() {
        let registry = ColorCardRegistry::standard();
        let resolver = ColorResolver::new(&registry);
        let specs = parse_product_spec("[A] Pole\n[B] Mop");
        let colors = parse_color_attributes(&resolver, "[A] black\n[Z] white");
        assert_eq!(validate_component_codes(&specs, &colors), vec!["Z".to_string()]);
    }

    #[test]
    fn test_extract_set_type() {
        assert_eq!(extract_set_type("MP007-清洁四件套").as_deref(), Some("四件套"));
        assert_eq!(extract_set_type("Cleaning 3-piece set").as_deref(), Some("3-piece set"));
        assert_eq!(extract_set_type("Deluxe four piece set, blue").as_deref(), Some("four piece set"));
        assert_eq!(extract_set_type("Single mop"), None);
    }
}
