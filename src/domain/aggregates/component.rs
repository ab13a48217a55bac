//! Component Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A paintable element of a component, named in two languages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part { pub name_local: String, pub name_alt: String }

impl Part {
    pub fn new(name_local: impl Into<String>, name_alt: impl Into<String>) -> Self {
        Self { name_local: name_local.into(), name_alt: name_alt.into() }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Component {
    id: String,
    code: String,
    name_local: String,
    name_alt: String,
    parts: Vec<Part>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Component {
    pub fn create(code: impl Into<String>, name_local: impl Into<String>, name_alt: impl Into<String>, parts: Vec<Part>) -> Result<Self, ComponentError> {
        let code = code.into().trim().to_string();
        if code.is_empty() { return Err(ComponentError::EmptyCode); }
        validate_parts(&parts)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(), code, name_local: name_local.into(), name_alt: name_alt.into(),
            parts, created_at: now, updated_at: now,
        })
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn code(&self) -> &str { &self.code }
    pub fn name_local(&self) -> &str { &self.name_local }
    pub fn name_alt(&self) -> &str { &self.name_alt }
    pub fn parts(&self) -> &[Part] { &self.parts }
    pub fn part_names(&self) -> impl Iterator<Item = &str> { self.parts.iter().map(|p| p.name_local.as_str()) }
    pub fn has_part(&self, name: &str) -> bool { self.parts.iter().any(|p| p.name_local == name) }

    /// The code is kept; SKUs and schemes refer to it.
    pub fn replace_parts(&mut self, parts: Vec<Part>) -> Result<(), ComponentError> {
        validate_parts(&parts)?;
        self.parts = parts;
        self.touch();
        Ok(())
    }

    pub fn rename(&mut self, name_local: impl Into<String>, name_alt: impl Into<String>) {
        self.name_local = name_local.into();
        self.name_alt = name_alt.into();
        self.touch();
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

fn validate_parts(parts: &[Part]) -> Result<(), ComponentError> {
    if parts.is_empty() { return Err(ComponentError::NoParts); }
    for (i, part) in parts.iter().enumerate() {
        if part.name_local.trim().is_empty() || part.name_alt.trim().is_empty() { return Err(ComponentError::EmptyPartName(i)); }
        if parts[..i].iter().any(|p| p.name_local == part.name_local) { return Err(ComponentError::DuplicatePart(part.name_local.clone())); }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ComponentError { EmptyCode, NoParts, EmptyPartName(usize), DuplicatePart(String) }
impl std::error::Error for ComponentError {}
impl std::fmt::Display for ComponentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCode => write!(f, "Component code is empty"),
            Self::NoParts => write!(f, "Component needs at least one part"),
            Self::EmptyPartName(i) => write!(f, "Part {} is missing a name", i + 1),
            Self::DuplicatePart(name) => write!(f, "Duplicate part '{}'", name),
        }
    }
}
