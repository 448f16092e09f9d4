//! The in-memory configuration document.
//!
//! A [`ConfigDocument`] is an insertion-ordered map of section name to
//! [`Section`]; insertion order is irrelevant for lookup but is preserved
//! because it is the widget's z-order. Section names stay case-sensitive as
//! written; style and extend lookups fall back to case-insensitive scans.
//!
//! A [`Section`] is a property bag of normalized key to string value plus a
//! typed slot for the compiled shape list. Type conversion (numbers) happens
//! here, at the boundary, not ad hoc at every consumer.

use std::path::PathBuf;

use indexmap::IndexMap;

use crate::shape::ShapeElement;

/// One named group of key/value properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    values: IndexMap<String, String>,
    /// Compiled shape list, set only for `element=shape` sections.
    pub shapes: Option<ShapeElement>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: IndexMap<String, String>) -> Self {
        Section {
            values,
            shapes: None,
        }
    }

    /// Exact-key lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Lookup by exact key, then lowercase key, then a case-insensitive scan,
    /// in that priority order.
    pub fn get_ci(&self, key: &str) -> Option<&str> {
        if let Some(v) = self.values.get(key) {
            return Some(v);
        }
        let lower = key.to_lowercase();
        if let Some(v) = self.values.get(&lower) {
            return Some(v);
        }
        self.values
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Resolve the actual stored key for `key` using the same priority order
    /// as [`Section::get_ci`].
    pub fn resolve_key_ci(&self, key: &str) -> Option<&str> {
        if self.values.contains_key(key) {
            return self.values.get_key_value(key).map(|(k, _)| k.as_str());
        }
        let lower = key.to_lowercase();
        if self.values.contains_key(&lower) {
            return self.values.get_key_value(&lower).map(|(k, _)| k.as_str());
        }
        self.values
            .keys()
            .find(|k| k.eq_ignore_ascii_case(key))
            .map(String::as_str)
    }

    /// Exact-key numeric lookup; unparseable values read as absent.
    pub fn num(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.trim().parse::<f64>().ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn contains_ci(&self, key: &str) -> bool {
        self.get_ci(key).is_some()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Remove a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut String)> {
        self.values.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered mapping of section name to section, plus the directory the skin
/// was loaded from (used to resolve image paths).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    pub sections: IndexMap<String, Section>,
    pub base_dir: PathBuf,
}

impl ConfigDocument {
    /// Exact-name section lookup.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Resolve a section name exactly, then case-insensitively.
    pub fn resolve_section_name(&self, name: &str) -> Option<String> {
        if self.sections.contains_key(name) {
            return Some(name.to_string());
        }
        self.sections
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Remove and return a section by case-insensitive name.
    pub fn take_section_ci(&mut self, name: &str) -> Option<Section> {
        let key = self.resolve_section_name(name)?;
        self.sections.shift_remove(&key)
    }

    /// Remove a section by exact name, preserving the order of the rest.
    pub fn remove_section(&mut self, name: &str) -> Option<Section> {
        self.sections.shift_remove(name)
    }
}
