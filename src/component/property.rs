use std::collections::{BTreeMap, HashMap};

use crate::component::style::StyleSheet;
use crate::component::value::PropertyValue;
use crate::errors::SyncError;

/// Key/value storage for the properties of one component (or one style).
///
/// A store holds plain properties, indexed properties (e.g. per-column layout
/// data addressed by `(name, index)`) and an optional link to a named style
/// in a [`StyleSheet`]. Lookups through [`get`](Self::get) consult the local
/// maps first and fall back along the style chain only on a miss.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyStore {
    local: HashMap<String, PropertyValue>,
    indexed: HashMap<String, BTreeMap<usize, PropertyValue>>,
    fallback: Option<String>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that falls back to the named style.
    pub fn with_fallback(style: impl Into<String>) -> Self {
        Self { fallback: Some(style.into()), ..Self::default() }
    }

    /// Sets a property locally, returning the previous local value.
    pub fn set(&mut self, name: impl Into<String>, value: PropertyValue) -> Option<PropertyValue> {
        self.local.insert(name.into(), value)
    }

    /// Removes a local property, returning it. Styles are untouched.
    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        self.local.remove(name)
    }

    pub fn set_indexed(&mut self, name: impl Into<String>, index: usize, value: PropertyValue) -> Option<PropertyValue> {
        self.indexed.entry(name.into()).or_default().insert(index, value)
    }

    pub fn remove_indexed(&mut self, name: &str, index: usize) -> Option<PropertyValue> {
        let values = self.indexed.get_mut(name)?;
        let removed = values.remove(&index);
        if values.is_empty() {
            self.indexed.remove(name);
        }
        removed
    }

    /// Local value only, ignoring the fallback chain.
    pub fn local(&self, name: &str) -> Option<&PropertyValue> {
        self.local.get(name)
    }

    pub fn local_indexed(&self, name: &str, index: usize) -> Option<&PropertyValue> {
        self.indexed.get(name)?.get(&index)
    }

    pub fn is_set_locally(&self, name: &str) -> bool {
        self.local.contains_key(name)
    }

    pub fn is_indexed_set_locally(&self, name: &str, index: usize) -> bool {
        self.local_indexed(name, index).is_some()
    }

    /// Name of the style this store falls back to.
    pub fn fallback(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    pub fn set_fallback(&mut self, style: Option<String>) {
        self.fallback = style;
    }

    /// Names of the locally set (non-indexed) properties, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.local.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.indexed.is_empty()
    }

    /// Resolves `name` locally, then along the fallback chain.
    pub fn get<'a>(&'a self, name: &str, sheet: &'a StyleSheet) -> Result<Option<&'a PropertyValue>, SyncError> {
        if let Some(value) = self.local.get(name) {
            return Ok(Some(value));
        }
        sheet.resolve(self.fallback(), |style| style.local(name))
    }

    pub fn get_indexed<'a>(
        &'a self,
        name: &str,
        index: usize,
        sheet: &'a StyleSheet,
    ) -> Result<Option<&'a PropertyValue>, SyncError> {
        if let Some(value) = self.local_indexed(name, index) {
            return Ok(Some(value));
        }
        sheet.resolve(self.fallback(), |style| style.local_indexed(name, index))
    }

    pub fn is_set(&self, name: &str, sheet: &StyleSheet) -> Result<bool, SyncError> {
        Ok(self.get(name, sheet)?.is_some())
    }

    pub fn is_indexed_set(&self, name: &str, index: usize, sheet: &StyleSheet) -> Result<bool, SyncError> {
        Ok(self.get_indexed(name, index, sheet)?.is_some())
    }
}
