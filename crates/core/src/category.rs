//! Configured connectivity categories
//!
//! A [`CategoryTable`] is the validated, ordered list of categories a
//! comparison runs over. Its order is the output order of every per-category
//! product and of the transition matrix, so it is kept exactly as configured.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One configured category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Internal numeric key used to identify outputs
    pub key: i32,
    /// Cell value of this category in categorical rasters
    pub class_id: i32,
    /// Human-readable name
    pub name: String,
}

impl Category {
    pub fn new(key: i32, class_id: i32, name: impl Into<String>) -> Self {
        Self {
            key,
            class_id,
            name: name.into(),
        }
    }
}

/// Validated lookup table between keys, class ids and display names.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    categories: Vec<Category>,
    by_class: HashMap<i32, usize>,
    by_key: HashMap<i32, usize>,
    by_name: HashMap<String, usize>,
}

impl CategoryTable {
    /// Build a table, rejecting an empty list and duplicate class ids or keys.
    ///
    /// Names need not be unique; `key_of_name` resolves to the first entry.
    pub fn new(categories: Vec<Category>) -> Result<Self> {
        if categories.is_empty() {
            return Err(Error::Configuration(
                "a category table with at least one category is required".into(),
            ));
        }

        let mut by_class = HashMap::with_capacity(categories.len());
        let mut by_key = HashMap::with_capacity(categories.len());
        let mut by_name = HashMap::with_capacity(categories.len());

        for (idx, cat) in categories.iter().enumerate() {
            if by_class.insert(cat.class_id, idx).is_some() {
                return Err(Error::Configuration(format!(
                    "class id {} is configured more than once",
                    cat.class_id
                )));
            }
            if by_key.insert(cat.key, idx).is_some() {
                return Err(Error::Configuration(format!(
                    "category key {} is configured more than once",
                    cat.key
                )));
            }
            by_name.entry(cat.name.clone()).or_insert(idx);
        }

        Ok(Self {
            categories,
            by_class,
            by_key,
            by_name,
        })
    }

    /// Categories in configured order
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Class ids in configured order
    pub fn class_ids(&self) -> Vec<i32> {
        self.categories.iter().map(|c| c.class_id).collect()
    }

    pub fn contains_class(&self, class_id: i32) -> bool {
        self.by_class.contains_key(&class_id)
    }

    pub fn by_class(&self, class_id: i32) -> Result<&Category> {
        self.by_class
            .get(&class_id)
            .map(|&idx| &self.categories[idx])
            .ok_or_else(|| Error::UnknownCategory(format!("class id {}", class_id)))
    }

    pub fn by_key(&self, key: i32) -> Result<&Category> {
        self.by_key
            .get(&key)
            .map(|&idx| &self.categories[idx])
            .ok_or_else(|| Error::UnknownCategory(format!("key {}", key)))
    }

    /// Display name for a class id
    pub fn name_of_class(&self, class_id: i32) -> Result<&str> {
        self.by_class(class_id).map(|c| c.name.as_str())
    }

    /// Internal key for a display name
    pub fn key_of_name(&self, name: &str) -> Result<i32> {
        self.by_name
            .get(name)
            .map(|&idx| self.categories[idx].key)
            .ok_or_else(|| Error::UnknownCategory(format!("name {:?}", name)))
    }
}
