//! Mapping from diary discipline spellings to timetable subject names.

use std::collections::HashMap;

/// Built-in diary → timetable name pairs.
pub const DEFAULT_DISCIPLINES: &[(&str, &str)] = &[
    ("Tikyba", "Dorinis ugdymas (tikyba)"),
    ("1UK(An)", "Užsienio kalba (pirmoji, anglų)"),
    ("Klasės val.", "Vadovavimas klasei"),
    ("Lietuvių k.", "Lietuvių kalba ir literatūra"),
];

/// Normalization table for free-text discipline names.
///
/// Names without an entry map to themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisciplineTable {
    entries: HashMap<String, String>,
}

impl DisciplineTable {
    /// Table with no entries; every name is already canonical.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add or replace entries.
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (from, to) in overrides {
            self.entries.insert(from.into(), to.into());
        }
        self
    }

    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.entries.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DisciplineTable {
    fn default() -> Self {
        Self::empty().with_overrides(DEFAULT_DISCIPLINES.iter().copied())
    }
}
