//! Per-section filter context: the persisted state of one list view.

use crate::filter::FilterValue;
use crate::query::QueryNode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use thiserror::Error;

/// One sort criterion, round-tripping through the signed string form
/// `+field` (ascending) / `-field` (descending).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub ascending: bool,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        SortKey {
            field: field.into(),
            ascending: true,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        SortKey {
            field: field.into(),
            ascending: false,
        }
    }

    fn flipped(&self) -> Self {
        SortKey {
            field: self.field.clone(),
            ascending: !self.ascending,
        }
    }
}

#[derive(Debug, Error)]
#[error("Empty sort key")]
pub struct ParseSortKeyError;

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ascending, field) = match s.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => match s.strip_prefix('-') {
                Some(rest) => (false, rest),
                None => (true, s),
            },
        };

        if field.is_empty() {
            return Err(ParseSortKeyError);
        }

        Ok(SortKey {
            field: field.to_string(),
            ascending,
        })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", if self.ascending { '+' } else { '-' }, self.field)
    }
}

impl Serialize for SortKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SortKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A committed filter: the value as entered plus the criterion it compiled
/// to. The criterion is recomputed whenever the value changes, not when the
/// query tree is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledFilter {
    pub field: String,
    pub label: String,
    pub value: FilterValue,
    pub criterion: QueryNode,
}

/// An in-progress filter value bound to an editing surface, not yet
/// committed. The value variant carries its own kind tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveFilter {
    pub field: String,
    pub value: FilterValue,
}

pub trait FieldKeyed {
    fn field(&self) -> &str;
}

impl FieldKeyed for CompiledFilter {
    fn field(&self) -> &str {
        &self.field
    }
}

impl FieldKeyed for ActiveFilter {
    fn field(&self) -> &str {
        &self.field
    }
}

/// An insertion-ordered field-to-entry collection.
///
/// The compiled query's criteria order must equal the order filters were
/// first committed in, so this is an explicit ordered list with uniqueness
/// by field, not an associative container with incidental iteration order.
/// Replacing an existing field keeps its original position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap<T> {
    entries: Vec<T>,
}

impl<T> Default for FieldMap<T> {
    fn default() -> Self {
        FieldMap {
            entries: Vec::new(),
        }
    }
}

impl<T: FieldKeyed> FieldMap<T> {
    pub fn insert(&mut self, entry: T) {
        match self.entries.iter_mut().find(|e| e.field() == entry.field()) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn remove(&mut self, field: &str) -> Option<T> {
        let idx = self.entries.iter().position(|e| e.field() == field)?;
        Some(self.entries.remove(idx))
    }

    pub fn get(&self, field: &str) -> Option<&T> {
        self.entries.iter().find(|e| e.field() == field)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut T> {
        self.entries.iter_mut().find(|e| e.field() == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(FieldKeyed::field)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Committed filters of one section, in commit order.
pub type FilterSet = FieldMap<CompiledFilter>;

/// Active (editing-surface) filters of one section.
pub type ActiveSet = FieldMap<ActiveFilter>;

/// The whole persisted state of one list view: visibility toggles, paging,
/// sort criteria, committed filters and the in-progress editing values.
///
/// Mutated only through the [`crate::filtering::Filtering`] operations and
/// persisted after every mutation; serialization is deterministic, so an
/// unchanged context always stores byte-identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterContext {
    /// Name of the view state the context was created for.
    pub state: String,
    pub show_filters: bool,
    pub show_stats: bool,
    pub page_size: NonZeroU32,
    pub sort: Vec<SortKey>,
    pub filters: FilterSet,
    pub active: ActiveSet,
}

impl FilterContext {
    /// Toggle-or-reset the sort criteria on a column header click.
    ///
    /// `pinned` entries (a fixed per-section prefix such as flagged-first)
    /// are ignored when deciding and re-applied in front of the result.
    /// Selecting a new field sorts it ascending; selecting the current
    /// primary field flips its direction.
    pub fn sort_by_field(&mut self, field: &str, pinned: &[SortKey]) {
        let primary = self
            .sort
            .iter()
            .find(|key| !pinned.iter().any(|p| p.field == key.field))
            .cloned();

        let next = match primary {
            Some(key) if key.field == field => key.flipped(),
            _ => SortKey::asc(field),
        };

        self.sort = pinned.to_vec();
        self.sort.push(next);
    }
}
