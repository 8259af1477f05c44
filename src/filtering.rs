//! The per-section view adapter: owns a [`FilterContext`], commits editing
//! values through the translators, and persists after every mutation.

use crate::context::{ActiveFilter, CompiledFilter, FilterContext, SortKey};
use crate::filter::{FieldTable, FilterError, FilterValue, translate};
use crate::query::{self, QueryNode, legacy, wire};
use crate::settings::UiSettings;
use crate::store::{ContextStore, StoreError};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::num::NonZeroU32;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilteringError {
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Context attributes a section starts from when nothing is stored.
#[derive(Debug, Clone)]
pub struct SectionDefaults {
    pub show_filters: bool,
    pub show_stats: bool,
    pub page_size: NonZeroU32,
    /// Initial sort criteria, pinned entries included.
    pub sort: Vec<SortKey>,
    /// Fixed sort prefix kept in front of whatever column the user sorts
    /// by (flagged-first on cases).
    pub pinned_sort: Vec<SortKey>,
}

impl Default for SectionDefaults {
    fn default() -> Self {
        Self {
            show_filters: true,
            show_stats: false,
            page_size: NonZeroU32::new(15).expect("non-zero default page size"),
            sort: Vec::new(),
            pinned_sort: Vec::new(),
        }
    }
}

/// Static description of one list view: its storage key, filterable
/// fields, defaults and seed filter.
#[derive(Debug, Clone)]
pub struct SectionConfig {
    /// Storage key of the persisted context (`case.list`, `alert.list`, ...).
    pub section: String,
    pub fields: FieldTable,
    pub defaults: SectionDefaults,
    /// Filters every fresh context starts with (cases open by default,
    /// alerts hide imported ones).
    pub default_filter: Vec<ActiveFilter>,
}

impl SectionConfig {
    pub fn new(section: impl Into<String>, fields: FieldTable) -> Self {
        SectionConfig {
            section: section.into(),
            fields,
            defaults: SectionDefaults::default(),
            default_filter: Vec::new(),
        }
    }
}

/// One list view's filtering service.
///
/// An explicit value owned by the view/session that uses it - two views
/// over the same section key race with last-write-wins at the store
/// boundary, which is accepted.
pub struct Filtering<S> {
    config: SectionConfig,
    settings: UiSettings,
    store: S,
    context: FilterContext,
}

impl<S: ContextStore> Filtering<S> {
    pub fn new(config: SectionConfig, settings: UiSettings, store: S) -> Self {
        let context = Self::default_context(&config, "");
        Filtering {
            config,
            settings,
            store,
            context,
        }
    }

    /// Load the stored context for this section, or build one from the
    /// section defaults (seed filter included) and persist it.
    ///
    /// A blob that fails to parse is treated exactly like an absent one;
    /// storage problems never surface from the read path.
    pub fn init_context(&mut self, state: &str) -> Result<(), FilteringError> {
        if let Some(raw) = self.store.load(&self.config.section)
            && let Ok(context) = serde_json::from_str::<FilterContext>(&raw)
        {
            self.context = context;
            return Ok(());
        }

        self.context = self.fresh_context(state)?;
        self.store_context()?;
        Ok(())
    }

    /// Discard the stored context and start over from the defaults.
    pub fn reset_context(&mut self) -> Result<(), FilteringError> {
        let state = self.context.state.clone();
        self.context = self.fresh_context(&state)?;
        self.store_context()?;
        Ok(())
    }

    pub fn context(&self) -> &FilterContext {
        &self.context
    }

    pub fn config(&self) -> &SectionConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Seed every defined field's editing value from its committed filter,
    /// or the definition default when the field is not filtered on.
    pub fn init_active_filters(&mut self) {
        let entries: Vec<ActiveFilter> = self
            .config
            .fields
            .iter()
            .map(|def| ActiveFilter {
                field: def.field.clone(),
                value: self
                    .context
                    .filters
                    .get(&def.field)
                    .map(|f| f.value.clone())
                    .unwrap_or_else(|| def.default_value.clone()),
            })
            .collect();

        self.context.active.clear();
        for entry in entries {
            self.context.active.insert(entry);
        }
    }

    /// Bind an editing value to a field without committing it. The value
    /// becomes part of the query on the next [`Filtering::filter`] call.
    pub fn set_active_filter(
        &mut self,
        field: &str,
        value: FilterValue,
    ) -> Result<(), FilterError> {
        if self.config.fields.get(field).is_none() {
            return Err(FilterError::UnknownField(field.to_string()));
        }

        self.context.active.insert(ActiveFilter {
            field: field.to_string(),
            value,
        });
        Ok(())
    }

    /// Commit every active filter: non-empty values are translated and
    /// stored, empty ones drop their field. Persists once at the end.
    pub fn filter(&mut self) -> Result<(), FilteringError> {
        let now = Utc::now();
        let entries: Vec<ActiveFilter> = self.context.active.iter().cloned().collect();

        for entry in entries {
            if entry.value.is_empty() {
                self.drop_filter(&entry.field);
            } else {
                self.commit_filter(&entry.field, entry.value, now)?;
            }
        }

        self.store_context()?;
        Ok(())
    }

    /// Commit one field's value, recomputing its criterion only; the
    /// query tree is recombined lazily at read time.
    pub fn add_filter(&mut self, field: &str, value: FilterValue) -> Result<(), FilteringError> {
        self.commit_filter(field, value, Utc::now())?;
        self.store_context()?;
        Ok(())
    }

    /// Drop one field from the committed and active filters.
    pub fn remove_filter(&mut self, field: &str) -> Result<(), FilteringError> {
        self.drop_filter(field);
        self.store_context()?;
        Ok(())
    }

    pub fn clear_filters(&mut self) -> Result<(), FilteringError> {
        self.context.filters.clear();
        self.context.active.clear();
        self.store_context()?;
        Ok(())
    }

    pub fn has_filter(&self, field: &str) -> bool {
        self.context.filters.contains(field)
    }

    pub fn has_filters(&self) -> bool {
        !self.context.filters.is_empty()
    }

    pub fn count_filters(&self) -> usize {
        self.context.filters.len()
    }

    pub fn count_sorts(&self) -> usize {
        self.context.sort.len()
    }

    pub fn get_filter_value(&self, field: &str) -> Option<&FilterValue> {
        self.context.filters.get(field).map(|f| &f.value)
    }

    /// The combined boolean expression of the committed filters, `None`
    /// when nothing is filtered.
    pub fn build_query(&self) -> Option<QueryNode> {
        query::compile(&self.context.filters)
    }

    /// The compiled query in the legacy string DSL.
    pub fn build_query_string(&self) -> Option<String> {
        self.build_query().map(|node| legacy::to_query_string(&node))
    }

    /// The compiled query in the structured v1 wire format.
    pub fn build_wire_query(&self) -> Option<Value> {
        self.build_query().map(|node| wire::to_wire(&node))
    }

    pub fn toggle_filters(&mut self) -> Result<(), FilteringError> {
        self.context.show_filters = !self.context.show_filters;
        self.store_context()
    }

    pub fn toggle_stats(&mut self) -> Result<(), FilteringError> {
        self.context.show_stats = !self.context.show_stats;
        self.store_context()
    }

    pub fn set_page_size(&mut self, page_size: NonZeroU32) -> Result<(), FilteringError> {
        self.context.page_size = page_size;
        self.store_context()
    }

    pub fn set_sort(&mut self, sort: Vec<SortKey>) -> Result<(), FilteringError> {
        self.context.sort = sort;
        self.store_context()
    }

    /// Toggle-or-reset the sort on a column header click; see
    /// [`FilterContext::sort_by_field`].
    pub fn sort_by_field(&mut self, field: &str) -> Result<(), FilteringError> {
        self.context
            .sort_by_field(field, &self.config.defaults.pinned_sort);
        self.store_context()
    }

    /// The single persistence choke point: serialize the whole context
    /// under the section key. Serialization is deterministic, so storing
    /// an unchanged context writes byte-identical blobs.
    pub fn store_context(&mut self) -> Result<(), FilteringError> {
        let blob = serde_json::to_string_pretty(&self.context).map_err(StoreError::Serialize)?;
        self.store.save(&self.config.section, &blob)?;
        Ok(())
    }

    fn commit_filter(
        &mut self,
        field: &str,
        value: FilterValue,
        now: DateTime<Utc>,
    ) -> Result<(), FilterError> {
        let def = self
            .config
            .fields
            .get(field)
            .ok_or_else(|| FilterError::UnknownField(field.to_string()))?;

        match translate(def, &value, &self.settings, now) {
            Some(criterion) => {
                let label = def.label.clone();
                self.context.filters.insert(CompiledFilter {
                    field: field.to_string(),
                    label,
                    value: value.clone(),
                    criterion,
                });
                self.context.active.insert(ActiveFilter {
                    field: field.to_string(),
                    value,
                });
            }
            // The value contributes nothing; the field must disappear
            // rather than commit an empty criterion.
            None => self.drop_filter(field),
        }

        Ok(())
    }

    fn drop_filter(&mut self, field: &str) {
        // Clear sub-fields before dropping the entry, so editing surfaces
        // still bound to the value observe it blank.
        if let Some(active) = self.context.active.get_mut(field) {
            active.value.clear();
        }

        self.context.filters.remove(field);
        self.context.active.remove(field);
    }

    fn fresh_context(&self, state: &str) -> Result<FilterContext, FilterError> {
        let mut context = Self::default_context(&self.config, state);
        let now = Utc::now();

        for seed in &self.config.default_filter {
            let def = self
                .config
                .fields
                .get(&seed.field)
                .ok_or_else(|| FilterError::UnknownField(seed.field.clone()))?;

            if let Some(criterion) = translate(def, &seed.value, &self.settings, now) {
                context.filters.insert(CompiledFilter {
                    field: seed.field.clone(),
                    label: def.label.clone(),
                    value: seed.value.clone(),
                    criterion,
                });
                context.active.insert(seed.clone());
            }
        }

        Ok(context)
    }

    fn default_context(config: &SectionConfig, state: &str) -> FilterContext {
        FilterContext {
            state: state.to_string(),
            show_filters: config.defaults.show_filters,
            show_stats: config.defaults.show_stats,
            page_size: config.defaults.page_size,
            sort: config.defaults.sort.clone(),
            filters: Default::default(),
            active: Default::default(),
        }
    }
}
