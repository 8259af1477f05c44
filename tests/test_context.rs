use case_query::{
    FieldDefinition, FieldKind, FieldTable, Filtering, FilteringError, FilterValue, ListOperator,
    MemoryStore, NumberOperator, QueryNode, SectionConfig, SectionDefaults, SortKey, UiSettings,
};
use case_query::store::ContextStore;
use std::num::NonZeroU32;

fn test_config() -> SectionConfig {
    let fields = FieldTable::new([
        FieldDefinition::new("keyword", FieldKind::Keyword, "Keyword"),
        FieldDefinition::new("title", FieldKind::FreeText, "Title"),
        FieldDefinition::new("tags", FieldKind::Tags, "Tags"),
        FieldDefinition::new("tlp", FieldKind::Number, "TLP"),
        FieldDefinition::new("ioc", FieldKind::Boolean, "IOC"),
        FieldDefinition::new("startDate", FieldKind::Date, "Start date"),
    ]);

    SectionConfig {
        section: "test.list".to_string(),
        fields,
        defaults: SectionDefaults {
            sort: vec![SortKey::desc("startDate")],
            ..SectionDefaults::default()
        },
        default_filter: Vec::new(),
    }
}

fn open() -> Filtering<MemoryStore> {
    let mut filtering = Filtering::new(test_config(), UiSettings::default(), MemoryStore::new());
    filtering.init_context("list").expect("initialized context");
    filtering
}

#[test]
fn test_init_context_builds_and_persists_defaults() {
    let filtering = open();

    let context = filtering.context();
    assert_eq!(context.state, "list");
    assert_eq!(context.page_size.get(), 15);
    assert_eq!(context.sort, vec![SortKey::desc("startDate")]);
    assert!(context.show_filters);
    assert!(!context.show_stats);
    assert!(!filtering.has_filters());

    // The fresh context is persisted immediately.
    assert!(filtering.store().load("test.list").is_some());
}

#[test]
fn test_add_then_remove_restores_no_filter() {
    let mut filtering = open();
    assert_eq!(filtering.build_query(), None);

    filtering
        .add_filter("tlp", FilterValue::number(NumberOperator::Gte, 2))
        .expect("committed filter");
    assert!(filtering.has_filter("tlp"));
    assert!(filtering.build_query().is_some());

    filtering.remove_filter("tlp").expect("removed filter");
    assert_eq!(filtering.build_query(), None);
    assert!(!filtering.has_filters());
}

#[test]
fn test_filter_commits_active_values_and_drops_empties() {
    let mut filtering = open();

    filtering
        .set_active_filter("title", FilterValue::terms(ListOperator::Any, ["phishing"]))
        .expect("known field");
    filtering
        .set_active_filter("ioc", FilterValue::boolean(None))
        .expect("known field");
    filtering.filter().expect("committed filters");

    assert!(filtering.has_filter("title"));
    assert!(!filtering.has_filter("ioc"));

    // Committed and active key sets stay identical.
    let context = filtering.context();
    let committed: Vec<&str> = context.filters.fields().collect();
    let active: Vec<&str> = context.active.fields().collect();
    assert_eq!(committed, active);
}

#[test]
fn test_unknown_field_fails_fast() {
    let mut filtering = open();

    let result = filtering.add_filter("nope", FilterValue::text("x"));
    assert!(matches!(result, Err(FilteringError::Filter(_))));

    assert!(filtering.set_active_filter("nope", FilterValue::text("x")).is_err());
}

#[test]
fn test_committing_an_empty_value_drops_the_field() {
    let mut filtering = open();

    filtering
        .add_filter("tags", FilterValue::terms(ListOperator::All, ["t1"]))
        .expect("committed filter");
    assert!(filtering.has_filter("tags"));

    filtering
        .add_filter("tags", FilterValue::terms(ListOperator::All, Vec::<String>::new()))
        .expect("empty value accepted");
    assert!(!filtering.has_filter("tags"));
    assert_eq!(filtering.build_query(), None);
}

#[test]
fn test_clear_filters_empties_both_sets() {
    let mut filtering = open();

    filtering
        .add_filter("title", FilterValue::terms(ListOperator::Any, ["a"]))
        .expect("committed filter");
    filtering
        .add_filter("ioc", FilterValue::boolean(true))
        .expect("committed filter");
    filtering.clear_filters().expect("cleared");

    assert_eq!(filtering.count_filters(), 0);
    assert!(filtering.context().active.is_empty());
    assert_eq!(filtering.build_query(), None);
}

#[test]
fn test_sort_toggle_sequence() {
    let mut filtering = open();
    assert_eq!(filtering.context().sort, vec![SortKey::desc("startDate")]);

    filtering.sort_by_field("title").expect("sorted");
    assert_eq!(filtering.context().sort, vec![SortKey::asc("title")]);

    filtering.sort_by_field("title").expect("sorted");
    assert_eq!(filtering.context().sort, vec![SortKey::desc("title")]);

    filtering.sort_by_field("tlp").expect("sorted");
    assert_eq!(filtering.context().sort, vec![SortKey::asc("tlp")]);
}

#[test]
fn test_store_context_is_idempotent() {
    let mut filtering = open();
    filtering
        .add_filter("title", FilterValue::terms(ListOperator::Any, ["a"]))
        .expect("committed filter");

    let first = filtering.store().load("test.list").expect("stored blob");
    filtering.store_context().expect("stored");
    filtering.store_context().expect("stored");
    let second = filtering.store().load("test.list").expect("stored blob");

    assert_eq!(first, second, "unchanged context stores byte-identical");
}

#[test]
fn test_context_round_trips_through_the_store() {
    let mut store = MemoryStore::new();

    {
        let mut filtering =
            Filtering::new(test_config(), UiSettings::default(), &mut store);
        filtering.init_context("list").expect("initialized context");
        filtering
            .add_filter("ioc", FilterValue::boolean(true))
            .expect("committed filter");
        filtering
            .set_page_size(NonZeroU32::new(50).expect("non-zero size"))
            .expect("page size set");
        filtering.sort_by_field("tlp").expect("sorted");
    }

    let mut filtering = Filtering::new(test_config(), UiSettings::default(), store);
    filtering.init_context("list").expect("initialized context");

    assert!(filtering.has_filter("ioc"));
    assert_eq!(filtering.context().page_size.get(), 50);
    assert_eq!(filtering.context().sort, vec![SortKey::asc("tlp")]);
    assert_eq!(
        filtering.build_query(),
        Some(QueryNode::field("ioc", true))
    );
}

#[test]
fn test_corrupt_stored_blob_falls_back_to_defaults() {
    let mut store = MemoryStore::new();
    store
        .save("test.list", "{not json at all")
        .expect("seeded blob");

    let mut filtering = Filtering::new(test_config(), UiSettings::default(), store);
    filtering.init_context("list").expect("initialized context");

    assert!(!filtering.has_filters());
    assert_eq!(filtering.context().page_size.get(), 15);

    // The rebuilt defaults replace the corrupt blob.
    let stored = filtering.store().load("test.list").expect("stored blob");
    assert!(serde_json::from_str::<serde_json::Value>(&stored).is_ok());
}

#[test]
fn test_toggles_flip_one_attribute() {
    let mut filtering = open();

    filtering.toggle_filters().expect("toggled");
    assert!(!filtering.context().show_filters);
    filtering.toggle_filters().expect("toggled");
    assert!(filtering.context().show_filters);

    filtering.toggle_stats().expect("toggled");
    assert!(filtering.context().show_stats);
}

#[test]
fn test_init_active_filters_seeds_every_definition() {
    let mut filtering = open();
    filtering
        .add_filter("ioc", FilterValue::boolean(true))
        .expect("committed filter");

    filtering.init_active_filters();

    let context = filtering.context();
    assert_eq!(context.active.len(), 6);
    // Committed fields keep their value; the rest get the definition default.
    assert_eq!(
        context.active.get("ioc").map(|a| &a.value),
        Some(&FilterValue::boolean(true))
    );
    assert!(
        context
            .active
            .get("title")
            .map(|a| a.value.is_empty())
            .unwrap_or(false)
    );
}

#[test]
fn test_get_filter_value_reads_committed_values() {
    let mut filtering = open();
    assert_eq!(filtering.get_filter_value("ioc"), None);

    filtering
        .add_filter("ioc", FilterValue::boolean(false))
        .expect("committed filter");
    assert_eq!(
        filtering.get_filter_value("ioc"),
        Some(&FilterValue::boolean(false))
    );
}

#[test]
fn test_reset_context_discards_mutations() {
    let mut filtering = open();
    filtering
        .add_filter("title", FilterValue::terms(ListOperator::Any, ["x"]))
        .expect("committed filter");
    filtering
        .set_page_size(NonZeroU32::new(100).expect("non-zero size"))
        .expect("page size set");

    filtering.reset_context().expect("reset");

    assert!(!filtering.has_filters());
    assert_eq!(filtering.context().page_size.get(), 15);
    assert_eq!(filtering.context().sort, vec![SortKey::desc("startDate")]);
}
