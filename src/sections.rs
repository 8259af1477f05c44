//! Built-in section configurations, one per list view.
//!
//! Each preset carries the storage key, filterable field table, default
//! sort/paging and seed filter of a view. The field tables mirror the
//! filterable attributes the backend exposes for each entity.

use crate::context::{ActiveFilter, SortKey};
use crate::filter::{FieldDefinition, FieldKind, FieldTable, FilterValue, ListOperator};
use crate::filtering::{SectionConfig, SectionDefaults};
use serde_json::Value;

/// Severity names are entered by label but matched by numeric rank.
fn severity_rank(text: &str) -> Value {
    match text.to_ascii_lowercase().as_str() {
        "low" => Value::from(1),
        "medium" => Value::from(2),
        "high" => Value::from(3),
        "critical" => Value::from(4),
        _ => Value::String(text.to_string()),
    }
}

fn severity_field() -> FieldDefinition {
    FieldDefinition::new("severity", FieldKind::Enumeration, "Severity")
        .with_choices(["Low", "Medium", "High", "Critical"])
        .with_convert(severity_rank)
}

/// The case list: open cases first, flagged ones pinned on top.
pub fn cases() -> SectionConfig {
    let fields = FieldTable::new([
        FieldDefinition::new("keyword", FieldKind::Keyword, "Keyword"),
        FieldDefinition::new("title", FieldKind::FreeText, "Title"),
        FieldDefinition::new("tags", FieldKind::Tags, "Tags"),
        FieldDefinition::new("status", FieldKind::Enumeration, "Status").with_choices([
            "Open",
            "Resolved",
            "Deleted",
            "Duplicated",
        ]),
        FieldDefinition::new("resolutionStatus", FieldKind::List, "Resolution"),
        severity_field(),
        FieldDefinition::new("tlp", FieldKind::Number, "TLP"),
        FieldDefinition::new("flag", FieldKind::Boolean, "Flagged"),
        FieldDefinition::new("assignee", FieldKind::FreeText, "Assignee"),
        FieldDefinition::new("startDate", FieldKind::Date, "Start date"),
    ]);

    SectionConfig {
        section: "case.list".to_string(),
        fields,
        defaults: SectionDefaults {
            sort: vec![SortKey::desc("flag"), SortKey::desc("startDate")],
            pinned_sort: vec![SortKey::desc("flag")],
            ..SectionDefaults::default()
        },
        default_filter: vec![ActiveFilter {
            field: "status".to_string(),
            value: FilterValue::terms(ListOperator::Any, ["Open"]),
        }],
    }
}

/// The alert list: unimported alerts by default, newest first.
pub fn alerts() -> SectionConfig {
    let fields = FieldTable::new([
        FieldDefinition::new("keyword", FieldKind::Keyword, "Keyword"),
        FieldDefinition::new("title", FieldKind::FreeText, "Title"),
        FieldDefinition::new("type", FieldKind::List, "Type"),
        FieldDefinition::new("source", FieldKind::List, "Source"),
        severity_field(),
        FieldDefinition::new("tags", FieldKind::Tags, "Tags"),
        FieldDefinition::new("imported", FieldKind::Boolean, "Imported"),
        FieldDefinition::new("date", FieldKind::Date, "Date"),
    ]);

    SectionConfig {
        section: "alert.list".to_string(),
        fields,
        defaults: SectionDefaults {
            sort: vec![SortKey::desc("date")],
            ..SectionDefaults::default()
        },
        default_filter: vec![ActiveFilter {
            field: "imported".to_string(),
            value: FilterValue::boolean(false),
        }],
    }
}

/// A task list. The same sections back several task views (my tasks,
/// waiting tasks), each persisting under its own key.
pub fn tasks(view_id: &str) -> SectionConfig {
    let fields = FieldTable::new([
        FieldDefinition::new("title", FieldKind::FreeText, "Title"),
        FieldDefinition::new("status", FieldKind::Enumeration, "Status").with_choices([
            "Waiting",
            "InProgress",
            "Completed",
            "Cancel",
        ]),
        FieldDefinition::new("assignee", FieldKind::FreeText, "Assignee"),
        FieldDefinition::new("flag", FieldKind::Boolean, "Flagged"),
        FieldDefinition::new("startDate", FieldKind::Date, "Start date"),
        FieldDefinition::new("dueDate", FieldKind::Date, "Due date"),
    ]);

    SectionConfig {
        section: format!("{view_id}.list"),
        fields,
        defaults: SectionDefaults {
            sort: vec![SortKey::desc("flag"), SortKey::desc("startDate")],
            pinned_sort: vec![SortKey::desc("flag")],
            ..SectionDefaults::default()
        },
        default_filter: Vec::new(),
    }
}

/// The observable list of a case.
pub fn observables() -> SectionConfig {
    let fields = FieldTable::new([
        FieldDefinition::new("keyword", FieldKind::Keyword, "Keyword"),
        FieldDefinition::new("dataType", FieldKind::List, "Type"),
        FieldDefinition::new("data", FieldKind::FreeText, "Value"),
        FieldDefinition::new("tags", FieldKind::Tags, "Tags"),
        FieldDefinition::new("ioc", FieldKind::Boolean, "IOC"),
        FieldDefinition::new("sighted", FieldKind::Boolean, "Sighted"),
        FieldDefinition::new("tlp", FieldKind::Number, "TLP"),
        FieldDefinition::new("startDate", FieldKind::Date, "Added"),
    ]);

    SectionConfig {
        section: "observable.list".to_string(),
        fields,
        defaults: SectionDefaults {
            sort: vec![SortKey::desc("startDate")],
            ..SectionDefaults::default()
        },
        default_filter: Vec::new(),
    }
}

/// The TTP/procedure list of a case.
pub fn procedures() -> SectionConfig {
    let fields = FieldTable::new([
        FieldDefinition::new("patternId", FieldKind::FreeText, "Pattern"),
        FieldDefinition::new("tactic", FieldKind::List, "Tactic"),
        FieldDefinition::new("description", FieldKind::FreeText, "Description"),
        FieldDefinition::new("occurDate", FieldKind::Date, "Occur date"),
    ]);

    SectionConfig {
        section: "procedure.list".to_string(),
        fields,
        defaults: SectionDefaults {
            sort: vec![SortKey::desc("occurDate")],
            ..SectionDefaults::default()
        },
        default_filter: Vec::new(),
    }
}

/// The dashboard library.
pub fn dashboards() -> SectionConfig {
    let fields = FieldTable::new([
        FieldDefinition::new("title", FieldKind::FreeText, "Title"),
        FieldDefinition::new("description", FieldKind::FreeText, "Description"),
        FieldDefinition::new("status", FieldKind::Enumeration, "Visibility")
            .with_choices([("Private", "Private"), ("Shared", "Shared")]),
    ]);

    SectionConfig {
        section: "dashboard.list".to_string(),
        fields,
        defaults: SectionDefaults {
            sort: vec![SortKey::asc("title")],
            ..SectionDefaults::default()
        },
        default_filter: Vec::new(),
    }
}

/// The organisation's custom tag library.
pub fn custom_tags() -> SectionConfig {
    let fields = FieldTable::new([
        FieldDefinition::new("namespace", FieldKind::List, "Namespace"),
        FieldDefinition::new("predicate", FieldKind::FreeText, "Predicate"),
        FieldDefinition::new("description", FieldKind::FreeText, "Description"),
        FieldDefinition::new("colour", FieldKind::FreeText, "Colour"),
    ]);

    SectionConfig {
        section: "custom-tags.list".to_string(),
        fields,
        defaults: SectionDefaults {
            sort: vec![SortKey::asc("predicate")],
            ..SectionDefaults::default()
        },
        default_filter: Vec::new(),
    }
}
