use super::value::{FilterValue, NumberOperator, Term, end_of_day, start_of_day};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// The closed set of filter kinds. Translator dispatch matches on this
/// exhaustively, so adding a kind is a compile-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Tri-state flag.
    Boolean,
    /// Numeric comparison.
    Number,
    /// Pattern-matched term list.
    FreeText,
    /// Pattern-matched term list over the tags attribute.
    Tags,
    /// Exact-match term list.
    List,
    /// Exact-match term list restricted to a closed choice set.
    Enumeration,
    /// Relative period or explicit range.
    Date,
    /// Raw search string passed through verbatim.
    Keyword,
}

/// Normalization applied to raw entered text before it lands in a
/// criterion (severity name to numeric rank, lowercasing, ...).
pub type ConvertFn = fn(&str) -> Value;

/// Describes one filterable attribute of a list view. Immutable, supplied
/// by the view adapter at setup.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    /// Attribute name on the backend entity.
    pub field: String,
    pub kind: FieldKind,
    /// Display label of the filter editor.
    pub label: String,
    /// Value seeded into a fresh editing surface.
    pub default_value: FilterValue,
    /// Selectable terms for enumeration fields.
    pub choices: Vec<Term>,
    pub convert: Option<ConvertFn>,
}

impl FieldDefinition {
    pub fn new(field: impl Into<String>, kind: FieldKind, label: impl Into<String>) -> Self {
        let default_value = match kind {
            FieldKind::Boolean => FilterValue::boolean(None),
            FieldKind::Number => FilterValue::Number {
                operator: NumberOperator::default(),
                value: None,
            },
            FieldKind::FreeText | FieldKind::Tags | FieldKind::List | FieldKind::Enumeration => {
                FilterValue::terms(Default::default(), Vec::<String>::new())
            }
            FieldKind::Date => FilterValue::date_range(None, None),
            FieldKind::Keyword => FilterValue::text(""),
        };

        FieldDefinition {
            field: field.into(),
            kind,
            label: label.into(),
            default_value,
            choices: Vec::new(),
            convert: None,
        }
    }

    pub fn with_choices<I, T>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_convert(mut self, convert: ConvertFn) -> Self {
        self.convert = Some(convert);
        self
    }

    /// Apply the definition's normalization to one raw term text.
    pub fn convert_text(&self, text: &str) -> Value {
        match self.convert {
            Some(convert) => convert(text),
            None => Value::String(text.to_string()),
        }
    }

    /// Display label registered for a choice text, falling back to the text
    /// itself for open-ended fields.
    pub fn choice_label(&self, text: &str) -> String {
        self.choices
            .iter()
            .find(|c| c.text == text)
            .map(|c| c.label().to_string())
            .unwrap_or_else(|| text.to_string())
    }

    /// Build a filter value for this field from a loosely-typed raw value,
    /// the way quick filters ("filter to this cell's value") enter the
    /// system. Returns `None` when the raw value cannot be read as this
    /// kind.
    pub fn value_from(&self, raw: &Value) -> Option<FilterValue> {
        match self.kind {
            FieldKind::Boolean => raw.as_bool().map(FilterValue::boolean),
            FieldKind::Number => raw
                .as_number()
                .cloned()
                .map(|n| FilterValue::number(NumberOperator::Eq, n)),
            FieldKind::FreeText | FieldKind::Tags | FieldKind::List | FieldKind::Enumeration => {
                let texts: Vec<String> = match raw {
                    Value::String(s) => vec![s.clone()],
                    Value::Number(n) => vec![n.to_string()],
                    Value::Array(items) => items
                        .iter()
                        .map(|item| match item {
                            Value::String(s) => Some(s.clone()),
                            Value::Number(n) => Some(n.to_string()),
                            _ => None,
                        })
                        .collect::<Option<Vec<_>>>()?,
                    _ => return None,
                };

                let list = texts
                    .into_iter()
                    .map(|text| {
                        let label = self.choice_label(&text);
                        Term::labelled(text, label)
                    })
                    .collect();

                Some(FilterValue::Terms {
                    operator: Default::default(),
                    list,
                })
            }
            FieldKind::Date => {
                let instant = parse_instant(raw)?;
                Some(FilterValue::date_range(
                    Some(start_of_day(instant)),
                    Some(end_of_day(instant)),
                ))
            }
            FieldKind::Keyword => raw.as_str().map(FilterValue::text),
        }
    }
}

/// A date cell value arrives either as an epoch-millisecond number or as a
/// textual date/instant.
fn parse_instant(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
        Value::String(s) => {
            if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
                return Some(instant.with_timezone(&Utc));
            }
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc())
        }
        _ => None,
    }
}

/// The registered field definitions of one section, looked up by field
/// name. Referencing a field absent from the table is a configuration
/// error surfaced by the caller.
#[derive(Debug, Clone, Default)]
pub struct FieldTable {
    defs: Vec<FieldDefinition>,
}

impl FieldTable {
    pub fn new<I>(defs: I) -> Self
    where
        I: IntoIterator<Item = FieldDefinition>,
    {
        FieldTable {
            defs: defs.into_iter().collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldDefinition> {
        self.defs.iter().find(|def| def.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_values_are_empty() {
        for kind in [
            FieldKind::Boolean,
            FieldKind::Number,
            FieldKind::FreeText,
            FieldKind::Tags,
            FieldKind::List,
            FieldKind::Enumeration,
            FieldKind::Date,
            FieldKind::Keyword,
        ] {
            let def = FieldDefinition::new("f", kind, "F");
            assert!(def.default_value.is_empty(), "{kind:?}");
        }
    }

    #[test]
    fn test_value_from_scalar_becomes_single_term() {
        let def = FieldDefinition::new("status", FieldKind::Enumeration, "Status")
            .with_choices([("Open", "Open cases")]);
        let value = def.value_from(&json!("Open")).expect("coercible value");

        assert_eq!(
            value,
            FilterValue::Terms {
                operator: Default::default(),
                list: vec![Term::labelled("Open", "Open cases")],
            }
        );
    }

    #[test]
    fn test_value_from_day_expands_to_whole_day_range() {
        let def = FieldDefinition::new("startDate", FieldKind::Date, "Start date");
        let value = def.value_from(&json!("2026-03-10")).expect("coercible value");

        match value {
            FilterValue::Date { from, to, .. } => {
                assert_eq!(from.expect("from bound").to_rfc3339(), "2026-03-10T00:00:00+00:00");
                assert_eq!(
                    to.expect("to bound").timestamp_millis() % 1000,
                    999,
                    "upper bound widened to end of day"
                );
            }
            other => panic!("expected date value, got {other:?}"),
        }
    }

    #[test]
    fn test_value_from_rejects_mismatched_raw() {
        let def = FieldDefinition::new("ioc", FieldKind::Boolean, "IOC");
        assert_eq!(def.value_from(&json!({"nested": true})), None);
    }
}
