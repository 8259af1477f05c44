//! Per-kind translation of filter values into query criteria.

use super::definition::{FieldDefinition, FieldKind};
use super::value::{DatePeriod, FilterValue, ListOperator, NumberOperator, Term, end_of_day, start_of_day};
use crate::query::QueryNode;
use crate::settings::{TagJoinPolicy, UiSettings};
use chrono::{DateTime, Months, Utc};
use serde_json::Value;

/// Translate one field's current value into a query criterion.
///
/// `None` means the field contributes nothing (blank or partial value) and
/// must be dropped from the committed filters; translators never fail.
/// Relative date periods are resolved against `now`, injected so the
/// resolution is reproducible.
pub fn translate(
    def: &FieldDefinition,
    value: &FilterValue,
    settings: &UiSettings,
    now: DateTime<Utc>,
) -> Option<QueryNode> {
    match (def.kind, value) {
        (FieldKind::Boolean, FilterValue::Boolean { value }) => {
            value.map(|v| QueryNode::field(&def.field, v))
        }

        (FieldKind::Number, FilterValue::Number { operator, value }) => value
            .clone()
            .map(|n| translate_number(&def.field, *operator, n)),

        (FieldKind::FreeText | FieldKind::Tags, FilterValue::Terms { operator, list }) => {
            let leaves = term_leaves(def, list, QueryNode::like);
            let all_join = if def.kind == FieldKind::Tags {
                settings.tag_join
            } else {
                TagJoinPolicy::And
            };
            join_leaves(leaves, *operator, all_join)
        }

        (FieldKind::List | FieldKind::Enumeration, FilterValue::Terms { operator, list }) => {
            let leaves = term_leaves(def, list, QueryNode::field);
            join_leaves(leaves, *operator, TagJoinPolicy::And)
        }

        (FieldKind::Date, FilterValue::Date { operator, from, to }) => {
            translate_date(&def.field, *operator, *from, *to, now)
        }

        (FieldKind::Keyword, FilterValue::Text { value }) => {
            (!value.is_empty()).then(|| QueryNode::Raw(value.clone()))
        }

        // Any other pairing degrades to the plain string translation of the
        // value's display form, mirroring the historical catch-all branch.
        (_, value) => value
            .display_text()
            .map(|text| QueryNode::field(&def.field, text)),
    }
}

fn translate_number(field: &str, operator: NumberOperator, value: serde_json::Number) -> QueryNode {
    let field = field.to_string();
    let value = Value::Number(value);
    match operator {
        NumberOperator::Lt => QueryNode::Lt { field, value },
        NumberOperator::Lte => QueryNode::Lte { field, value },
        NumberOperator::Gt => QueryNode::Gt { field, value },
        NumberOperator::Gte => QueryNode::Gte { field, value },
        NumberOperator::Ne => QueryNode::Not(Box::new(QueryNode::Field { field, value })),
        NumberOperator::Eq => QueryNode::Field { field, value },
    }
}

fn term_leaves(
    def: &FieldDefinition,
    list: &[Term],
    leaf: fn(String, Value) -> QueryNode,
) -> Vec<QueryNode> {
    list.iter()
        .map(|term| leaf(def.field.clone(), def.convert_text(&term.text)))
        .collect()
}

/// Join per-term leaves under the list operator. A single leaf is returned
/// bare, never wrapped in a one-element connective. `all_join` carries the
/// configurable connective used for the `all` operator (tags historically
/// supported OR-joining behind a UI setting).
fn join_leaves(
    leaves: Vec<QueryNode>,
    operator: ListOperator,
    all_join: TagJoinPolicy,
) -> Option<QueryNode> {
    match operator {
        ListOperator::All => match all_join {
            TagJoinPolicy::And => QueryNode::all_of(leaves),
            TagJoinPolicy::Or => QueryNode::any_of(leaves),
        },
        ListOperator::None => QueryNode::any_of(leaves).map(|inner| QueryNode::Not(Box::new(inner))),
        ListOperator::Any => QueryNode::any_of(leaves),
    }
}

fn translate_date(
    field: &str,
    operator: DatePeriod,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<QueryNode> {
    let (from, to) = match operator {
        DatePeriod::Last7Days => period_window(now, |start| start.checked_sub_days(chrono::Days::new(7)))?,
        DatePeriod::Last30Days => {
            period_window(now, |start| start.checked_sub_days(chrono::Days::new(30)))?
        }
        DatePeriod::Last3Months => {
            period_window(now, |start| start.checked_sub_months(Months::new(3)))?
        }
        DatePeriod::Custom => (from, to.map(end_of_day)),
    };

    let field = field.to_string();
    match (from, to) {
        (Some(from), Some(to)) => Some(QueryNode::Between {
            field,
            from: millis(from),
            to: millis(to),
        }),
        (Some(from), None) => Some(QueryNode::Gt {
            field,
            value: millis(from),
        }),
        (None, Some(to)) => Some(QueryNode::Lt {
            field,
            value: millis(to),
        }),
        (None, None) => None,
    }
}

/// A named period spans midnight of its first day through the end of the
/// current day.
fn period_window(
    now: DateTime<Utc>,
    back: impl Fn(DateTime<Utc>) -> Option<DateTime<Utc>>,
) -> Option<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
    let today = start_of_day(now);
    let from = back(today)?;
    Some((Some(from), Some(end_of_day(now))))
}

fn millis(instant: DateTime<Utc>) -> Value {
    Value::from(instant.timestamp_millis())
}
