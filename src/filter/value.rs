use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// One entry of a term-list filter value.
///
/// `label` carries the display form when it differs from the matched text
/// (enumeration choices mapping ranks to names, for instance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Term {
    pub fn new(text: impl Into<String>) -> Self {
        Term {
            text: text.into(),
            label: None,
        }
    }

    pub fn labelled(text: impl Into<String>, label: impl Into<String>) -> Self {
        Term {
            text: text.into(),
            label: Some(label.into()),
        }
    }

    /// Display form of the term.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.text)
    }
}

impl From<&str> for Term {
    fn from(text: &str) -> Self {
        Term::new(text)
    }
}

impl From<(&str, &str)> for Term {
    fn from((text, label): (&str, &str)) -> Self {
        Term::labelled(text, label)
    }
}

/// How the entries of a term list combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOperator {
    /// At least one term matches.
    #[default]
    Any,
    /// Every term matches.
    All,
    /// No term matches.
    None,
}

/// Comparison operator of a number filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NumberOperator {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "!=")]
    Ne,
    #[default]
    #[serde(rename = "eq")]
    Eq,
}

/// Period selector of a date filter: a named relative window resolved
/// against "now", or an explicit custom range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DatePeriod {
    #[serde(rename = "last7Days")]
    Last7Days,
    #[serde(rename = "last30Days")]
    Last30Days,
    #[serde(rename = "last3Months")]
    Last3Months,
    #[default]
    #[serde(rename = "custom")]
    Custom,
}

/// The in-progress value of one filter, keyed by field kind.
///
/// Every variant has an "empty" configuration meaning "no filter on this
/// field"; see [`FilterValue::is_empty`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterValue {
    Boolean {
        value: Option<bool>,
    },
    Number {
        #[serde(default)]
        operator: NumberOperator,
        value: Option<Number>,
    },
    Terms {
        #[serde(default)]
        operator: ListOperator,
        list: Vec<Term>,
    },
    Date {
        #[serde(default)]
        operator: DatePeriod,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    },
    Text {
        value: String,
    },
}

impl FilterValue {
    pub fn boolean(value: impl Into<Option<bool>>) -> Self {
        FilterValue::Boolean {
            value: value.into(),
        }
    }

    pub fn number(operator: NumberOperator, value: impl Into<Number>) -> Self {
        FilterValue::Number {
            operator,
            value: Some(value.into()),
        }
    }

    pub fn terms<I, T>(operator: ListOperator, list: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        FilterValue::Terms {
            operator,
            list: list.into_iter().map(|t| Term::new(t)).collect(),
        }
    }

    pub fn date_range(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        FilterValue::Date {
            operator: DatePeriod::Custom,
            from,
            to,
        }
    }

    pub fn period(period: DatePeriod) -> Self {
        FilterValue::Date {
            operator: period,
            from: None,
            to: None,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        FilterValue::Text {
            value: value.into(),
        }
    }

    /// An empty value contributes nothing to the query and the field must
    /// be dropped from the committed filters rather than emit an empty
    /// criterion.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Boolean { value } => value.is_none(),
            FilterValue::Number { value, .. } => value.is_none(),
            FilterValue::Terms { list, .. } => list.is_empty(),
            FilterValue::Date { operator, from, to } => {
                *operator == DatePeriod::Custom && from.is_none() && to.is_none()
            }
            FilterValue::Text { value } => value.is_empty(),
        }
    }

    /// Clear the sub-fields of a composite value in place.
    ///
    /// Run on the active entry before a field is dropped, so an editing
    /// surface still bound to the value observes it blank rather than
    /// holding the last committed range or list.
    pub fn clear(&mut self) {
        match self {
            FilterValue::Boolean { value } => *value = None,
            FilterValue::Number { operator, value } => {
                *operator = NumberOperator::default();
                *value = None;
            }
            FilterValue::Terms { operator, list } => {
                *operator = ListOperator::default();
                list.clear();
            }
            FilterValue::Date { operator, from, to } => {
                *operator = DatePeriod::default();
                *from = None;
                *to = None;
            }
            FilterValue::Text { value } => value.clear(),
        }
    }

    /// Scalar display form used by the string fallback translation and the
    /// context rendering; `None` when the value is empty.
    pub fn display_text(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        Some(match self {
            FilterValue::Boolean { value } => value.map(|v| v.to_string()).unwrap_or_default(),
            FilterValue::Number { operator, value } => format!(
                "{} {}",
                operator_symbol(*operator),
                value.as_ref().map(Number::to_string).unwrap_or_default()
            ),
            FilterValue::Terms { list, .. } => list
                .iter()
                .map(Term::label)
                .collect::<Vec<_>>()
                .join(", "),
            FilterValue::Date { operator, from, to } => match operator {
                DatePeriod::Last7Days => "last 7 days".to_string(),
                DatePeriod::Last30Days => "last 30 days".to_string(),
                DatePeriod::Last3Months => "last 3 months".to_string(),
                DatePeriod::Custom => format!(
                    "{} to {}",
                    from.map(|d| d.to_rfc3339()).unwrap_or_else(|| "*".to_string()),
                    to.map(|d| d.to_rfc3339()).unwrap_or_else(|| "*".to_string())
                ),
            },
            FilterValue::Text { value } => value.clone(),
        })
    }
}

/// Midnight of the instant's day.
pub(crate) fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .date_naive()
        .and_hms_milli_opt(0, 0, 0, 0)
        .expect("valid midnight time")
        .and_utc()
}

/// `23:59:59.999` of the instant's day. Explicit upper bounds are widened
/// to this instant so a range entered as a day covers the whole day.
pub(crate) fn end_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .date_naive()
        .and_hms_milli_opt(23, 59, 59, 999)
        .expect("valid end of day time")
        .and_utc()
}

fn operator_symbol(operator: NumberOperator) -> &'static str {
    match operator {
        NumberOperator::Lt => "<",
        NumberOperator::Lte => "<=",
        NumberOperator::Gt => ">",
        NumberOperator::Gte => ">=",
        NumberOperator::Ne => "!=",
        NumberOperator::Eq => "=",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_per_kind() {
        assert!(FilterValue::boolean(None).is_empty());
        assert!(!FilterValue::boolean(false).is_empty());

        assert!(
            FilterValue::Number {
                operator: NumberOperator::Gt,
                value: None,
            }
            .is_empty()
        );
        assert!(!FilterValue::number(NumberOperator::Eq, 2).is_empty());

        assert!(FilterValue::terms(ListOperator::Any, Vec::<String>::new()).is_empty());
        assert!(!FilterValue::terms(ListOperator::Any, ["x"]).is_empty());

        assert!(FilterValue::date_range(None, None).is_empty());
        assert!(!FilterValue::period(DatePeriod::Last7Days).is_empty());

        assert!(FilterValue::text("").is_empty());
        assert!(!FilterValue::text("apt").is_empty());
    }

    #[test]
    fn test_clear_resets_sub_fields() {
        let mut value = FilterValue::terms(ListOperator::All, ["a", "b"]);
        value.clear();
        assert_eq!(
            value,
            FilterValue::Terms {
                operator: ListOperator::Any,
                list: vec![],
            }
        );
        assert!(value.is_empty());
    }

    #[test]
    fn test_value_round_trips_through_serde() {
        let value = FilterValue::terms(ListOperator::None, ["t1", "t2"]);
        let raw = serde_json::to_string(&value).expect("serializable value");
        let back: FilterValue = serde_json::from_str(&raw).expect("parseable value");
        assert_eq!(back, value);
    }

    #[test]
    fn test_operator_spellings() {
        let raw = r#"{"kind":"number","operator":">=","value":3}"#;
        let value: FilterValue = serde_json::from_str(raw).expect("parseable value");
        assert_eq!(value, FilterValue::number(NumberOperator::Gte, 3));

        let raw = r#"{"kind":"date","operator":"last30Days","from":null,"to":null}"#;
        let value: FilterValue = serde_json::from_str(raw).expect("parseable value");
        assert_eq!(value, FilterValue::period(DatePeriod::Last30Days));
    }
}
