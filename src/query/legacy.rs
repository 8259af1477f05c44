//! Legacy string DSL serializer
//!
//! Flattens a [`QueryNode`] into the historical Lucene-like search string:
//! `tags:"apt" AND (status:"Open" OR status:"New") AND startDate:[ 1 TO 2 ]`.
//! OR groups are parenthesized; nothing else introduces grouping beyond
//! that, matching what the search endpoint accepted historically.

use super::QueryNode;
use serde_json::Value;

/// Render the expression as a single flattened query string.
pub fn to_query_string(node: &QueryNode) -> String {
    render(node, true)
}

fn render(node: &QueryNode, top: bool) -> String {
    match node {
        QueryNode::Field { field, value } | QueryNode::Like { field, value } => {
            format!("{}:{}", field, render_value(value))
        }
        QueryNode::In { field, values } => {
            let terms: Vec<String> = values
                .iter()
                .map(|v| format!("{}:{}", field, render_value(v)))
                .collect();
            format!("({})", terms.join(" OR "))
        }
        QueryNode::Between { field, from, to } => {
            format!("{}:[ {} TO {} ]", field, render_bound(from), render_bound(to))
        }
        QueryNode::Gt { field, value } => format!("{}:[ {} TO * ]", field, render_bound(value)),
        QueryNode::Lt { field, value } => format!("{}:[ * TO {} ]", field, render_bound(value)),
        QueryNode::Gte { field, value } => format!("{}:>={}", field, render_bound(value)),
        QueryNode::Lte { field, value } => format!("{}:<={}", field, render_bound(value)),
        QueryNode::And(nodes) => {
            let joined = nodes
                .iter()
                .map(|n| render(n, false))
                .collect::<Vec<_>>()
                .join(" AND ");
            if top { joined } else { format!("({})", joined) }
        }
        QueryNode::Or(nodes) => {
            let joined = nodes
                .iter()
                .map(|n| render(n, false))
                .collect::<Vec<_>>()
                .join(" OR ");
            format!("({})", joined)
        }
        QueryNode::Not(inner) => format!("NOT {}", render(inner, false)),
        QueryNode::Raw(text) => text.clone(),
    }
}

/// Strings are quoted with embedded quotes escaped; numbers and booleans
/// are rendered bare.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s.replace('"', "\\\"")),
        other => other.to_string(),
    }
}

/// Range bounds are never quoted (epoch milliseconds or plain numbers).
fn render_bound(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_quotes_strings() {
        let node = QueryNode::field("title", "malware campaign");
        assert_eq!(to_query_string(&node), "title:\"malware campaign\"");
    }

    #[test]
    fn test_field_escapes_embedded_quotes() {
        let node = QueryNode::field("title", "say \"hi\"");
        assert_eq!(to_query_string(&node), "title:\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_numbers_render_bare() {
        let node = QueryNode::field("tlp", 2);
        assert_eq!(to_query_string(&node), "tlp:2");
    }

    #[test]
    fn test_and_joins_without_grouping_at_top_level() {
        let node = QueryNode::And(vec![
            QueryNode::field("status", "Open"),
            QueryNode::field("tlp", 2),
        ]);
        assert_eq!(to_query_string(&node), "status:\"Open\" AND tlp:2");
    }

    #[test]
    fn test_or_group_is_parenthesized() {
        let node = QueryNode::And(vec![
            QueryNode::field("flag", true),
            QueryNode::Or(vec![
                QueryNode::field("status", "Open"),
                QueryNode::field("status", "New"),
            ]),
        ]);
        assert_eq!(
            to_query_string(&node),
            "flag:true AND (status:\"Open\" OR status:\"New\")"
        );
    }

    #[test]
    fn test_not_renders_as_leading_exclusion() {
        let node = QueryNode::Not(Box::new(QueryNode::Or(vec![
            QueryNode::like("tags", "junk"),
            QueryNode::like("tags", "noise"),
        ])));
        assert_eq!(to_query_string(&node), "NOT (tags:\"junk\" OR tags:\"noise\")");
    }

    #[test]
    fn test_range_forms() {
        assert_eq!(
            to_query_string(&QueryNode::Between {
                field: "startDate".into(),
                from: json!(1000),
                to: json!(2000),
            }),
            "startDate:[ 1000 TO 2000 ]"
        );
        assert_eq!(
            to_query_string(&QueryNode::Gt {
                field: "startDate".into(),
                value: json!(1000),
            }),
            "startDate:[ 1000 TO * ]"
        );
        assert_eq!(
            to_query_string(&QueryNode::Lt {
                field: "startDate".into(),
                value: json!(2000),
            }),
            "startDate:[ * TO 2000 ]"
        );
        assert_eq!(
            to_query_string(&QueryNode::Gte {
                field: "tlp".into(),
                value: json!(2),
            }),
            "tlp:>=2"
        );
    }

    #[test]
    fn test_raw_passes_through() {
        let node = QueryNode::Raw("apt28".to_string());
        assert_eq!(to_query_string(&node), "apt28");
    }
}
