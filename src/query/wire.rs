//! Structured v1 wire format serializer
//!
//! Renders a [`QueryNode`] as the JSON operator tree consumed by the v1
//! search API: `{"_and": [{"_field": "status", "_value": "Open"}, ...]}`.

use super::QueryNode;
use serde_json::{Value, json};

/// Render the expression as the structured v1 JSON tree.
pub fn to_wire(node: &QueryNode) -> Value {
    match node {
        QueryNode::Field { field, value } => json!({ "_field": field, "_value": value }),
        QueryNode::Like { field, value } => {
            json!({ "_like": { "_field": field, "_value": value } })
        }
        QueryNode::In { field, values } => {
            json!({ "_in": { "_field": field, "_values": values } })
        }
        QueryNode::Between { field, from, to } => {
            json!({ "_between": { "_field": field, "_from": from, "_to": to } })
        }
        QueryNode::Gt { field, value } => json!({ "_gt": { "_field": field, "_value": value } }),
        QueryNode::Gte { field, value } => json!({ "_gte": { "_field": field, "_value": value } }),
        QueryNode::Lt { field, value } => json!({ "_lt": { "_field": field, "_value": value } }),
        QueryNode::Lte { field, value } => json!({ "_lte": { "_field": field, "_value": value } }),
        QueryNode::And(nodes) => json!({ "_and": nodes.iter().map(to_wire).collect::<Vec<_>>() }),
        QueryNode::Or(nodes) => json!({ "_or": nodes.iter().map(to_wire).collect::<Vec<_>>() }),
        QueryNode::Not(inner) => json!({ "_not": to_wire(inner) }),
        QueryNode::Raw(text) => json!({ "_string": text }),
    }
}
