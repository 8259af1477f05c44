//! Boolean query expressions and their wire encodings
//!
//! Every committed filter compiles down to one [`QueryNode`]. The nodes of
//! all committed filters are combined into a single expression by
//! [`compile`], and that expression is rendered by one of two independent
//! serializers:
//!
//! - [`legacy::to_query_string`] - the flattened Lucene-like string DSL
//! - [`wire::to_wire`] - the structured v1 JSON tree consumed by the
//!   search API
//!
//! The AST is the single source of truth; the serializers never re-derive
//! criteria from filter values.

pub mod legacy;
pub mod wire;

use crate::context::FilterSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One compiled query predicate.
///
/// Leaf values are kept as loosely-typed JSON values: a criterion may carry
/// a string, a number or a boolean depending on the field it was compiled
/// from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryNode {
    /// Exact match on a field.
    Field { field: String, value: Value },
    /// Substring/pattern match on a field.
    Like { field: String, value: Value },
    /// Membership in a value list.
    In { field: String, values: Vec<Value> },
    /// Inclusive range match.
    Between { field: String, from: Value, to: Value },
    Gt { field: String, value: Value },
    Gte { field: String, value: Value },
    Lt { field: String, value: Value },
    Lte { field: String, value: Value },
    And(Vec<QueryNode>),
    Or(Vec<QueryNode>),
    Not(Box<QueryNode>),
    /// A raw query fragment passed through verbatim (keyword searches).
    Raw(String),
}

impl QueryNode {
    pub fn field(field: impl Into<String>, value: impl Into<Value>) -> Self {
        QueryNode::Field {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn like(field: impl Into<String>, value: impl Into<Value>) -> Self {
        QueryNode::Like {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Join a set of leaves under one connective, collapsing a singleton to
    /// the bare leaf instead of wrapping it.
    pub fn all_of(mut nodes: Vec<QueryNode>) -> Option<QueryNode> {
        match nodes.len() {
            0 => None,
            1 => Some(nodes.remove(0)),
            _ => Some(QueryNode::And(nodes)),
        }
    }

    /// See [`QueryNode::all_of`].
    pub fn any_of(mut nodes: Vec<QueryNode>) -> Option<QueryNode> {
        match nodes.len() {
            0 => None,
            1 => Some(nodes.remove(0)),
            _ => Some(QueryNode::Or(nodes)),
        }
    }
}

/// Combine the committed filters into one boolean expression.
///
/// Returns `None` for an empty filter set, meaning "no filter applied at
/// all" - distinct from a query matching nothing. A single criterion is
/// returned bare; several are ANDed in the filters' insertion order, so
/// repeated compilation of an unchanged context produces the same tree.
pub fn compile(filters: &FilterSet) -> Option<QueryNode> {
    QueryNode::all_of(filters.iter().map(|f| f.criterion.clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singleton_join_collapses() {
        let leaf = QueryNode::field("status", "Open");
        assert_eq!(QueryNode::any_of(vec![leaf.clone()]), Some(leaf.clone()));
        assert_eq!(QueryNode::all_of(vec![leaf.clone()]), Some(leaf));
        assert_eq!(QueryNode::any_of(vec![]), None);
    }

    #[test]
    fn test_join_keeps_order() {
        let a = QueryNode::field("a", 1);
        let b = QueryNode::field("b", 2);
        assert_eq!(
            QueryNode::all_of(vec![a.clone(), b.clone()]),
            Some(QueryNode::And(vec![a, b]))
        );
    }
}
