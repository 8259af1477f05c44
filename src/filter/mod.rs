//! Typed filter state and per-kind translation to query criteria
//!
//! Each list view registers a table of [`FieldDefinition`]s describing what
//! can be filtered on. The editing surface holds one [`FilterValue`] per
//! field; committing a value runs it through [`translate::translate`], which
//! produces zero or one [`crate::query::QueryNode`] for that field.
//!
//! # Filter kinds
//!
//! - `boolean` - tri-state flag (unset contributes nothing)
//! - `number` - comparison against a numeric field (`<`, `<=`, `>`, `>=`, `!=`, `eq`)
//! - `free_text` / `tags` - pattern-matched term lists
//! - `list` / `enumeration` - exact-match term lists
//! - `date` - relative period or explicit from/to range
//! - `keyword` - raw search string passed through verbatim

pub mod definition;
pub mod error;
pub mod translate;
pub mod value;

pub use definition::{ConvertFn, FieldDefinition, FieldKind, FieldTable};
pub use error::FilterError;
pub use translate::translate;
pub use value::{DatePeriod, FilterValue, ListOperator, NumberOperator, Term};

use regex::RegexBuilder;

/// Match an autocomplete query against a list of candidate terms.
///
/// The query is interpreted as a case-insensitive pattern; if it is not a
/// valid pattern (stray `(` and friends in hand-typed input), it degrades
/// to a literal substring match.
pub fn suggest_terms<'a, I>(candidates: I, query: &str) -> Vec<Term>
where
    I: IntoIterator<Item = &'a str>,
{
    let matcher = RegexBuilder::new(query).case_insensitive(true).build();

    candidates
        .into_iter()
        .filter(|candidate| match &matcher {
            Ok(re) => re.is_match(candidate),
            Err(_) => candidate.to_lowercase().contains(&query.to_lowercase()),
        })
        .map(Term::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_is_case_insensitive() {
        let severities = ["Low", "Medium", "High", "Critical"];
        let hits = suggest_terms(severities, "hi");
        assert_eq!(hits, vec![Term::new("High")]);
    }

    #[test]
    fn test_suggest_empty_query_matches_all() {
        let hits = suggest_terms(["Open", "Resolved"], "");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_suggest_invalid_pattern_falls_back_to_substring() {
        let hits = suggest_terms(["a(b", "other"], "a(");
        assert_eq!(hits, vec![Term::new("a(b")]);
    }
}
