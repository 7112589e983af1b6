//! Key grammar for the counter and cache namespaces.
//!
//! The literal prefixes are load-bearing: operators inspect the live store
//! with `paper_views:*` / `search:*` patterns, so they must not drift.

use uuid::Uuid;

use crate::domain::types::{SortField, SortOrder};

pub const VIEW_COUNTER_PREFIX: &str = "paper_views:";
pub const SEARCH_PREFIX: &str = "search:";

/// Counter key for a paper: `paper_views:<id>`.
pub fn view_counter_key(paper_id: Uuid) -> String {
    format!("{VIEW_COUNTER_PREFIX}{paper_id}")
}

/// Recover the paper id from a counter key, if the suffix parses.
pub fn paper_id_from_counter_key(key: &str) -> Option<Uuid> {
    key.strip_prefix(VIEW_COUNTER_PREFIX)
        .and_then(|suffix| Uuid::parse_str(suffix).ok())
}

/// Cache key for a search-result payload:
/// `search:<normalizedTerm>:<sortBy>:<order>`.
///
/// The term is trimmed, an empty term collapses to `all`, and spaces and
/// colons are replaced so the term cannot break the `:`-delimited namespace.
pub fn search_key(term: &str, sort_by: SortField, order: SortOrder) -> String {
    let mut clean = term.trim().replace([' ', ':'], "_");
    if clean.is_empty() {
        clean = "all".to_string();
    }
    format!(
        "{SEARCH_PREFIX}{clean}:{}:{}",
        sort_by.as_str(),
        order.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_key_round_trips() {
        let id = Uuid::new_v4();
        let key = view_counter_key(id);
        assert!(key.starts_with("paper_views:"));
        assert_eq!(paper_id_from_counter_key(&key), Some(id));
    }

    #[test]
    fn counter_key_parse_rejects_foreign_keys() {
        assert_eq!(paper_id_from_counter_key("search:all"), None);
        assert_eq!(paper_id_from_counter_key("paper_views:not-a-uuid"), None);
    }

    #[test]
    fn search_key_normalizes_term() {
        let key = search_key("  deep learning  ", SortField::Relevance, SortOrder::Desc);
        assert_eq!(key, "search:deep_learning:relevance:desc");
    }

    #[test]
    fn empty_term_collapses_to_all() {
        let key = search_key("   ", SortField::PublicationDate, SortOrder::Asc);
        assert_eq!(key, "search:all:publication_date:asc");
    }

    #[test]
    fn colons_cannot_break_the_namespace() {
        let key = search_key("a:b", SortField::PublicationDate, SortOrder::Desc);
        assert_eq!(key, "search:a_b:publication_date:desc");
    }
}
