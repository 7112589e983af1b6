//! Shared domain enumerations used across query handling and caching.

use serde::{Deserialize, Serialize};

/// Sort criterion accepted by the paper search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    PublicationDate,
    Relevance,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::PublicationDate => "publication_date",
            SortField::Relevance => "relevance",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "publication_date" => Some(SortField::PublicationDate),
            "relevance" => Some(SortField::Relevance),
            _ => None,
        }
    }
}

/// Sort direction accepted by the paper search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_field_round_trips_through_parse() {
        assert_eq!(
            SortField::parse("publication_date"),
            Some(SortField::PublicationDate)
        );
        assert_eq!(SortField::parse("relevance"), Some(SortField::Relevance));
        assert_eq!(SortField::parse("citations"), None);
    }

    #[test]
    fn sort_order_rejects_unknown_values() {
        assert_eq!(SortOrder::parse("asc"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("desc"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse("descending"), None);
    }
}
