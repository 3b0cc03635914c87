//! Business Record Store
//!
//! The store interface exposes exactly what the directory needs from a
//! backing table: equality filters on key fields, one sort key, a result cap,
//! a case-insensitive "contains" filter over an OR of text fields, and a
//! count-only mode. Two implementations exist:
//! - [`SampleStore`]: fixed in-memory listing set for local development
//! - [`TableStore`](crate::query_engine::TableStore): DataFusion over a
//!   Parquet / NDJSON table (`api` feature)

mod sample;

pub use sample::SampleStore;

use crate::models::Business;
use async_trait::async_trait;
use std::cmp::Ordering;

/// Store-level faults. Absence is never an error.
#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("query failed: {0}")]
    Query(String),

    #[error("could not decode business row: {0}")]
    Decode(String),

    #[error("table schema mismatch: {0}")]
    Schema(String),

    #[error("data source unavailable: {0}")]
    Unavailable(String),

    #[error("{count} listings share the path {path}")]
    Ambiguous { path: String, count: usize },
}

pub type StoreResult<T> = Result<T, DataSourceError>;

// ============================================================================
// Query description
// ============================================================================

/// Key fields usable in equality filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    StateSlug,
    CitySlug,
    Slug,
}

impl Field {
    pub fn column(self) -> &'static str {
        match self {
            Field::StateSlug => "state_slug",
            Field::CitySlug => "city_slug",
            Field::Slug => "slug",
        }
    }

    pub fn value_of(self, business: &Business) -> &str {
        match self {
            Field::StateSlug => &business.state_slug,
            Field::CitySlug => &business.city_slug,
            Field::Slug => &business.slug,
        }
    }
}

/// Text fields covered by the "contains" filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Name,
    City,
    State,
    Services,
}

impl SearchField {
    /// Every text field a visitor might type: name, city, state, services.
    pub const ALL: [SearchField; 4] = [
        SearchField::Name,
        SearchField::City,
        SearchField::State,
        SearchField::Services,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Rating,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Case-insensitive substring match over an OR of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSearch {
    /// Stored lowercased.
    pub needle: String,
    pub fields: Vec<SearchField>,
}

impl TextSearch {
    pub fn matches(&self, business: &Business) -> bool {
        let needle = self.needle.as_str();
        let contains = |text: &str| text.to_lowercase().contains(needle);
        self.fields.iter().any(|field| match field {
            SearchField::Name => contains(&business.name),
            SearchField::City => contains(&business.city),
            SearchField::State => contains(&business.state),
            SearchField::Services => business.services.iter().any(|s| contains(s)),
        })
    }
}

/// A single read against the `businesses` table.
///
/// Ties under the sort key are broken by name, then id, so both store
/// implementations return rows in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusinessQuery {
    pub filters: Vec<(Field, String)>,
    pub search: Option<TextSearch>,
    pub sort: Option<(SortKey, SortOrder)>,
    pub limit: Option<usize>,
}

impl BusinessQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: Field, value: impl Into<String>) -> Self {
        self.filters.push((field, value.into()));
        self
    }

    pub fn contains(mut self, fields: &[SearchField], pattern: &str) -> Self {
        self.search = Some(TextSearch {
            needle: pattern.to_lowercase(),
            fields: fields.to_vec(),
        });
        self
    }

    pub fn order_by(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort = Some((key, order));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Filter and search predicates, ignoring sort and limit.
    pub fn matches(&self, business: &Business) -> bool {
        self.filters
            .iter()
            .all(|(field, value)| field.value_of(business) == value)
            && self.search.as_ref().map_or(true, |s| s.matches(business))
    }

    /// Row ordering shared by every implementation.
    pub fn compare(&self, a: &Business, b: &Business) -> Ordering {
        let primary = match self.sort {
            Some((SortKey::Rating, order)) => {
                let ord = a.rating.total_cmp(&b.rating);
                apply(order, ord)
            }
            Some((SortKey::Name, order)) => apply(order, a.name.cmp(&b.name)),
            None => return Ordering::Equal,
        };
        primary
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    }
}

fn apply(order: SortOrder, ord: Ordering) -> Ordering {
    match order {
        SortOrder::Ascending => ord,
        SortOrder::Descending => ord.reverse(),
    }
}

// ============================================================================
// Store trait
// ============================================================================

#[async_trait]
pub trait BusinessStore: Send + Sync {
    /// Rows matching the query, sorted and capped as requested.
    async fn select(&self, query: &BusinessQuery) -> StoreResult<Vec<Business>>;

    /// Number of matching rows; sort and limit are ignored.
    async fn count(&self, query: &BusinessQuery) -> StoreResult<u64>;

    /// Short label for logs.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(id: &str, name: &str, rating: f64) -> Business {
        let mut b = SampleStore::sample_businesses().remove(0);
        b.id = id.to_string();
        b.name = name.to_string();
        b.rating = rating;
        b
    }

    #[test]
    fn rating_ties_fall_back_to_name_then_id() {
        let query = BusinessQuery::new().order_by(SortKey::Rating, SortOrder::Descending);
        let mut rows = vec![
            named("3", "Zephyr Air", 4.5),
            named("2", "Acme Air", 4.5),
            named("1", "Acme Air", 4.5),
            named("4", "Top Air", 4.9),
        ];
        rows.sort_by(|a, b| query.compare(a, b));
        let ids: Vec<_> = rows.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["4", "1", "2", "3"]);
    }

    #[test]
    fn search_needle_is_lowercased_once() {
        let query = BusinessQuery::new().contains(&SearchField::ALL, "DUCT");
        let search = query.search.as_ref().unwrap();
        assert_eq!(search.needle, "duct");
        assert!(query.matches(&SampleStore::sample_businesses()[0]));
    }

    #[test]
    fn search_respects_the_field_set() {
        let arctic = &SampleStore::sample_businesses()[0];
        let names_only = BusinessQuery::new().contains(&[SearchField::Name], "duct cleaning");
        let with_services = BusinessQuery::new().contains(&SearchField::ALL, "duct cleaning");
        assert!(!names_only.matches(arctic));
        assert!(with_services.matches(arctic));
    }

    #[test]
    fn equality_filters_are_case_sensitive() {
        let arctic = &SampleStore::sample_businesses()[0];
        assert!(BusinessQuery::new().eq(Field::StateSlug, "california").matches(arctic));
        assert!(!BusinessQuery::new().eq(Field::StateSlug, "California").matches(arctic));
    }
}
