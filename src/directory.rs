//! Data Access Layer
//!
//! Query functions behind every page: grouping and counting listings by state
//! and city, per-city listings, single listing lookup, search, and totals.
//! The store is injected once at startup; both store implementations share
//! query semantics, so results have the same shape and ordering whichever
//! one backs the directory.

use crate::models::{Business, CityInfo, StateInfo};
use crate::store::{
    BusinessQuery, BusinessStore, DataSourceError, Field, SearchField, SortKey, SortOrder,
    StoreResult,
};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::sync::Arc;

/// Maximum number of search results.
pub const SEARCH_LIMIT: usize = 50;

#[derive(Clone)]
pub struct Directory {
    store: Arc<dyn BusinessStore>,
}

impl Directory {
    pub fn new(store: Arc<dyn BusinessStore>) -> Self {
        Self { store }
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// One entry per state that has listings, sorted by state name.
    pub async fn list_states_with_counts(&self) -> StoreResult<Vec<StateInfo>> {
        let rows = self.store.select(&by_name()).await?;

        let mut groups: Vec<StateInfo> = Vec::new();
        let mut index: FxHashMap<String, usize> = FxHashMap::default();
        for b in rows {
            match index.get(&b.state_slug) {
                Some(&i) => groups[i].business_count += 1,
                None => {
                    index.insert(b.state_slug.clone(), groups.len());
                    groups.push(StateInfo {
                        name: b.state,
                        slug: b.state_slug,
                        abbr: b.state_abbr,
                        business_count: 1,
                    });
                }
            }
        }

        groups.sort_by(|a, b| display_order(&a.name, &b.name));
        tracing::debug!("{} states with listings", groups.len());
        Ok(groups)
    }

    /// Cities with listings in one state, sorted by city name. Empty when the
    /// state has no listings.
    pub async fn list_cities_for_state(&self, state_slug: &str) -> StoreResult<Vec<CityInfo>> {
        let query = by_name().eq(Field::StateSlug, state_slug);
        let rows = self.store.select(&query).await?;

        let mut groups: Vec<CityInfo> = Vec::new();
        let mut index: FxHashMap<String, usize> = FxHashMap::default();
        for b in rows {
            match index.get(&b.city_slug) {
                Some(&i) => groups[i].business_count += 1,
                None => {
                    index.insert(b.city_slug.clone(), groups.len());
                    groups.push(CityInfo {
                        name: b.city,
                        slug: b.city_slug,
                        state: b.state,
                        state_slug: b.state_slug,
                        state_abbr: b.state_abbr,
                        business_count: 1,
                    });
                }
            }
        }

        groups.sort_by(|a, b| display_order(&a.name, &b.name));
        tracing::debug!("{} cities with listings in {}", groups.len(), state_slug);
        Ok(groups)
    }

    /// Listings in one city, highest rated first. Slugs match exactly.
    pub async fn list_businesses_for_city(
        &self,
        state_slug: &str,
        city_slug: &str,
    ) -> StoreResult<Vec<Business>> {
        let query = BusinessQuery::new()
            .eq(Field::StateSlug, state_slug)
            .eq(Field::CitySlug, city_slug)
            .order_by(SortKey::Rating, SortOrder::Descending);
        self.store.select(&query).await
    }

    /// Exact `(state, city, slug)` lookup.
    ///
    /// `Ok(None)` means the listing does not exist. Store faults and duplicate
    /// paths are errors, so absence is never confused with a failed read.
    pub async fn get_business_by_slug(
        &self,
        state_slug: &str,
        city_slug: &str,
        slug: &str,
    ) -> StoreResult<Option<Business>> {
        let query = BusinessQuery::new()
            .eq(Field::StateSlug, state_slug)
            .eq(Field::CitySlug, city_slug)
            .eq(Field::Slug, slug)
            .limit(2);
        let mut rows = self.store.select(&query).await?;

        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            _ => {
                let count = self.store.count(&query).await?;
                Err(DataSourceError::Ambiguous {
                    path: format!("/{}/{}/{}", state_slug, city_slug, slug),
                    count: count as usize,
                })
            }
        }
    }

    /// Case-insensitive substring search over name, city, state and services,
    /// highest rated first, at most [`SEARCH_LIMIT`] results.
    ///
    /// Blank queries are the caller's to reject.
    pub async fn search_businesses(&self, query: &str) -> StoreResult<Vec<Business>> {
        let query = BusinessQuery::new()
            .contains(&SearchField::ALL, query)
            .order_by(SortKey::Rating, SortOrder::Descending)
            .limit(SEARCH_LIMIT);
        self.store.select(&query).await
    }

    pub async fn total_business_count(&self) -> StoreResult<u64> {
        self.store.count(&BusinessQuery::new()).await
    }

    /// Every listing, by name. Feeds the sitemap.
    pub async fn list_all_businesses(&self) -> StoreResult<Vec<Business>> {
        self.store.select(&by_name()).await
    }
}

fn by_name() -> BusinessQuery {
    BusinessQuery::new().order_by(SortKey::Name, SortOrder::Ascending)
}

/// Case-insensitive, then exact, so the order is total.
fn display_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
