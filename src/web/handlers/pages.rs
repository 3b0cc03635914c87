// Page handlers for HTML rendering with Askama

use crate::api_server::AppState;
use crate::models::{Business, CityInfo};
use crate::regions::{self, UsState};
use crate::seo::{self, PageMeta};
use crate::store::DataSourceError;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use rustc_hash::FxHashMap;

/// One step of the breadcrumb trail after "Home". The last crumb has no link.
pub struct Crumb {
    pub label: String,
    pub href: Option<String>,
}

impl Crumb {
    fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: Some(href.into()),
        }
    }

    fn current(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: None,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

pub enum PageError {
    NotFound,
    DataSource(DataSourceError),
    Template(askama::Error),
}

impl From<DataSourceError> for PageError {
    fn from(e: DataSourceError) -> Self {
        PageError::DataSource(e)
    }
}

impl From<askama::Error> for PageError {
    fn from(e: askama::Error) -> Self {
        PageError::Template(e)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, rendered) = match self {
            PageError::NotFound => (StatusCode::NOT_FOUND, NotFoundTemplate::new().render()),
            PageError::DataSource(e) => {
                tracing::error!("Data source failure while rendering page: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorTemplate::new().render())
            }
            PageError::Template(e) => {
                tracing::error!("Template error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorTemplate::new().render())
            }
        };
        match rendered {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => (status, format!("Template error: {}", e)).into_response(),
        }
    }
}

type PageResult = Result<Html<String>, PageError>;

fn render(template: impl Template) -> PageResult {
    Ok(Html(template.render()?))
}

fn known_state(slug: &str) -> Result<&'static UsState, PageError> {
    regions::state_by_slug(slug).ok_or(PageError::NotFound)
}

/// 1234567 -> "1,234,567"
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ============================================================================
// Home Page
// ============================================================================

pub struct StateLink {
    pub name: &'static str,
    pub slug: &'static str,
    pub business_count: u64,
}

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub meta: PageMeta,
    pub total_count: u64,
    pub total_count_formatted: String,
    pub states: Vec<StateLink>,
}

pub async fn home_page(State(state): State<AppState>) -> PageResult {
    let (with_counts, total_count) = tokio::try_join!(
        state.directory.list_states_with_counts(),
        state.directory.total_business_count(),
    )?;

    let counts: FxHashMap<String, u64> = with_counts
        .into_iter()
        .map(|s| (s.slug, s.business_count))
        .collect();
    let states = regions::all_states()
        .iter()
        .map(|s| StateLink {
            name: s.name,
            slug: s.slug,
            business_count: counts.get(s.slug).copied().unwrap_or(0),
        })
        .collect();

    render(HomeTemplate {
        meta: seo::home_meta(&state.config.site_url),
        total_count,
        total_count_formatted: format_count(total_count),
        states,
    })
}

// ============================================================================
// State Page
// ============================================================================

#[derive(Template)]
#[template(path = "pages/state.html")]
pub struct StateTemplate {
    pub meta: PageMeta,
    pub breadcrumbs: Vec<Crumb>,
    pub state_name: &'static str,
    pub state_slug: &'static str,
    pub cities: Vec<CityInfo>,
}

pub async fn state_page(
    State(state): State<AppState>,
    Path(state_slug): Path<String>,
) -> PageResult {
    let region = known_state(&state_slug)?;
    let cities = state.directory.list_cities_for_state(region.slug).await?;

    render(StateTemplate {
        meta: seo::state_meta(&state.config.site_url, region),
        breadcrumbs: vec![Crumb::current(region.name)],
        state_name: region.name,
        state_slug: region.slug,
        cities,
    })
}

// ============================================================================
// City Page
// ============================================================================

#[derive(Template)]
#[template(path = "pages/city.html")]
pub struct CityTemplate {
    pub meta: PageMeta,
    pub breadcrumbs: Vec<Crumb>,
    pub city_name: String,
    pub state_abbr: &'static str,
    pub summary: String,
    pub businesses: Vec<Business>,
}

pub async fn city_page(
    State(state): State<AppState>,
    Path((state_slug, city_slug)): Path<(String, String)>,
) -> PageResult {
    let region = known_state(&state_slug)?;
    let businesses = state
        .directory
        .list_businesses_for_city(region.slug, &city_slug)
        .await?;

    let city_name = businesses
        .first()
        .map(|b| b.city.clone())
        .unwrap_or_else(|| seo::title_case_slug(&city_slug));

    let summary = match businesses.len() {
        0 => format!(
            "We're still adding HVAC contractors in {}. Check back soon!",
            city_name
        ),
        n => format!(
            "Showing {} HVAC contractor{} in {}, {}. Compare ratings, services, and availability.",
            n,
            if n == 1 { "" } else { "s" },
            city_name,
            region.name
        ),
    };

    render(CityTemplate {
        meta: seo::city_meta(&state.config.site_url, region, &city_name, &city_slug),
        breadcrumbs: vec![
            Crumb::link(region.name, format!("/{}", region.slug)),
            Crumb::current(city_name.clone()),
        ],
        city_name,
        state_abbr: region.abbr,
        summary,
        businesses,
    })
}

// ============================================================================
// Listing Page
// ============================================================================

#[derive(Template)]
#[template(path = "pages/listing.html")]
pub struct ListingTemplate {
    pub meta: PageMeta,
    pub breadcrumbs: Vec<Crumb>,
    pub business: Business,
    pub json_ld: String,
}

pub async fn listing_page(
    State(state): State<AppState>,
    Path((state_slug, city_slug, slug)): Path<(String, String, String)>,
) -> PageResult {
    let region = known_state(&state_slug)?;
    let business = state
        .directory
        .get_business_by_slug(region.slug, &city_slug, &slug)
        .await?
        .ok_or(PageError::NotFound)?;

    let site_url = &state.config.site_url;
    render(ListingTemplate {
        meta: seo::listing_meta(site_url, &business),
        breadcrumbs: vec![
            Crumb::link(region.name, format!("/{}", region.slug)),
            Crumb::link(
                business.city.clone(),
                format!("/{}/{}", region.slug, business.city_slug),
            ),
            Crumb::current(business.name.clone()),
        ],
        json_ld: seo::json_ld_script(&seo::structured_data(&business, site_url)),
        business,
    })
}

// ============================================================================
// Search Page
// ============================================================================

#[derive(Debug, Default, serde::Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

impl SearchParams {
    /// Trimmed query, `None` when blank.
    pub fn query(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

#[derive(Template)]
#[template(path = "pages/search.html")]
pub struct SearchTemplate {
    pub meta: PageMeta,
    pub query: String,
    pub searched: bool,
    pub result_label: String,
    pub results: Vec<Business>,
}

pub async fn search_page(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> PageResult {
    let query = params.query();
    let results = match query {
        Some(q) => state.directory.search_businesses(q).await?,
        None => Vec::new(),
    };
    let result_label = format!(
        "{} result{} found",
        results.len(),
        if results.len() == 1 { "" } else { "s" }
    );

    render(SearchTemplate {
        meta: seo::search_meta(&state.config.site_url, query),
        query: query.unwrap_or_default().to_string(),
        searched: query.is_some(),
        result_label,
        results,
    })
}

// ============================================================================
// Not Found / Error
// ============================================================================

#[derive(Template)]
#[template(path = "pages/not_found.html")]
pub struct NotFoundTemplate {
    pub meta: PageMeta,
}

impl NotFoundTemplate {
    fn new() -> Self {
        Self {
            meta: PageMeta {
                title: "Page Not Found".to_string(),
                description: "The page you're looking for doesn't exist or has been moved."
                    .to_string(),
                canonical: String::new(),
            },
        }
    }
}

#[derive(Template)]
#[template(path = "pages/error.html")]
pub struct ErrorTemplate {
    pub meta: PageMeta,
}

impl ErrorTemplate {
    fn new() -> Self {
        Self {
            meta: PageMeta {
                title: "Something went wrong".to_string(),
                description: "We could not load this page. Please try again shortly.".to_string(),
                canonical: String::new(),
            },
        }
    }
}

pub async fn not_found_page() -> PageError {
    PageError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_get_thousands_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn blank_queries_are_none() {
        let params = |q: &str| SearchParams {
            q: Some(q.to_string()),
        };
        assert_eq!(params("   ").query(), None);
        assert_eq!(params(" houston ").query(), Some("houston"));
        assert_eq!(SearchParams::default().query(), None);
    }
}
