// Axum server: HTML directory pages, JSON API, sitemap and health check
//
// Both surfaces read through the same Directory, so the store choice made at
// startup applies to every route.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;

use crate::config::{AppConfig, DataSourceConfig};
use crate::directory::Directory;
use crate::query_engine::TableStore;
use crate::regions;
use crate::seo;
use crate::store::{BusinessStore, DataSourceError, SampleStore};
use crate::web::handlers::pages::{self, SearchParams};

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub directory: Directory,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn BusinessStore> = match &config.data_source {
            DataSourceConfig::Sample => {
                tracing::info!("Using built-in sample listings");
                Arc::new(SampleStore::new())
            }
            DataSourceConfig::Table { path } => {
                tracing::info!("Opening DataFusion table at {}", path.display());
                let store = TableStore::open(path)
                    .await
                    .with_context(|| format!("failed to open listings table {}", path.display()))?;
                Arc::new(store)
            }
        };

        let directory = Directory::new(store);
        let total = directory.total_business_count().await?;
        tracing::info!("{} store ready with {} listings", directory.store_name(), total);

        Ok(Self::with_directory(directory, config))
    }

    pub fn with_directory(directory: Directory, config: AppConfig) -> Self {
        Self {
            directory,
            config: Arc::new(config),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        .route("/sitemap.xml", get(sitemap))

        // JSON API
        .route("/api/states", get(api_states))
        .route("/api/states/:state/cities", get(api_cities))
        .route("/api/states/:state/cities/:city/businesses", get(api_city_businesses))
        .route("/api/businesses/:state/:city/:slug", get(api_business))
        .route("/api/search", get(api_search))
        .route("/api/stats", get(api_stats))

        // HTML pages; static segments above win over the :state capture
        .route("/", get(pages::home_page))
        .route("/search", get(pages::search_page))
        .route("/:state", get(pages::state_page))
        .route("/:state/:city", get(pages::city_page))
        .route("/:state/:city/:slug", get(pages::listing_page))
        .fallback(pages::not_found_page)

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn sitemap(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let businesses = state.directory.list_all_businesses().await?;
    let entries = seo::sitemap_entries(
        &state.config.site_url,
        regions::all_states(),
        &businesses,
        chrono::Utc::now(),
    );
    tracing::debug!("Sitemap with {} URLs", entries.len());

    Ok((
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        seo::sitemap_xml(&entries),
    ))
}

async fn api_states(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let states = state.directory.list_states_with_counts().await?;
    Ok(Json(rows(&states)?))
}

async fn api_cities(
    State(state): State<AppState>,
    Path(state_slug): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let region = known_state(&state_slug)?;
    let cities = state.directory.list_cities_for_state(region.slug).await?;
    Ok(Json(rows(&cities)?))
}

async fn api_city_businesses(
    State(state): State<AppState>,
    Path((state_slug, city_slug)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let region = known_state(&state_slug)?;
    let businesses = state
        .directory
        .list_businesses_for_city(region.slug, &city_slug)
        .await?;
    Ok(Json(rows(&businesses)?))
}

async fn api_business(
    State(state): State<AppState>,
    Path((state_slug, city_slug, slug)): Path<(String, String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let region = known_state(&state_slug)?;
    let business = state
        .directory
        .get_business_by_slug(region.slug, &city_slug, &slug)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No listing at /{}/{}/{}",
                region.slug, city_slug, slug
            ))
        })?;

    let json_ld = seo::structured_data(&business, &state.config.site_url);
    Ok(Json(serde_json::json!({
        "business": business,
        "json_ld": json_ld,
    })))
}

async fn api_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let query = params
        .query()
        .ok_or_else(|| AppError::BadRequest("Query parameter 'q' must not be blank".to_string()))?;

    let start = std::time::Instant::now();
    let results = state.directory.search_businesses(query).await?;
    tracing::debug!(
        "Search '{}' returned {} results in {:?}",
        query,
        results.len(),
        start.elapsed()
    );

    Ok(Json(rows(&results)?))
}

async fn api_stats(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let (states, total) = tokio::try_join!(
        state.directory.list_states_with_counts(),
        state.directory.total_business_count(),
    )?;
    Ok(Json(serde_json::json!({
        "store": state.directory.store_name(),
        "total_businesses": total,
        "states_with_listings": states.len(),
        "registry_states": regions::all_states().len(),
    })))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn known_state(slug: &str) -> Result<&'static regions::UsState, AppError> {
    regions::state_by_slug(slug).ok_or_else(|| AppError::NotFound(format!("Unknown state '{}'", slug)))
}

/// `{"rows": n, "data": [...]}` envelope.
fn rows<T: Serialize>(items: &[T]) -> Result<serde_json::Value, AppError> {
    let data = serde_json::to_value(items)
        .map_err(|e| AppError::Internal(format!("JSON encode error: {}", e)))?;
    Ok(serde_json::json!({
        "rows": items.len(),
        "data": data
    }))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    DataSource(DataSourceError),
    Internal(String),
    BadRequest(String),
    NotFound(String),
}

impl From<DataSourceError> for AppError {
    fn from(e: DataSourceError) -> Self {
        AppError::DataSource(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::DataSource(e) => {
                tracing::error!("Data source failure: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("{}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
