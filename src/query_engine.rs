// DataFusion Table Store
//
// Purpose: serve the `businesses` table from a Parquet or newline-delimited
// JSON file through DataFusion SQL.
// Expected columns: id, name, slug, address, city, city_slug, state,
// state_slug, state_abbr, zip, phone, rating, review_count. Optional:
// website, categories, services (list<utf8>), description, image_url,
// latitude, longitude, is_emergency, is_24hr, created_at, updated_at.

use crate::models::Business;
use crate::store::{
    BusinessQuery, BusinessStore, DataSourceError, SearchField, SortKey, SortOrder, StoreResult,
};
use arrow::array::{Array, Int64Array};
use async_trait::async_trait;
use datafusion::arrow::array::RecordBatch;
use datafusion::arrow::datatypes::DataType;
use datafusion::arrow::json::ArrayWriter;
use datafusion::error::DataFusionError;
use datafusion::prelude::*;
use rustc_hash::FxHashMap;
use std::path::Path;
use std::sync::Arc;

pub type DFResult<T> = Result<T, DataFusionError>;

const TABLE: &str = "businesses";

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "name",
    "slug",
    "address",
    "city",
    "city_slug",
    "state",
    "state_slug",
    "state_abbr",
    "zip",
    "phone",
    "rating",
    "review_count",
];

impl From<DataFusionError> for DataSourceError {
    fn from(e: DataFusionError) -> Self {
        DataSourceError::Query(e.to_string())
    }
}

#[derive(Clone)]
pub struct TableStore {
    ctx: Arc<SessionContext>,
    source: String,
    /// `services` exists and is a list column.
    searchable_services: bool,
}

impl TableStore {
    /// Register the table file, verify its schema and audit every row once.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataSourceError::Unavailable(format!(
                "business table not found: {}",
                path.display()
            )));
        }
        let location = path.to_str().ok_or_else(|| {
            DataSourceError::Unavailable(format!("non UTF-8 table path: {}", path.display()))
        })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let ctx = SessionContext::new();
        match extension.as_str() {
            "parquet" => {
                ctx.register_parquet(TABLE, location, ParquetReadOptions::default())
                    .await?
            }
            "json" | "ndjson" => {
                let ext = format!(".{}", extension);
                let options = NdJsonReadOptions::default().file_extension(&ext);
                ctx.register_json(TABLE, location, options).await?
            }
            other => {
                return Err(DataSourceError::Unavailable(format!(
                    "unsupported table format '{}' (expected .parquet, .json or .ndjson)",
                    other
                )))
            }
        }

        let searchable_services = Self::check_schema(&ctx).await?;
        let store = Self {
            ctx: Arc::new(ctx),
            source: location.to_string(),
            searchable_services,
        };
        store.audit().await?;

        tracing::info!("Opened business table {}", store.source);
        Ok(store)
    }

    async fn check_schema(ctx: &SessionContext) -> StoreResult<bool> {
        let df = ctx.table(TABLE).await?;
        let schema = df.schema();
        let column = |name: &str| schema.fields().iter().find(|f| f.name() == name).cloned();

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| column(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(DataSourceError::Schema(format!(
                "missing columns: {}",
                missing.join(", ")
            )));
        }

        match column("services").map(|f| f.data_type().clone()) {
            None => {
                tracing::warn!("Table has no services column; search will skip services");
                Ok(false)
            }
            Some(DataType::List(_)) | Some(DataType::LargeList(_)) => Ok(true),
            Some(DataType::Null) => Ok(false),
            Some(other) => Err(DataSourceError::Schema(format!(
                "services must be a list of strings, found {}",
                other
            ))),
        }
    }

    /// Log invariant violations and duplicate listing paths. Rows are never dropped.
    async fn audit(&self) -> StoreResult<()> {
        let rows = self.select(&BusinessQuery::new()).await?;

        let mut paths: FxHashMap<String, usize> = FxHashMap::default();
        let mut violations = 0usize;
        for business in &rows {
            if let Err(violation) = business.check_invariants() {
                violations += 1;
                tracing::warn!("Listing {} ({}): {}", business.id, business.path(), violation);
            }
            *paths.entry(business.path()).or_insert(0) += 1;
        }
        for (path, count) in paths.iter().filter(|(_, count)| **count > 1) {
            tracing::warn!("{} listings share the path {}", count, path);
        }

        tracing::info!(
            "Audited {} listings ({} invariant violations)",
            rows.len(),
            violations
        );
        Ok(())
    }

    /// Raw SQL execution
    pub async fn query(&self, sql: &str) -> DFResult<Vec<RecordBatch>> {
        let df = self.ctx.sql(sql).await?;
        df.collect().await
    }

    fn search_expr(&self, field: SearchField) -> Option<&'static str> {
        match field {
            SearchField::Name => Some("name"),
            SearchField::City => Some("city"),
            SearchField::State => Some("state"),
            SearchField::Services if self.searchable_services => {
                Some("array_to_string(services, chr(31))")
            }
            SearchField::Services => None,
        }
    }

    fn where_clause(&self, query: &BusinessQuery) -> String {
        let mut conditions = Vec::new();

        for (field, value) in &query.filters {
            conditions.push(format!("{} = '{}'", field.column(), escape(value)));
        }

        // Case-insensitive substring over an OR of fields
        if let Some(ref search) = query.search {
            let needle = escape(&search.needle);
            let any: Vec<String> = search
                .fields
                .iter()
                .filter_map(|f| self.search_expr(*f))
                .map(|expr| format!("strpos(LOWER({}), '{}') > 0", expr, needle))
                .collect();
            if any.is_empty() {
                conditions.push("FALSE".to_string());
            } else {
                conditions.push(format!("({})", any.join(" OR ")));
            }
        }

        if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        }
    }

    fn select_sql(&self, query: &BusinessQuery) -> String {
        let order_clause = match query.sort {
            Some((key, order)) => {
                let column = match key {
                    SortKey::Rating => "rating",
                    SortKey::Name => "name",
                };
                let direction = match order {
                    SortOrder::Ascending => "ASC",
                    SortOrder::Descending => "DESC",
                };
                format!(
                    "ORDER BY {} {}, name ASC, CAST(id AS VARCHAR) ASC",
                    column, direction
                )
            }
            None => String::new(),
        };
        let limit_clause = query
            .limit
            .map(|l| format!("LIMIT {}", l))
            .unwrap_or_default();

        format!(
            "SELECT * FROM {} {} {} {}",
            TABLE,
            self.where_clause(query),
            order_clause,
            limit_clause
        )
    }
}

#[async_trait]
impl BusinessStore for TableStore {
    async fn select(&self, query: &BusinessQuery) -> StoreResult<Vec<Business>> {
        let sql = self.select_sql(query);
        let start = std::time::Instant::now();
        let batches = self.query(&sql).await?;
        let rows = batches_to_businesses(&batches)?;

        tracing::debug!("{} returned {} rows in {:?}", sql.trim(), rows.len(), start.elapsed());
        Ok(rows)
    }

    async fn count(&self, query: &BusinessQuery) -> StoreResult<u64> {
        let sql = format!(
            "SELECT COUNT(*) AS row_count FROM {} {}",
            TABLE,
            self.where_clause(query)
        );
        let batches = self.query(&sql).await?;

        let batch = batches
            .iter()
            .find(|b| b.num_rows() > 0)
            .ok_or_else(|| DataSourceError::Query("count returned no rows".to_string()))?;
        let counts = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| DataSourceError::Decode("count column is not Int64".to_string()))?;
        if counts.is_null(0) {
            return Ok(0);
        }
        Ok(counts.value(0).max(0) as u64)
    }

    fn name(&self) -> &str {
        &self.source
    }
}

/// SQL string literal escaping
fn escape(value: &str) -> String {
    value.replace('\'', "''")
}

/// Convert record batches to listings via Arrow's JSON writer
fn batches_to_businesses(batches: &[RecordBatch]) -> StoreResult<Vec<Business>> {
    let total_rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    if total_rows == 0 {
        return Ok(Vec::new());
    }

    let mut buf = Vec::new();
    {
        let mut writer = ArrayWriter::new(&mut buf);
        for batch in batches {
            writer
                .write(batch)
                .map_err(|e| DataSourceError::Decode(e.to_string()))?;
        }
        writer
            .finish()
            .map_err(|e| DataSourceError::Decode(e.to_string()))?;
    }

    serde_json::from_slice(&buf).map_err(|e| DataSourceError::Decode(e.to_string()))
}
