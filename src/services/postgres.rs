use crate::config::DatabaseSettings;
use crate::models::{
    CandidateQuery, CatalogService, EventContext, LocationFilter, ServiceId, VendorCandidate,
    VendorContext,
};
use chrono::NaiveDate;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    #[error("Not found: {0}")]
    NotFound(String),
}

const CANDIDATE_SELECT: &str = r#"
    SELECT
        vp.id::int8 AS vendor_id,
        vp.business_name,
        COALESCE(vp.rating, 0)::float8 AS rating,
        COALESCE(vp.total_reviews, 0)::int8 AS total_reviews,
        vp.business_lat::float8 AS business_lat,
        vp.business_lng::float8 AS business_lng,
        vp.service_radius::float8 AS service_radius,
        ARRAY_AGG(DISTINCT s.service_name::text) AS offered_services,
        AVG(vso.price_range_min)::float8 AS avg_min_price,
        AVG(vso.price_range_max)::float8 AS avg_max_price,
        (
            SELECT COUNT(*)
            FROM vendor_availability va
            WHERE va.vendor_id = vp.id
              AND va.date = "#;

const CANDIDATE_FROM: &str = r#"
              AND va.status = 'available'
        ) AS availability_count
    FROM vendor_profiles vp
    JOIN vendor_service_offerings vso ON vso.vendor_id = vp.id
    JOIN services s ON s.id = vso.service_id
    WHERE vso.is_active = TRUE
      AND vso.service_id = ANY("#;

/// Escape `%`, `_` and `\` so user text matches literally inside ILIKE
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Build the candidate vendor query
///
/// Vendors are joined to their active offerings for the requested services
/// and grouped, so prices are averaged over matched offerings only. A text
/// location narrows by city or street address; coordinates have no SQL
/// effect and are left to scoring.
pub fn build_candidate_query(query: &CandidateQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(CANDIDATE_SELECT);
    builder.push_bind(query.service_date);
    builder.push(CANDIDATE_FROM);
    builder.push_bind(query.service_ids.clone());
    builder.push(")");

    if let Some(text) = query.location.text() {
        let pattern = format!("%{}%", escape_like(text));
        builder.push(" AND (vp.city ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR vp.address ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }

    if let Some(vendor_id) = query.exclude_vendor_id {
        builder.push(" AND vp.id <> ");
        builder.push_bind(vendor_id);
    }

    builder.push(" GROUP BY vp.id ORDER BY rating DESC, avg_min_price ASC NULLS LAST LIMIT ");
    builder.push_bind(query.limit as i64);

    builder
}

fn candidate_from_row(row: &PgRow) -> Result<VendorCandidate, sqlx::Error> {
    let availability_count: i64 = row.try_get("availability_count")?;

    Ok(VendorCandidate {
        vendor_id: row.try_get("vendor_id")?,
        business_name: row.try_get("business_name")?,
        rating: row.try_get("rating")?,
        total_reviews: row.try_get("total_reviews")?,
        business_lat: row.try_get("business_lat")?,
        business_lng: row.try_get("business_lng")?,
        service_radius: row.try_get("service_radius")?,
        offered_services: row
            .try_get::<Option<Vec<String>>, _>("offered_services")?
            .unwrap_or_default(),
        avg_min_price: row.try_get("avg_min_price")?,
        avg_max_price: row.try_get("avg_max_price")?,
        // Several slots on one date still count as a single availability
        availability_score: availability_count.clamp(0, 1) as u8,
        score: 0.0,
        breakdown: Vec::new(),
    })
}

/// PostgreSQL client for the marketplace tables this service reads
///
/// Event, vendor and catalog rows are owned by the rest of the marketplace;
/// this client never writes.
pub struct PostgresClient {
    pool: PgPool,
    query_timeout: Duration,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
        query_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self {
            pool,
            query_timeout,
        })
    }

    /// Create a client whose connections are opened on first use
    pub fn connect_lazy(database_url: &str, query_timeout: Duration) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(query_timeout)
            .connect_lazy(database_url)?;

        Ok(Self {
            pool,
            query_timeout,
        })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            &settings.url,
            settings.max_connections.unwrap_or(10),
            settings.min_connections.unwrap_or(1),
            Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)),
            Duration::from_millis(settings.query_timeout_ms.unwrap_or(3000)),
        )
        .await
    }

    async fn timed<T, F>(&self, fut: F) -> Result<T, PostgresError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(PostgresError::Timeout(self.query_timeout)),
        }
    }

    /// Find vendors offering at least one of the required services
    ///
    /// Never fails: an empty service set returns no vendors without touching
    /// the database, and datastore errors or timeouts are logged and reported
    /// as an empty list.
    pub async fn find_candidate_vendors(
        &self,
        required_service_ids: &BTreeSet<ServiceId>,
        service_date: NaiveDate,
        location: &LocationFilter,
        context: &VendorContext,
        limit: usize,
    ) -> Vec<VendorCandidate> {
        if required_service_ids.is_empty() {
            tracing::debug!("No required services for user {}, skipping vendor query", context.user_id);
            return Vec::new();
        }

        let query = CandidateQuery {
            service_ids: required_service_ids.iter().copied().collect(),
            service_date,
            location: location.clone(),
            exclude_vendor_id: context.vendor_id,
            limit,
        };

        match self.fetch_candidates(&query).await {
            Ok(candidates) => {
                if candidates.is_empty() {
                    tracing::info!(
                        "No vendors offer services {:?} (user {})",
                        query.service_ids,
                        context.user_id
                    );
                }
                candidates
            }
            Err(e) => {
                tracing::error!(
                    "Candidate vendor query failed for services {:?}: {}",
                    query.service_ids,
                    e
                );
                Vec::new()
            }
        }
    }

    async fn fetch_candidates(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<VendorCandidate>, PostgresError> {
        let mut builder = build_candidate_query(query);
        let rows = self.timed(builder.build().fetch_all(&self.pool)).await?;

        let candidates = rows
            .iter()
            .map(candidate_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Retrieved {} candidate vendors", candidates.len());

        Ok(candidates)
    }

    /// Load an event owned by the calling user, with its required services
    pub async fn get_event(
        &self,
        event_id: i64,
        context: &VendorContext,
    ) -> Result<EventContext, PostgresError> {
        let query = r#"
            SELECT
                e.id::int8 AS id,
                e.event_date,
                COALESCE(e.budget_min, 0)::float8 AS budget_min,
                COALESCE(e.budget_max, 0)::float8 AS budget_max,
                e.event_lat::float8 AS event_lat,
                e.event_lng::float8 AS event_lng
            FROM events e
            WHERE e.id = $1 AND e.user_id = $2
        "#;

        let row = self
            .timed(
                sqlx::query(query)
                    .bind(event_id)
                    .bind(context.user_id)
                    .fetch_optional(&self.pool),
            )
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("Event {} not found", event_id)))?;

        let services_query = r#"
            SELECT DISTINCT service_id
            FROM event_services
            WHERE event_id = $1
        "#;

        let service_rows = self
            .timed(sqlx::query(services_query).bind(event_id).fetch_all(&self.pool))
            .await?;

        let required_service_ids = service_rows
            .iter()
            .map(|r| r.try_get::<ServiceId, _>("service_id"))
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(EventContext {
            id: Some(row.try_get("id")?),
            event_date: row.try_get("event_date")?,
            budget_min: row.try_get("budget_min")?,
            budget_max: row.try_get("budget_max")?,
            event_lat: row.try_get("event_lat")?,
            event_lng: row.try_get("event_lng")?,
            required_service_ids,
        })
    }

    /// Load the canonical service catalog
    pub async fn list_services(&self) -> Result<Vec<CatalogService>, PostgresError> {
        let query = r#"
            SELECT id, service_name::text AS service_name, category::text AS category
            FROM services
            ORDER BY id
        "#;

        let rows = self.timed(sqlx::query(query).fetch_all(&self.pool)).await?;

        let services = rows
            .iter()
            .map(|row| -> Result<CatalogService, sqlx::Error> {
                Ok(CatalogService {
                    id: row.try_get("id")?,
                    service_name: row.try_get("service_name")?,
                    category: row.try_get("category")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Loaded {} catalog services", services.len());

        Ok(services)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        self.timed(sqlx::query("SELECT 1").fetch_one(&self.pool))
            .await
            .map(|_| true)
    }
}
