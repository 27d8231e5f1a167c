use actix_web::{http::header, web, HttpRequest, HttpResponse, Responder};
use validator::Validate;
use crate::config::MatchingSettings;
use crate::core::{match_services, Ranker};
use crate::models::{
    ErrorResponse, EventContext, EventVendorsQuery, HealthResponse, LocationFilter,
    MatchServicesRequest, MatchServicesResponse, RecommendVendorsRequest,
    RecommendationsResponse, VendorCandidate, VendorContext,
};
use crate::services::{AssistantClient, PostgresClient, PostgresError, ServiceCatalog, TokenVerifier};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub catalog: Arc<ServiceCatalog>,
    pub assistant: Option<Arc<AssistantClient>>,
    pub verifier: Arc<TokenVerifier>,
    pub ranker: Ranker,
    pub matching: MatchingSettings,
}

/// Configure all recommendation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/events/{event_id}/vendors", web::get().to(event_vendors))
        .route("/vendors/recommend", web::post().to(recommend_vendors))
        .route("/services/match", web::post().to(match_service_names));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Resolve the caller from the bearer token
fn authorize(state: &AppState, http_req: &HttpRequest) -> Result<VendorContext, HttpResponse> {
    let header = http_req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    state.verifier.verify_header(header).map_err(|e| {
        tracing::info!("Rejected request to {}: {}", http_req.path(), e);
        HttpResponse::Unauthorized().json(ErrorResponse {
            error: "Unauthorized".to_string(),
            message: e.to_string(),
            status_code: 401,
        })
    })
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

fn resolve_limit(requested: Option<u16>, default: usize, max: usize) -> usize {
    requested
        .map(usize::from)
        .unwrap_or(default)
        .clamp(1, max.max(1))
}

/// Best-effort natural-language summary; any failure just omits it
async fn summarize(
    state: &AppState,
    event: &EventContext,
    vendors: &[VendorCandidate],
    requested: bool,
) -> Option<String> {
    if !requested || vendors.is_empty() {
        return None;
    }

    let assistant = state.assistant.as_ref()?;

    match assistant.summarize_vendors(event, vendors).await {
        Ok(summary) => Some(summary),
        Err(e) => {
            tracing::warn!("Vendor summary unavailable: {}", e);
            None
        }
    }
}

async fn ranked_response(
    state: &AppState,
    event: &EventContext,
    candidates: Vec<VendorCandidate>,
    include_summary: bool,
) -> HttpResponse {
    let vendors = state.ranker.rank_vendors(event, candidates);
    let summary = summarize(state, event, &vendors, include_summary).await;

    let response = RecommendationsResponse {
        request_id: uuid::Uuid::new_v4().to_string(),
        total_results: vendors.len(),
        vendors,
        summary,
    };

    tracing::info!(
        "Returning {} ranked vendors (request {})",
        response.total_results,
        response.request_id
    );

    HttpResponse::Ok().json(response)
}

/// Recommendations for a stored event
///
/// GET /api/v1/events/{event_id}/vendors?limit=10&includeSummary=true
async fn event_vendors(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<EventVendorsQuery>,
    http_req: HttpRequest,
) -> impl Responder {
    let context = match authorize(&state, &http_req) {
        Ok(context) => context,
        Err(response) => return response,
    };

    if let Err(errors) = query.validate() {
        return validation_failed(errors);
    }

    let event_id = path.into_inner();
    let limit = resolve_limit(query.limit, state.matching.event_limit, state.matching.max_limit);

    let event = match state.postgres.get_event(event_id, &context).await {
        Ok(event) => event,
        Err(PostgresError::NotFound(message)) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Event not found".to_string(),
                message,
                status_code: 404,
            });
        }
        Err(e) => {
            tracing::error!("Failed to load event {}: {}", event_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to load event".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    tracing::info!(
        "Recommending vendors for event {} (user {}, {} services, limit {})",
        event_id,
        context.user_id,
        event.required_service_ids.len(),
        limit
    );

    let candidates = state
        .postgres
        .find_candidate_vendors(
            &event.required_service_ids,
            event.event_date,
            &event.location_filter(),
            &context,
            limit,
        )
        .await;

    ranked_response(&state, &event, candidates, query.include_summary).await
}

/// Recommendations for ad-hoc form input
///
/// POST /api/v1/vendors/recommend
///
/// Request body:
/// ```json
/// {
///   "serviceIds": [5, 9],
///   "serviceDate": "2024-06-01",
///   "budgetMin": 50000,
///   "budgetMax": 100000,
///   "location": "Lekki",
///   "limit": 20,
///   "includeSummary": false
/// }
/// ```
async fn recommend_vendors(
    state: web::Data<AppState>,
    req: web::Json<RecommendVendorsRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let context = match authorize(&state, &http_req) {
        Ok(context) => context,
        Err(response) => return response,
    };

    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommend request: {:?}", errors);
        return validation_failed(errors);
    }

    let req = req.into_inner();
    let limit = resolve_limit(req.limit, state.matching.search_limit, state.matching.max_limit);
    let location = LocationFilter::from_text(req.location.as_deref());

    let event = EventContext {
        id: None,
        event_date: req.service_date,
        budget_min: req.budget_min,
        budget_max: req.budget_max,
        event_lat: None,
        event_lng: None,
        required_service_ids: req.service_ids.iter().copied().collect(),
    };

    tracing::info!(
        "Ad-hoc vendor search by user {} ({} services, location {:?}, limit {})",
        context.user_id,
        event.required_service_ids.len(),
        location.text(),
        limit
    );

    let candidates = state
        .postgres
        .find_candidate_vendors(
            &event.required_service_ids,
            event.event_date,
            &location,
            &context,
            limit,
        )
        .await;

    ranked_response(&state, &event, candidates, req.include_summary).await
}

/// Resolve free-text service suggestions to catalog services
///
/// POST /api/v1/services/match
async fn match_service_names(
    state: web::Data<AppState>,
    req: web::Json<MatchServicesRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    if let Err(response) = authorize(&state, &http_req) {
        return response;
    }

    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let MatchServicesRequest {
        mut suggestions,
        mut rationale,
        description,
    } = req.into_inner();

    if let (Some(description), Some(assistant), true) =
        (description.as_deref(), state.assistant.as_ref(), suggestions.is_empty())
    {
        match assistant.suggest_services(description).await {
            Ok(suggested) => {
                suggestions = suggested.services;
                if rationale.is_empty() {
                    rationale = suggested.rationale;
                }
            }
            Err(e) => tracing::warn!("Service suggestions unavailable: {}", e),
        }
    }

    let catalog = match state.catalog.services().await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("Failed to load service catalog: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to load service catalog".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let matched = match_services(&suggestions, &rationale, &catalog);

    HttpResponse::Ok().json(MatchServicesResponse {
        services: matched.services,
        used_keyword_fallback: matched.used_keyword_fallback,
        unmatched: matched.unmatched,
    })
}
