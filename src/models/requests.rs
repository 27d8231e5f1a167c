use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::ServiceId;

/// Ad-hoc vendor recommendation request, as submitted from the planning form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendVendorsRequest {
    #[serde(alias = "service_ids", rename = "serviceIds", default)]
    pub service_ids: Vec<ServiceId>,
    #[serde(alias = "service_date", rename = "serviceDate")]
    pub service_date: NaiveDate,
    #[validate(range(min = 0.0))]
    #[serde(alias = "budget_min", rename = "budgetMin", default)]
    pub budget_min: f64,
    #[validate(range(min = 0.0))]
    #[serde(alias = "budget_max", rename = "budgetMax", default)]
    pub budget_max: f64,
    #[validate(length(max = 200))]
    #[serde(default)]
    pub location: Option<String>,
    #[validate(range(min = 1, max = 50))]
    #[serde(default)]
    pub limit: Option<u16>,
    #[serde(alias = "include_summary", rename = "includeSummary", default)]
    pub include_summary: bool,
}

/// Query string for event-anchored recommendations
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EventVendorsQuery {
    #[validate(range(min = 1, max = 50))]
    #[serde(default)]
    pub limit: Option<u16>,
    #[serde(alias = "include_summary", rename = "includeSummary", default)]
    pub include_summary: bool,
}

/// Free-text service suggestions to resolve against the catalog
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchServicesRequest {
    #[validate(length(max = 50))]
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[validate(length(max = 10000))]
    #[serde(default)]
    pub rationale: String,
    /// Free-text event description sent to the assistant for suggestions
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: Option<String>,
}
