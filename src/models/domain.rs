use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Catalog service identifier
pub type ServiceId = i32;

/// Event requirements that drive vendor scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventContext {
    pub id: Option<i64>,
    #[serde(rename = "eventDate")]
    pub event_date: NaiveDate,
    /// Zero means the bound is unset
    #[serde(rename = "budgetMin", default)]
    pub budget_min: f64,
    #[serde(rename = "budgetMax", default)]
    pub budget_max: f64,
    #[serde(rename = "eventLat", default)]
    pub event_lat: Option<f64>,
    #[serde(rename = "eventLng", default)]
    pub event_lng: Option<f64>,
    #[serde(rename = "requiredServiceIds", default)]
    pub required_service_ids: BTreeSet<ServiceId>,
}

impl EventContext {
    /// Event coordinates, if both halves are present
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.event_lat.zip(self.event_lng)
    }

    /// Location filter implied by a stored event
    pub fn location_filter(&self) -> LocationFilter {
        match self.coordinates() {
            Some((lat, lng)) => LocationFilter::Coordinates { lat, lng },
            None => LocationFilter::None,
        }
    }
}

/// Vendor retrieved because it offers at least one required service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorCandidate {
    #[serde(rename = "vendorId")]
    pub vendor_id: i64,
    #[serde(rename = "businessName")]
    pub business_name: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(rename = "totalReviews", default)]
    pub total_reviews: i64,
    #[serde(rename = "businessLat", default)]
    pub business_lat: Option<f64>,
    #[serde(rename = "businessLng", default)]
    pub business_lng: Option<f64>,
    /// Kilometres; zero or missing means local only
    #[serde(rename = "serviceRadius", default)]
    pub service_radius: Option<f64>,
    #[serde(rename = "offeredServices", default)]
    pub offered_services: Vec<String>,
    #[serde(rename = "avgMinPrice", default)]
    pub avg_min_price: Option<f64>,
    #[serde(rename = "avgMaxPrice", default)]
    pub avg_max_price: Option<f64>,
    /// Number of available slots on the service date, clamped to 0 or 1
    #[serde(rename = "availabilityScore", default)]
    pub availability_score: u8,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub breakdown: Vec<ScoreComponent>,
}

impl VendorCandidate {
    /// Vendor coordinates, if both halves are present
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.business_lat.zip(self.business_lng)
    }

    /// Midpoint of the averaged price range, missing values counted as zero
    pub fn average_price(&self) -> f64 {
        (self.avg_min_price.unwrap_or(0.0) + self.avg_max_price.unwrap_or(0.0)) / 2.0
    }
}

/// One named sub-score and its weighted contribution to the composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub name: String,
    pub raw: f64,
    pub weighted: f64,
}

/// Location constraint for candidate retrieval
#[derive(Debug, Clone, PartialEq)]
pub enum LocationFilter {
    /// Geocoded event; consumed by scoring, no SQL effect
    Coordinates { lat: f64, lng: f64 },
    /// Free-text city or street fragment, matched in SQL
    Text(String),
    None,
}

impl LocationFilter {
    /// Build a filter from optional form input, ignoring blank text
    pub fn from_text(text: Option<&str>) -> Self {
        match text.map(str::trim) {
            Some(t) if !t.is_empty() => LocationFilter::Text(t.to_string()),
            _ => LocationFilter::None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            LocationFilter::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }
}

/// Authenticated account on whose behalf vendors are retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorContext {
    pub user_id: i64,
    /// Set when the caller is itself a vendor; that vendor is never its own candidate
    pub vendor_id: Option<i64>,
}

/// Canonical catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogService {
    pub id: ServiceId,
    #[serde(rename = "serviceName")]
    pub service_name: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Candidate query parameters
#[derive(Debug, Clone)]
pub struct CandidateQuery {
    pub service_ids: Vec<ServiceId>,
    pub service_date: NaiveDate,
    pub location: LocationFilter,
    pub exclude_vendor_id: Option<i64>,
    pub limit: usize,
}

/// Scoring weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub location: f64,
    pub availability: f64,
    pub price: f64,
    pub review: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            location: 1.0,
            availability: 0.3,
            price: 1.0,
            review: 0.2,
        }
    }
}
