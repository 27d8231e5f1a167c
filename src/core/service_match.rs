use crate::models::{CatalogService, ServiceId};
use std::collections::{HashMap, HashSet};

/// Catalog services reachable through the keyword fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalService {
    BallroomRental,
    BuffetCatering,
    Photography,
    Videography,
    DjServices,
    FloralDecoration,
    WeddingCake,
    BridalMakeup,
    LiveBand,
    CarRental,
    StageLighting,
    InvitationCards,
}

impl CanonicalService {
    /// Display name as stored in the service catalog
    pub fn service_name(self) -> &'static str {
        match self {
            CanonicalService::BallroomRental => "Ballroom Rental",
            CanonicalService::BuffetCatering => "Buffet Catering",
            CanonicalService::Photography => "Photography",
            CanonicalService::Videography => "Videography",
            CanonicalService::DjServices => "DJ Services",
            CanonicalService::FloralDecoration => "Floral Decoration",
            CanonicalService::WeddingCake => "Wedding Cake",
            CanonicalService::BridalMakeup => "Bridal Makeup",
            CanonicalService::LiveBand => "Live Band",
            CanonicalService::CarRental => "Car Rental",
            CanonicalService::StageLighting => "Stage Lighting",
            CanonicalService::InvitationCards => "Invitation Cards",
        }
    }
}

/// Lower-case keywords scanned for in free-text rationale, in priority order
pub const KEYWORD_SERVICES: &[(&str, CanonicalService)] = &[
    ("venue", CanonicalService::BallroomRental),
    ("ballroom", CanonicalService::BallroomRental),
    ("catering", CanonicalService::BuffetCatering),
    ("food", CanonicalService::BuffetCatering),
    ("photo", CanonicalService::Photography),
    ("video", CanonicalService::Videography),
    ("music", CanonicalService::DjServices),
    ("decor", CanonicalService::FloralDecoration),
    ("flower", CanonicalService::FloralDecoration),
    ("cake", CanonicalService::WeddingCake),
    ("makeup", CanonicalService::BridalMakeup),
    ("live band", CanonicalService::LiveBand),
    ("transport", CanonicalService::CarRental),
    ("lighting", CanonicalService::StageLighting),
    ("invitation", CanonicalService::InvitationCards),
];

/// Outcome of resolving free-text suggestions against the catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceMatch {
    pub services: Vec<CatalogService>,
    pub unmatched: Vec<String>,
    pub used_keyword_fallback: bool,
}

impl ServiceMatch {
    pub fn service_ids(&self) -> Vec<ServiceId> {
        self.services.iter().map(|s| s.id).collect()
    }
}

/// Lower-case and replace spaces with underscores
#[inline]
pub fn normalize_service_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Canonical services whose keyword occurs in `text` (case-insensitive), without repeats
pub fn keyword_services(text: &str) -> Vec<CanonicalService> {
    let haystack = text.to_lowercase();
    let mut found = Vec::new();

    for (keyword, service) in KEYWORD_SERVICES {
        if haystack.contains(keyword) && !found.contains(service) {
            found.push(*service);
        }
    }

    found
}

/// Resolve suggested service names to catalog entries
///
/// Names are compared after normalization. Only when none of them match is
/// the rationale scanned for keywords. Unknown names are dropped.
pub fn match_services(
    suggestions: &[String],
    rationale: &str,
    catalog: &[CatalogService],
) -> ServiceMatch {
    let by_name: HashMap<String, &CatalogService> = catalog
        .iter()
        .map(|service| (normalize_service_name(&service.service_name), service))
        .collect();

    let mut result = ServiceMatch::default();
    let mut seen: HashSet<ServiceId> = HashSet::new();

    for suggestion in suggestions {
        match by_name.get(&normalize_service_name(suggestion)) {
            Some(service) => {
                if seen.insert(service.id) {
                    result.services.push((*service).clone());
                }
            }
            None => {
                tracing::warn!("Dropping unmatched service suggestion: {:?}", suggestion);
                result.unmatched.push(suggestion.clone());
            }
        }
    }

    if !result.services.is_empty() {
        return result;
    }

    result.used_keyword_fallback = true;

    for canonical in keyword_services(rationale) {
        match by_name.get(&normalize_service_name(canonical.service_name())) {
            Some(service) => {
                if seen.insert(service.id) {
                    result.services.push((*service).clone());
                }
            }
            None => {
                tracing::warn!(
                    "Keyword fallback service {:?} is missing from the catalog",
                    canonical.service_name()
                );
            }
        }
    }

    tracing::debug!(
        "Keyword fallback matched {} services from rationale",
        result.services.len()
    );

    result
}
