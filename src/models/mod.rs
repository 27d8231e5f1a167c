// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CandidateQuery, CatalogService, EventContext, LocationFilter, ScoreComponent, ScoringWeights,
    ServiceId, VendorCandidate, VendorContext,
};
pub use requests::{EventVendorsQuery, MatchServicesRequest, RecommendVendorsRequest};
pub use responses::{ErrorResponse, HealthResponse, MatchServicesResponse, RecommendationsResponse};
