// Core algorithm exports
pub mod distance;
pub mod ranker;
pub mod scoring;
pub mod service_match;

pub use distance::haversine_distance;
pub use ranker::Ranker;
pub use scoring::{location_score, price_score, CompositeScorer, SubScorer};
pub use service_match::{match_services, normalize_service_name, ServiceMatch};
