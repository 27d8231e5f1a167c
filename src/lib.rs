//! Vendor Match - vendor recommendation service for the event-planning marketplace
//!
//! Retrieves vendors offering an event's required services, scores them on
//! location, availability, price and reviews, and returns them ranked.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{haversine_distance, match_services, CompositeScorer, Ranker};
pub use models::{EventContext, LocationFilter, ScoringWeights, VendorCandidate, VendorContext};
