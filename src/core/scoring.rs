use crate::core::distance::haversine_distance;
use crate::models::{EventContext, ScoreComponent, ScoringWeights, VendorCandidate};
use std::fmt;
use std::sync::Arc;

/// Location score when either side lacks coordinates
pub const NEUTRAL_LOCATION_SCORE: f64 = 0.7;
/// Location score for a vendor serving the event's area
pub const IN_AREA_LOCATION_SCORE: f64 = 1.0;
/// Location score for a vendor whose service area does not reach the event
pub const OUT_OF_AREA_LOCATION_SCORE: f64 = 0.2;
/// Vendors without a declared radius are treated as serving anything closer than this
pub const LOCAL_ONLY_RADIUS_KM: f64 = 5.0;

/// Price score when the event budget is unset
pub const NEUTRAL_PRICE_SCORE: f64 = 0.5;
pub const IN_BUDGET_PRICE_SCORE: f64 = 1.0;
pub const UNDER_BUDGET_PRICE_SCORE: f64 = 0.8;
pub const OVER_BUDGET_PRICE_SCORE: f64 = 0.2;
/// Returned when no other price rule applies (vendor without usable prices)
pub const FALLBACK_PRICE_SCORE: f64 = 0.5;

/// Maximum review rating
pub const MAX_RATING: f64 = 5.0;

/// Location fit (0.2, 0.7 or 1.0)
///
/// Vendors or events without coordinates get the neutral score, since the
/// candidate query has already narrowed them by city text. Otherwise the
/// Haversine distance is checked against the vendor's service radius.
pub fn location_score(vendor: &VendorCandidate, event: &EventContext) -> f64 {
    let (Some((vendor_lat, vendor_lng)), Some((event_lat, event_lng))) =
        (vendor.coordinates(), event.coordinates())
    else {
        return NEUTRAL_LOCATION_SCORE;
    };

    let distance_km = haversine_distance(vendor_lat, vendor_lng, event_lat, event_lng);
    let radius_km = vendor.service_radius.unwrap_or(0.0);

    if radius_km == 0.0 && distance_km < LOCAL_ONLY_RADIUS_KM {
        IN_AREA_LOCATION_SCORE
    } else if radius_km >= distance_km {
        IN_AREA_LOCATION_SCORE
    } else {
        OUT_OF_AREA_LOCATION_SCORE
    }
}

/// Price fit (0.2, 0.5, 0.8 or 1.0)
///
/// Rules are evaluated in order; the final fallback is reached only by
/// vendors whose averaged price is not positive and below the budget.
pub fn price_score(vendor: &VendorCandidate, event: &EventContext) -> f64 {
    let vendor_price = vendor.average_price();
    let event_budget = (event.budget_min + event.budget_max) / 2.0;

    if event_budget == 0.0 {
        return NEUTRAL_PRICE_SCORE;
    }

    if vendor_price >= event.budget_min && vendor_price <= event.budget_max {
        IN_BUDGET_PRICE_SCORE
    } else if vendor_price < event.budget_min && vendor_price > 0.0 {
        UNDER_BUDGET_PRICE_SCORE
    } else if vendor_price > event.budget_max {
        OVER_BUDGET_PRICE_SCORE
    } else {
        FALLBACK_PRICE_SCORE
    }
}

/// Same-day availability flag (0 or 1)
#[inline]
pub fn availability_score(vendor: &VendorCandidate) -> f64 {
    f64::from(vendor.availability_score.min(1))
}

/// Raw review rating (0-5)
#[inline]
pub fn review_score(vendor: &VendorCandidate) -> f64 {
    vendor.rating
}

/// A named scoring criterion with documented output bounds
pub trait SubScorer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Inclusive range every score is clamped into
    fn bounds(&self) -> (f64, f64);

    fn score(&self, vendor: &VendorCandidate, event: &EventContext) -> f64;

    /// Clamp a raw score to `bounds`, mapping non-finite values to the lower bound
    fn bounded(&self, vendor: &VendorCandidate, event: &EventContext) -> f64 {
        let (lower, upper) = self.bounds();
        let raw = self.score(vendor, event);
        if !raw.is_finite() {
            return lower;
        }
        raw.clamp(lower, upper)
    }
}

pub struct LocationScorer;

impl SubScorer for LocationScorer {
    fn name(&self) -> &'static str {
        "location"
    }

    fn bounds(&self) -> (f64, f64) {
        (OUT_OF_AREA_LOCATION_SCORE, IN_AREA_LOCATION_SCORE)
    }

    fn score(&self, vendor: &VendorCandidate, event: &EventContext) -> f64 {
        location_score(vendor, event)
    }
}

pub struct AvailabilityScorer;

impl SubScorer for AvailabilityScorer {
    fn name(&self) -> &'static str {
        "availability"
    }

    fn bounds(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn score(&self, vendor: &VendorCandidate, _event: &EventContext) -> f64 {
        availability_score(vendor)
    }
}

pub struct PriceScorer;

impl SubScorer for PriceScorer {
    fn name(&self) -> &'static str {
        "price"
    }

    fn bounds(&self) -> (f64, f64) {
        (OVER_BUDGET_PRICE_SCORE, IN_BUDGET_PRICE_SCORE)
    }

    fn score(&self, vendor: &VendorCandidate, event: &EventContext) -> f64 {
        price_score(vendor, event)
    }
}

pub struct ReviewScorer;

impl SubScorer for ReviewScorer {
    fn name(&self) -> &'static str {
        "review"
    }

    fn bounds(&self) -> (f64, f64) {
        (0.0, MAX_RATING)
    }

    fn score(&self, vendor: &VendorCandidate, _event: &EventContext) -> f64 {
        review_score(vendor)
    }
}

/// Combines weighted components into a single ranking scalar
pub type Aggregation = fn(&[ScoreComponent]) -> f64;

/// Default aggregation: plain sum of weighted components, no normalization
pub fn weighted_sum(components: &[ScoreComponent]) -> f64 {
    components.iter().map(|c| c.weighted).sum()
}

#[derive(Clone)]
struct WeightedScorer {
    scorer: Arc<dyn SubScorer>,
    weight: f64,
}

/// Composite scoring strategy
///
/// Holds named sub-scorers with their weights and an aggregation function.
/// With default weights the composite is
/// `location + availability * 0.3 + price + rating * 0.2`, which has no fixed
/// upper bound other than the sum of weighted maxima (3.3).
#[derive(Clone)]
pub struct CompositeScorer {
    scorers: Vec<WeightedScorer>,
    aggregate: Aggregation,
}

impl CompositeScorer {
    /// Build the standard four-criterion scorer
    pub fn new(weights: ScoringWeights) -> Self {
        Self::empty()
            .with_scorer(LocationScorer, weights.location)
            .with_scorer(AvailabilityScorer, weights.availability)
            .with_scorer(PriceScorer, weights.price)
            .with_scorer(ReviewScorer, weights.review)
    }

    /// A scorer with no criteria, aggregating by weighted sum
    pub fn empty() -> Self {
        Self {
            scorers: Vec::new(),
            aggregate: weighted_sum,
        }
    }

    pub fn with_scorer<S: SubScorer + 'static>(mut self, scorer: S, weight: f64) -> Self {
        self.scorers.push(WeightedScorer {
            scorer: Arc::new(scorer),
            weight,
        });
        self
    }

    pub fn with_aggregation(mut self, aggregate: Aggregation) -> Self {
        self.aggregate = aggregate;
        self
    }

    /// Score one vendor, returning the composite and its per-criterion breakdown
    pub fn score(
        &self,
        vendor: &VendorCandidate,
        event: &EventContext,
    ) -> (f64, Vec<ScoreComponent>) {
        let components: Vec<ScoreComponent> = self
            .scorers
            .iter()
            .map(|entry| {
                let raw = entry.scorer.bounded(vendor, event);
                ScoreComponent {
                    name: entry.scorer.name().to_string(),
                    raw,
                    weighted: raw * entry.weight,
                }
            })
            .collect();

        ((self.aggregate)(&components), components)
    }
}

impl Default for CompositeScorer {
    fn default() -> Self {
        Self::new(ScoringWeights::default())
    }
}

impl fmt::Debug for CompositeScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.scorers.iter().map(|s| (s.scorer.name(), s.weight)))
            .finish()
    }
}
