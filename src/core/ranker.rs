use crate::core::scoring::CompositeScorer;
use crate::models::{EventContext, ScoringWeights, VendorCandidate};

/// Scores and orders retrieved vendor candidates
///
/// # Pipeline Stages
/// 1. Composite scoring of each candidate
/// 2. Stable descending sort by score
/// 3. Truncation to the requested limit
#[derive(Debug, Clone)]
pub struct Ranker {
    scorer: CompositeScorer,
}

impl Ranker {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            scorer: CompositeScorer::new(weights),
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default())
    }

    pub fn with_scorer(scorer: CompositeScorer) -> Self {
        Self { scorer }
    }

    /// Attach scores to every candidate and sort them, best first
    ///
    /// The sort is stable, so candidates with equal scores keep the order
    /// retrieval produced (rating desc, then price asc).
    pub fn rank_vendors(
        &self,
        event: &EventContext,
        candidates: Vec<VendorCandidate>,
    ) -> Vec<VendorCandidate> {
        let mut ranked: Vec<VendorCandidate> = candidates
            .into_iter()
            .map(|mut vendor| {
                let (score, breakdown) = self.scorer.score(&vendor, event);
                vendor.score = score;
                vendor.breakdown = breakdown;
                vendor
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        ranked
    }

    /// Rank candidates and keep at most `limit` of them
    pub fn top_vendors(
        &self,
        event: &EventContext,
        candidates: Vec<VendorCandidate>,
        limit: usize,
    ) -> Vec<VendorCandidate> {
        let mut ranked = self.rank_vendors(event, candidates);
        ranked.truncate(limit);
        ranked
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scoring::{AvailabilityScorer, ReviewScorer};
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn create_candidate(id: i64, rating: f64, available: u8) -> VendorCandidate {
        VendorCandidate {
            vendor_id: id,
            business_name: format!("Vendor {}", id),
            rating,
            total_reviews: 3,
            business_lat: None,
            business_lng: None,
            service_radius: None,
            offered_services: vec![],
            avg_min_price: Some(1000.0),
            avg_max_price: Some(2000.0),
            availability_score: available,
            score: 0.0,
            breakdown: vec![],
        }
    }

    fn create_event() -> EventContext {
        EventContext {
            id: None,
            event_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            budget_min: 0.0,
            budget_max: 0.0,
            event_lat: None,
            event_lng: None,
            required_service_ids: BTreeSet::from([1]),
        }
    }

    #[test]
    fn test_ranked_descending() {
        let ranker = Ranker::with_default_weights();
        let candidates = vec![
            create_candidate(1, 3.0, 0),
            create_candidate(2, 3.0, 1),
            create_candidate(3, 5.0, 0),
        ];

        let ranked = ranker.rank_vendors(&create_event(), candidates);

        for i in 1..ranked.len() {
            assert!(ranked[i - 1].score >= ranked[i].score, "Vendors not sorted by score");
        }
        assert_eq!(ranked[0].vendor_id, 3);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranker = Ranker::with_default_weights();
        let candidates = vec![
            create_candidate(7, 4.0, 1),
            create_candidate(3, 4.0, 1),
            create_candidate(5, 4.0, 1),
        ];

        let ranked = ranker.rank_vendors(&create_event(), candidates);
        let ids: Vec<i64> = ranked.iter().map(|v| v.vendor_id).collect();

        assert_eq!(ids, vec![7, 3, 5]);
    }

    #[test]
    fn test_respects_limit() {
        let ranker = Ranker::with_default_weights();
        let candidates: Vec<VendorCandidate> =
            (0..20).map(|i| create_candidate(i, (i % 5) as f64, 0)).collect();

        let ranked = ranker.top_vendors(&create_event(), candidates, 5);

        assert_eq!(ranked.len(), 5);
    }

    #[test]
    fn test_custom_scorer_orders_by_its_components() {
        let scorer = CompositeScorer::empty()
            .with_scorer(AvailabilityScorer, 10.0)
            .with_scorer(ReviewScorer, 1.0);
        let ranker = Ranker::with_scorer(scorer);
        let candidates = vec![
            create_candidate(1, 5.0, 0),
            create_candidate(2, 1.0, 1),
            create_candidate(3, 4.0, 1),
        ];

        let ranked = ranker.rank_vendors(&create_event(), candidates);
        let ids: Vec<i64> = ranked.iter().map(|v| v.vendor_id).collect();

        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(ranked[0].breakdown.len(), 2);
        assert!((ranked[0].score - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input() {
        let ranker = Ranker::default();
        assert!(ranker.rank_vendors(&create_event(), vec![]).is_empty());
    }
}
