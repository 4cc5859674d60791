use crate::config::Config;
use crate::models::RecommendationItem;
use crate::services::recommendation::RecommendationService;
use crate::utils::round2;
use anyhow::Result;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// Neighbor-weighted item recommendations built on the user profile vectors.
pub struct CollaborativeRecommendationService {
    engine: Arc<RecommendationService>,
    config: Arc<Config>,
}

impl CollaborativeRecommendationService {
    pub fn new(engine: Arc<RecommendationService>, config: Arc<Config>) -> Self {
        Self { engine, config }
    }

    /// Recommend items the user's nearest neighbors interacted with but the
    /// user has not. Each candidate accumulates
    /// `neighbor_similarity * raw_weight(neighbor, item)`; scores are
    /// rounded to 2 decimals and, unlike the personal-history path, not
    /// capped.
    pub fn get_collaborative_recommendations(
        &self,
        user_id: &str,
        k: usize,
    ) -> Result<Vec<RecommendationItem>> {
        let generation = self.engine.snapshot();
        let profiles = generation.profiles();

        let Some(user_vector) = profiles.user_vector(user_id) else {
            return Ok(Vec::new());
        };

        let neighbors = generation.store().top_k_similar_users(
            user_vector,
            self.config.engine.neighbor_count,
            user_id,
        )?;

        if neighbors.is_empty() {
            return Ok(Vec::new());
        }

        let user_items = profiles.user_items(user_id);
        let mut item_scores: HashMap<String, f32> = HashMap::new();

        for (neighbor_id, similarity) in &neighbors {
            for item_id in profiles.user_items(neighbor_id) {
                if user_items.contains(&item_id) {
                    continue;
                }

                let weight = profiles.user_item_weight(neighbor_id, &item_id);
                *item_scores.entry(item_id).or_insert(0.0) += similarity * weight;
            }
        }

        let mut ranked: Vec<(String, f32)> = item_scores.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(k);

        Ok(ranked
            .into_iter()
            .map(|(item_id, score)| RecommendationItem::new(item_id, round2(score as f64)))
            .collect())
    }

    /// The user's most similar neighbors, for transparency and debugging.
    pub fn get_similar_users(&self, user_id: &str, top_n: usize) -> Result<Vec<(String, f32)>> {
        let generation = self.engine.snapshot();

        let Some(user_vector) = generation.profiles().user_vector(user_id) else {
            return Ok(Vec::new());
        };

        generation
            .store()
            .top_k_similar_users(user_vector, top_n, user_id)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Activity;

    fn services() -> (Arc<RecommendationService>, CollaborativeRecommendationService) {
        let config = Arc::new(Config::default());
        let engine = Arc::new(RecommendationService::new(config.clone()));
        let collaborative = CollaborativeRecommendationService::new(engine.clone(), config);
        (engine, collaborative)
    }

    #[test]
    fn test_unknown_user_is_empty() {
        let (engine, collaborative) = services();
        engine
            .ingest_activities(vec![Activity::new("u1", "i1", "view")])
            .unwrap();

        assert!(collaborative
            .get_collaborative_recommendations("ghost", 5)
            .unwrap()
            .is_empty());
        assert!(collaborative.get_similar_users("ghost", 5).unwrap().is_empty());
    }

    #[test]
    fn test_lone_user_has_no_neighbors() {
        let (engine, collaborative) = services();
        engine
            .ingest_activities(vec![Activity::new("u1", "i1", "view")])
            .unwrap();

        assert!(collaborative
            .get_collaborative_recommendations("u1", 5)
            .unwrap()
            .is_empty());
        assert!(collaborative.get_similar_users("u1", 5).unwrap().is_empty());
    }

    #[test]
    fn test_already_seen_items_are_excluded() {
        let (engine, collaborative) = services();
        engine
            .ingest_activities(vec![
                Activity::new("u1", "shared", "view"),
                Activity::new("u2", "shared", "view"),
                Activity::new("u2", "fresh", "view"),
            ])
            .unwrap();

        let recs = collaborative
            .get_collaborative_recommendations("u1", 5)
            .unwrap();
        let ids: Vec<&str> = recs.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, vec!["fresh"]);
    }

    #[test]
    fn test_neighbor_items_ranked_by_similarity_times_weight() {
        let (engine, collaborative) = services();
        engine
            .ingest_activities(vec![
                Activity::new("u1", "shared", "view"),
                Activity::new("u2", "shared", "view"),
                Activity::new("u2", "heavy", "add_to_cart"),
                Activity::new("u2", "light", "view"),
            ])
            .unwrap();

        let recs = collaborative
            .get_collaborative_recommendations("u1", 5)
            .unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].item_id, "heavy");
        assert_eq!(recs[1].item_id, "light");
        // add_to_cart carries 3x the raw weight of view, scaled by the same
        // neighbor similarity.
        assert!(recs[0].score > recs[1].score);
        assert!(recs[0].score > 0.0);
    }

    #[test]
    fn test_zero_k_is_empty() {
        let (engine, collaborative) = services();
        engine
            .ingest_activities(vec![
                Activity::new("u1", "shared", "view"),
                Activity::new("u2", "shared", "view"),
                Activity::new("u2", "fresh", "view"),
            ])
            .unwrap();

        assert!(collaborative
            .get_collaborative_recommendations("u1", 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_similar_users_ranked_by_similarity() {
        let (engine, collaborative) = services();
        // u2 matches u1 exactly; u3 only overlaps on one of two items.
        engine
            .ingest_activities(vec![
                Activity::new("u1", "a", "view"),
                Activity::new("u1", "b", "view"),
                Activity::new("u2", "a", "view"),
                Activity::new("u2", "b", "view"),
                Activity::new("u3", "a", "view"),
                Activity::new("u3", "c", "view"),
            ])
            .unwrap();

        let similar = collaborative.get_similar_users("u1", 5).unwrap();
        assert_eq!(similar.len(), 2);
        assert_eq!(similar[0].0, "u2");
        assert!((similar[0].1 - 1.0).abs() < 1e-6);
        assert_eq!(similar[1].0, "u3");
        assert!(similar[1].1 < similar[0].1);
    }
}
