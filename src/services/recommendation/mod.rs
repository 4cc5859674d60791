use crate::config::Config;
use crate::models::{Activity, RecommendationItem};
use crate::services::profile::UserProfiles;
use crate::services::vector_store::VectorStore;
use crate::utils::round2;
use anyhow::Result;
use parking_lot::RwLock;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::info;

/// One complete, immutable rebuild of the engine state.
///
/// Ingest constructs the next generation off to the side and publishes it by
/// swapping an `Arc`, so queries always see either the old or the new
/// generation in full, never a partially rebuilt mix.
#[derive(Debug)]
pub struct Generation {
    activities: Vec<Activity>,
    store: VectorStore,
    profiles: UserProfiles,
}

impl Generation {
    fn empty(item_dim: usize) -> Self {
        Self {
            activities: Vec::new(),
            store: VectorStore::new(item_dim),
            profiles: UserProfiles::new(),
        }
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn profiles(&self) -> &UserProfiles {
        &self.profiles
    }
}

/// Per-item interaction counters for the personal-history ranking.
#[derive(Debug)]
struct ItemScore {
    item_id: String,
    add_to_cart_count: u32,
    view_count: u32,
}

// Personal-history score constants. A recommendation scores
// (add_to_cart * 10 + view * 1) / 100, rounded to 2 decimals and capped at
// 1.0; these values are part of the external contract.
const ADD_TO_CART_POINTS: f64 = 10.0;
const VIEW_POINTS: f64 = 1.0;
const SCORE_SCALE: f64 = 100.0;
const SCORE_CAP: f64 = 1.0;

pub struct RecommendationService {
    config: Arc<Config>,
    generation: RwLock<Arc<Generation>>,
}

impl RecommendationService {
    pub fn new(config: Arc<Config>) -> Self {
        let empty = Arc::new(Generation::empty(config.engine.item_vector_dim));
        Self {
            config,
            generation: RwLock::new(empty),
        }
    }

    /// Replace all engine state with a rebuild from the given activity log.
    /// Returns the number of accepted activities.
    pub fn ingest_activities(&self, activities: Vec<Activity>) -> Result<usize> {
        let dim = self.config.engine.item_vector_dim;
        let mut store = VectorStore::new(dim);

        let all_items: BTreeSet<&str> = activities.iter().map(|a| a.item_id.as_str()).collect();
        let num_distinct_items = all_items.len();
        for item_id in all_items {
            store.add(item_id, deterministic_item_vector(item_id, dim))?;
        }

        let mut profiles = UserProfiles::new();
        profiles.build(&activities);

        for (user_id, vector) in profiles.all_user_vectors() {
            store.upsert_user_vector(user_id.clone(), vector.clone());
        }

        let count = activities.len();
        let num_users = profiles.all_user_vectors().len();

        let next = Arc::new(Generation {
            activities,
            store,
            profiles,
        });
        *self.generation.write() = next;

        info!(
            activities = count,
            users = num_users,
            items = num_distinct_items,
            "ingested activity log"
        );
        Ok(count)
    }

    /// Rank the user's own items by add_to_cart count, then view count, then
    /// item id. Unknown users get an empty list.
    pub fn get_recommendations(&self, user_id: &str, k: usize) -> Vec<RecommendationItem> {
        let generation = self.snapshot();

        let user_activities: Vec<&Activity> = generation
            .activities
            .iter()
            .filter(|a| a.user_id == user_id)
            .collect();

        if user_activities.is_empty() {
            return Vec::new();
        }

        let mut item_scores: HashMap<&str, ItemScore> = HashMap::new();
        for activity in user_activities {
            let score = item_scores
                .entry(activity.item_id.as_str())
                .or_insert_with(|| ItemScore {
                    item_id: activity.item_id.clone(),
                    add_to_cart_count: 0,
                    view_count: 0,
                });

            if activity.action.eq_ignore_ascii_case("add_to_cart") {
                score.add_to_cart_count += 1;
            } else if activity.action.eq_ignore_ascii_case("view") {
                score.view_count += 1;
            }
        }

        let mut ranked: Vec<ItemScore> = item_scores.into_values().collect();
        ranked.sort_by(|a, b| {
            b.add_to_cart_count
                .cmp(&a.add_to_cart_count)
                .then_with(|| b.view_count.cmp(&a.view_count))
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        ranked.truncate(k);

        ranked
            .into_iter()
            .map(|s| {
                let score = calculate_score(s.add_to_cart_count, s.view_count);
                RecommendationItem::new(s.item_id, score)
            })
            .collect()
    }

    pub fn activity_count(&self) -> usize {
        self.snapshot().activities.len()
    }

    /// Grab the current generation; the caller keeps a consistent view even
    /// if an ingest swaps in a new one mid-query.
    pub fn snapshot(&self) -> Arc<Generation> {
        Arc::clone(&self.generation.read())
    }
}

fn calculate_score(add_to_cart_count: u32, view_count: u32) -> f64 {
    let raw = add_to_cart_count as f64 * ADD_TO_CART_POINTS + view_count as f64 * VIEW_POINTS;
    round2(raw / SCORE_SCALE).min(SCORE_CAP)
}

/// Deterministic pseudo-random vector for an item id.
///
/// FNV-1a over the id bytes seeds a ChaCha8 stream; both are pinned
/// algorithms, so the same id maps to the same vector across processes and
/// across releases.
pub fn deterministic_item_vector(item_id: &str, dim: usize) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(fnv1a_64(item_id.as_bytes()));
    (0..dim).map(|_| rng.gen::<f32>()).collect()
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x100_0000_01b3;

    bytes
        .iter()
        .fold(OFFSET_BASIS, |hash, &b| (hash ^ b as u64).wrapping_mul(PRIME))
}
