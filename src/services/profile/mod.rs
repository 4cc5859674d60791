use crate::models::Activity;
use crate::utils::normalize;
use std::collections::{BTreeSet, HashMap, HashSet};

const VIEW_WEIGHT: f32 = 1.0;
const ADD_TO_CART_WEIGHT: f32 = 3.0;

/// Builds one L2-normalized interaction vector per user over a global item
/// index, plus the raw per-(user, item) weights and per-user item sets the
/// collaborative ranker scores with.
///
/// The item index assigns slots in ascending item-id order, so identical
/// input produces bit-identical vectors run to run.
#[derive(Debug, Clone, Default)]
pub struct UserProfiles {
    item_to_index: HashMap<String, usize>,
    user_vectors: HashMap<String, Vec<f32>>,
    user_item_weights: HashMap<String, HashMap<String, f32>>,
    user_items: HashMap<String, HashSet<String>>,
}

impl UserProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild all user vectors from scratch out of the activity log.
    pub fn build(&mut self, activities: &[Activity]) {
        self.item_to_index.clear();
        self.user_vectors.clear();
        self.user_item_weights.clear();
        self.user_items.clear();

        // Global item index: distinct ids in ascending order.
        let all_items: BTreeSet<&str> = activities.iter().map(|a| a.item_id.as_str()).collect();
        for (index, item_id) in all_items.into_iter().enumerate() {
            self.item_to_index.insert(item_id.to_string(), index);
        }

        let num_items = self.item_to_index.len();
        let mut raw_vectors: HashMap<String, Vec<f32>> = HashMap::new();

        for activity in activities {
            let weight = action_weight(&activity.action);
            let item_index = self.item_to_index[&activity.item_id];

            raw_vectors
                .entry(activity.user_id.clone())
                .or_insert_with(|| vec![0.0; num_items])[item_index] += weight;

            *self
                .user_item_weights
                .entry(activity.user_id.clone())
                .or_default()
                .entry(activity.item_id.clone())
                .or_insert(0.0) += weight;

            self.user_items
                .entry(activity.user_id.clone())
                .or_default()
                .insert(activity.item_id.clone());
        }

        for (user_id, raw_vector) in raw_vectors {
            self.user_vectors.insert(user_id, normalize(&raw_vector));
        }
    }

    /// The user's normalized profile vector, if any activities were seen.
    pub fn user_vector(&self, user_id: &str) -> Option<&[f32]> {
        self.user_vectors.get(user_id).map(|v| v.as_slice())
    }

    pub fn all_user_ids(&self) -> Vec<String> {
        self.user_vectors.keys().cloned().collect()
    }

    /// Items the user interacted with; empty for unknown users.
    pub fn user_items(&self, user_id: &str) -> HashSet<String> {
        self.user_items.get(user_id).cloned().unwrap_or_default()
    }

    /// Accumulated raw (non-normalized) weight for a (user, item) pair.
    pub fn user_item_weight(&self, user_id: &str, item_id: &str) -> f32 {
        self.user_item_weights
            .get(user_id)
            .and_then(|weights| weights.get(item_id))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn all_user_vectors(&self) -> &HashMap<String, Vec<f32>> {
        &self.user_vectors
    }

    pub fn num_items(&self) -> usize {
        self.item_to_index.len()
    }
}

fn action_weight(action: &str) -> f32 {
    if action.eq_ignore_ascii_case("add_to_cart") {
        ADD_TO_CART_WEIGHT
    } else if action.eq_ignore_ascii_case("view") {
        VIEW_WEIGHT
    } else {
        1.0
    }
}
