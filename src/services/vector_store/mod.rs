use crate::error::EngineError;
use nalgebra::DVector;
use std::cmp::Ordering;
use std::collections::HashMap;

/// In-memory store for item vectors and normalized user profile vectors.
///
/// Item vectors share a fixed dimension; user vectors share the size of the
/// global item index of the generation they were built in. Both sides are
/// scanned exhaustively on query, sorted descending by score with ascending
/// id as the deterministic tie-break.
#[derive(Debug, Clone)]
pub struct VectorStore {
    item_dim: usize,
    item_vectors: HashMap<String, DVector<f32>>,
    user_vectors: HashMap<String, DVector<f32>>,
}

impl VectorStore {
    pub fn new(item_dim: usize) -> Self {
        Self {
            item_dim,
            item_vectors: HashMap::new(),
            user_vectors: HashMap::new(),
        }
    }

    pub fn item_dim(&self) -> usize {
        self.item_dim
    }

    /// Insert or overwrite an item vector.
    pub fn add(&mut self, item_id: impl Into<String>, vector: Vec<f32>) -> Result<(), EngineError> {
        if vector.len() != self.item_dim {
            return Err(EngineError::DimensionMismatch {
                left: vector.len(),
                right: self.item_dim,
            });
        }

        self.item_vectors
            .insert(item_id.into(), DVector::from_vec(vector));
        Ok(())
    }

    /// Top-k items by cosine similarity to the query vector.
    pub fn query(&self, query: &[f32], k: usize) -> Result<Vec<(String, f32)>, EngineError> {
        if query.len() != self.item_dim {
            return Err(EngineError::DimensionMismatch {
                left: query.len(),
                right: self.item_dim,
            });
        }

        let query = DVector::from_vec(query.to_vec());
        let mut similarities: Vec<(String, f32)> = self
            .item_vectors
            .iter()
            .map(|(id, vector)| (id.clone(), cosine_similarity(&query, vector)))
            .collect();

        sort_scored_desc(&mut similarities);
        similarities.truncate(k);
        Ok(similarities)
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.item_vectors.contains_key(item_id)
    }

    pub fn get_vector(&self, item_id: &str) -> Option<Vec<f32>> {
        self.item_vectors
            .get(item_id)
            .map(|v| v.as_slice().to_vec())
    }

    pub fn all_item_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.item_vectors.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Clear both item and user vectors.
    pub fn clear(&mut self) {
        self.item_vectors.clear();
        self.user_vectors.clear();
    }

    // ===== user vector operations =====

    pub fn upsert_user_vector(&mut self, user_id: impl Into<String>, vector: Vec<f32>) {
        self.user_vectors
            .insert(user_id.into(), DVector::from_vec(vector));
    }

    pub fn get_user_vector(&self, user_id: &str) -> Option<Vec<f32>> {
        self.user_vectors
            .get(user_id)
            .map(|v| v.as_slice().to_vec())
    }

    /// Top-k users by similarity to the query vector, excluding
    /// `exclude_user_id`. Profile vectors are pre-normalized, so the dot
    /// product already equals cosine similarity.
    pub fn top_k_similar_users(
        &self,
        query: &[f32],
        k: usize,
        exclude_user_id: &str,
    ) -> Result<Vec<(String, f32)>, EngineError> {
        let mut similarities = Vec::new();

        for (user_id, vector) in &self.user_vectors {
            if user_id == exclude_user_id {
                continue;
            }
            if vector.len() != query.len() {
                return Err(EngineError::DimensionMismatch {
                    left: query.len(),
                    right: vector.len(),
                });
            }
            let score = query
                .iter()
                .zip(vector.iter())
                .map(|(x, y)| x * y)
                .sum::<f32>();
            similarities.push((user_id.clone(), score));
        }

        sort_scored_desc(&mut similarities);
        similarities.truncate(k);
        Ok(similarities)
    }
}

fn cosine_similarity(a: &DVector<f32>, b: &DVector<f32>) -> f32 {
    let norm_a = a.norm();
    let norm_b = b.norm();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        a.dot(b) / (norm_a * norm_b)
    }
}

/// Score descending, id ascending on ties.
fn sort_scored_desc(entries: &mut [(String, f32)]) {
    entries.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
}
