use serde::{Deserialize, Serialize};

/// A single recorded user-item interaction.
///
/// Activities only live in the current in-memory log; the next ingest
/// replaces them wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub user_id: String,
    pub item_id: String,
    pub action: String,
}

impl Activity {
    pub fn new(user_id: impl Into<String>, item_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            action: action.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationItem {
    pub item_id: String,
    pub score: f64,
}

impl RecommendationItem {
    pub fn new(item_id: impl Into<String>, score: f64) -> Self {
        Self {
            item_id: item_id.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub user_id: String,
    pub recommendations: Vec<RecommendationItem>,
    pub generated_at: String,
}

impl RecommendationResponse {
    pub fn new(user_id: impl Into<String>, recommendations: Vec<RecommendationItem>) -> Self {
        Self {
            user_id: user_id.into(),
            recommendations,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarUser {
    pub user_id: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborativeRecommendationResponse {
    pub user_id: String,
    pub recommendations: Vec<RecommendationItem>,
    pub similar_users: Vec<SimilarUser>,
    pub generated_at: String,
}

impl CollaborativeRecommendationResponse {
    pub fn new(
        user_id: impl Into<String>,
        recommendations: Vec<RecommendationItem>,
        similar_users: Vec<SimilarUser>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            recommendations,
            similar_users,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub message: String,
    pub count: usize,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
