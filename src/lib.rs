pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::EngineError;
pub use models::*;

use services::collaborative::CollaborativeRecommendationService;
use services::recommendation::RecommendationService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub recommendation_service: Arc<RecommendationService>,
    pub collaborative_service: Arc<CollaborativeRecommendationService>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        let recommendation_service = Arc::new(RecommendationService::new(config.clone()));

        let collaborative_service = Arc::new(CollaborativeRecommendationService::new(
            recommendation_service.clone(),
            config.clone(),
        ));

        Self {
            config,
            recommendation_service,
            collaborative_service,
        }
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
