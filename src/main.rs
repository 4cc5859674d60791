use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use vecrec::utils::validation::validate_activities;
use vecrec::utils::round2;
use vecrec::{init_tracing, AppState, Config};
use vecrec::{
    Activity, CollaborativeRecommendationResponse, HealthResponse, IngestResponse,
    RecommendationResponse, SimilarUser,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendQuery {
    user_id: String,
    k: Option<i64>,
}

impl RecommendQuery {
    // k may arrive as zero or negative; both mean "nothing requested".
    fn k(&self) -> usize {
        self.k.unwrap_or(5).max(0) as usize
    }
}

fn error_body(status: StatusCode, message: String) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({
            "status": status.as_u16(),
            "error": status.canonical_reason().unwrap_or("Unexpected Error"),
            "message": message,
        })),
    )
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "recommendation-service",
        "status": "ok",
        "endpoints": ["/health", "/ingest", "/recommend", "/recommendCollaborative"],
    }))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn ingest_activities(
    State(state): State<AppState>,
    Json(activities): Json<Vec<Activity>>,
) -> Result<Json<IngestResponse>, (StatusCode, Json<Value>)> {
    validate_activities(&activities)
        .map_err(|e| error_body(StatusCode::BAD_REQUEST, e.to_string()))?;

    let count = state
        .recommendation_service
        .ingest_activities(activities)
        .map_err(|e| {
            tracing::error!("failed to ingest activities: {}", e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    Ok(Json(IngestResponse {
        message: "Activities ingested successfully".to_string(),
        count,
        status: "success".to_string(),
    }))
}

async fn get_recommendations(
    State(state): State<AppState>,
    Query(params): Query<RecommendQuery>,
) -> Json<RecommendationResponse> {
    let recommendations = state
        .recommendation_service
        .get_recommendations(&params.user_id, params.k());

    Json(RecommendationResponse::new(
        params.user_id.clone(),
        recommendations,
    ))
}

async fn get_collaborative_recommendations(
    State(state): State<AppState>,
    Query(params): Query<RecommendQuery>,
) -> Result<Json<CollaborativeRecommendationResponse>, (StatusCode, Json<Value>)> {
    let recommendations = state
        .collaborative_service
        .get_collaborative_recommendations(&params.user_id, params.k())
        .map_err(|e| {
            tracing::error!("failed to get collaborative recommendations: {}", e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    let similar_users = state
        .collaborative_service
        .get_similar_users(&params.user_id, state.config.engine.neighbor_count)
        .map_err(|e| {
            tracing::error!("failed to get similar users: {}", e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?
        .into_iter()
        .map(|(user_id, similarity)| SimilarUser {
            user_id,
            similarity: round2(similarity as f64),
        })
        .collect();

    Ok(Json(CollaborativeRecommendationResponse::new(
        params.user_id.clone(),
        recommendations,
        similar_users,
    )))
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ingest", post(ingest_activities))
        .route("/recommend", get(get_recommendations))
        .route("/recommendCollaborative", get(get_collaborative_recommendations))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = match std::env::var("VECREC_CONFIG") {
        Ok(path) => Config::from_file(&path)?,
        Err(_) => Config::default(),
    };
    info!("starting recommendation server with config: {:?}", config.server);

    let addr = config.server.socket_addr()?;
    let state = AppState::new(config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
