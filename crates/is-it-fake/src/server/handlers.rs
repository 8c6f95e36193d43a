use axum::{Json, extract::State};
use serde_json::{Value, json};
use tracing::debug;

use super::{errors::ApiError, state::AppState};
use crate::{RawPosting, ScoreResult};

/// POST /predict
pub async fn predict_handler(
    State(state): State<AppState>,
    Json(posting): Json<RawPosting>,
) -> Result<Json<ScoreResult>, ApiError> {
    let result = state.detector.score(posting)?;
    debug!(
        prediction = %result.prediction,
        fake_probability = result.fake_probability,
        "Scored posting"
    );
    Ok(Json(result))
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME"),
        "num_features": state.detector.pipeline().num_features(),
        "threshold": state.detector.threshold(),
    }))
}
