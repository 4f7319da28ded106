//! Audio Handlers

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::domain::speech::OwnerId;
use crate::infrastructure::http::dto::GetAudioRequest;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 按需取音频：命中直接回缓存字节，失效则合成后返回
pub async fn get_audio(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetAudioRequest>,
) -> Result<Response, ApiError> {
    let owner = OwnerId::new(req.owner_id);

    let generated = state
        .coordinator
        .get_or_generate(&owner, &req.text, &req.voice)
        .await?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, generated.mime_type)
        .header(header::CONTENT_LENGTH, generated.audio.len())
        .body(Body::from(generated.audio))
        .unwrap())
}
