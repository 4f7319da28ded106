//! Message Handlers - 语料管理

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::ports::SpokenMessage;
use crate::domain::speech::OwnerId;
use crate::infrastructure::http::dto::{
    ApiResponse, DeleteMessageRequest, DeleteMessageResponse, Empty, UpsertMessageRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 写入或更新一条消息定义
pub async fn upsert_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpsertMessageRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    if req.owner_id.trim().is_empty() {
        return Err(ApiError::BadRequest("owner_id cannot be empty".to_string()));
    }
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text cannot be empty".to_string()));
    }
    req.voice
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let message = SpokenMessage::new(OwnerId::new(req.owner_id), req.text, req.voice);
    state
        .directory
        .upsert(message)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(ApiResponse::ok()))
}

/// 删除一条消息定义
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteMessageRequest>,
) -> Result<Json<ApiResponse<DeleteMessageResponse>>, ApiError> {
    let deleted = state
        .directory
        .delete(&OwnerId::new(req.owner_id))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(ApiResponse::success(DeleteMessageResponse { deleted })))
}

/// 列出全部 owner
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let ids = state
        .directory
        .list_owner_ids()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        ids.into_iter().map(OwnerId::into_string).collect(),
    )))
}
