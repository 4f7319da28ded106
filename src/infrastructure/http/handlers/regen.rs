//! Regeneration Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{BulkRegenerationResult, RegenerationOutcome};
use crate::domain::speech::OwnerId;
use crate::infrastructure::http::dto::{
    ApiResponse, RegenerateAllRequest, RegenerateOneRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 强制再生成单条消息
pub async fn regenerate_one(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegenerateOneRequest>,
) -> Result<Json<ApiResponse<RegenerationOutcome>>, ApiError> {
    let owner = OwnerId::new(req.owner_id);
    let outcome = state.regeneration.regenerate_one(&owner).await;
    Ok(Json(ApiResponse::success(outcome)))
}

/// 批量强制再生成
///
/// 给 owner_ids 时按给定顺序处理，否则对目录全量处理；
/// 单条失败只体现在汇总里，接口本身总是 errno=0
pub async fn regenerate_all(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegenerateAllRequest>,
) -> Result<Json<ApiResponse<BulkRegenerationResult>>, ApiError> {
    let result = match req.owner_ids {
        Some(ids) => {
            let owners: Vec<OwnerId> = ids.into_iter().map(OwnerId::new).collect();
            state.regeneration.regenerate_all(&owners).await
        }
        None => state.regeneration.regenerate_corpus().await?,
    };
    Ok(Json(ApiResponse::success(result)))
}
