//! Maintenance Handlers - 淘汰与统计

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::CacheStatistics;
use crate::infrastructure::http::dto::{ApiResponse, ClearCacheRequest, ClearCacheResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 删除早于 now - days 的缓存条目
pub async fn clear_cache(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClearCacheRequest>,
) -> Result<Json<ApiResponse<ClearCacheResponse>>, ApiError> {
    let removed = state.maintenance.clear_older_than(req.days).await?;
    Ok(Json(ApiResponse::success(ClearCacheResponse { removed })))
}

/// 缓存聚合统计
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<CacheStatistics>>, ApiError> {
    let stats = state.maintenance.compute_statistics().await?;
    Ok(Json(ApiResponse::success(stats)))
}
