//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping            GET   健康检查
//! - /api/audio           POST  按需取音频（命中回缓存，失效合成）
//! - /api/regen/one       POST  强制再生成单条
//! - /api/regen/all       POST  批量强制再生成（可选 owner_ids，缺省全量）
//! - /api/cache/clear     POST  按龄淘汰缓存条目
//! - /api/cache/stats     GET   缓存聚合统计
//! - /api/message/upsert  POST  写入/更新消息定义
//! - /api/message/delete  POST  删除消息定义
//! - /api/message/list    GET   列出全部 owner

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/audio", post(handlers::get_audio))
        .nest("/regen", regen_routes())
        .nest("/cache", cache_routes())
        .nest("/message", message_routes())
}

/// Regeneration 路由
fn regen_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/one", post(handlers::regenerate_one))
        .route("/all", post(handlers::regenerate_all))
}

/// Cache 维护路由
fn cache_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/clear", post(handlers::clear_cache))
        .route("/stats", get(handlers::get_stats))
}

/// Message 路由
fn message_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upsert", post(handlers::upsert_message))
        .route("/delete", post(handlers::delete_message))
        .route("/list", get(handlers::list_messages))
}
