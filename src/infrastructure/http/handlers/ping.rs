//! Ping Handler - 健康检查

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// 下游 TTS 服务是否可达
    pub tts_available: bool,
}

/// Ping endpoint
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        tts_available: state.tts_client.health_check().await,
    })
}
