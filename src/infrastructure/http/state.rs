//! Application State

use std::sync::Arc;

use crate::application::{
    CacheMaintenance, MessageDirectoryPort, RegenerationEngine, RequestCoordinator, TtsClientPort,
};

/// 应用状态
///
/// 所有服务在 main 中显式构造后注入，没有隐藏的全局可变状态
pub struct AppState {
    pub coordinator: Arc<RequestCoordinator>,
    pub regeneration: Arc<RegenerationEngine>,
    pub maintenance: Arc<CacheMaintenance>,
    pub directory: Arc<dyn MessageDirectoryPort>,
    pub tts_client: Arc<dyn TtsClientPort>,
}

impl AppState {
    pub fn new(
        coordinator: Arc<RequestCoordinator>,
        regeneration: Arc<RegenerationEngine>,
        maintenance: Arc<CacheMaintenance>,
        directory: Arc<dyn MessageDirectoryPort>,
        tts_client: Arc<dyn TtsClientPort>,
    ) -> Self {
        Self {
            coordinator,
            regeneration,
            maintenance,
            directory,
            tts_client,
        }
    }
}
