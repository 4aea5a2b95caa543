use std::sync::Arc;

use analytics_core::JobQueueService;
use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{
    health::health_check,
    jobs::{get_job_status, submit_job, update_job_status},
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<dyn JobQueueService>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 任务API
        .route("/api/jobs", post(submit_job))
        .route("/api/jobs/status/{job_id}", get(get_job_status))
        .route("/api/jobs/update-status/{job_id}", post(update_job_status))
        .with_state(state)
}
