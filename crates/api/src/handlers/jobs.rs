use analytics_core::{JobKind, JobMessage, JobRecord, JobStatus};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::routes::AppState;

/// 提交任务请求体
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitJobRequest {
    pub kind: JobKind,
    #[serde(default)]
    pub dataset_id: Option<String>,
    #[serde(default)]
    pub parameters: Option<Value>,
}

/// 提交异步任务
///
/// 任务id在入队前生成并立即返回，调用方之后凭id轮询结果。
pub async fn submit_job(
    State(state): State<AppState>,
    Json(request): Json<SubmitJobRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let job_id = Uuid::new_v4().to_string();

    let mut message = JobMessage::new(&job_id);
    message.dataset_id = request.dataset_id;
    message.parameters = request.parameters;

    state.queue.enqueue_job(request.kind, &message).await?;

    info!("任务已提交: job_id={}, kind={}", job_id, request.kind);

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "jobId": job_id,
            "kind": request.kind,
            "status": JobStatus::Pending,
        })),
    ))
}

/// 查询任务状态
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobRecord>> {
    match state.queue.get_job_record(&job_id).await? {
        Some(record) => Ok(Json(record)),
        // 过期和从未存在无法区分，统一按不存在处理
        None => Err(ApiError::JobNotFound(job_id)),
    }
}

/// 管理用状态更新请求体
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: JobStatus,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// 管理用状态更新
///
/// 供在调度器之外执行的任务回写状态。
pub async fn update_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Value>> {
    state
        .queue
        .update_job_status(&job_id, request.status, request.result, request.error_message)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Job {job_id} status updated to {}", request.status),
    })))
}
