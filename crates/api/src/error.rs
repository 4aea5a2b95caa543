use analytics_core::AnalyticsError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("分析引擎错误: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("任务不存在: {0}")]
    JobNotFound(String),

    #[error("请求参数错误: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // 对外只暴露分类信息，不泄漏传输层细节
        let (status, error_message, error_type) = match &self {
            ApiError::JobNotFound(job_id) => (
                StatusCode::NOT_FOUND,
                format!("任务 {job_id} 不存在"),
                "JOB_NOT_FOUND",
            ),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数错误: {message}"),
                "BAD_REQUEST",
            ),
            ApiError::Analytics(AnalyticsError::Transport(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "消息队列暂不可用，请稍后重试".to_string(),
                "QUEUE_UNAVAILABLE",
            ),
            ApiError::Analytics(AnalyticsError::Serialization(_)) => (
                StatusCode::BAD_REQUEST,
                "请求数据格式错误".to_string(),
                "SERIALIZATION_ERROR",
            ),
            ApiError::Analytics(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "系统内部错误".to_string(),
                "INTERNAL_ERROR",
            ),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type,
                "code": status.as_u16(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_not_found_maps_to_404() {
        let response = ApiError::JobNotFound("job-1".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_transport_error_maps_to_503() {
        let error = ApiError::Analytics(AnalyticsError::Transport("连接断开".to_string()));
        assert_eq!(error.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_handler_error_maps_to_500() {
        let error = ApiError::Analytics(AnalyticsError::Internal("oops".to_string()));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
