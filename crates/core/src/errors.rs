use thiserror::Error;

/// 分析引擎错误类型定义
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("消息队列传输错误: {0}")]
    Transport(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("任务处理错误: {0}")]
    Handler(String),

    #[error("未注册的任务类型: {kind}")]
    HandlerNotFound { kind: String },

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("缓存错误: {0}")]
    Cache(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl AnalyticsError {
    /// 提取面向任务记录的错误描述
    ///
    /// 处理器失败和负载解析失败的消息会原样写入任务记录的errorMessage字段，
    /// 其余错误带上分类前缀。
    pub fn job_error_message(self) -> String {
        match self {
            AnalyticsError::Handler(message) | AnalyticsError::Serialization(message) => message,
            other => other.to_string(),
        }
    }
}

/// 统一的Result类型
pub type AnalyticsResult<T> = std::result::Result<T, AnalyticsError>;
