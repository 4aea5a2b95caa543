mod data_processing;
mod model_training;
mod prediction;
mod statistics;
mod visualization;

use std::sync::Arc;

use analytics_core::{AnalyticsError, AnalyticsResult, CacheStore, JobHandler, JobKind, JobMessage};
use serde::de::DeserializeOwned;

pub use data_processing::DataProcessingHandler;
pub use model_training::ModelTrainingHandler;
pub use prediction::PredictionHandler;
pub use statistics::StatisticalAnalysisHandler;
pub use visualization::VisualizationHandler;

/// 构建全部内置处理器
///
/// 返回 (kind, handler) 对，由应用在启动时一次性注册到处理器注册表。
pub fn builtin_handlers(
    cache: Arc<dyn CacheStore>,
) -> Vec<(JobKind, Arc<dyn JobHandler>)> {
    vec![
        (
            JobKind::DataProcessing,
            Arc::new(DataProcessingHandler::new(Arc::clone(&cache))) as Arc<dyn JobHandler>,
        ),
        (
            JobKind::ModelTraining,
            Arc::new(ModelTrainingHandler::new(Arc::clone(&cache))),
        ),
        (
            JobKind::Prediction,
            Arc::new(PredictionHandler::new(Arc::clone(&cache))),
        ),
        (JobKind::Visualization, Arc::new(VisualizationHandler::new())),
        (
            JobKind::StatisticalAnalysis,
            Arc::new(StatisticalAnalysisHandler::new(cache)),
        ),
    ]
}

/// 解析任务消息中的kind专属参数
///
/// 参数缺失时使用默认值；参数存在但形状不对按处理失败处理，
/// 解码错误会写入任务记录的errorMessage。
pub(crate) fn parse_params<T>(job: &JobMessage) -> AnalyticsResult<T>
where
    T: DeserializeOwned + Default,
{
    match &job.parameters {
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| AnalyticsError::Handler(format!("invalid job parameters: {e}"))),
        None => Ok(T::default()),
    }
}
