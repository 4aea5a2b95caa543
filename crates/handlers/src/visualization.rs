use analytics_core::{AnalyticsResult, JobHandler, JobMessage};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

/// 可视化任务参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisualizationParams {
    #[serde(default = "default_chart_type")]
    chart_type: String,
    #[serde(default)]
    title: Option<String>,
}

impl Default for VisualizationParams {
    fn default() -> Self {
        Self {
            chart_type: default_chart_type(),
            title: None,
        }
    }
}

fn default_chart_type() -> String {
    "bar".to_string()
}

/// 可视化任务处理器
pub struct VisualizationHandler;

impl VisualizationHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VisualizationHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobHandler for VisualizationHandler {
    fn name(&self) -> &str {
        "visualization"
    }

    async fn handle(&self, job: &JobMessage) -> AnalyticsResult<Value> {
        let params: VisualizationParams = crate::parse_params(job)?;

        info!(
            "可视化生成完成: job_id={}, chart_type={}",
            job.id, params.chart_type
        );

        Ok(json!({
            "success": true,
            "chartType": params.chart_type,
            "chartData": {
                "data": [],
                "layout": {
                    "title": params.title,
                }
            },
            "message": "Visualization created successfully"
        }))
    }
}
