use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{AnalyticsError, AnalyticsResult};

/// 队列命名前缀，完整队列名为 `analytics:<kind>`
pub const QUEUE_PREFIX: &str = "analytics";

/// 任务类型
///
/// 决定消息进入哪个队列、由哪个处理器执行。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    DataProcessing,
    ModelTraining,
    Prediction,
    Visualization,
    StatisticalAnalysis,
}

impl JobKind {
    /// 所有内置任务类型
    pub fn all() -> [JobKind; 5] {
        [
            JobKind::DataProcessing,
            JobKind::ModelTraining,
            JobKind::Prediction,
            JobKind::Visualization,
            JobKind::StatisticalAnalysis,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::DataProcessing => "data_processing",
            JobKind::ModelTraining => "model_training",
            JobKind::Prediction => "prediction",
            JobKind::Visualization => "visualization",
            JobKind::StatisticalAnalysis => "statistical_analysis",
        }
    }

    /// 任务队列名称: `analytics:<kind>`
    pub fn queue_name(&self) -> String {
        format!("{}:{}", QUEUE_PREFIX, self.as_str())
    }

    /// 通知频道名称: `analytics:<kind>:notification`
    pub fn notification_channel(&self) -> String {
        format!("{}:notification", self.queue_name())
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobKind {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data_processing" => Ok(JobKind::DataProcessing),
            "model_training" => Ok(JobKind::ModelTraining),
            "prediction" => Ok(JobKind::Prediction),
            "visualization" => Ok(JobKind::Visualization),
            "statistical_analysis" => Ok(JobKind::StatisticalAnalysis),
            other => Err(AnalyticsError::HandlerNotFound {
                kind: other.to_string(),
            }),
        }
    }
}

/// 任务消息（生产者 → 队列）
///
/// `id` 由生产者在入队前分配，作为任务整个生命周期的关联键，
/// 调度器从不生成id。任务类型由消息所在的队列隐含，不出现在消息体中。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobMessage {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    /// 其余kind相关字段原样保留，仅由对应处理器解释
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl JobMessage {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dataset_id: None,
            parameters: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_dataset_id(mut self, dataset_id: impl Into<String>) -> Self {
        self.dataset_id = Some(dataset_id.into());
        self
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// 从队列负载解析消息，负载必须是带字符串`id`的JSON对象
    pub fn from_wire(payload: &str) -> AnalyticsResult<Self> {
        serde_json::from_str(payload)
            .map_err(|e| AnalyticsError::Serialization(format!("解析任务消息失败: {e}")))
    }

    pub fn to_wire(&self) -> AnalyticsResult<String> {
        serde_json::to_string(self)
            .map_err(|e| AnalyticsError::Serialization(format!("序列化任务消息失败: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_queue_naming_convention() {
        assert_eq!(
            JobKind::DataProcessing.queue_name(),
            "analytics:data_processing"
        );
        assert_eq!(
            JobKind::ModelTraining.notification_channel(),
            "analytics:model_training:notification"
        );
        assert_eq!(JobKind::StatisticalAnalysis.as_str(), "statistical_analysis");
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in JobKind::all() {
            let parsed: JobKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("unknown_kind".parse::<JobKind>().is_err());
    }

    #[test]
    fn test_message_wire_shape() {
        let message = JobMessage::new("job-1")
            .with_dataset_id("ds-42")
            .with_parameters(json!({"op": "clean"}));

        let wire = message.to_wire().unwrap();
        let value: serde_json::Value = serde_json::from_str(&wire).unwrap();
        assert_eq!(value["id"], "job-1");
        assert_eq!(value["datasetId"], "ds-42");
        assert_eq!(value["parameters"]["op"], "clean");

        let parsed = JobMessage::from_wire(&wire).unwrap();
        assert_eq!(parsed, message);
    }

    #[test]
    fn test_message_preserves_extra_fields() {
        let wire = r#"{"id":"job-2","modelType":"regression","parameters":{}}"#;
        let message = JobMessage::from_wire(wire).unwrap();
        assert_eq!(message.extra["modelType"], "regression");
    }

    #[test]
    fn test_message_without_id_is_rejected() {
        assert!(JobMessage::from_wire(r#"{"parameters":{}}"#).is_err());
        assert!(JobMessage::from_wire("not json").is_err());
        assert!(JobMessage::from_wire("[1,2,3]").is_err());
    }
}
