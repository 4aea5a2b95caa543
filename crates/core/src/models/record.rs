use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 任务状态
///
/// ```text
/// pending --(调度器取出消息)--> processing
/// processing --(处理器返回结果)--> completed
/// processing --(处理器返回错误)--> failed
/// ```
///
/// `pending` 是隐式初始状态：首次状态写入之前，任何任务都视为pending。
/// `completed` 和 `failed` 是终态。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 任务记录（结果存储中按任务id保存的状态文档）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    /// 创建隐式初始记录
    ///
    /// 记录在首次状态写入时才真正落盘；入队本身不会创建pending记录。
    pub fn pending(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Pending,
            result: None,
            error_message: None,
            completed_at: None,
        }
    }

    /// 合并一次状态更新（upsert语义）
    ///
    /// 不校验状态机前置条件：对终态记录的再次更新直接覆盖，
    /// last-write-wins是已知并接受的竞态，不加锁防护。
    /// `completed_at` 仅在首次进入终态时设置一次，之后保持不变，
    /// 因此对同一组参数重复调用是幂等的。
    pub fn apply(&mut self, status: JobStatus, result: Option<Value>, error_message: Option<String>) {
        self.status = status;
        if let Some(result) = result {
            self.result = Some(result);
        }
        if let Some(error_message) = error_message {
            self.error_message = Some(error_message);
        }
        if status.is_terminal() && self.completed_at.is_none() {
            self.completed_at = Some(Utc::now());
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pending_record_defaults() {
        let record = JobRecord::pending("job-1");
        assert_eq!(record.status, JobStatus::Pending);
        assert!(record.result.is_none());
        assert!(record.error_message.is_none());
        assert!(record.completed_at.is_none());
        assert!(!record.is_finished());
    }

    #[test]
    fn test_apply_completed_sets_result_and_timestamp() {
        let mut record = JobRecord::pending("job-1");
        record.apply(JobStatus::Processing, None, None);
        assert_eq!(record.status, JobStatus::Processing);
        assert!(record.completed_at.is_none());

        record.apply(JobStatus::Completed, Some(json!({"rows": 950})), None);
        assert_eq!(record.status, JobStatus::Completed);
        assert_eq!(record.result, Some(json!({"rows": 950})));
        assert!(record.completed_at.is_some());
    }

    #[test]
    fn test_completed_at_is_set_exactly_once() {
        let mut record = JobRecord::pending("job-1");
        record.apply(JobStatus::Failed, None, Some("boom".to_string()));
        let first = record.completed_at;
        assert!(first.is_some());

        record.apply(JobStatus::Failed, None, Some("boom".to_string()));
        assert_eq!(record.completed_at, first);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut a = JobRecord::pending("job-1");
        a.apply(JobStatus::Completed, Some(json!({"ok": true})), None);
        let mut b = a.clone();
        b.apply(JobStatus::Completed, Some(json!({"ok": true})), None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_terminal_record_is_overwritten_last_write_wins() {
        let mut record = JobRecord::pending("job-1");
        record.apply(JobStatus::Completed, Some(json!({"ok": true})), None);
        record.apply(JobStatus::Failed, None, Some("late failure".to_string()));
        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.error_message.as_deref(), Some("late failure"));
        // 先前的result不会被清除，这是沿用的覆盖语义
        assert!(record.result.is_some());
    }

    #[test]
    fn test_record_wire_shape() {
        let mut record = JobRecord::pending("job-1");
        record.apply(JobStatus::Failed, None, Some("model not found".to_string()));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["jobId"], "job-1");
        assert_eq!(value["status"], "failed");
        assert_eq!(value["errorMessage"], "model not found");
        assert!(value["completedAt"].is_string());
        // 未设置的字段不出现在线格式中
        assert!(value.get("result").is_none());
    }

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_value(JobStatus::Processing).unwrap(),
            json!("processing")
        );
        let status: JobStatus = serde_json::from_value(json!("completed")).unwrap();
        assert_eq!(status, JobStatus::Completed);
    }
}
