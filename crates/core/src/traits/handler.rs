use async_trait::async_trait;
use serde_json::Value;

use crate::errors::AnalyticsResult;
use crate::models::JobMessage;

/// 任务处理器接口
///
/// 每种任务类型注册一个处理器，由调度器的消费循环同步等待执行完成。
/// 处理器内部可以自行并发，对调度器不可见。
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// 处理器名称，用于日志
    fn name(&self) -> &str;

    /// 执行任务
    ///
    /// 返回的`Value`会原样写入任务记录的result字段；
    /// 返回错误则任务被标记为failed，错误描述写入errorMessage。
    async fn handle(&self, job: &JobMessage) -> AnalyticsResult<Value>;
}
