use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use analytics_core::{AnalyticsError, AnalyticsResult, QueueTransport};
use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use tracing::debug;

/// 内存队列传输实现
///
/// 使用Tokio channels，适用于嵌入式部署和测试场景。
/// 每个队列一条无界mpsc通道保证FIFO；接收端用互斥锁包装以支持多个消费者。
pub struct InMemoryQueueTransport {
    queues: Arc<RwLock<HashMap<String, QueueChannel>>>,
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<String>>>>,
}

struct QueueChannel {
    sender: mpsc::UnboundedSender<String>,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
}

impl InMemoryQueueTransport {
    pub fn new() -> Self {
        Self {
            queues: Arc::new(RwLock::new(HashMap::new())),
            channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn get_or_create_queue(&self, queue: &str) -> QueueHandles {
        {
            let queues = self.queues.read().await;
            if let Some(channel) = queues.get(queue) {
                return QueueHandles {
                    sender: channel.sender.clone(),
                    receiver: Arc::clone(&channel.receiver),
                };
            }
        }

        let mut queues = self.queues.write().await;
        let channel = queues.entry(queue.to_string()).or_insert_with(|| {
            debug!("创建内存队列: {}", queue);
            let (sender, receiver) = mpsc::unbounded_channel();
            QueueChannel {
                sender,
                receiver: Arc::new(Mutex::new(receiver)),
            }
        });

        QueueHandles {
            sender: channel.sender.clone(),
            receiver: Arc::clone(&channel.receiver),
        }
    }

    /// 订阅通知频道（测试和嵌入式订阅者使用）
    pub async fn subscribe(&self, channel: &str) -> broadcast::Receiver<String> {
        let mut channels = self.channels.write().await;
        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(64).0)
            .subscribe()
    }
}

struct QueueHandles {
    sender: mpsc::UnboundedSender<String>,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
}

impl Default for InMemoryQueueTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueueTransport for InMemoryQueueTransport {
    async fn push(&self, queue: &str, payload: &str) -> AnalyticsResult<()> {
        let handles = self.get_or_create_queue(queue).await;
        handles.sender.send(payload.to_string()).map_err(|e| {
            AnalyticsError::Transport(format!("向内存队列 {queue} 发送消息失败: {e}"))
        })?;

        debug!("消息已推送到内存队列: {}", queue);
        Ok(())
    }

    async fn pop(&self, queue: &str, timeout: Duration) -> AnalyticsResult<Option<String>> {
        let handles = self.get_or_create_queue(queue).await;
        let mut receiver = handles.receiver.lock().await;

        match tokio::time::timeout(timeout, receiver.recv()).await {
            Ok(Some(payload)) => Ok(Some(payload)),
            Ok(None) => Err(AnalyticsError::Transport(format!(
                "内存队列 {queue} 已关闭"
            ))),
            // 等待超时
            Err(_) => Ok(None),
        }
    }

    async fn publish(&self, channel: &str, payload: &str) -> AnalyticsResult<()> {
        let channels = self.channels.read().await;
        if let Some(sender) = channels.get(channel) {
            // 没有订阅者时发送会失败，通知本来就是尽力而为
            let _ = sender.send(payload.to_string());
        }
        Ok(())
    }
}
