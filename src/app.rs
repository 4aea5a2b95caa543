use std::sync::Arc;
use std::time::Duration;

use analytics_api::create_app;
use analytics_core::config::QueueBackend;
use analytics_core::{AppConfig, CacheStore, JobQueueService, QueueTransport, ResultStore};
use analytics_dispatcher::{HandlerRegistry, JobProcessor};
use analytics_handlers::builtin_handlers;
use analytics_infrastructure::{
    InMemoryCacheStore, InMemoryQueueTransport, InMemoryResultStore, JobQueueClient,
    RedisCacheStore, RedisConnectionManager, RedisQueueTransport, RedisResultStore,
};
use anyhow::{Context, Result};
use tokio::{net::TcpListener, sync::broadcast};
use tracing::{error, info};

/// 应用运行模式
#[derive(Debug, Clone)]
pub enum AppMode {
    /// 仅运行任务处理器
    Processor,
    /// 仅运行API服务器
    Api,
    /// 运行所有组件
    All,
}

/// 主应用程序
///
/// 所有组件显式构造、显式注入，生命周期由start/stop驱动，不依赖全局单例。
pub struct Application {
    config: AppConfig,
    mode: AppMode,
    queue: Arc<dyn JobQueueService>,
    cache: Arc<dyn CacheStore>,
}

impl Application {
    /// 创建新的应用实例
    pub async fn new(config: AppConfig, mode: AppMode) -> Result<Self> {
        info!("初始化应用程序，模式: {:?}", mode);

        let (transport, store, cache) = create_backend(&config).await?;

        let queue: Arc<dyn JobQueueService> = Arc::new(
            JobQueueClient::new(transport, store)
                .with_key_prefix(config.result_store.key_prefix.clone())
                .with_result_ttl(Duration::from_secs(config.result_store.ttl_hours * 3600)),
        );

        Ok(Self {
            config,
            mode,
            queue,
            cache,
        })
    }

    /// 运行应用程序
    pub async fn run(&self, shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        info!("启动应用程序，模式: {:?}", self.mode);

        match self.mode {
            AppMode::Processor => self.run_processor(shutdown_rx).await?,
            AppMode::Api => self.run_api(shutdown_rx).await?,
            AppMode::All => self.run_all_components(shutdown_rx).await?,
        }

        Ok(())
    }

    /// 运行任务处理器模式
    async fn run_processor(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        info!("启动任务处理器");

        // 启动时一次性注册全部内置处理器
        let mut registry = HandlerRegistry::new();
        for (kind, handler) in builtin_handlers(Arc::clone(&self.cache)) {
            registry.register(kind, handler);
        }

        let processor = JobProcessor::new(
            Arc::clone(&self.queue),
            Arc::new(registry),
            &self.config.processor,
        );
        processor.start().await?;

        // 等待关闭信号
        let _ = shutdown_rx.recv().await;
        info!("任务处理器收到关闭信号");

        // 协作式停止，等待所有消费循环退出
        processor.stop().await?;

        info!("任务处理器已停止");
        Ok(())
    }

    /// 运行API模式
    async fn run_api(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        info!("启动API服务器: {}", self.config.api.bind_address);

        let app = create_app(Arc::clone(&self.queue), &self.config.api);

        let listener = TcpListener::bind(&self.config.api.bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {}", self.config.api.bind_address))?;

        info!("API服务器启动在 http://{}", self.config.api.bind_address);

        let server_handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app.into_make_service()).await {
                error!("API服务器运行失败: {}", e);
            }
        });

        // 等待关闭信号
        let _ = shutdown_rx.recv().await;
        info!("API服务器收到关闭信号");

        server_handle.abort();

        info!("API服务器已停止");
        Ok(())
    }

    /// 运行所有组件
    async fn run_all_components(&self, shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        info!("启动所有组件");

        let mut handles = Vec::new();

        if self.config.processor.enabled {
            let app = self.clone_for_mode(AppMode::Processor);
            let shutdown_rx = shutdown_rx.resubscribe();

            handles.push(tokio::spawn(async move {
                if let Err(e) = app.run_processor(shutdown_rx).await {
                    error!("任务处理器运行失败: {}", e);
                }
            }));
        }

        if self.config.api.enabled {
            let app = self.clone_for_mode(AppMode::Api);
            let shutdown_rx = shutdown_rx.resubscribe();

            handles.push(tokio::spawn(async move {
                if let Err(e) = app.run_api(shutdown_rx).await {
                    error!("API服务器运行失败: {}", e);
                }
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }

        info!("所有组件已停止");
        Ok(())
    }

    /// 为特定模式克隆应用实例
    fn clone_for_mode(&self, mode: AppMode) -> Self {
        Self {
            config: self.config.clone(),
            mode,
            queue: Arc::clone(&self.queue),
            cache: Arc::clone(&self.cache),
        }
    }
}

/// 按配置创建传输、结果存储和缓存后端
async fn create_backend(
    config: &AppConfig,
) -> Result<(
    Arc<dyn QueueTransport>,
    Arc<dyn ResultStore>,
    Arc<dyn CacheStore>,
)> {
    match config.message_queue.backend {
        QueueBackend::Redis => {
            let url = config
                .message_queue
                .redis_url()
                .context("缺少Redis连接配置")?;
            let timeout =
                Duration::from_secs(config.message_queue.connection_timeout_seconds);

            let connection = Arc::new(
                RedisConnectionManager::connect(&url, timeout)
                    .await
                    .context("连接Redis失败")?,
            );

            Ok((
                Arc::new(RedisQueueTransport::new(Arc::clone(&connection))),
                Arc::new(RedisResultStore::new(Arc::clone(&connection))),
                Arc::new(RedisCacheStore::new(
                    connection,
                    config.cache.key_prefix.clone(),
                )),
            ))
        }
        QueueBackend::Memory => {
            info!("使用内存队列后端（嵌入式模式）");
            Ok((
                Arc::new(InMemoryQueueTransport::new()),
                Arc::new(InMemoryResultStore::new()),
                Arc::new(InMemoryCacheStore::new()),
            ))
        }
    }
}
