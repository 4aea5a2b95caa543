use std::collections::HashMap;
use std::sync::Arc;

use analytics_core::{JobHandler, JobKind};
use tracing::info;

/// 任务处理器注册表
///
/// kind到处理器的静态映射，启动时填充一次，之后只读。
/// 取代按字符串晚绑定的动态分发。
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<JobKind, Arc<dyn JobHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// 注册处理器，同kind重复注册时后者覆盖前者
    pub fn register(&mut self, kind: JobKind, handler: Arc<dyn JobHandler>) {
        info!("注册任务处理器: {} -> {}", kind, handler.name());
        self.handlers.insert(kind, handler);
    }

    pub fn get(&self, kind: JobKind) -> Option<Arc<dyn JobHandler>> {
        self.handlers.get(&kind).map(Arc::clone)
    }

    /// 已注册的任务类型
    pub fn kinds(&self) -> Vec<JobKind> {
        self.handlers.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
