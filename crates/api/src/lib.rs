pub mod error;
pub mod handlers;
pub mod routes;

use std::sync::Arc;

use analytics_core::config::ApiConfig;
use analytics_core::JobQueueService;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};
pub use routes::AppState;

/// 创建API应用
pub fn create_app(queue: Arc<dyn JobQueueService>, config: &ApiConfig) -> Router {
    let state = AppState { queue };
    let mut app = routes::create_routes(state).layer(TraceLayer::new_for_http());

    if config.cors_enabled {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app
}
