pub mod handlers;

pub use handlers::*;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;

/// 上传文件大小上限
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/compare", post(compare))
        .route("/api/result", get(result_view))
        .route("/api/result.csv", get(export_csv))
        .route("/api/sheets", post(list_sheets))
        .layer(ServiceBuilder::new().layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)))
        .with_state(state)
}
