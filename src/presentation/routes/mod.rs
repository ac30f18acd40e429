// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::generation_service::GenerationService;
use crate::presentation::handlers::generate_handler;
use crate::presentation::middleware::cors_middleware::cors_middleware;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 图像生成端点路径
pub const GENERATE_PATH: &str = "/api/generate";

/// 创建应用路由
///
/// # 参数
///
/// * `service` - 图像生成服务
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(service: Arc<GenerationService>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let generate_routes = Router::new()
        .route(
            GENERATE_PATH,
            post(generate_handler::generate)
                .options(generate_handler::preflight)
                .fallback(generate_handler::method_not_allowed),
        )
        .layer(axum::middleware::from_fn(cors_middleware))
        .layer(Extension(service));

    Router::new()
        .merge(public_routes)
        .merge(generate_routes)
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
