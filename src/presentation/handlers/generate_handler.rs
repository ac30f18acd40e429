// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    body::Bytes,
    extract::Extension,
    http::{Method, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::dto::{
    generate_request::GenerateRequestDto, generate_response::GenerateResponseDto,
};
use crate::domain::services::generation_service::GenerationService;
use crate::presentation::errors::AppError;

/// 图像生成端点
///
/// 请求体校验失败时直接返回 400，不会调用提供商
#[tracing::instrument(name = "generate", skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn generate(
    Extension(service): Extension<Arc<GenerationService>>,
    body: Bytes,
) -> Result<Json<GenerateResponseDto>, AppError> {
    debug!("Received {} byte request body", body.len());

    let request = GenerateRequestDto::from_body(&body)
        .and_then(GenerateRequestDto::into_request)
        .map_err(|e| {
            warn!("Rejected request: {}", e);
            e
        })?;

    let outcome = service.generate(&request).await?;
    info!(
        "Generated image with {} after {} attempt(s) in {:?}",
        outcome.model_id, outcome.attempts, outcome.elapsed
    );

    Ok(Json(GenerateResponseDto::from_outcome(
        outcome,
        Utc::now().timestamp_millis(),
    )))
}

/// 跨域预检
///
/// 返回 200 且不带响应体，跨域头由中间件统一添加
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// 不支持的请求方法
pub async fn method_not_allowed(method: Method) -> impl IntoResponse {
    debug!("Method {} not allowed", method);
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}
