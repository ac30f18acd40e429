// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::domain::models::error::GenerationError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_message = self.0.to_string();

        let (status, debug) = match self.0.downcast_ref::<GenerationError>() {
            Some(GenerationError::Validation(_)) => (StatusCode::BAD_REQUEST, None),
            Some(GenerationError::Extraction { debug, .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Some(debug.clone()))
            }
            Some(_) | None => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };

        if status.is_server_error() {
            error!("Request failed: {:#}", self.0);
        }

        let body = match debug {
            Some(debug) => json!({ "error": error_message, "debug": debug }),
            None => json!({ "error": error_message }),
        };
        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
