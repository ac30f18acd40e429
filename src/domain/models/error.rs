// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::Value;
use thiserror::Error;

use crate::domain::services::normalizer::ExtractionFailure;

/// 图像生成错误
///
/// 每个变体对应一种处理方式：校验错误在本地返回 400，其余均为 500
#[derive(Error, Debug)]
pub enum GenerationError {
    /// 请求参数不合法，不会触达提供商
    #[error("{0}")]
    Validation(String),

    /// 服务配置缺失（如 API 令牌）
    #[error("{0}")]
    Config(String),

    /// 提供商调用本身失败
    #[error("Provider API error: {message}")]
    Provider {
        message: String,
        model: String,
        attempts: usize,
        tried: Vec<String>,
    },

    /// 收到响应但无法提取图像 URL
    #[error("{failure}")]
    Extraction {
        failure: ExtractionFailure,
        debug: Value,
    },

    /// 超出运维配置的总耗时预算
    #[error("Image generation exceeded the {0}s time budget")]
    Timeout(u64),
}

impl GenerationError {
    /// 用于日志和指标标签
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Validation(_) => "validation",
            GenerationError::Config(_) => "config",
            GenerationError::Provider { .. } => "provider",
            GenerationError::Extraction { failure, .. } => failure.as_str(),
            GenerationError::Timeout(_) => "timeout",
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, GenerationError::Validation(_))
    }
}
