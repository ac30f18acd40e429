// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

use crate::domain::services::generation_service::GenerationOutcome;

/// 图像生成响应数据传输对象
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GenerateResponseDto {
    /// 生成的图像地址
    pub image_url: String,
    /// 模型展示名称
    pub model: String,
    /// 模型标识
    pub model_id: String,
    /// 生成完成时刻（Unix 毫秒时间戳）
    pub generation_time: i64,
    /// 实际发送给模型的提示词
    pub enhanced_prompt: String,
    /// 尝试的模型数量
    pub attempts: usize,
}

impl GenerateResponseDto {
    pub fn from_outcome(outcome: GenerationOutcome, generation_time: i64) -> Self {
        Self {
            image_url: outcome.url,
            model: outcome.display_name,
            model_id: outcome.model_id,
            generation_time,
            enhanced_prompt: outcome.enhanced_prompt,
            attempts: outcome.attempts,
        }
    }
}
