// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;

use crate::domain::models::error::GenerationError;

/// 提示词最少字符数（去除首尾空白后）
pub const MIN_PROMPT_CHARS: usize = 3;
/// 提示词最多字符数（去除首尾空白后）
pub const MAX_PROMPT_CHARS: usize = 500;

/// 提示词校验失败的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptViolation {
    /// 缺失或为空
    Missing,
    /// 过短
    TooShort,
    /// 过长
    TooLong,
}

impl PromptViolation {
    pub fn code(&self) -> &'static str {
        match self {
            PromptViolation::Missing => "prompt_required",
            PromptViolation::TooShort => "prompt_too_short",
            PromptViolation::TooLong => "prompt_too_long",
        }
    }

    pub fn message(&self) -> String {
        match self {
            PromptViolation::Missing => "Prompt is required and must be a string.".to_string(),
            PromptViolation::TooShort => format!(
                "Prompt must be at least {} characters long.",
                MIN_PROMPT_CHARS
            ),
            PromptViolation::TooLong => format!(
                "Prompt must not exceed {} characters.",
                MAX_PROMPT_CHARS
            ),
        }
    }
}

/// 校验提示词长度
///
/// 长度按字符（而非字节）计算，且在去除首尾空白之后计算
pub fn check_prompt(prompt: &str) -> Result<&str, PromptViolation> {
    let trimmed = prompt.trim();
    let chars = trimmed.chars().count();
    if chars == 0 {
        return Err(PromptViolation::Missing);
    }
    if chars < MIN_PROMPT_CHARS {
        return Err(PromptViolation::TooShort);
    }
    if chars > MAX_PROMPT_CHARS {
        return Err(PromptViolation::TooLong);
    }
    Ok(trimmed)
}

/// 图像生成请求
///
/// 只能通过 [`GenerationRequest::new`] 构造，保证提示词已经过校验
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    prompt: String,
    steps: Option<u32>,
    model_hint: Option<String>,
}

impl GenerationRequest {
    /// 创建新的生成请求
    ///
    /// # 参数
    ///
    /// * `prompt` - 原始提示词，会被去除首尾空白
    /// * `steps` - 推理步数，必须为正整数
    /// * `model_hint` - 优先尝试的模型标识
    ///
    /// # 返回值
    ///
    /// * `Ok(GenerationRequest)` - 校验通过的请求
    /// * `Err(GenerationError::Validation)` - 提示词或步数不合法
    pub fn new(
        prompt: &str,
        steps: Option<u32>,
        model_hint: Option<String>,
    ) -> Result<Self, GenerationError> {
        let prompt = check_prompt(prompt).map_err(|v| GenerationError::Validation(v.message()))?;

        if steps == Some(0) {
            return Err(GenerationError::Validation(
                "Steps must be a positive integer.".to_string(),
            ));
        }

        let model_hint = model_hint
            .map(|hint| hint.trim().to_string())
            .filter(|hint| !hint.is_empty());

        Ok(Self {
            prompt: prompt.to_string(),
            steps,
            model_hint,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn steps(&self) -> Option<u32> {
        self.steps
    }

    pub fn model_hint(&self) -> Option<&str> {
        self.model_hint.as_deref()
    }
}
