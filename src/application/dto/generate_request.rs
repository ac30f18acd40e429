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

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::models::error::GenerationError;
use crate::domain::models::generation::{check_prompt, GenerationRequest};

/// 图像生成请求数据传输对象
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct GenerateRequestDto {
    /// 提示词
    #[validate(
        required(message = "Prompt is required and must be a string."),
        custom(function = "validate_prompt")
    )]
    pub prompt: Option<String>,
    /// 推理步数
    #[validate(range(min = 1, message = "Steps must be a positive integer."))]
    pub steps: Option<u32>,
    /// 优先尝试的模型
    pub model: Option<String>,
}

fn validate_prompt(prompt: &str) -> Result<(), ValidationError> {
    check_prompt(prompt).map(|_| ()).map_err(|violation| {
        ValidationError::new(violation.code()).with_message(Cow::Owned(violation.message()))
    })
}

impl GenerateRequestDto {
    /// 从原始请求体解析
    ///
    /// 空请求体视为 `{}`，非 JSON 或字段类型错误均按校验错误处理
    pub fn from_body(body: &[u8]) -> Result<Self, GenerationError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(body)
            .map_err(|e| GenerationError::Validation(format!("Invalid request body: {}", e)))
    }

    /// 校验并转换为领域请求
    pub fn into_request(self) -> Result<GenerationRequest, GenerationError> {
        self.validate()
            .map_err(|errors| GenerationError::Validation(first_message(&errors)))?;

        let prompt = self.prompt.unwrap_or_default();
        GenerationRequest::new(&prompt, self.steps, self.model)
    }
}

// Prompt errors are reported ahead of any other field.
fn first_message(errors: &ValidationErrors) -> String {
    let fields = errors.field_errors();
    ["prompt", "steps"]
        .iter()
        .filter_map(|field| fields.get(*field))
        .chain(fields.values())
        .flat_map(|errs| errs.iter())
        .map(|err| {
            err.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string())
        })
        .next()
        .unwrap_or_else(|| "Invalid request".to_string())
}
