// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::models::generation::GenerationRequest;

/// 模型配置
///
/// 回退链中的一环：模型标识加上构造该模型输入参数所需的默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    /// 提供商模型标识，`owner/name` 或 `owner/name:version`
    pub id: String,
    /// 返回给调用方的模型名称
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_dimension")]
    pub width: u32,
    #[serde(default = "default_dimension")]
    pub height: u32,
    #[serde(default = "default_guidance_scale")]
    pub guidance_scale: f64,
    /// 请求未指定步数时使用
    #[serde(default = "default_steps")]
    pub default_steps: u32,
    /// 步数上限，请求中的步数会被截断到此值
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
    #[serde(default = "default_num_outputs")]
    pub num_outputs: u32,
    /// 原样合并进输入参数的额外字段
    #[serde(default)]
    pub extra_input: Map<String, Value>,
}

fn default_dimension() -> u32 {
    1024
}

fn default_guidance_scale() -> f64 {
    7.5
}

fn default_steps() -> u32 {
    25
}

fn default_max_steps() -> u32 {
    50
}

fn default_num_outputs() -> u32 {
    1
}

impl ModelProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            width: default_dimension(),
            height: default_dimension(),
            guidance_scale: default_guidance_scale(),
            default_steps: default_steps(),
            max_steps: default_max_steps(),
            num_outputs: default_num_outputs(),
            extra_input: Map::new(),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// 返回展示名称，未配置时退回模型标识（不含版本）
    pub fn display_name(&self) -> &str {
        match &self.display_name {
            Some(name) => name.as_str(),
            None => self.id.split(':').next().unwrap_or(&self.id),
        }
    }

    /// 实际使用的推理步数
    pub fn effective_steps(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.default_steps).min(self.max_steps)
    }

    /// 构造该模型的输入参数
    ///
    /// 每次调用都基于不可变的请求重新生成，模型之间互不影响
    pub fn build_input(&self, request: &GenerationRequest, prompt: &str) -> Value {
        let mut input = json!({
            "prompt": prompt,
            "num_inference_steps": self.effective_steps(request.steps()),
            "guidance_scale": self.guidance_scale,
            "width": self.width,
            "height": self.height,
            "num_outputs": self.num_outputs,
        });

        if let Some(map) = input.as_object_mut() {
            for (key, value) in &self.extra_input {
                map.insert(key.clone(), value.clone());
            }
        }

        input
    }

    /// 默认回退链：先尝试 SDXL，失败后尝试 Qwen Image
    pub fn default_chain() -> Vec<ModelProfile> {
        let mut sdxl = ModelProfile::new(
            "stability-ai/sdxl:7762fd07cf82c948538e41f63f77d685e02b063e37e496e96eefd46c929f9bdc",
        )
        .with_display_name("Stable Diffusion XL");
        sdxl.extra_input
            .insert("apply_watermark".to_string(), Value::Bool(false));

        let mut qwen = ModelProfile::new("qwen/qwen-image").with_display_name("Qwen Image AI");
        qwen.default_steps = 50;

        vec![sdxl, qwen]
    }
}
