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

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::models::provider_output::ProviderOutput;

/// 提供商错误类型
#[derive(Error, Debug)]
pub enum ProviderError {
    /// 请求失败
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// 提供商返回非成功状态码
    #[error("Provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    /// 预测任务失败或被取消
    #[error("Prediction failed: {0}")]
    PredictionFailed(String),
    /// 模型标识格式错误
    #[error("Invalid model identifier: {0}")]
    InvalidModel(String),
    /// 未配置 API 令牌
    #[error("Provider API token not configured")]
    MissingCredential,
    /// 客户端配置错误
    #[error("Invalid provider configuration: {0}")]
    Configuration(String),
}

/// 图像生成提供商特质
///
/// 调用方只关心"用某个模型和某组输入跑一次，拿回原始输出"，
/// 输出形状的解读交给归一化器
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// 运行一次模型推理
    ///
    /// # 参数
    ///
    /// * `model` - 模型标识
    /// * `input` - 模型输入参数
    ///
    /// # 返回值
    ///
    /// * `Ok(ProviderOutput)` - 未经解读的原始输出
    /// * `Err(ProviderError)` - 调用失败
    async fn run(&self, model: &str, input: &Value) -> Result<ProviderOutput, ProviderError>;

    /// 是否已配置凭据
    fn has_credential(&self) -> bool;

    /// 提供商名称
    fn name(&self) -> &'static str;
}
