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

use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use config::builder::DefaultState;
use serde::Deserialize;

use crate::domain::models::model_profile::ModelProfile;
use crate::domain::services::generation_service::DEFAULT_PROMPT_SUFFIX;

/// 提供商令牌的常用环境变量名
pub const TOKEN_ENV_VAR: &str = "REPLICATE_API_TOKEN";

/// 应用程序配置设置
///
/// 包含服务器、提供商、生成和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 提供商配置
    pub provider: ProviderSettings,
    /// 生成配置
    pub generation: GenerationSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
    /// 日志配置
    pub logging: LoggingSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 提供商配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    /// API 令牌，缺省时读取 `REPLICATE_API_TOKEN`
    pub api_token: Option<String>,
    /// API 基础地址
    pub base_url: String,
    /// 预测未完成时的轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 单个 HTTP 请求的超时时间（秒），缺省不限制
    pub request_timeout_secs: Option<u64>,
    /// 单次生成请求的总耗时预算（秒），缺省不限制
    pub max_wall_clock_secs: Option<u64>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: "https://api.replicate.com".to_string(),
            poll_interval_ms: 1000,
            request_timeout_secs: None,
            max_wall_clock_secs: None,
        }
    }
}

/// 生成配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationSettings {
    /// 追加到提示词末尾的修饰语，空字符串表示不增强
    pub prompt_suffix: String,
    /// 回退链中的模型，按尝试顺序排列
    #[serde(default)]
    pub models: Vec<ModelProfile>,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出地址
    pub address: String,
}

/// 日志配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// 是否输出 JSON 格式日志
    pub json: bool,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 加载顺序：内置默认值 → `config/default` → `config/{APP_ENVIRONMENT}` →
    /// 以 `IMAGEGATE__` 为前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("IMAGEGATE").separator("__"));

        let settings: Settings = builder.build()?.try_deserialize()?;
        Ok(settings.finalize(std::env::var(TOKEN_ENV_VAR).ok()))
    }

    /// 内置默认值
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let provider = ProviderSettings::default();
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("provider.base_url", provider.base_url)?
            .set_default("provider.poll_interval_ms", provider.poll_interval_ms)?
            .set_default("generation.prompt_suffix", DEFAULT_PROMPT_SUFFIX)?
            .set_default("metrics.enabled", false)?
            .set_default("metrics.address", "0.0.0.0:9000")?
            .set_default("logging.json", false)
    }

    /// 补全加载后的配置
    ///
    /// 空令牌视为未配置；未配置令牌时使用 `fallback_token`；未配置模型时使用默认回退链
    pub fn finalize(mut self, fallback_token: Option<String>) -> Self {
        let non_blank = |token: Option<String>| token.filter(|t| !t.trim().is_empty());
        self.provider.api_token =
            non_blank(self.provider.api_token.take()).or_else(|| non_blank(fallback_token));

        if self.generation.models.is_empty() {
            self.generation.models = ModelProfile::default_chain();
        }
        self
    }
}
