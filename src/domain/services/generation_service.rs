// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::config::settings::Settings;
use crate::domain::models::error::GenerationError;
use crate::domain::models::generation::GenerationRequest;
use crate::domain::models::model_profile::ModelProfile;
use crate::domain::services::fallback_chain::{AttemptFailure, ChainFailure, FallbackChain};
use crate::providers::traits::ImageProvider;

/// 默认追加到提示词末尾的修饰语
pub const DEFAULT_PROMPT_SUFFIX: &str =
    ", high quality desktop wallpaper, detailed, cinematic lighting, vibrant colors";

/// 一次成功生成的结果
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub url: String,
    pub model_id: String,
    pub display_name: String,
    pub enhanced_prompt: String,
    pub attempts: usize,
    pub elapsed: Duration,
}

/// 图像生成服务
///
/// 负责单次请求的编排：凭据检查、提示词增强、可选的总耗时预算、执行回退链
pub struct GenerationService {
    chain: FallbackChain,
    prompt_suffix: String,
    max_wall_clock: Option<Duration>,
}

impl GenerationService {
    /// 创建新的生成服务
    ///
    /// # 错误
    ///
    /// 模型列表为空时返回 `GenerationError::Config`
    pub fn new(
        provider: Arc<dyn ImageProvider>,
        models: Vec<ModelProfile>,
        prompt_suffix: impl Into<String>,
        max_wall_clock: Option<Duration>,
    ) -> Result<Self, GenerationError> {
        if models.is_empty() {
            return Err(GenerationError::Config(
                "At least one image model must be configured".to_string(),
            ));
        }

        Ok(Self {
            chain: FallbackChain::new(provider, models),
            prompt_suffix: prompt_suffix.into(),
            max_wall_clock,
        })
    }

    /// 根据应用配置创建服务
    pub fn from_settings(
        settings: &Settings,
        provider: Arc<dyn ImageProvider>,
    ) -> Result<Self, GenerationError> {
        Self::new(
            provider,
            settings.generation.models.clone(),
            settings.generation.prompt_suffix.clone(),
            settings
                .provider
                .max_wall_clock_secs
                .map(Duration::from_secs),
        )
    }

    pub fn models(&self) -> &[ModelProfile] {
        self.chain.models()
    }

    /// 增强提示词
    pub fn enhance_prompt(&self, prompt: &str) -> String {
        format!("{}{}", prompt, self.prompt_suffix)
    }

    /// 生成图像
    ///
    /// # 参数
    ///
    /// * `request` - 已校验的生成请求
    ///
    /// # 返回值
    ///
    /// * `Ok(GenerationOutcome)` - 图像 URL 及所用模型
    /// * `Err(GenerationError)` - 配置、提供商、提取或超时错误
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        let start = Instant::now();
        let result = self.run(request, start).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::counter!("imagegate_generations_total", "outcome" => outcome).increment(1);
        metrics::histogram!("imagegate_generation_duration_seconds")
            .record(start.elapsed().as_secs_f64());

        result
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        start: Instant,
    ) -> Result<GenerationOutcome, GenerationError> {
        if !self.chain.provider().has_credential() {
            error!(
                "No API token configured for provider {}",
                self.chain.provider().name()
            );
            return Err(GenerationError::Config(
                "Replicate API token not configured".to_string(),
            ));
        }

        let enhanced_prompt = self.enhance_prompt(request.prompt());
        info!(
            "Generating image ({} chars, steps {:?}) with {} configured models",
            request.prompt().chars().count(),
            request.steps(),
            self.chain.models().len()
        );

        let run = self.chain.run(request, &enhanced_prompt);
        let result = match self.max_wall_clock {
            Some(budget) => match tokio::time::timeout(budget, run).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("Generation exceeded the {:?} budget", budget);
                    return Err(GenerationError::Timeout(budget.as_secs()));
                }
            },
            None => run.await,
        };

        match result {
            Ok(success) => Ok(GenerationOutcome {
                url: success.url,
                model_id: success.model.id.clone(),
                display_name: success.model.display_name().to_string(),
                enhanced_prompt,
                attempts: success.attempts,
                elapsed: start.elapsed(),
            }),
            Err(failure) => Err(Self::into_error(failure)),
        }
    }

    fn into_error(failure: ChainFailure) -> GenerationError {
        let ChainFailure {
            last,
            attempts,
            tried,
        } = failure;

        warn!("All {} model attempts failed: {:?}", attempts, tried);
        match last {
            AttemptFailure::Provider(e) => GenerationError::Provider {
                message: e.to_string(),
                model: tried.last().cloned().unwrap_or_default(),
                attempts,
                tried,
            },
            AttemptFailure::Extraction { failure, mut debug } => {
                if let Some(map) = debug.as_object_mut() {
                    map.insert("reason".to_string(), failure.as_str().into());
                    map.insert("attempts".to_string(), attempts.into());
                    map.insert("models_tried".to_string(), tried.into());
                }
                GenerationError::Extraction { failure, debug }
            }
        }
    }
}
