// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::domain::models::generation::GenerationRequest;
use crate::domain::models::model_profile::ModelProfile;
use crate::domain::services::normalizer::{describe_shape, normalize, ExtractionFailure};
use crate::providers::traits::{ImageProvider, ProviderError};

/// 单次尝试的失败原因
#[derive(Debug)]
pub enum AttemptFailure {
    /// 提供商调用失败
    Provider(ProviderError),
    /// 响应无法归一化
    Extraction {
        failure: ExtractionFailure,
        debug: Value,
    },
}

impl AttemptFailure {
    fn label(&self) -> &'static str {
        match self {
            AttemptFailure::Provider(_) => "provider_error",
            AttemptFailure::Extraction { failure, .. } => failure.as_str(),
        }
    }
}

/// 回退链成功结果
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSuccess {
    pub url: String,
    pub model: ModelProfile,
    /// 包括成功那一次在内的尝试次数
    pub attempts: usize,
}

/// 回退链失败结果：最后一次失败，附带尝试次数和已尝试的模型
#[derive(Debug)]
pub struct ChainFailure {
    pub last: AttemptFailure,
    pub attempts: usize,
    pub tried: Vec<String>,
}

/// 模型回退链
///
/// 按顺序依次调用各模型（严格串行，绝不并发），返回第一个成功的结果。
/// 每个模型每次请求最多尝试一次，失败不会重试，也不会影响下一个模型的输入。
pub struct FallbackChain {
    provider: Arc<dyn ImageProvider>,
    models: Vec<ModelProfile>,
}

impl FallbackChain {
    pub fn new(provider: Arc<dyn ImageProvider>, models: Vec<ModelProfile>) -> Self {
        Self { provider, models }
    }

    pub fn models(&self) -> &[ModelProfile] {
        &self.models
    }

    pub fn provider(&self) -> &Arc<dyn ImageProvider> {
        &self.provider
    }

    /// 计算本次请求的尝试顺序
    ///
    /// 指定的模型被提到最前，其余保持配置顺序；重复的模型标识只保留第一个
    pub fn attempt_order(&self, hint: Option<&str>) -> Vec<&ModelProfile> {
        let hinted = hint.and_then(|hint| self.models.iter().find(|m| m.id == hint));
        if let Some(hint) = hint {
            if hinted.is_none() {
                warn!("Model hint {} is not configured, using default order", hint);
            }
        }

        let mut seen = HashSet::new();
        hinted
            .into_iter()
            .chain(self.models.iter())
            .filter(|model| seen.insert(model.id.clone()))
            .collect()
    }

    /// 执行回退链
    ///
    /// # 参数
    ///
    /// * `request` - 已校验的生成请求
    /// * `prompt` - 实际发送给模型的提示词（可能已增强）
    ///
    /// # 返回值
    ///
    /// * `Ok(ChainSuccess)` - 第一个成功的模型及其 URL
    /// * `Err(ChainFailure)` - 全部失败时的最后一次失败
    pub async fn run(
        &self,
        request: &GenerationRequest,
        prompt: &str,
    ) -> Result<ChainSuccess, ChainFailure> {
        let order = self.attempt_order(request.model_hint());
        let mut tried: Vec<String> = Vec::with_capacity(order.len());
        let mut last = None;

        for model in order {
            tried.push(model.id.clone());
            let attempt = tried.len();
            let input = model.build_input(request, prompt);

            info!("Attempt {} using model {}", attempt, model.id);
            let started = Instant::now();
            let outcome = match self.provider.run(&model.id, &input).await {
                Ok(output) => normalize(&output).map_err(|failure| {
                    warn!(
                        "Model {} returned an unusable {} output: {}",
                        model.id,
                        output.type_name(),
                        failure
                    );
                    AttemptFailure::Extraction {
                        failure,
                        debug: describe_shape(&output, &model.id),
                    }
                }),
                Err(e) => {
                    warn!("Model {} call failed: {}", model.id, e);
                    Err(AttemptFailure::Provider(e))
                }
            };

            let label = match &outcome {
                Ok(_) => "success",
                Err(failure) => failure.label(),
            };
            metrics::counter!(
                "imagegate_provider_attempts_total",
                "model" => model.id.clone(),
                "outcome" => label
            )
            .increment(1);

            match outcome {
                Ok(url) => {
                    info!(
                        "Model {} produced an image in {:?}",
                        model.id,
                        started.elapsed()
                    );
                    return Ok(ChainSuccess {
                        url,
                        model: model.clone(),
                        attempts: attempt,
                    });
                }
                Err(failure) => last = Some(failure),
            }
        }

        let attempts = tried.len();
        Err(ChainFailure {
            last: last.unwrap_or_else(|| {
                AttemptFailure::Provider(ProviderError::Configuration(
                    "no models configured".to_string(),
                ))
            }),
            attempts,
            tried,
        })
    }
}
