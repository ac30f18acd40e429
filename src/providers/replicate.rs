// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::settings::ProviderSettings;
use crate::domain::models::provider_output::ProviderOutput;
use crate::providers::traits::{ImageProvider, ProviderError};

/// 解析后的模型标识
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub owner: String,
    pub name: String,
    pub version: Option<String>,
}

impl ModelRef {
    /// 解析 `owner/name` 或 `owner/name:version`
    pub fn parse(id: &str) -> Result<Self, ProviderError> {
        let (path, version) = match id.split_once(':') {
            Some((path, version)) if !version.is_empty() => (path, Some(version.to_string())),
            Some(_) => return Err(ProviderError::InvalidModel(id.to_string())),
            None => (id, None),
        };

        match path.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                    version,
                })
            }
            _ => Err(ProviderError::InvalidModel(id.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    get: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: PredictionStatus,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    urls: Option<PredictionUrls>,
}

impl Prediction {
    fn error_message(&self) -> String {
        match &self.error {
            Some(Value::String(message)) => message.clone(),
            Some(Value::Null) | None => format!("prediction {} ended as {:?}", self.id, self.status),
            Some(other) => other.to_string(),
        }
    }
}

/// Replicate 提供商
///
/// 基于 Replicate HTTP 预测接口实现：创建预测时请求同步等待，
/// 若返回时仍未结束则按固定间隔轮询，直到进入终止状态
pub struct ReplicateProvider {
    client: reqwest::Client,
    api_token: Option<String>,
    base_url: String,
    poll_interval: Duration,
}

impl ReplicateProvider {
    /// 根据配置创建提供商
    ///
    /// 未配置 `request_timeout_secs` 时不设置客户端超时，沿用提供商自身的超时行为
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| ProviderError::Configuration(format!("base_url: {}", e)))?;

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("imagegate/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            api_token: settings.api_token.clone(),
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            poll_interval: Duration::from_millis(settings.poll_interval_ms.max(1)),
        })
    }

    fn auth_headers(&self) -> Result<HeaderMap, ProviderError> {
        let token = self
            .api_token
            .as_deref()
            .ok_or(ProviderError::MissingCredential)?;

        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| ProviderError::Configuration(format!("api_token: {}", e)))?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    async fn create_prediction(
        &self,
        model: &ModelRef,
        input: &Value,
    ) -> Result<Prediction, ProviderError> {
        let (url, body) = match &model.version {
            Some(version) => (
                format!("{}/v1/predictions", self.base_url),
                json!({ "version": version, "input": input }),
            ),
            None => (
                format!(
                    "{}/v1/models/{}/{}/predictions",
                    self.base_url, model.owner, model.name
                ),
                json!({ "input": input }),
            ),
        };

        debug!("Creating prediction at {}", url);
        let response = self
            .client
            .post(url)
            .headers(self.auth_headers()?)
            .header("Prefer", "wait")
            .json(&body)
            .send()
            .await?;

        Self::read_prediction(response).await
    }

    async fn fetch_prediction(&self, prediction: &Prediction) -> Result<Prediction, ProviderError> {
        let url = prediction
            .urls
            .as_ref()
            .and_then(|urls| urls.get.clone())
            .unwrap_or_else(|| format!("{}/v1/predictions/{}", self.base_url, prediction.id));

        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .send()
            .await?;

        Self::read_prediction(response).await
    }

    async fn read_prediction(response: reqwest::Response) -> Result<Prediction, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Prediction>().await?)
    }
}

#[async_trait]
impl ImageProvider for ReplicateProvider {
    async fn run(&self, model: &str, input: &Value) -> Result<ProviderOutput, ProviderError> {
        let model_ref = ModelRef::parse(model)?;
        let start = Instant::now();

        let mut prediction = self.create_prediction(&model_ref, input).await?;
        loop {
            match prediction.status {
                PredictionStatus::Succeeded => {
                    info!(
                        "Prediction {} for {} succeeded in {:?}",
                        prediction.id,
                        model,
                        start.elapsed()
                    );
                    return Ok(ProviderOutput::from(prediction.output.take()));
                }
                PredictionStatus::Failed | PredictionStatus::Canceled => {
                    warn!(
                        "Prediction {} for {} ended as {:?}",
                        prediction.id, model, prediction.status
                    );
                    return Err(ProviderError::PredictionFailed(prediction.error_message()));
                }
                PredictionStatus::Starting
                | PredictionStatus::Processing
                | PredictionStatus::Unknown => {
                    debug!(
                        "Prediction {} is {:?}, polling again in {:?}",
                        prediction.id, prediction.status, self.poll_interval
                    );
                    tokio::time::sleep(self.poll_interval).await;
                    prediction = self.fetch_prediction(&prediction).await?;
                }
            }
        }
    }

    fn has_credential(&self) -> bool {
        self.api_token.is_some()
    }

    fn name(&self) -> &'static str {
        "replicate"
    }
}
