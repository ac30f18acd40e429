// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum_test::TestServer;
use imagegate::domain::models::model_profile::ModelProfile;
use imagegate::domain::models::provider_output::ProviderOutput;
use imagegate::domain::services::generation_service::GenerationService;
use imagegate::presentation::routes;
use imagegate::providers::traits::{ImageProvider, ProviderError};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// 按顺序回放预设结果的提供商，并记录每次调用
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<ProviderOutput, ProviderError>>>,
    calls: Mutex<Vec<(String, Value)>>,
    credential: bool,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<ProviderOutput, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
            credential: true,
        })
    }

    pub fn without_credential() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            credential: false,
        })
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageProvider for ScriptedProvider {
    async fn run(&self, model: &str, input: &Value) -> Result<ProviderOutput, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), input.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(ProviderOutput::Null))
    }

    fn has_credential(&self) -> bool {
        self.credential
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn test_models() -> Vec<ModelProfile> {
    vec![
        ModelProfile::new("stability-ai/sdxl:7762fd07").with_display_name("Stable Diffusion XL"),
        ModelProfile::new("qwen/qwen-image").with_display_name("Qwen Image AI"),
    ]
}

pub fn create_test_server(provider: Arc<ScriptedProvider>) -> TestServer {
    let service = GenerationService::new(provider, test_models(), "", None)
        .expect("Failed to create generation service");
    TestServer::new(routes::routes(Arc::new(service))).expect("Failed to create test server")
}
