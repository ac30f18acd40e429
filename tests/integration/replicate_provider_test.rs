// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use imagegate::config::settings::ProviderSettings;
use imagegate::domain::models::provider_output::ProviderOutput;
use imagegate::domain::services::normalizer::normalize;
use imagegate::providers::replicate::ReplicateProvider;
use imagegate::providers::traits::{ImageProvider, ProviderError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> ReplicateProvider {
    let settings = ProviderSettings {
        api_token: Some("r8_test".to_string()),
        base_url: server.uri(),
        poll_interval_ms: 5,
        ..ProviderSettings::default()
    };
    ReplicateProvider::new(&settings).expect("Failed to create provider")
}

/// 测试指定版本的模型走 /v1/predictions
#[tokio::test]
async fn test_versioned_model_uses_predictions_endpoint() {
    let server = MockServer::start().await;
    let input = json!({ "prompt": "a cat", "num_inference_steps": 25 });

    Mock::given(method("POST"))
        .and(path("/v1/predictions"))
        .and(header("authorization", "Bearer r8_test"))
        .and(header("prefer", "wait"))
        .and(body_json(json!({ "version": "7762fd07", "input": input })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "p1",
            "status": "succeeded",
            "output": ["https://replicate.delivery/p1/out-0.png"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = provider_for(&server)
        .run("stability-ai/sdxl:7762fd07", &input)
        .await
        .expect("prediction should succeed");

    assert_eq!(
        normalize(&output),
        Ok("https://replicate.delivery/p1/out-0.png".to_string())
    );
}

/// 测试官方模型走 /v1/models/{owner}/{name}/predictions
#[tokio::test]
async fn test_official_model_uses_model_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/models/qwen/qwen-image/predictions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "p2",
            "status": "succeeded",
            "output": "https://replicate.delivery/p2/out.webp"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = provider_for(&server)
        .run("qwen/qwen-image", &json!({ "prompt": "a cat" }))
        .await
        .unwrap();

    assert_eq!(
        normalize(&output),
        Ok("https://replicate.delivery/p2/out.webp".to_string())
    );
}

/// 测试未完成的预测会被轮询
#[tokio::test]
async fn test_pending_prediction_is_polled() {
    let server = MockServer::start().await;
    let poll_url = format!("{}/v1/predictions/p3", server.uri());

    Mock::given(method("POST"))
        .and(path("/v1/models/qwen/qwen-image/predictions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "p3",
            "status": "processing",
            "urls": { "get": poll_url }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/predictions/p3"))
        .and(header("authorization", "Bearer r8_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p3",
            "status": "succeeded",
            "output": [{ "url": "https://replicate.delivery/p3/out.png" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = provider_for(&server)
        .run("qwen/qwen-image", &json!({ "prompt": "a cat" }))
        .await
        .unwrap();

    assert_eq!(
        normalize(&output),
        Ok("https://replicate.delivery/p3/out.png".to_string())
    );
}

/// 测试预测失败
#[tokio::test]
async fn test_failed_prediction_reports_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/predictions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "p4",
            "status": "failed",
            "error": "NSFW content detected"
        })))
        .mount(&server)
        .await;

    let result = provider_for(&server)
        .run("stability-ai/sdxl:7762fd07", &json!({ "prompt": "a cat" }))
        .await;

    match result {
        Err(ProviderError::PredictionFailed(message)) => {
            assert_eq!(message, "NSFW content detected")
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

/// 测试非成功状态码
#[tokio::test]
async fn test_http_error_is_reported_with_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/predictions"))
        .respond_with(
            ResponseTemplate::new(402).set_body_string("{\"detail\":\"Insufficient credit\"}"),
        )
        .mount(&server)
        .await;

    let result = provider_for(&server)
        .run("stability-ai/sdxl:7762fd07", &json!({ "prompt": "a cat" }))
        .await;

    match result {
        Err(ProviderError::Api { status, body }) => {
            assert_eq!(status, 402);
            assert!(body.contains("Insufficient credit"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

/// 测试缺失输出字段时视为 null
#[tokio::test]
async fn test_missing_output_is_null() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/predictions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "p5",
            "status": "succeeded"
        })))
        .mount(&server)
        .await;

    let output = provider_for(&server)
        .run("stability-ai/sdxl:7762fd07", &json!({ "prompt": "a cat" }))
        .await
        .unwrap();

    assert!(matches!(output, ProviderOutput::Null));
}

/// 测试未配置令牌时不发出请求
#[tokio::test]
async fn test_missing_token_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let settings = ProviderSettings {
        api_token: None,
        base_url: server.uri(),
        ..ProviderSettings::default()
    };
    let provider = ReplicateProvider::new(&settings).unwrap();

    let result = provider
        .run("stability-ai/sdxl:7762fd07", &json!({ "prompt": "a cat" }))
        .await;
    assert!(matches!(result, Err(ProviderError::MissingCredential)));
}

/// 测试非法模型标识
#[tokio::test]
async fn test_invalid_model_identifier() {
    let server = MockServer::start().await;
    let result = provider_for(&server)
        .run("not-a-model", &json!({ "prompt": "a cat" }))
        .await;
    assert!(matches!(result, Err(ProviderError::InvalidModel(_))));
}
