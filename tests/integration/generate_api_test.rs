// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::http::{HeaderName, Method, StatusCode};
use imagegate::domain::models::provider_output::ProviderOutput;
use imagegate::providers::traits::ProviderError;
use serde_json::{json, Value};

use super::helpers::{create_test_server, ScriptedProvider};

fn assert_cors_headers(response: &axum_test::TestResponse) {
    let headers = response.headers();
    let get = |name: &str| {
        headers
            .get(HeaderName::from_bytes(name.as_bytes()).unwrap())
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    assert_eq!(get("access-control-allow-origin").as_deref(), Some("*"));
    assert_eq!(
        get("access-control-allow-methods").as_deref(),
        Some("POST, OPTIONS")
    );
    assert_eq!(
        get("access-control-allow-headers").as_deref(),
        Some("Content-Type")
    );
}

/// 测试正常生成流程
#[tokio::test]
async fn test_generate_returns_image_url() {
    let provider = ScriptedProvider::new(vec![Ok(ProviderOutput::from(json!([
        "https://cdn.example/x.webp"
    ])))]);
    let server = create_test_server(provider.clone());

    let response = server
        .post("/api/generate")
        .json(&json!({ "prompt": "a cat on a beach" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_cors_headers(&response);
    let body: Value = response.json();
    assert_eq!(body["image_url"], "https://cdn.example/x.webp");
    assert_eq!(body["model"], "Stable Diffusion XL");
    assert_eq!(body["model_id"], "stability-ai/sdxl:7762fd07");
    assert_eq!(body["attempts"], 1);
    assert!(body["generation_time"].as_i64().unwrap() > 0);

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1["prompt"], "a cat on a beach");
}

/// 测试过短的提示词不会调用提供商
#[tokio::test]
async fn test_short_prompt_is_rejected_without_provider_call() {
    let provider = ScriptedProvider::new(vec![]);
    let server = create_test_server(provider.clone());

    let response = server
        .post("/api/generate")
        .json(&json!({ "prompt": "hi" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_cors_headers(&response);
    let body: Value = response.json();
    assert_eq!(body["error"], "Prompt must be at least 3 characters long.");
    assert!(provider.calls().is_empty());
}

/// 测试提示词长度边界
#[tokio::test]
async fn test_prompt_length_boundaries() {
    let cases = [
        ("ab".to_string(), StatusCode::BAD_REQUEST),
        ("abc".to_string(), StatusCode::OK),
        ("a".repeat(500), StatusCode::OK),
        ("a".repeat(501), StatusCode::BAD_REQUEST),
    ];

    for (prompt, expected) in cases {
        let provider = ScriptedProvider::new(vec![Ok(ProviderOutput::from(
            "https://cdn.example/ok.png",
        ))]);
        let server = create_test_server(provider);

        let response = server
            .post("/api/generate")
            .json(&json!({ "prompt": prompt }))
            .await;

        assert_eq!(response.status_code(), expected, "prompt length {}", prompt.len());
    }
}

/// 测试缺失或类型错误的提示词
#[tokio::test]
async fn test_missing_or_malformed_prompt() {
    let server = create_test_server(ScriptedProvider::new(vec![]));

    let response = server.post("/api/generate").json(&json!({ "steps": 20 })).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Prompt is required and must be a string.");

    let response = server.post("/api/generate").json(&json!({ "prompt": 42 })).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server.post("/api/generate").text("not json").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

/// 测试预检请求
#[tokio::test]
async fn test_preflight_returns_empty_ok() {
    let server = create_test_server(ScriptedProvider::new(vec![]));

    let response = server.method(Method::OPTIONS, "/api/generate").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.as_bytes().is_empty());
    assert_cors_headers(&response);
}

/// 测试不支持的方法
#[tokio::test]
async fn test_other_methods_are_not_allowed() {
    let server = create_test_server(ScriptedProvider::new(vec![]));

    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let response = server.method(method.clone(), "/api/generate").await;
        assert_eq!(
            response.status_code(),
            StatusCode::METHOD_NOT_ALLOWED,
            "{}",
            method
        );
        assert_cors_headers(&response);
        let body: Value = response.json();
        assert_eq!(body["error"], "Method not allowed");
    }
}

/// 测试未配置令牌
#[tokio::test]
async fn test_missing_credential_is_server_error() {
    let provider = ScriptedProvider::without_credential();
    let server = create_test_server(provider.clone());

    let response = server
        .post("/api/generate")
        .json(&json!({ "prompt": "a cat on a beach" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Replicate API token not configured");
    assert!(provider.calls().is_empty());
}

/// 测试回退到第二个模型
#[tokio::test]
async fn test_fallback_to_second_model() {
    let provider = ScriptedProvider::new(vec![
        Ok(ProviderOutput::from(json!([{}]))),
        Ok(ProviderOutput::from(json!([{ "url": "https://cdn.example/qwen.png" }]))),
    ]);
    let server = create_test_server(provider.clone());

    let response = server
        .post("/api/generate")
        .json(&json!({ "prompt": "a cat on a beach", "steps": 30 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["image_url"], "https://cdn.example/qwen.png");
    assert_eq!(body["model_id"], "qwen/qwen-image");
    assert_eq!(body["attempts"], 2);

    let calls = provider.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, "stability-ai/sdxl:7762fd07");
    assert_eq!(calls[1].0, "qwen/qwen-image");
    assert_eq!(calls[1].1["num_inference_steps"], 30);
}

/// 测试模型提示
#[tokio::test]
async fn test_model_hint_is_tried_first() {
    let provider = ScriptedProvider::new(vec![Ok(ProviderOutput::from(
        "https://cdn.example/qwen.png",
    ))]);
    let server = create_test_server(provider.clone());

    let response = server
        .post("/api/generate")
        .json(&json!({ "prompt": "a cat on a beach", "model": "qwen/qwen-image" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(provider.calls()[0].0, "qwen/qwen-image");
}

/// 测试无法识别的响应形状返回调试信息
#[tokio::test]
async fn test_unrecognized_output_returns_debug_payload() {
    let provider = ScriptedProvider::new(vec![
        Ok(ProviderOutput::from(json!({ "status": "done" }))),
        Ok(ProviderOutput::from(json!(42))),
    ]);
    let server = create_test_server(provider);

    let response = server
        .post("/api/generate")
        .json(&json!({ "prompt": "a cat on a beach" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors_headers(&response);
    let body: Value = response.json();
    assert_eq!(body["error"], "No valid image URL in response");
    assert_eq!(body["debug"]["reason"], "unrecognized_shape");
    assert_eq!(body["debug"]["output_type"], "number");
    assert_eq!(body["debug"]["model_used"], "qwen/qwen-image");
    assert_eq!(body["debug"]["attempts"], 2);
}

/// 测试提供商调用失败
#[tokio::test]
async fn test_provider_failure_surfaces_message() {
    let provider = ScriptedProvider::new(vec![
        Err(ProviderError::Api {
            status: 402,
            body: "Insufficient credit".to_string(),
        }),
        Err(ProviderError::PredictionFailed("CUDA out of memory".to_string())),
    ]);
    let server = create_test_server(provider);

    let response = server
        .post("/api/generate")
        .json(&json!({ "prompt": "a cat on a beach" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("CUDA out of memory"), "{}", error);
    assert!(body.get("debug").is_none());
}

/// 测试健康检查和版本端点
#[tokio::test]
async fn test_health_and_version() {
    let server = create_test_server(ScriptedProvider::new(vec![]));

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "OK");

    let response = server.get("/v1/version").await;
    assert_eq!(response.text(), env!("CARGO_PKG_VERSION"));
}
