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

use imagegate::config::settings::Settings;
use imagegate::domain::services::generation_service::GenerationService;
use imagegate::infrastructure::metrics;
use imagegate::presentation::routes;
use imagegate::providers::replicate::ReplicateProvider;
use imagegate::providers::traits::ImageProvider;
use imagegate::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Arc::new(Settings::new()?);

    // 2. Initialize logging
    telemetry::init_telemetry(settings.logging.json);
    info!("Starting imagegate...");

    // Initialize Prometheus Metrics
    metrics::init_metrics(&settings.metrics);

    // 3. Initialize provider
    let provider = Arc::new(ReplicateProvider::new(&settings.provider)?);
    if !provider.has_credential() {
        // Requests will be answered with 500 until a token is configured
        warn!("No provider API token configured");
    }

    // 4. Initialize generation service
    let service = Arc::new(GenerationService::from_settings(&settings, provider)?);
    let model_ids: Vec<&str> = service.models().iter().map(|m| m.id.as_str()).collect();
    info!("Model fallback chain: {:?}", model_ids);

    // 5. Start HTTP server
    let app = routes::routes(service);
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
