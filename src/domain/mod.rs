// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：生成请求、模型配置、提供商输出和错误类型
/// - 服务（services）：响应归一化、模型回退链和生成编排
///
/// 领域层只依赖 `ImageProvider` 抽象，不关心具体的提供商实现。
pub mod models;
pub mod services;
