// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心数据结构，包括：
/// - 错误（error）：生成过程中可能出现的错误
/// - 生成请求（generation）：经过校验的提示词和参数
/// - 模型配置（model_profile）：回退链中每个模型的输入参数
/// - 提供商输出（provider_output）：提供商返回的任意形状数据
pub mod error;
pub mod generation;
pub mod model_profile;
pub mod provider_output;
