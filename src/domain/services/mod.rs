// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 回退链（fallback_chain）：按顺序尝试模型，直到得到可用的图像 URL
/// - 生成服务（generation_service）：凭据检查、提示词增强和总耗时预算
/// - 归一化（normalizer）：从各种形状的提供商输出中提取图像 URL
pub mod fallback_chain;
pub mod generation_service;
pub mod normalizer;
