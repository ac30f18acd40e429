// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 图像生成提供商模块
///
/// - 接口（traits）：`ImageProvider` 抽象及其错误类型
/// - Replicate（replicate）：基于 Replicate 预测 API 的实现
pub mod replicate;
pub mod traits;
