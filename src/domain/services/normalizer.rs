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

//! 提供商响应归一化
//!
//! 外部图像生成服务在不同版本中以多种形状返回同一结果：
//! 纯字符串、字符串数组、带 `url` 字段的对象、带可调用 URL 访问器的对象、
//! 嵌套数组，以及表示额度耗尽的 `[{}]`。
//! 本模块按固定的优先级依次检查这些形状，将其归一为一个图像 URL 或一个分类错误。

use serde::Serialize;
use serde_json::{json, Value};
use std::borrow::Cow;
use thiserror::Error;

use crate::domain::models::provider_output::{OutputObject, ProviderOutput};

/// 对象上可能携带 URL 的属性，按探测顺序排列
const URL_PROPERTIES: [&str; 4] = ["url", "image_url", "imageUrl", "image"];

/// 提取失败的分类
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionFailure {
    /// 找到了 URL 字段，但其值为空
    #[error("Provider returned an empty image URL")]
    EmptyOutput,
    /// 无法识别的响应形状
    #[error("No valid image URL in response")]
    UnrecognizedShape,
    /// 提供商返回 `[{}]`，通常意味着账户额度耗尽
    #[error("Provider returned an empty result; account credit may be exhausted")]
    QuotaExhausted,
    /// 提取到的值不是绝对 URL
    #[error("Provider returned a value that is not an absolute image URL")]
    InvalidUrl,
}

impl ExtractionFailure {
    /// 用于日志和指标标签
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionFailure::EmptyOutput => "empty_output",
            ExtractionFailure::UnrecognizedShape => "unrecognized_shape",
            ExtractionFailure::QuotaExhausted => "quota_exhausted",
            ExtractionFailure::InvalidUrl => "invalid_url",
        }
    }
}

/// 归一化结果
pub type ExtractionResult = Result<String, ExtractionFailure>;

/// 单次探测的结果
enum Probe<'a> {
    Found(Cow<'a, ProviderOutput>),
    Empty,
    Missing,
}

/// 将提供商输出归一为图像 URL
///
/// # 检查顺序
///
/// 1. `[{}]` 额度耗尽哨兵（最高优先级）
/// 2. 直接字符串
/// 3. 首元素为字符串的数组
/// 4. 首元素为对象的数组：访问器 → `url` → `image_url`/`imageUrl` → `image`
/// 5. 首元素为非空数组且其首元素为字符串（解包一层）
/// 6. 直接对象，探测顺序同 4
/// 7. 以上均不匹配时返回 [`ExtractionFailure::UnrecognizedShape`]
///
/// 候选值最终必须以 `http://` 或 `https://` 开头
pub fn normalize(output: &ProviderOutput) -> ExtractionResult {
    if is_quota_sentinel(output) {
        return Err(ExtractionFailure::QuotaExhausted);
    }

    match extract_candidate(output) {
        Probe::Found(candidate) => into_url(&candidate),
        Probe::Empty => Err(ExtractionFailure::EmptyOutput),
        Probe::Missing => Err(ExtractionFailure::UnrecognizedShape),
    }
}

fn is_quota_sentinel(output: &ProviderOutput) -> bool {
    match output.as_array() {
        Some([ProviderOutput::Object(obj)]) => obj.is_empty(),
        _ => false,
    }
}

fn extract_candidate(output: &ProviderOutput) -> Probe<'_> {
    match output {
        ProviderOutput::String(_) => Probe::Found(Cow::Borrowed(output)),
        ProviderOutput::Array(items) => match items.first() {
            Some(first @ ProviderOutput::String(_)) => Probe::Found(Cow::Borrowed(first)),
            Some(ProviderOutput::Object(obj)) => probe_object(obj),
            Some(ProviderOutput::Array(inner)) => match inner.first() {
                Some(nested @ ProviderOutput::String(_)) => Probe::Found(Cow::Borrowed(nested)),
                _ => Probe::Missing,
            },
            _ => Probe::Missing,
        },
        ProviderOutput::Object(obj) => probe_object(obj),
        _ => Probe::Missing,
    }
}

fn probe_object(obj: &OutputObject) -> Probe<'_> {
    // The accessor wins over every plain property, even when it yields nothing.
    if let Some(accessor) = obj.url_accessor() {
        let value = accessor();
        return if value.is_blank() {
            Probe::Empty
        } else {
            Probe::Found(Cow::Owned(value))
        };
    }

    let mut saw_property = false;
    for key in URL_PROPERTIES {
        match obj.get(key) {
            Some(value) if !value.is_blank() => return Probe::Found(Cow::Borrowed(value)),
            Some(_) => saw_property = true,
            None => {}
        }
    }

    if saw_property {
        Probe::Empty
    } else {
        Probe::Missing
    }
}

fn into_url(candidate: &ProviderOutput) -> ExtractionResult {
    let text = match candidate {
        ProviderOutput::String(s) => s.as_str(),
        // URL objects stringify through their href
        ProviderOutput::Object(obj) => match obj.get("href") {
            Some(ProviderOutput::String(href)) => href.as_str(),
            _ => return Err(ExtractionFailure::InvalidUrl),
        },
        _ => return Err(ExtractionFailure::InvalidUrl),
    };

    if is_absolute_http_url(text) {
        Ok(text.to_string())
    } else {
        Err(ExtractionFailure::InvalidUrl)
    }
}

fn is_absolute_http_url(candidate: &str) -> bool {
    candidate.starts_with("http://") || candidate.starts_with("https://")
}

/// 生成描述输出形状的调试信息
///
/// 随提取失败一起返回给调用方，便于排查提供商响应格式的变化
pub fn describe_shape(output: &ProviderOutput, model_id: &str) -> Value {
    let (is_array, array_length, first_element_type) = match output.as_array() {
        Some(items) => (
            true,
            json!(items.len()),
            items
                .first()
                .map(|first| json!(first.type_name()))
                .unwrap_or_else(|| json!("N/A")),
        ),
        None => (false, json!("N/A"), json!("N/A")),
    };

    json!({
        "output_type": output.type_name(),
        "output": output.to_json(),
        "model_used": model_id,
        "is_array": is_array,
        "array_length": array_length,
        "first_element_type": first_element_type,
    })
}
