// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// 惰性 URL 访问器
///
/// 某些提供商 SDK 返回的文件对象并不直接携带 URL，而是暴露一个可调用的访问器
pub type UrlAccessor = Arc<dyn Fn() -> ProviderOutput + Send + Sync>;

/// 提供商原始输出
///
/// 外部推理服务返回的值没有任何形状保证，这里按 JSON 结构建模，
/// 并在对象上额外保留一个可选的 URL 访问器
#[derive(Clone, Default)]
pub enum ProviderOutput {
    /// `null` 或缺失（undefined）
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<ProviderOutput>),
    Object(OutputObject),
}

/// 提供商返回的对象
#[derive(Clone, Default)]
pub struct OutputObject {
    fields: BTreeMap<String, ProviderOutput>,
    url_accessor: Option<UrlAccessor>,
}

impl OutputObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加字段
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<ProviderOutput>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// 设置可调用的 URL 访问器
    pub fn with_url_accessor<F>(mut self, accessor: F) -> Self
    where
        F: Fn() -> ProviderOutput + Send + Sync + 'static,
    {
        self.url_accessor = Some(Arc::new(accessor));
        self
    }

    pub fn get(&self, key: &str) -> Option<&ProviderOutput> {
        self.fields.get(key)
    }

    pub fn url_accessor(&self) -> Option<&UrlAccessor> {
        self.url_accessor.as_ref()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// 没有任何自有字段，也没有访问器
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.url_accessor.is_none()
    }
}

impl ProviderOutput {
    /// 类型名称，用于调试信息
    pub fn type_name(&self) -> &'static str {
        match self {
            ProviderOutput::Null => "null",
            ProviderOutput::Bool(_) => "boolean",
            ProviderOutput::Number(_) => "number",
            ProviderOutput::String(_) => "string",
            ProviderOutput::Array(_) => "array",
            ProviderOutput::Object(_) => "object",
        }
    }

    /// `null` 或空字符串
    pub fn is_blank(&self) -> bool {
        match self {
            ProviderOutput::Null => true,
            ProviderOutput::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_array(&self) -> Option<&[ProviderOutput]> {
        match self {
            ProviderOutput::Array(items) => Some(items),
            _ => None,
        }
    }

    /// 转换回 JSON
    ///
    /// 访问器无法序列化，只以标记字段的形式出现
    pub fn to_json(&self) -> Value {
        match self {
            ProviderOutput::Null => Value::Null,
            ProviderOutput::Bool(b) => Value::Bool(*b),
            ProviderOutput::Number(n) => Value::Number(n.clone()),
            ProviderOutput::String(s) => Value::String(s.clone()),
            ProviderOutput::Array(items) => {
                Value::Array(items.iter().map(ProviderOutput::to_json).collect())
            }
            ProviderOutput::Object(obj) => {
                let mut map: Map<String, Value> = obj
                    .fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                if obj.url_accessor.is_some() {
                    map.insert("$url_accessor".to_string(), Value::Bool(true));
                }
                Value::Object(map)
            }
        }
    }
}

impl From<Value> for ProviderOutput {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ProviderOutput::Null,
            Value::Bool(b) => ProviderOutput::Bool(b),
            Value::Number(n) => ProviderOutput::Number(n),
            Value::String(s) => ProviderOutput::String(s),
            Value::Array(items) => {
                ProviderOutput::Array(items.into_iter().map(ProviderOutput::from).collect())
            }
            Value::Object(map) => ProviderOutput::Object(OutputObject {
                fields: map
                    .into_iter()
                    .map(|(k, v)| (k, ProviderOutput::from(v)))
                    .collect(),
                url_accessor: None,
            }),
        }
    }
}

impl From<Option<Value>> for ProviderOutput {
    fn from(value: Option<Value>) -> Self {
        value.map(ProviderOutput::from).unwrap_or_default()
    }
}

impl From<&str> for ProviderOutput {
    fn from(value: &str) -> Self {
        ProviderOutput::String(value.to_string())
    }
}

impl From<String> for ProviderOutput {
    fn from(value: String) -> Self {
        ProviderOutput::String(value)
    }
}

impl From<OutputObject> for ProviderOutput {
    fn from(value: OutputObject) -> Self {
        ProviderOutput::Object(value)
    }
}

impl From<Vec<ProviderOutput>> for ProviderOutput {
    fn from(value: Vec<ProviderOutput>) -> Self {
        ProviderOutput::Array(value)
    }
}

impl fmt::Debug for ProviderOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl fmt::Debug for OutputObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputObject")
            .field("fields", &self.fields)
            .field("url_accessor", &self.url_accessor.is_some())
            .finish()
    }
}
