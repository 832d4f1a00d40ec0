//! 表单提取
//!
//! 同时接受 urlencoded、multipart 和 JSON 三种提交方式，其他类型视为空表单。

use std::collections::HashMap;

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde_json::{Map, Value};

use crate::models::parse_url_list;

/// 表单字段的值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// 普通文本
    Text(String),
    /// JSON 字符串数组，每一项都是完整的值
    List(Vec<String>),
}

/// 提交的表单字段
#[derive(Debug, Default, Clone)]
pub struct SubmittedForm(pub HashMap<String, FieldValue>);

impl SubmittedForm {
    /// 文本字段
    pub fn get(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(FieldValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// URL 列表字段
    ///
    /// 文本按换行/逗号拆分；数组逐项去除空白并丢弃空项，不再拆分。
    pub fn url_list(&self, name: &str) -> Vec<String> {
        match self.0.get(name) {
            Some(FieldValue::Text(text)) => parse_url_list(text),
            Some(FieldValue::List(items)) => items
                .iter()
                .map(|item| item.trim())
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        }
    }

    fn from_text(fields: HashMap<String, String>) -> Self {
        Self(
            fields
                .into_iter()
                .map(|(name, value)| (name, FieldValue::Text(value)))
                .collect(),
        )
    }
}

impl<S> FromRequest<S> for SubmittedForm
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            let mut fields = HashMap::new();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(IntoResponse::into_response)?
            {
                let Some(name) = field.name().map(str::to_string) else {
                    continue;
                };
                let value = field.text().await.map_err(IntoResponse::into_response)?;
                fields.insert(name, value);
            }
            return Ok(Self::from_text(fields));
        }

        if content_type.starts_with("application/json") {
            let Json(object) = Json::<Map<String, Value>>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(Self(
                object
                    .into_iter()
                    .filter_map(|(name, value)| json_field(value).map(|v| (name, v)))
                    .collect(),
            ));
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(Self::from_text(fields));
        }

        // 没有或无法识别的类型：与未提交字段一样处理
        Ok(Self::default())
    }
}

/// 字符串保留为文本；字符串数组保留为列表，非字符串项被忽略
fn json_field(value: Value) -> Option<FieldValue> {
    match value {
        Value::String(s) => Some(FieldValue::Text(s)),
        Value::Array(items) => Some(FieldValue::List(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        )),
        _ => None,
    }
}
