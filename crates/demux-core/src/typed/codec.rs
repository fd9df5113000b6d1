//! EventCodec - RawEvent を型付き Event に decode
//!
//! フィールドの対応付けは serde の宣言（`#[serde(rename = "...")]`）で行います。
//! - 未知のフィールドは無視（`deny_unknown_fields` を付けない限り）
//! - 欠けたフィールドは `#[serde(default)]` があれば既定値

use serde_json::Value;
use thiserror::Error;

use super::event::Event;
use crate::domain::event::RawEvent;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("json decode: {0}")]
    Json(#[from] serde_json::Error),
}

/// EventCodec は RawEvent を E にデシリアライズ
///
/// # デシリアライズフロー
/// 1. RawEvent を `&Value` として借用（コピーしない）
/// 2. serde_json で E にデシリアライズ
/// 3. 型の不一致・不正な値は CodecError
#[derive(Debug, Clone, Copy, Default)]
pub struct EventCodec;

impl EventCodec {
    pub fn new() -> Self {
        Self
    }

    pub fn decode<E: Event>(&self, raw: &RawEvent) -> Result<E, CodecError> {
        Ok(<E as serde::Deserialize>::deserialize(raw.as_value())?)
    }

    /// decode の逆方向。テストや CLI でペイロードを組み立てるときに使う
    pub fn encode<T: serde::Serialize>(&self, value: &T) -> Result<RawEvent, CodecError> {
        let value: Value = serde_json::to_value(value)?;
        Ok(RawEvent::from(value))
    }
}
