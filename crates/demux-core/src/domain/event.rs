//! RawEvent / EventContext - 型の決まっていない入力ペイロード
//!
//! # 役割
//! - **RawEvent**: ホストランタイムから渡される JSON object（形は静的に不明）
//! - **EventContext**: probe に渡す読み取り専用ビュー（event + resourceContext）
//!
//! `null` や object 以外のペイロードは空の object として扱います。

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// EventContext::resource_context() が参照するキー
pub const RESOURCE_CONTEXT_KEY: &str = "resourceContext";

static EMPTY_RECORD: LazyLock<Map<String, Value>> = LazyLock::new(Map::new);

/// 1 回の呼び出しで受け取る生ペイロード。
///
/// 中身は常に JSON object です。`Value::Null`（ペイロードなし）や配列・文字列などは
/// 空の object に正規化されます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct RawEvent(Value);

impl RawEvent {
    /// 空の object
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// top-level のフィールド
    pub fn fields(&self) -> &Map<String, Value> {
        self.0.as_object().unwrap_or(&EMPTY_RECORD)
    }

    /// decode 用に JSON 値として借用
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

impl Default for RawEvent {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Value> for RawEvent {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(_) => Self(value),
            _ => Self::empty(),
        }
    }
}

impl From<Map<String, Value>> for RawEvent {
    fn from(map: Map<String, Value>) -> Self {
        Self(Value::Object(map))
    }
}

impl From<Option<Value>> for RawEvent {
    fn from(value: Option<Value>) -> Self {
        value.map(Self::from).unwrap_or_default()
    }
}

impl From<RawEvent> for Value {
    fn from(event: RawEvent) -> Self {
        event.0
    }
}

/// probe に渡される読み取り専用ビュー。
///
/// `identify` 1 回につき 1 つだけ作られ、全 probe に同じ参照が渡されます。
#[derive(Debug, Clone, Copy)]
pub struct EventContext<'a> {
    event: &'a Map<String, Value>,
    resource_context: &'a Map<String, Value>,
}

impl<'a> EventContext<'a> {
    pub fn new(event: &'a RawEvent) -> Self {
        let fields = event.fields();
        let resource_context = fields
            .get(RESOURCE_CONTEXT_KEY)
            .and_then(Value::as_object)
            .unwrap_or(&EMPTY_RECORD);
        Self {
            event: fields,
            resource_context,
        }
    }

    pub fn event(&self) -> &'a Map<String, Value> {
        self.event
    }

    /// `resourceContext` の object。存在しない・object でない場合は空。
    pub fn resource_context(&self) -> &'a Map<String, Value> {
        self.resource_context
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        has_attribute(self.event, name)
    }

    pub fn string_attribute(&self, name: &str) -> Option<&'a str> {
        string_attribute(self.event, name)
    }

    pub fn string_attribute_matches(&self, name: &str, value: &str) -> bool {
        string_attribute_matches(self.event, name, value)
    }

    pub fn resource_string_attribute(&self, name: &str) -> Option<&'a str> {
        string_attribute(self.resource_context, name)
    }
}

/// キーが存在するか（値が `null` でも true）
pub fn has_attribute(record: &Map<String, Value>, name: &str) -> bool {
    record.contains_key(name)
}

/// 値が JSON 文字列のときだけ返す
pub fn string_attribute<'a>(record: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    record.get(name).and_then(Value::as_str)
}

pub fn string_attribute_matches(record: &Map<String, Value>, name: &str, value: &str) -> bool {
    string_attribute(record, name) == Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mock_event() -> RawEvent {
        RawEvent::from(json!({
            "abc": "def",
            "something": true,
            "somethingElse": 5,
            "nullValue": null,
        }))
    }

    #[test]
    fn has_attribute_works() {
        let event = mock_event();
        assert!(has_attribute(event.fields(), "abc"));
        assert!(has_attribute(event.fields(), "nullValue"));
        assert!(!has_attribute(event.fields(), "def"));
    }

    #[test]
    fn string_attribute_only_returns_strings() {
        let event = mock_event();
        assert_eq!(string_attribute(event.fields(), "abc"), Some("def"));
        assert_eq!(string_attribute(event.fields(), "something"), None);
        assert_eq!(string_attribute(event.fields(), "missingAttr"), None);
    }

    #[test]
    fn string_attribute_matches_works() {
        let event = mock_event();
        assert!(string_attribute_matches(event.fields(), "abc", "def"));
        assert!(!string_attribute_matches(event.fields(), "abc", "xxxf"));
        assert!(!string_attribute_matches(event.fields(), "something", "true"));
    }

    #[test]
    fn non_object_payloads_become_empty() {
        assert!(RawEvent::from(Value::Null).is_empty());
        assert!(RawEvent::from(json!([1, 2, 3])).is_empty());
        assert!(RawEvent::from(json!("hello")).is_empty());
        assert!(RawEvent::from(None).is_empty());
        assert_eq!(RawEvent::from(Value::Null).as_value(), &json!({}));
    }

    #[test]
    fn deserializes_through_normalization() {
        let event: RawEvent = serde_json::from_str("null").unwrap();
        assert!(event.is_empty());

        let event: RawEvent = serde_json::from_str(r#"{"path": "/foo"}"#).unwrap();
        assert_eq!(string_attribute(event.fields(), "path"), Some("/foo"));
    }

    #[test]
    fn context_extracts_resource_context() {
        let event = RawEvent::from(json!({
            "resourceContext": { "connectionId": "abc123" },
        }));
        let ctx = EventContext::new(&event);
        assert_eq!(ctx.resource_string_attribute("connectionId"), Some("abc123"));
        assert!(ctx.has_attribute(RESOURCE_CONTEXT_KEY));
    }

    #[test]
    fn context_substitutes_empty_resource_context() {
        let missing = RawEvent::from(json!({ "abc": "def" }));
        assert!(EventContext::new(&missing).resource_context().is_empty());

        let wrong_shape = RawEvent::from(json!({ "resourceContext": "nope" }));
        let ctx = EventContext::new(&wrong_shape);
        assert!(ctx.resource_context().is_empty());
        assert_eq!(ctx.string_attribute("resourceContext"), Some("nope"));
    }
}
