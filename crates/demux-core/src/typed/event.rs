//! Event / Record trait と EventType - 型付きレコードと型タグ
//!
//! # 学習ポイント
//! - `TypeId` を使った型の同一性（値ではなく型から作るキー）
//! - probe は空のインスタンスではなく `EventType` を直接返す
//! - マーカー trait (`Record`) で「構造化レコードだけ」を型レベルで保証する
//! - Trait bounds の組み合わせ (Record + DeserializeOwned + Sync)

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::DeserializeOwned;

/// Record は handler の入出力になれる構造化レコード
///
/// `EventType` は Record からしか作れないので、handler の引数・戻り値が
/// プリミティブ（`String`, `usize`, `serde_json::Value` など）になることはない。
/// std の型には crate の外から実装できない（orphan rule）。
///
/// # 使用例
/// ```ignore
/// #[derive(Serialize)]
/// struct ApiGatewayProxyResponse {
///     status_code: u16,
///     body: String,
/// }
///
/// impl Record for ApiGatewayProxyResponse {}
/// ```
///
/// Record でない戻り値の handler は登録できない:
/// ```compile_fail
/// use demux_core::typed::Record;
/// use demux_core::{Context, DemuxConfig, Event, HandlerError};
///
/// #[derive(serde::Deserialize)]
/// struct Ping {}
/// impl Record for Ping {}
/// impl Event for Ping {}
///
/// let _ = DemuxConfig::new().handler_fn(|_ctx: Context, _event: Ping| async move {
///     Ok::<usize, HandlerError>(1)
/// });
/// ```
pub trait Record: Send + 'static {}

/// Event は demux が decode できる Record
///
/// # 使用例
/// ```ignore
/// #[derive(Deserialize)]
/// struct ApiGatewayProxyRequest {
///     path: String,
///     #[serde(rename = "httpMethod")]
///     http_method: String,
/// }
///
/// impl Record for ApiGatewayProxyRequest {}
/// impl Event for ApiGatewayProxyRequest {}
/// ```
///
/// # Trait Bounds
/// - `Record`: 構造化レコードであること（`Send + 'static` を含む）
/// - `DeserializeOwned`: RawEvent からの decode のため
/// - `Sync`: 複数の dispatch から安全に使えるため
pub trait Event: Record + DeserializeOwned + Sync {
    fn event_type() -> EventType {
        EventType::of::<Self>()
    }
}

/// EventType は registry のキーになる Record の型タグ
///
/// 等価性・ハッシュは `TypeId` だけで決まり、名前は表示用です。
#[derive(Clone, Copy)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
}

impl EventType {
    pub fn of<T: Record>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// `std::any::type_name` のフルパス
    pub fn full_name(&self) -> &'static str {
        self.name
    }

    /// 末尾 2 セグメント（`module::Type`）。ジェネリクス部分はそのまま残す。
    pub fn short_name(&self) -> &'static str {
        let base_end = self.name.find('<').unwrap_or(self.name.len());
        let base = &self.name[..base_end];
        let start = base
            .rmatch_indices("::")
            .nth(1)
            .map(|(idx, _)| idx + 2)
            .unwrap_or(0);
        &self.name[start..]
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventType").field(&self.name).finish()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
