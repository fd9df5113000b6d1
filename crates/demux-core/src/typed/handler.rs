//! Handler trait - Event を処理する Handler の定義
//!
//! # 学習ポイント
//! - ジェネリック trait (Handler<E>)
//! - Object-safe trait (DynHandler)
//! - Type erasure パターン (TypedHandler<E, H> → DynHandler)
//! - 戻り値の型消去 (Reply: Box<dyn Any> + シリアライザ)

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::Serialize;

use super::codec::EventCodec;
use super::event::{Event, EventType, Record};
use super::signature::Signature;
use crate::domain::context::Context;
use crate::domain::errors::{DispatchError, HandlerError};
use crate::domain::event::RawEvent;

/// Handler は Event を受け取り、型付きの結果かエラーを返す
///
/// # 使用例
/// ```ignore
/// struct ProxyHandler;
///
/// #[async_trait]
/// impl Handler<ApiGatewayProxyRequest> for ProxyHandler {
///     type Output = ApiGatewayProxyResponse;
///
///     async fn handle(
///         &self,
///         ctx: Context,
///         event: ApiGatewayProxyRequest,
///     ) -> Result<ApiGatewayProxyResponse, HandlerError> {
///         Ok(ApiGatewayProxyResponse::ok(event.path))
///     }
/// }
/// ```
///
/// # ジェネリクスによる型安全性
/// - `Handler<ApiGatewayProxyRequest>` は `ApiGatewayProxyRequest` しか受け取れない
/// - 登録時に Event 型がそのまま registry のキーになる
/// - `Output` は `Record` に限る（プリミティブは返せない）
#[async_trait]
pub trait Handler<E: Event>: Send + Sync {
    type Output: Record + Serialize;

    async fn handle(&self, ctx: Context, event: E) -> Result<Self::Output, HandlerError>;
}

/// クロージャを Handler として使うためのラッパー（`handler_fn` で作る）
pub struct FnHandler<F, E, Fut> {
    f: F,
    _marker: PhantomData<fn(E) -> Fut>,
}

pub fn handler_fn<E, F, Fut, O>(f: F) -> FnHandler<F, E, Fut>
where
    E: Event,
    F: Fn(Context, E) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, HandlerError>> + Send + 'static,
    O: Record + Serialize,
{
    FnHandler {
        f,
        _marker: PhantomData,
    }
}

#[async_trait]
impl<E, F, Fut, O> Handler<E> for FnHandler<F, E, Fut>
where
    E: Event,
    F: Fn(Context, E) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, HandlerError>> + Send + 'static,
    O: Record + Serialize,
{
    type Output = O;

    async fn handle(&self, ctx: Context, event: E) -> Result<O, HandlerError> {
        (self.f)(ctx, event).await
    }
}

/// DynHandler は object-safe な Handler の抽象化
///
/// TypedHandler<E, H> を DynHandler に変換することで、
/// HashMap<EventType, Arc<dyn DynHandler>> に格納可能にします。
///
/// 手書きで実装する場合、`signature()` は registry 構築時に検証されます。
#[async_trait]
pub trait DynHandler: Send + Sync {
    /// この handler の形
    fn signature(&self) -> Signature;

    /// decode してから handler を呼ぶ
    async fn handle_dyn(&self, ctx: Context, event: &RawEvent) -> Result<Reply, DispatchError>;
}

pub struct TypedHandler<E: Event, H: Handler<E>> {
    handler: H,
    codec: EventCodec,
    _marker: PhantomData<fn(E)>,
}

impl<E: Event, H: Handler<E>> TypedHandler<E, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            codec: EventCodec::new(),
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<E: Event, H: Handler<E>> DynHandler for TypedHandler<E, H> {
    fn signature(&self) -> Signature {
        Signature::handler(E::event_type(), EventType::of::<H::Output>())
    }

    async fn handle_dyn(&self, ctx: Context, event: &RawEvent) -> Result<Reply, DispatchError> {
        tracing::trace!(event_type = %E::event_type(), "decoding event");
        let decoded: E = self
            .codec
            .decode(event)
            .map_err(|source| DispatchError::Decode {
                event_type: E::event_type(),
                source,
            })?;

        let output = self
            .handler
            .handle(ctx, decoded)
            .await
            .map_err(DispatchError::Handler)?;
        Ok(Reply::new(output))
    }
}

/// 型消去された handler の戻り値
///
/// 中身は handler が返した値そのもの（変換しない）。
/// 呼び出し側は `downcast` で取り出すか、`to_json` で JSON にする。
pub struct Reply {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
    to_json: fn(&(dyn Any + Send)) -> Result<serde_json::Value, serde_json::Error>,
}

fn encode_as<T: Serialize + 'static>(
    value: &(dyn Any + Send),
) -> Result<serde_json::Value, serde_json::Error> {
    match value.downcast_ref::<T>() {
        Some(value) => serde_json::to_value(value),
        None => Err(serde::ser::Error::custom("reply type mismatch")),
    }
}

impl Reply {
    pub fn new<T: Serialize + Send + 'static>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: std::any::type_name::<T>(),
            to_json: encode_as::<T>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// 型が違う場合は Reply をそのまま返す
    pub fn downcast<T: 'static>(self) -> Result<Box<T>, Self> {
        let Self {
            value,
            type_name,
            to_json,
        } = self;
        value.downcast::<T>().map_err(|value| Self {
            value,
            type_name,
            to_json,
        })
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        (self.to_json)(self.value.as_ref())
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reply")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
