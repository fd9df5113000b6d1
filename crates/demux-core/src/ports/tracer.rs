//! Tracer port - decode + invoke を名前付き span で包む
//!
//! Tracer は制御フローを変えないデコレータです。
//! - body は必ずちょうど 1 回実行する
//! - 成功・失敗に関係なく span を閉じる
//! - body の結果をそのまま返す

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::domain::errors::DispatchError;
use crate::typed::handler::Reply;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// decode + invoke の本体
pub type DispatchBody<'a> = BoxFuture<'a, Result<Reply, DispatchError>>;

#[async_trait]
pub trait Tracer: Send + Sync {
    async fn with_span<'a>(
        &self,
        name: String,
        body: DispatchBody<'a>,
    ) -> Result<Reply, DispatchError>;
}
