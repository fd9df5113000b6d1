//! DemuxConfig - demux の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 開発体験の改善（明確なエラーメッセージ）

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;

use super::demux::Demux;
use crate::domain::context::Context;
use crate::domain::errors::{ConfigError, HandlerError};
use crate::ports::Tracer;
use crate::typed::handler::{DynHandler, Handler, handler_fn};
use crate::typed::probe::TypeProbe;
use crate::typed::registry::erase;
use crate::typed::{Event, Record};

/// DemuxConfig は probe と handler を集めて Demux を構築
///
/// # 使用例
/// ```ignore
/// let demux = DemuxConfig::new()
///     .probe(probe::when::<ApiGatewayProxyRequest>(|ctx| ctx.has_attribute("httpMethod")))
///     .handler::<ApiGatewayProxyRequest, _>(ProxyHandler)
///     .tracer(SpanTracer)
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - 登録時にはエラーを返さず、build() でまとめて検証する
/// - probe が空 → `ConfigError::NoProbes`
/// - handler が空 → `ConfigError::NoHandlers`
/// - handler の形が不正・二重登録 → registry 構築のエラー
#[derive(Default)]
pub struct DemuxConfig {
    pub(crate) probes: Vec<TypeProbe>,
    pub(crate) handlers: Vec<Arc<dyn DynHandler>>,
    pub(crate) tracer: Option<Arc<dyn Tracer>>,
}

impl DemuxConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// probe を追加（登録順に評価される）
    pub fn probe(mut self, probe: TypeProbe) -> Self {
        self.probes.push(probe);
        self
    }

    pub fn probes(mut self, probes: impl IntoIterator<Item = TypeProbe>) -> Self {
        self.probes.extend(probes);
        self
    }

    /// Handler を登録
    ///
    /// # Example
    /// ```ignore
    /// config.handler::<ApiGatewayProxyRequest, _>(ProxyHandler);
    /// ```
    pub fn handler<E: Event, H: Handler<E> + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(erase::<E, H>(handler));
        self
    }

    /// クロージャを Handler として登録
    pub fn handler_fn<E, F, Fut, O>(self, f: F) -> Self
    where
        E: Event,
        F: Fn(Context, E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, HandlerError>> + Send + 'static,
        O: Record + Serialize,
    {
        self.handler::<E, _>(handler_fn(f))
    }

    /// 手書きの DynHandler を登録（Signature は build() で検証される）
    pub fn dyn_handler(mut self, handler: Arc<dyn DynHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn tracer(mut self, tracer: impl Tracer + 'static) -> Self {
        self.tracer = Some(Arc::new(tracer));
        self
    }

    pub fn build(self) -> Result<Demux, ConfigError> {
        Demux::new(self)
    }
}

impl std::fmt::Debug for DemuxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemuxConfig")
            .field("probes", &self.probes.len())
            .field("handlers", &self.handlers.len())
            .field("tracer", &self.tracer.is_some())
            .finish()
    }
}
