//! demux-core
//!
//! Core building blocks for routing untyped event payloads to typed handlers.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（RawEvent, EventContext, Context, errors）
//! - **typed**: 型付き API（Event, EventType, Handler, Signature, probe, registry, codec）
//! - **ports**: 抽象化レイヤー（Tracer）
//! - **impls**: 実装（NoopTracer, SpanTracer）
//! - **app**: 構築と dispatch（DemuxConfig, Demux, DemuxEntry）
//!
//! # 使用例
//! ```ignore
//! let entry = new_demux_handler(Some(
//!     DemuxConfig::new()
//!         .probe(probe::when::<ApiGatewayProxyRequest>(|ctx| ctx.has_attribute("httpMethod")))
//!         .handler::<ApiGatewayProxyRequest, _>(ProxyHandler)
//!         .tracer(SpanTracer),
//! ));
//!
//! let reply = entry.invoke(Context::background(), &raw).await?;
//! ```

pub mod domain;
pub mod ports;
pub mod app;
pub mod typed;
pub mod impls;

pub use app::{Demux, DemuxConfig, DemuxEntry, new_demux_handler};
pub use domain::{
    CancelHandle, ConfigError, Context, DispatchError, EventContext, HandlerError, RawEvent,
    ValidationError,
};
pub use typed::{Event, EventType, Handler, Record, Reply, probe};
