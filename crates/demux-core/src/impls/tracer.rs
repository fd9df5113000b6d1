//! Tracer の実装
//!
//! - **NoopTracer**: span を作らずに body を実行する（デフォルト）
//! - **SpanTracer**: `tracing` の span で body を計装する

use async_trait::async_trait;
use tracing::Instrument;

use crate::domain::errors::DispatchError;
use crate::ports::tracer::{DispatchBody, Tracer};
use crate::typed::handler::Reply;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

#[async_trait]
impl Tracer for NoopTracer {
    async fn with_span<'a>(
        &self,
        _name: String,
        body: DispatchBody<'a>,
    ) -> Result<Reply, DispatchError> {
        body.await
    }
}

/// `demux.event` span を開いて body を実行する。
///
/// span は future が完了した時点（または drop された時点）で閉じる。
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanTracer;

#[async_trait]
impl Tracer for SpanTracer {
    async fn with_span<'a>(
        &self,
        name: String,
        body: DispatchBody<'a>,
    ) -> Result<Reply, DispatchError> {
        let span = tracing::info_span!("demux.event", event = %name, outcome = tracing::field::Empty);
        let result = body.instrument(span.clone()).await;
        span.record("outcome", if result.is_ok() { "ok" } else { "error" });
        result
    }
}
