//! Demux - 生ペイロードを型付き handler に振り分ける
//!
//! # dispatch の流れ
//! 1. probe chain で EventType を判定（なければ `TypeUndetermined`）
//! 2. registry から handler を引く（なければ `UnregisteredType`）
//! 3. Tracer の span の中で decode → handler 呼び出し
//! 4. handler の結果・エラーはそのまま返す（検査・リトライ・変換しない）
//!
//! 構築後は不変なので、`Arc<Demux>` で複数タスクから同時に dispatch できます。

use std::fmt;
use std::sync::Arc;

use super::builder::DemuxConfig;
use crate::domain::context::Context;
use crate::domain::errors::{ConfigError, DispatchError};
use crate::domain::event::RawEvent;
use crate::impls::NoopTracer;
use crate::ports::Tracer;
use crate::typed::handler::Reply;
use crate::typed::probe::ProbeChain;
use crate::typed::registry::HandlerRegistry;

pub struct Demux {
    probes: ProbeChain,
    registry: HandlerRegistry,
    tracer: Arc<dyn Tracer>,
}

impl Demux {
    /// 構築時検証: probe → handler → registry の順
    pub fn new(config: DemuxConfig) -> Result<Self, ConfigError> {
        let DemuxConfig {
            probes,
            handlers,
            tracer,
        } = config;

        if probes.is_empty() {
            return Err(ConfigError::NoProbes);
        }
        if handlers.is_empty() {
            return Err(ConfigError::NoHandlers);
        }

        let registry = HandlerRegistry::build(handlers)?;
        let probes = ProbeChain::new(probes);
        tracing::debug!(
            probes = probes.len(),
            handlers = registry.len(),
            "demux configured"
        );

        Ok(Self {
            probes,
            registry,
            tracer: tracer.unwrap_or_else(|| Arc::new(NoopTracer)),
        })
    }

    pub fn from_config(config: Option<DemuxConfig>) -> Result<Self, ConfigError> {
        Self::new(config.ok_or(ConfigError::MissingConfig)?)
    }

    pub fn probes(&self) -> &ProbeChain {
        &self.probes
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub async fn dispatch(&self, ctx: Context, event: &RawEvent) -> Result<Reply, DispatchError> {
        let event_type = self
            .probes
            .identify(event)
            .ok_or(DispatchError::TypeUndetermined)?;
        tracing::debug!(%event_type, invocation_id = %ctx.invocation_id(), "event type identified");

        let descriptor = self
            .registry
            .get(&event_type)
            .ok_or(DispatchError::UnregisteredType(event_type))?;

        let body = descriptor.handler().handle_dyn(ctx, event);
        self.tracer
            .with_span(format!("event: {event_type}"), body)
            .await
    }
}

impl fmt::Debug for Demux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Demux")
            .field("probes", &self.probes)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
