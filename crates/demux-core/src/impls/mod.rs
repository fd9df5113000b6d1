//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **NoopTracer**: span なし（デフォルト）
//! - **SpanTracer**: `tracing` の span を使う Tracer

pub mod tracer;

pub use self::tracer::{NoopTracer, SpanTracer};
