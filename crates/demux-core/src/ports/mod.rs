//! Ports - 抽象化レイヤー
//!
//! このモジュールは demux が外部に委ねる機能の「ポート」を定義します。
//! 実装は `impls` に置き、構築時に注入します。

pub mod tracer;

pub use self::tracer::{BoxFuture, DispatchBody, Tracer};
