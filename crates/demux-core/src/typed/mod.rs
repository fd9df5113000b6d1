//! Typed - 型付き Event / Handler API
//!
//! ペイロードの型判定と handler の対応付けを型で表現します。
//!
//! # 二層構造
//! - **表層（Typed）**: `Event` trait, `Handler<E>` trait - 型安全
//! - **内部（Dyn）**: `DynHandler` trait - object-safe, type erasure
//!
//! `Signature` は handler の形を記述し、registry 構築時に検証されます。

pub mod event;
pub mod codec;
pub mod signature;
pub mod handler;
pub mod probe;
pub mod registry;

pub use self::event::{Event, EventType, Record};
pub use self::codec::{CodecError, EventCodec};
pub use self::signature::{Signature, Slot};
pub use self::handler::{DynHandler, FnHandler, Handler, Reply, TypedHandler, handler_fn};
pub use self::probe::{ProbeChain, TypeProbe};
pub use self::registry::{HandlerDescriptor, HandlerRegistry};
