//! Errors - エラー型と分類
//!
//! # 分類
//! - **ConfigError**: 構築時エラー（設定不足・handler の形が不正・二重登録）。起動を中断すべきもの
//! - **ValidationError**: handler signature の検証エラー（ConfigError に包まれて返る）
//! - **DispatchError**: 呼び出しごとのエラー。ログもリトライもせず呼び出し元に返す
//!
//! メッセージ文字列は互換性のため固定です（テストで完全一致を確認しています）。

use std::sync::Arc;

use thiserror::Error;

use crate::typed::codec::CodecError;
use crate::typed::event::EventType;
use crate::typed::signature::Signature;

/// Handler 自身が返すエラー。demux は中身を見ずにそのまま返す。
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing demuxer configuration")]
    MissingConfig,

    #[error("no demux factories provided")]
    NoProbes,

    #[error("no demux handlers provided")]
    NoHandlers,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("event handler for type {event_type} already provided; {signature}")]
    DuplicateHandler {
        event_type: EventType,
        signature: Signature,
    },
}

/// Handler signature の検証エラー（最初に失敗したルールだけを報告）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("expected a handler function; got {0}")]
    NotCallable(Signature),

    #[error("expected to take two parameters and return two parameters; got {0}")]
    Arity(Signature),

    #[error("expected first argument of handler function to be context.Context; got {0}")]
    FirstArgument(Signature),

    #[error("expected second argument of handler function to be pointer to event struct; got {0}")]
    SecondArgument(Signature),

    #[error("expected first return value to be pointer to structure; got {0}")]
    FirstReturn(Signature),

    #[error("expected second return value to be 'error'; got {0}")]
    SecondReturn(Signature),
}

impl ValidationError {
    pub fn signature(&self) -> &Signature {
        match self {
            Self::NotCallable(sig)
            | Self::Arity(sig)
            | Self::FirstArgument(sig)
            | Self::SecondArgument(sig)
            | Self::FirstReturn(sig)
            | Self::SecondReturn(sig) => sig,
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unable to determine event type for demux")]
    TypeUndetermined,

    #[error("unable to find handler function for event type {0}")]
    UnregisteredType(EventType),

    #[error("unable to decode event of type {event_type}: {source}")]
    Decode {
        event_type: EventType,
        #[source]
        source: CodecError,
    },

    /// Handler の戻り値エラー（Display / source とも素通し）
    #[error(transparent)]
    Handler(HandlerError),

    /// 構築に失敗した demux を呼んだ場合（構築時のエラーをそのまま返す）
    #[error(transparent)]
    Misconfigured(Arc<ConfigError>),
}

impl DispatchError {
    /// Handler が返したエラーなら取り出す
    pub fn handler_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Handler(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    pub fn is_handler_error(&self) -> bool {
        matches!(self, Self::Handler(_))
    }
}
