//! DemuxEntry - ホストランタイムに渡す単一のエントリポイント
//!
//! 構築に失敗しても panic せず、毎回の呼び出しで構築時のエラーを返す
//! エントリポイントになります（起動は成功し、呼び出しで失敗が見える）。

use std::sync::Arc;

use super::builder::DemuxConfig;
use super::demux::Demux;
use crate::domain::context::Context;
use crate::domain::errors::{ConfigError, DispatchError};
use crate::domain::event::RawEvent;
use crate::typed::handler::Reply;

#[derive(Debug, Clone)]
pub enum DemuxEntry {
    Ready(Arc<Demux>),
    Misconfigured(Arc<ConfigError>),
}

/// 設定から demux を構築し、エントリポイントとして返す
pub fn new_demux_handler(config: Option<DemuxConfig>) -> DemuxEntry {
    match Demux::from_config(config) {
        Ok(demux) => DemuxEntry::Ready(Arc::new(demux)),
        Err(err) => {
            tracing::error!(error = %err, "demux construction failed");
            DemuxEntry::Misconfigured(Arc::new(err))
        }
    }
}

impl DemuxEntry {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn demux(&self) -> Option<&Arc<Demux>> {
        match self {
            Self::Ready(demux) => Some(demux),
            Self::Misconfigured(_) => None,
        }
    }

    pub async fn invoke(&self, ctx: Context, event: &RawEvent) -> Result<Reply, DispatchError> {
        match self {
            Self::Ready(demux) => demux.dispatch(ctx, event).await,
            Self::Misconfigured(err) => Err(DispatchError::Misconfigured(Arc::clone(err))),
        }
    }
}

impl From<Demux> for DemuxEntry {
    fn from(demux: Demux) -> Self {
        Self::Ready(Arc::new(demux))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::HandlerError;
    use crate::typed::{Event, Record, probe};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Greeting {
        name: String,
    }
    impl Record for Greeting {}
    impl Event for Greeting {}

    #[derive(Debug, Serialize, PartialEq)]
    struct Greeted {
        message: String,
    }
    impl Record for Greeted {}

    fn config() -> DemuxConfig {
        DemuxConfig::new()
            .probe(probe::always::<Greeting>())
            .handler_fn(|_ctx: Context, event: Greeting| async move {
                Ok::<_, HandlerError>(Greeted {
                    message: format!("hello {}", event.name),
                })
            })
    }

    #[tokio::test]
    async fn ready_entry_dispatches() {
        let entry = new_demux_handler(Some(config()));
        assert!(entry.is_ready());

        let raw = RawEvent::from(json!({ "name": "demux" }));
        let reply = entry.invoke(Context::background(), &raw).await.unwrap();
        assert_eq!(
            reply.downcast_ref::<Greeted>(),
            Some(&Greeted {
                message: "hello demux".to_string()
            })
        );
        assert_eq!(reply.to_json().unwrap(), json!({ "message": "hello demux" }));
    }

    #[tokio::test]
    async fn missing_config_fails_every_invocation() {
        let entry = new_demux_handler(None);
        assert!(!entry.is_ready());
        assert!(entry.demux().is_none());

        for _ in 0..2 {
            let err = entry
                .invoke(Context::background(), &RawEvent::empty())
                .await
                .unwrap_err();
            assert!(matches!(&err, DispatchError::Misconfigured(e) if matches!(**e, ConfigError::MissingConfig)));
            assert_eq!(err.to_string(), "missing demuxer configuration");
        }
    }

    #[tokio::test]
    async fn construction_error_is_reported_unchanged() {
        let construction = Demux::new(DemuxConfig::new().probe(probe::always::<Greeting>()))
            .unwrap_err()
            .to_string();

        let entry = new_demux_handler(Some(DemuxConfig::new().probe(probe::always::<Greeting>())));
        let err = entry
            .invoke(Context::background(), &RawEvent::empty())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), construction);
        assert_eq!(err.to_string(), "no demux handlers provided");
    }
}
