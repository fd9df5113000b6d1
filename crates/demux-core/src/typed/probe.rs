//! TypeProbe chain - ペイロードがどの Event 型かを判定する
//!
//! probe は登録順に評価され、最初に `Some(EventType)` を返したものが勝ちます。
//! それ以降の probe は評価されません（順序は設定の一部）。
//! チェーンは構築時に固定され、以後は変更できません。
//!
//! 構造的に区別できない 2 つの型がある場合、どちらになるかは probe の順序だけで決まります。

use std::fmt;
use std::sync::Arc;

use super::event::{Event, EventType};
use crate::domain::event::{EventContext, RawEvent};

pub type TypeProbe = Arc<dyn Fn(&EventContext<'_>) -> Option<EventType> + Send + Sync>;

/// `predicate` が true のとき E を返す probe
///
/// # 使用例
/// ```ignore
/// let probe = probe::when::<ApiGatewayProxyRequest>(|ctx| {
///     ctx.has_attribute("httpMethod") && ctx.has_attribute("path")
/// });
/// ```
pub fn when<E: Event>(
    predicate: impl Fn(&EventContext<'_>) -> bool + Send + Sync + 'static,
) -> TypeProbe {
    Arc::new(move |ctx: &EventContext<'_>| predicate(ctx).then(E::event_type))
}

/// 常に E を返す probe（チェーンの最後に置くフォールバック用）
pub fn always<E: Event>() -> TypeProbe {
    Arc::new(|_: &EventContext<'_>| Some(E::event_type()))
}

pub fn from_fn(
    probe: impl Fn(&EventContext<'_>) -> Option<EventType> + Send + Sync + 'static,
) -> TypeProbe {
    Arc::new(probe)
}

/// 登録順に評価される probe の列（構築後は変更できない）
///
/// ```compile_fail
/// use demux_core::typed::{ProbeChain, probe};
///
/// let mut chain = ProbeChain::new(Vec::new());
/// chain.push(probe::from_fn(|_| None));
/// ```
#[derive(Clone, Default)]
pub struct ProbeChain {
    probes: Vec<TypeProbe>,
}

impl ProbeChain {
    pub fn new(probes: Vec<TypeProbe>) -> Self {
        Self { probes }
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub fn identify(&self, event: &RawEvent) -> Option<EventType> {
        let ctx = EventContext::new(event);
        self.probes.iter().find_map(|probe| probe(&ctx))
    }
}

impl fmt::Debug for ProbeChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeChain")
            .field("probes", &self.probes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::Record;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Deserialize)]
    struct ProxyRequest {}
    impl Record for ProxyRequest {}
    impl Event for ProxyRequest {}

    #[derive(Debug, Deserialize)]
    struct WebsocketRequest {}
    impl Record for WebsocketRequest {}
    impl Event for WebsocketRequest {}

    fn counting(
        counter: Arc<AtomicUsize>,
        result: Option<EventType>,
    ) -> TypeProbe {
        from_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            result
        })
    }

    #[test]
    fn identifies_absent_and_empty_payloads() {
        let chain = ProbeChain::new(vec![always::<ProxyRequest>()]);
        assert_eq!(
            chain.identify(&RawEvent::from(None)),
            Some(ProxyRequest::event_type())
        );
        assert_eq!(
            chain.identify(&RawEvent::empty()),
            Some(ProxyRequest::event_type())
        );
    }

    #[test]
    fn no_match_returns_none() {
        let chain = ProbeChain::new(vec![from_fn(|_| None)]);
        assert_eq!(chain.identify(&RawEvent::empty()), None);
    }

    #[test]
    fn empty_chain_returns_none() {
        assert_eq!(ProbeChain::default().identify(&RawEvent::empty()), None);
    }

    #[test]
    fn first_match_wins_and_stops() {
        let skipped = Arc::new(AtomicUsize::new(0));
        let first = Arc::new(AtomicUsize::new(0));
        let after = Arc::new(AtomicUsize::new(0));

        let chain = ProbeChain::new(vec![
            counting(skipped.clone(), None),
            counting(first.clone(), Some(WebsocketRequest::event_type())),
            counting(after.clone(), Some(ProxyRequest::event_type())),
        ]);

        assert_eq!(
            chain.identify(&RawEvent::empty()),
            Some(WebsocketRequest::event_type())
        );
        assert_eq!(skipped.load(Ordering::SeqCst), 1);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn when_uses_event_context() {
        let chain = ProbeChain::new(vec![
            when::<WebsocketRequest>(|ctx| ctx.resource_string_attribute("connectionId").is_some()),
            when::<ProxyRequest>(|ctx| ctx.has_attribute("httpMethod")),
        ]);

        let ws = RawEvent::from(json!({
            "httpMethod": "GET",
            "resourceContext": { "connectionId": "abc" },
        }));
        assert_eq!(chain.identify(&ws), Some(WebsocketRequest::event_type()));

        let http = RawEvent::from(json!({ "httpMethod": "GET" }));
        assert_eq!(chain.identify(&http), Some(ProxyRequest::event_type()));

        assert_eq!(chain.identify(&RawEvent::empty()), None);
    }
}
