//! サンプルのイベント型・probe・handler
//!
//! API Gateway (REST / WebSocket) と SQS のペイロードを見分けて、
//! それぞれの handler に振り分ける構成。

use std::collections::HashMap;

use async_trait::async_trait;
use demux_core::domain::event::string_attribute_matches;
use demux_core::impls::SpanTracer;
use demux_core::{Context, DemuxConfig, Event, EventContext, Handler, HandlerError, Record, probe};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiGatewayProxyRequest {
    pub resource: String,
    pub path: String,
    pub http_method: String,
    pub headers: Option<HashMap<String, String>>,
    pub query_string_parameters: Option<HashMap<String, String>>,
    pub body: Option<String>,
}

impl Record for ApiGatewayProxyRequest {}
impl Event for ApiGatewayProxyRequest {}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebsocketRequestContext {
    pub connection_id: String,
    pub route_key: String,
    pub event_type: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiGatewayWebsocketProxyRequest {
    pub request_context: WebsocketRequestContext,
    pub body: Option<String>,
}

impl Record for ApiGatewayWebsocketProxyRequest {}
impl Event for ApiGatewayWebsocketProxyRequest {}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SqsMessage {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: String,
    pub event_source: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SqsEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<SqsMessage>,
}

impl Record for SqsEvent {}
impl Event for SqsEvent {}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Record for ApiGatewayProxyResponse {}

impl ApiGatewayProxyResponse {
    fn json(status_code: u16, body: Value) -> Self {
        Self {
            status_code,
            headers: HashMap::from([("content-type".to_string(), "application/json".to_string())]),
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemFailure {
    pub item_identifier: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SqsBatchResponse {
    pub batch_item_failures: Vec<BatchItemFailure>,
}

impl Record for SqsBatchResponse {}

fn is_websocket(ctx: &EventContext<'_>) -> bool {
    ctx.event()
        .get("requestContext")
        .and_then(|rc| rc.get("connectionId"))
        .and_then(Value::as_str)
        .is_some()
}

fn is_proxy(ctx: &EventContext<'_>) -> bool {
    ctx.string_attribute("httpMethod").is_some() && ctx.string_attribute("path").is_some()
}

fn is_sqs(ctx: &EventContext<'_>) -> bool {
    ctx.event()
        .get("Records")
        .and_then(Value::as_array)
        .and_then(|records| records.first())
        .and_then(Value::as_object)
        .is_some_and(|record| string_attribute_matches(record, "eventSource", "aws:sqs"))
}

/// REST リクエストをそのまま要約して返す
struct ProxyHandler;

#[async_trait]
impl Handler<ApiGatewayProxyRequest> for ProxyHandler {
    type Output = ApiGatewayProxyResponse;

    async fn handle(
        &self,
        ctx: Context,
        event: ApiGatewayProxyRequest,
    ) -> Result<ApiGatewayProxyResponse, HandlerError> {
        tracing::info!(path = %event.path, method = %event.http_method, "proxy request");
        if event.path.is_empty() {
            return Err("proxy request without a path".into());
        }

        Ok(ApiGatewayProxyResponse::json(
            200,
            serde_json::json!({
                "path": event.path,
                "method": event.http_method,
                "invocationId": ctx.invocation_id().to_string(),
            }),
        ))
    }
}

/// 空の body を持つメッセージを失敗として報告する
struct SqsHandler;

#[async_trait]
impl Handler<SqsEvent> for SqsHandler {
    type Output = SqsBatchResponse;

    async fn handle(&self, _ctx: Context, event: SqsEvent) -> Result<SqsBatchResponse, HandlerError> {
        let batch_item_failures = event
            .records
            .iter()
            .filter(|record| record.body.is_empty())
            .map(|record| BatchItemFailure {
                item_identifier: record.message_id.clone(),
            })
            .collect::<Vec<_>>();
        tracing::info!(
            records = event.records.len(),
            failures = batch_item_failures.len(),
            "sqs batch"
        );
        Ok(SqsBatchResponse {
            batch_item_failures,
        })
    }
}

/// サンプル構成（WebSocket は REST より先に判定する）
pub fn config() -> DemuxConfig {
    DemuxConfig::new()
        .probe(probe::when::<ApiGatewayWebsocketProxyRequest>(is_websocket))
        .probe(probe::when::<ApiGatewayProxyRequest>(is_proxy))
        .probe(probe::when::<SqsEvent>(is_sqs))
        .handler::<ApiGatewayProxyRequest, _>(ProxyHandler)
        .handler::<SqsEvent, _>(SqsHandler)
        .handler_fn(|_ctx: Context, event: ApiGatewayWebsocketProxyRequest| async move {
            let rc = event.request_context;
            Ok::<_, HandlerError>(ApiGatewayProxyResponse::json(
                200,
                serde_json::json!({ "connectionId": rc.connection_id, "routeKey": rc.route_key }),
            ))
        })
        .tracer(SpanTracer)
}
