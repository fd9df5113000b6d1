//! HandlerRegistry - Handler の検証と登録
//!
//! # 学習ポイント
//! - HashMap での型消去された trait object の管理
//! - 構築時に一度だけ作り、以降は読み取り専用（ロック不要で共有できる）
//! - Arc による共有所有権
//!
//! # 構築の流れ
//! 1. 空なら `ConfigError::NoHandlers`
//! 2. 各 handler の Signature を検証（最初の失敗で中断、エラーはそのまま返す）
//! 3. 同じ accepted type が既にあれば `ConfigError::DuplicateHandler`

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::event::{Event, EventType};
use super::handler::{DynHandler, Handler, TypedHandler};
use super::signature::Signature;
use crate::domain::errors::{ConfigError, ValidationError};

/// 検証済みの handler と、その handler が受け取る型
#[derive(Clone)]
pub struct HandlerDescriptor {
    accepted: EventType,
    signature: Signature,
    handler: Arc<dyn DynHandler>,
}

impl HandlerDescriptor {
    pub fn accepted_type(&self) -> EventType {
        self.accepted
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn handler(&self) -> &Arc<dyn DynHandler> {
        &self.handler
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("accepted", &self.accepted)
            .field("signature", &self.signature.to_string())
            .finish()
    }
}

/// handler の Signature を検証して HandlerDescriptor を作る
pub fn validate(handler: Arc<dyn DynHandler>) -> Result<HandlerDescriptor, ValidationError> {
    let signature = handler.signature();
    let accepted = signature.validate()?;
    Ok(HandlerDescriptor {
        accepted,
        signature,
        handler,
    })
}

/// Typed handler を DynHandler に包む
pub fn erase<E: Event, H: Handler<E> + 'static>(handler: H) -> Arc<dyn DynHandler> {
    Arc::new(TypedHandler::<E, H>::new(handler))
}

/// HandlerRegistry は EventType → HandlerDescriptor の不変マップ
///
/// # 使用例
/// ```ignore
/// let registry = HandlerRegistry::build(vec![
///     erase::<ApiGatewayProxyRequest, _>(ProxyHandler),
///     erase::<SqsEvent, _>(SqsHandler),
/// ])?;
///
/// let descriptor = registry.get(&ApiGatewayProxyRequest::event_type());
/// ```
#[derive(Debug)]
pub struct HandlerRegistry {
    handlers: HashMap<EventType, HandlerDescriptor>,
}

impl HandlerRegistry {
    pub fn build(
        handlers: impl IntoIterator<Item = Arc<dyn DynHandler>>,
    ) -> Result<Self, ConfigError> {
        let mut map = HashMap::new();
        for handler in handlers {
            let descriptor = validate(handler)?;
            let event_type = descriptor.accepted_type();
            if map.contains_key(&event_type) {
                return Err(ConfigError::DuplicateHandler {
                    event_type,
                    signature: descriptor.signature,
                });
            }
            map.insert(event_type, descriptor);
        }

        if map.is_empty() {
            return Err(ConfigError::NoHandlers);
        }

        tracing::debug!(handlers = map.len(), "handler registry built");
        Ok(Self { handlers: map })
    }

    pub fn get(&self, event_type: &EventType) -> Option<&HandlerDescriptor> {
        self.handlers.get(event_type)
    }

    pub fn contains(&self, event_type: &EventType) -> bool {
        self.handlers.contains_key(event_type)
    }

    pub fn registered_types(&self) -> Vec<EventType> {
        self.handlers.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
