//! Domain model (raw events, invocation context, errors).

pub mod context;
pub mod errors;
pub mod event;

pub use self::context::{CancelHandle, Context};
pub use self::errors::{ConfigError, DispatchError, HandlerError, ValidationError};
pub use self::event::{EventContext, RawEvent};
