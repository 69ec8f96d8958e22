//! Interactions
//!
//! Verification, dispatch and response encoding for interaction requests.

pub mod context;
pub mod dispatch;
pub mod encode;
pub mod error;
pub mod handler;
pub mod multipart;

pub use context::{ConnectionContext, ReplyError};
pub use dispatch::{InteractionService, SIGNATURE_HEADER, TIMESTAMP_HEADER};
pub use encode::{encode, EncodeError, EncodedResponse};
pub use error::RequestError;
pub use handler::{HandlerResult, InteractionHandler, SharedHandler};
