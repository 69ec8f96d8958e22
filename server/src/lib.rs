//! httpcord Server
//!
//! Receives signed interaction requests from the chat platform, verifies and
//! resolves them, dispatches them to registered handlers, and encodes the
//! handlers' response as JSON or as multipart with file attachments.

pub mod config;
pub mod connection;
pub mod interactions;
pub mod webhooks;

pub use connection::{Connection, ConnectionError, ConnectionOptions, Transport};
pub use interactions::{ConnectionContext, InteractionHandler, ReplyError};
