//! httpcord Common Library
//!
//! Wire types for inbound interactions and outbound interaction responses,
//! plus the pure resolver that turns one into the other's input.

pub mod types;

pub use types::*;
