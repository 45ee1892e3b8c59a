//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! HTTP handlers and the chat event stream live under [`http`].

pub mod http;
