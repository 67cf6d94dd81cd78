//! A small hyper host for [`micro_typed`] handlers.
//!
//! [`Server`] accepts HTTP/1.1 connections, hands every request to a single
//! [`RequestHandler`](micro_typed::RequestHandler) (normally a [`Routes`] table) and drains open
//! connections gracefully once its shutdown future resolves.
//!
//! The [`app`] module holds the demo application served by the `micro-typed-demo` binary.

pub mod app;
mod config;
mod routes;
mod server;

pub use config::ServerConfig;
pub use routes::{Routes, RoutesBuilder};
pub use server::{Server, ServerBuildError, ServerBuilder, ServerError, shutdown_signal};
