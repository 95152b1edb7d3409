//! Thin adapters between platform invocation conventions and [`Handler`](crate::handlers::Handler).

pub mod callable;
pub mod http;
