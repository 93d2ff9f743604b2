//! Mockfront: a declarative HTTP mock server.
//!
//! Rules are read from a JSON or YAML document ([`config`]), compiled once
//! into an immutable route table ([`route`]) and served over HTTP/1.1
//! ([`server`]). A request is answered by the first rule of its
//! `(uri, method)` group whose query parameters equal the request's, after
//! the rule's simulated latency.

pub mod config;
pub mod metrics;
pub mod route;
pub mod server;
