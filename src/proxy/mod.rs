// Proxy module
//
// This module contains the forward proxy split into focused submodules:
// - server: listener setup, optional TLS, one task per connection
// - pipeline: the per-connection read, gate, relay, respond sequence
// - request: request head reading and parsing
// - responses: canned policy responses and relayed-response rendering
// - upstream: relaying to the origin server
// - tls: certificate loading

pub mod error;
pub mod pipeline;
pub mod request;
pub mod responses;
pub mod server;
pub mod tls;
pub mod upstream;

pub use error::ProxyError;
pub use pipeline::{Outcome, PipelineSettings, ProxyContext};
pub use server::{serve, start_proxy_server};
pub use upstream::{HyperUpstream, Upstream};
