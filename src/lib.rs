//! repgate: a forward HTTP proxy that gates every request through Basic
//! credential checks and a URL reputation service before relaying it.

pub mod auth;
pub mod config;
pub mod http_client;
pub mod proxy;
pub mod reputation;
pub mod utils;
