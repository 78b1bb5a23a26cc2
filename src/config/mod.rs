// Configuration module
//
// This module contains all configuration-related functionality split into focused submodules:
// - types: Core configuration structures, defaults and the partial-update patch
// - loader: JSON loading and saving, shared with the reputation service
// - validator: Startup validation

pub mod loader;
pub mod types;
pub mod validator;

pub use types::{Config, ConfigPatch, TlsConfig};
