// CLI module
//
// This module contains command-line interface functionality:
// - arguments: Command-line argument parsing and the mapping onto config overrides

pub mod arguments;

pub use arguments::ProxyArguments;
