// ABOUTME: MCP server entry (stdio/http) over the API catalog service
// ABOUTME: Thin runtime layer wiring transports to catalog tools

pub mod error;
#[cfg(feature = "server-http")]
pub mod http_server;
pub mod server;

pub use error::*;
#[cfg(feature = "server-http")]
pub use http_server::*;
pub use server::*;
