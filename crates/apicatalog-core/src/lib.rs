pub mod codegen;
pub mod config;
pub mod error;
pub mod format;
pub mod query;
pub mod request;
pub mod scoring;
pub mod service;
pub mod stats;
pub mod store;
pub mod sync;
pub mod types;

pub use codegen::{integration_guide, Language};
pub use config::*;
pub use error::*;
pub use query::*;
pub use request::*;
pub use scoring::*;
pub use service::*;
pub use stats::*;
pub use store::*;
pub use sync::*;
pub use types::*;
