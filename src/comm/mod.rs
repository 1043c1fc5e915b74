// Comm module - HTTP interface of the execution engine

pub mod config;
pub mod error;
pub mod server;
pub mod types;

pub use config::CommConfig;
#[allow(unused_imports)]
pub use server::{AppState, build_router};
pub use server::Comm;
#[allow(unused_imports)]
pub use types::{InvokeRequest, InvokeResponse, WireTest};
