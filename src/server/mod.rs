pub mod config;
mod errors;
mod http_layers;
pub mod metrics;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use errors::ApiError;
pub use http_layers::*;
pub use server::{make_app, run_server};
