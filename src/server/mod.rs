mod client_error_routes;
pub mod config;
mod http_layers;
mod job_routes;
mod layout_routes;
mod role_guard;
#[allow(clippy::module_inception)]
mod server;
pub mod session;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
