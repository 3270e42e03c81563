//! CLI command implementations.

mod config;
mod doctor;
mod quote;
mod serve;

pub use config::run_config;
pub use doctor::run_doctor;
pub use quote::run_quote;
pub use serve::{build_router, run_serve, AppState};
