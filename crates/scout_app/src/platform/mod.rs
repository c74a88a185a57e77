mod app;
pub mod config;
mod digest;
mod extract;
mod linkedin;
pub mod logging;
mod persistence;

pub use app::run_app;
