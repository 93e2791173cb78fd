pub mod app_bootstrap;
pub mod command_registry;
pub mod route_registry;

pub use app_bootstrap::{configure_app, AppBootstrap};
