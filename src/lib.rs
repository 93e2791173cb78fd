pub mod api;
pub mod bootstrap;
pub mod comm;
pub mod conf;
pub mod error;
pub mod middleware;
pub mod response;
pub mod schema;
pub mod state;
pub mod store;

// Modules
pub mod modules;

/// 初始化所有模块的命令
pub fn init_commands() {
    modules::system::register_system_commands();
}

/// 初始化所有模块的路由，可重复调用
pub fn init_routes() {
    modules::system::register_system_routes();
}

pub use bootstrap::command_registry::{build_app, handle_command};
pub use bootstrap::AppBootstrap;
