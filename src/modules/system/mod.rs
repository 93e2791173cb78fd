//! 系统管理模块：登录认证、用户、角色、部门、系统配置与日志

pub mod captcha;
pub mod cmd;
pub mod controller;
pub mod dept;
pub mod dispatch;
pub mod login;
pub mod models;
pub mod password;
pub mod routes;
pub mod token;

use std::sync::Arc;

use crate::bootstrap::command_registry::register_module;

pub use routes::register_system_routes;

/// 注册系统模块的命令
pub fn register_system_commands() {
    register_module(Arc::new(cmd::SystemCommands));
}
