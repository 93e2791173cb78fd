//! 系统模块接口

pub mod auth;
pub mod dept;
pub mod init_settings;
pub mod log;
pub mod role;
pub mod system_config;
pub mod user;
