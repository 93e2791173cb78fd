/// 通用模块：配置、日志、请求工具

pub mod config;
pub mod request_util;
pub mod tracing;
