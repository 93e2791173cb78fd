use actix_web::web;

use crate::error::configure_extractors;

use super::controller::{auth, dept, init_settings, log, role, system_config, user};

pub fn configure_auth(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(auth::captcha)
        .service(auth::refresh_token)
        .service(auth::logout);
}

pub fn configure_init_settings(cfg: &mut web::ServiceConfig) {
    cfg.service(init_settings::init_settings);
}

pub fn configure_system_config(cfg: &mut web::ServiceConfig) {
    cfg.service(system_config::list)
        .service(system_config::values)
        .service(system_config::dict)
        .service(system_config::create)
        .service(system_config::update)
        .service(system_config::remove);
}

pub fn configure_dept(cfg: &mut web::ServiceConfig) {
    cfg.service(dept::tree)
        .service(dept::detail)
        .service(dept::create)
        .service(dept::update)
        .service(dept::remove);
}

pub fn configure_role(cfg: &mut web::ServiceConfig) {
    cfg.service(role::list)
        .service(role::create)
        .service(role::update)
        .service(role::remove);
}

/// 固定路径需先于 `{id}` 注册
pub fn configure_user(cfg: &mut web::ServiceConfig) {
    cfg.service(user::user_info)
        .service(user::change_password)
        .service(user::list)
        .service(user::create)
        .service(user::reset_password)
        .service(user::unlock)
        .service(user::update)
        .service(user::remove);
}

pub fn configure_log(cfg: &mut web::ServiceConfig) {
    cfg.service(log::operation_logs).service(log::login_logs);
}

/// 不经全局注册器，直接挂载全部系统路由
pub fn configure_system(cfg: &mut web::ServiceConfig) {
    configure_extractors(cfg);
    configure_auth(cfg);
    configure_init_settings(cfg);
    configure_system_config(cfg);
    configure_dept(cfg);
    configure_role(cfg);
    configure_user(cfg);
    configure_log(cfg);
}

/// 这些前缀的处理器已随 `configure_auth` 挂载，只登记模块名
fn mounted_with_auth(_cfg: &mut web::ServiceConfig) {}

/// 注册到全局路由表，前缀同时决定操作日志的模块名
pub fn register_system_routes() {
    crate::register_routes!(
        ("login", "登录", "登录模块", "/api/login/", configure_auth),
        ("captcha", "验证码", "登录模块", "/api/captcha/", mounted_with_auth),
        ("token", "刷新令牌", "登录模块", "/api/token/", mounted_with_auth),
        ("logout", "注销", "登录模块", "/api/logout/", mounted_with_auth),
        ("init_settings", "初始化配置", "系统配置", "/api/init/", configure_init_settings),
        ("system_config", "系统配置", "系统配置", "/api/system/system_config/", configure_system_config),
        ("dept", "部门管理", "部门管理", "/api/system/dept/", configure_dept),
        ("role", "角色管理", "角色管理", "/api/system/role/", configure_role),
        ("user", "用户管理", "用户管理", "/api/system/user/", configure_user),
        ("log", "日志管理", "日志管理", "/api/system/", configure_log),
    );
}
