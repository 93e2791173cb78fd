use serde::{Deserialize, Serialize};

use super::BaseEntity;

/// 普通登录
pub const LOGIN_TYPE_NORMAL: i32 = 1;

/// 登录日志
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LoginLog {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub base: BaseEntity,
    pub username: String,
    pub ip: String,
    pub agent: String,
    pub browser: String,
    pub os: String,
    pub login_type: i32,
}

#[derive(Debug, Clone)]
pub struct NewLoginLog {
    pub username: String,
    pub ip: String,
    pub agent: String,
    pub browser: String,
    pub os: String,
    pub login_type: i32,
}
