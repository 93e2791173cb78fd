use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::BaseEntity;

/// 后台用户
pub const USER_TYPE_BACKEND: i32 = 0;

/// 用户
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub base: BaseEntity,
    pub username: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub avatar: Option<String>,
    pub name: String,
    /// 0 未知, 1 男, 2 女
    pub gender: i32,
    /// 0 后台用户, 1 前台用户
    pub user_type: i32,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub role_ids: Vec<i64>,
    pub dept_id: Option<i64>,
    pub login_error_count: i32,
    pub pwd_change_count: i32,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn id(&self) -> i64 {
        self.base.id
    }
}

/// 新建用户，`password_hash` 由服务层计算
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub avatar: Option<String>,
    pub name: Option<String>,
    pub gender: i32,
    pub user_type: i32,
    pub password_hash: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub role_ids: Vec<i64>,
    pub dept_id: Option<i64>,
}

/// 修改用户资料，未提供的字段保持不变
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub avatar: Option<String>,
    pub name: Option<String>,
    pub gender: Option<i32>,
    pub role_ids: Option<Vec<i64>>,
    pub dept_id: Option<i64>,
    pub is_active: Option<bool>,
}

impl UserUpdate {
    pub fn apply(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = Some(email).filter(|v| !v.is_empty());
        }
        if let Some(mobile) = self.mobile {
            user.mobile = Some(mobile).filter(|v| !v.is_empty());
        }
        if self.avatar.is_some() {
            user.avatar = self.avatar;
        }
        if let Some(name) = self.name.filter(|v| !v.is_empty()) {
            user.name = name;
        }
        if let Some(gender) = self.gender {
            user.gender = gender;
        }
        if let Some(role_ids) = self.role_ids {
            user.role_ids = role_ids;
        }
        if self.dept_id.is_some() {
            user.dept_id = self.dept_id;
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
    }
}

/// 用户列表过滤条件
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserQuery {
    /// 匹配用户名 / 姓名 / 手机号
    pub search: Option<String>,
    pub dept_id: Option<i64>,
    pub is_active: Option<bool>,
}

impl UserQuery {
    pub fn matches(&self, user: &User) -> bool {
        if let Some(dept_id) = self.dept_id {
            if user.dept_id != Some(dept_id) {
                return false;
            }
        }
        if let Some(is_active) = self.is_active {
            if user.is_active != is_active {
                return false;
            }
        }
        match self.search.as_deref().filter(|s| !s.is_empty()) {
            Some(search) => {
                user.username.contains(search)
                    || user.name.contains(search)
                    || user.mobile.as_deref().is_some_and(|m| m.contains(search))
            }
            None => true,
        }
    }
}

/// 一次密码错误之后的计数结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginFailure {
    pub count: i32,
    /// 本次错误是否导致账号被锁定
    pub locked: bool,
}
