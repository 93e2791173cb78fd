use serde::{Deserialize, Serialize};

use super::BaseEntity;

/// 角色
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub base: BaseEntity,
    pub name: String,
    /// 权限字符，租户内唯一
    pub key: String,
    pub sort: i32,
    pub status: bool,
}

/// 创建 / 修改角色的请求体
#[derive(Debug, Clone, Deserialize)]
pub struct RoleInput {
    pub name: String,
    pub key: String,
    #[serde(default = "default_sort")]
    pub sort: i32,
    #[serde(default = "default_true")]
    pub status: bool,
    pub description: Option<String>,
}

fn default_sort() -> i32 {
    1
}

fn default_true() -> bool {
    true
}

impl RoleInput {
    pub fn apply(self, role: &mut Role) {
        role.name = self.name;
        role.key = self.key;
        role.sort = self.sort;
        role.status = self.status;
        role.base.description = self.description;
    }
}
