use serde::{Deserialize, Serialize};

use super::BaseEntity;

/// 部门，通过 parent_id 组成树
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Dept {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub base: BaseEntity,
    pub name: String,
    /// 关联字符，设置时唯一
    pub key: Option<String>,
    pub sort: i32,
    pub owner: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: bool,
    pub parent_id: Option<i64>,
}

impl Dept {
    pub fn id(&self) -> i64 {
        self.base.id
    }
}

/// 创建 / 修改部门的请求体
#[derive(Debug, Clone, Deserialize)]
pub struct DeptInput {
    pub name: String,
    pub key: Option<String>,
    #[serde(default = "default_sort")]
    pub sort: i32,
    pub owner: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default = "default_true")]
    pub status: bool,
    pub parent_id: Option<i64>,
    pub description: Option<String>,
}

fn default_sort() -> i32 {
    1
}

fn default_true() -> bool {
    true
}

impl DeptInput {
    pub fn apply(self, dept: &mut Dept) {
        dept.name = self.name;
        dept.key = self.key.filter(|k| !k.is_empty());
        dept.sort = self.sort;
        dept.owner = self.owner;
        dept.phone = self.phone;
        dept.email = self.email;
        dept.status = self.status;
        dept.parent_id = self.parent_id;
        dept.base.description = self.description;
    }
}
