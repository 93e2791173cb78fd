//! 系统模块数据模型

pub mod dept;
pub mod login_log;
pub mod operation_log;
pub mod role;
pub mod system_config;
pub mod tenant;
pub mod user;

pub use dept::{Dept, DeptInput};
pub use login_log::{LoginLog, NewLoginLog};
pub use operation_log::{NewOperationLog, OperationLog};
pub use role::{Role, RoleInput};
pub use system_config::{SystemConfig, SystemConfigInput};
pub use tenant::{NewTenant, Tenant, PUBLIC_SCHEMA};
pub use user::{LoginFailure, NewUser, User, UserQuery, UserUpdate};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 所有实体共享的审计字段
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BaseEntity {
    pub id: i64,
    /// 所属租户的 schema_name
    #[serde(skip_serializing)]
    pub tenant_id: String,
    pub description: Option<String>,
    /// 创建人用户 id
    pub creator: Option<i64>,
    /// 修改人用户名
    pub modifier: Option<String>,
    pub dept_belong_id: Option<i64>,
    pub create_datetime: DateTime<Utc>,
    pub update_datetime: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub is_deleted: bool,
}

impl BaseEntity {
    pub fn new(id: i64, tenant: &str, operator: &Operator) -> Self {
        let now = Utc::now();
        Self {
            id,
            tenant_id: tenant.to_string(),
            description: None,
            creator: operator.user_id,
            modifier: operator.username.clone(),
            dept_belong_id: operator.dept_id,
            create_datetime: now,
            update_datetime: now,
            is_deleted: false,
        }
    }

    /// 更新修改人与修改时间
    pub fn touch(&mut self, operator: &Operator) {
        if operator.username.is_some() {
            self.modifier = operator.username.clone();
        }
        self.update_datetime = Utc::now();
    }
}

/// 执行写操作的用户，用于填充审计字段
#[derive(Debug, Clone, Default)]
pub struct Operator {
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub dept_id: Option<i64>,
}

impl Operator {
    /// 系统内部操作（初始化、中间件）
    pub fn system() -> Self {
        Self::default()
    }
}
