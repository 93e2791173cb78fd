use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 默认租户，非租户模式下唯一的租户
pub const PUBLIC_SCHEMA: &str = "public";

/// 租户
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tenant {
    pub id: i64,
    pub schema_name: String,
    pub name: String,
    /// 绑定的访问域名
    pub domain: Option<String>,
    pub create_datetime: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTenant {
    pub schema_name: String,
    pub name: String,
    pub domain: Option<String>,
}
