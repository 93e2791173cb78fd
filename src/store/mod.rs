//! 存储层
//!
//! 业务代码只依赖这里的 trait；`database.url` 配置时使用 [`PgStore`]，
//! 否则使用 [`MemoryStore`]。所有列表都排除已软删除的记录。

pub mod memory;
pub mod postgres;
pub mod seed;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

use crate::modules::system::models::{
    Dept, DeptInput, LoginFailure, LoginLog, NewLoginLog, NewOperationLog, NewTenant, NewUser,
    OperationLog, Operator, Role, RoleInput, SystemConfig, SystemConfigInput, Tenant, User,
    UserQuery,
};
use crate::response::{Page, PageQuery};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// 存储层错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    /// 唯一约束冲突
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>>;
    async fn get_tenant_by_schema(&self, schema_name: &str) -> StoreResult<Option<Tenant>>;
    async fn get_tenant_by_domain(&self, domain: &str) -> StoreResult<Option<Tenant>>;
    async fn create_tenant(&self, tenant: NewTenant) -> StoreResult<Tenant>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, tenant: &str, user: NewUser, op: &Operator) -> StoreResult<User>;
    async fn get_user(&self, tenant: &str, id: i64) -> StoreResult<Option<User>>;
    /// 依次按用户名、邮箱、手机号查找
    async fn find_user_by_account(&self, tenant: &str, account: &str)
        -> StoreResult<Option<User>>;
    async fn list_users(
        &self,
        tenant: &str,
        query: &UserQuery,
        page: PageQuery,
    ) -> StoreResult<Page<User>>;
    /// 保存资料字段（不含密码与登录计数）
    async fn update_user(&self, tenant: &str, user: &User, op: &Operator) -> StoreResult<User>;
    async fn delete_user(&self, tenant: &str, id: i64, op: &Operator) -> StoreResult<()>;
    /// 原子地累加错误次数，达到 `max_error_count` 时停用账号
    async fn record_login_failure(
        &self,
        tenant: &str,
        id: i64,
        max_error_count: i32,
    ) -> StoreResult<LoginFailure>;
    /// 登录成功：清零错误次数并记录登录时间
    async fn record_login_success(&self, tenant: &str, id: i64, at: DateTime<Utc>)
        -> StoreResult<()>;
    /// 修改密码；`count_change` 为真时累加 `pwd_change_count`
    async fn set_password(
        &self,
        tenant: &str,
        id: i64,
        password_hash: &str,
        count_change: bool,
    ) -> StoreResult<()>;
    /// 解锁：启用账号并清零错误次数
    async fn unlock_user(&self, tenant: &str, id: i64, op: &Operator) -> StoreResult<()>;
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn list_roles(&self, tenant: &str) -> StoreResult<Vec<Role>>;
    async fn get_role(&self, tenant: &str, id: i64) -> StoreResult<Option<Role>>;
    async fn get_roles_by_ids(&self, tenant: &str, ids: &[i64]) -> StoreResult<Vec<Role>>;
    async fn create_role(&self, tenant: &str, input: RoleInput, op: &Operator)
        -> StoreResult<Role>;
    async fn update_role(&self, tenant: &str, role: &Role, op: &Operator) -> StoreResult<Role>;
    async fn delete_role(&self, tenant: &str, id: i64, op: &Operator) -> StoreResult<()>;
}

#[async_trait]
pub trait DeptStore: Send + Sync {
    async fn list_depts(&self, tenant: &str) -> StoreResult<Vec<Dept>>;
    async fn get_dept(&self, tenant: &str, id: i64) -> StoreResult<Option<Dept>>;
    async fn create_dept(&self, tenant: &str, input: DeptInput, op: &Operator)
        -> StoreResult<Dept>;
    async fn update_dept(&self, tenant: &str, dept: &Dept, op: &Operator) -> StoreResult<Dept>;
    /// 软删除一组部门
    async fn delete_depts(&self, tenant: &str, ids: &[i64], op: &Operator) -> StoreResult<()>;
}

#[async_trait]
pub trait SystemConfigStore: Send + Sync {
    /// 按 sort 升序
    async fn list_system_configs(&self, tenant: &str) -> StoreResult<Vec<SystemConfig>>;
    async fn get_system_config(&self, tenant: &str, id: i64) -> StoreResult<Option<SystemConfig>>;
    async fn create_system_config(
        &self,
        tenant: &str,
        input: SystemConfigInput,
        op: &Operator,
    ) -> StoreResult<SystemConfig>;
    async fn update_system_config(
        &self,
        tenant: &str,
        config: &SystemConfig,
        op: &Operator,
    ) -> StoreResult<SystemConfig>;
    /// 软删除配置项及其子项
    async fn delete_system_config(&self, tenant: &str, id: i64, op: &Operator) -> StoreResult<()>;
}

#[async_trait]
pub trait OperationLogStore: Send + Sync {
    async fn create_operation_log(&self, tenant: &str, log: NewOperationLog) -> StoreResult<i64>;
    async fn update_operation_log(
        &self,
        tenant: &str,
        id: i64,
        log: NewOperationLog,
    ) -> StoreResult<()>;
    async fn get_operation_log(&self, tenant: &str, id: i64) -> StoreResult<Option<OperationLog>>;
    /// 按创建时间倒序
    async fn list_operation_logs(
        &self,
        tenant: &str,
        page: PageQuery,
    ) -> StoreResult<Page<OperationLog>>;
}

#[async_trait]
pub trait LoginLogStore: Send + Sync {
    async fn create_login_log(
        &self,
        tenant: &str,
        log: NewLoginLog,
        op: &Operator,
    ) -> StoreResult<LoginLog>;
    /// 按创建时间倒序
    async fn list_login_logs(&self, tenant: &str, page: PageQuery) -> StoreResult<Page<LoginLog>>;
}

/// 完整的存储接口
#[async_trait]
pub trait Store:
    TenantStore
    + UserStore
    + RoleStore
    + DeptStore
    + SystemConfigStore
    + OperationLogStore
    + LoginLogStore
{
    /// 存储可用性检查
    async fn ping(&self) -> StoreResult<()>;
}

pub type DynStore = Arc<dyn Store>;

/// 按配置选择存储实现
pub async fn connect(settings: &crate::conf::DatabaseSettings) -> anyhow::Result<DynStore> {
    match settings.url.as_deref().filter(|url| !url.is_empty()) {
        Some(url) => {
            let store = PgStore::connect(url, settings.max_connections).await?;
            tracing::info!("使用 PostgreSQL 存储");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("未配置 database.url，使用内存存储");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
