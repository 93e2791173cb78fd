//! PostgreSQL 存储实现（sqlx）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use std::time::Duration;

use super::{
    DeptStore, LoginLogStore, OperationLogStore, RoleStore, Store, StoreError, StoreResult,
    SystemConfigStore, TenantStore, UserStore,
};
use crate::modules::system::models::{
    Dept, DeptInput, LoginFailure, LoginLog, NewLoginLog, NewOperationLog, NewTenant, NewUser,
    OperationLog, Operator, Role, RoleInput, SystemConfig, SystemConfigInput, Tenant, User,
    UserQuery,
};
use crate::response::{Page, PageQuery};
use crate::schema::CREATE_TABLES;

/// 基于连接池的存储
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// 创建连接池（延迟连接，首次查询时建立）
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .max_lifetime(Some(Duration::from_secs(1800)))
            .idle_timeout(Some(Duration::from_secs(300)))
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy(url)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 执行初始化 DDL
    pub async fn create_schema(&self) -> StoreResult<()> {
        for ddl in CREATE_TABLES {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        Ok(())
    }
}

/// 唯一约束冲突转为 [`StoreError::Conflict`]
fn map_unique(message: impl FnOnce() -> String) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            StoreError::Conflict(message())
        }
        _ => StoreError::Database(e),
    }
}

fn not_found(what: &str) -> StoreError {
    StoreError::NotFound(format!("{}不存在", what))
}

fn expect_affected(rows: u64, what: &str) -> StoreResult<()> {
    if rows == 0 {
        return Err(not_found(what));
    }
    Ok(())
}

#[async_trait]
impl TenantStore for PgStore {
    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>> {
        Ok(
            sqlx::query_as::<_, Tenant>("SELECT * FROM sys_tenant ORDER BY id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn get_tenant_by_schema(&self, schema_name: &str) -> StoreResult<Option<Tenant>> {
        Ok(
            sqlx::query_as::<_, Tenant>("SELECT * FROM sys_tenant WHERE schema_name = $1")
                .bind(schema_name)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn get_tenant_by_domain(&self, domain: &str) -> StoreResult<Option<Tenant>> {
        Ok(
            sqlx::query_as::<_, Tenant>("SELECT * FROM sys_tenant WHERE domain = $1")
                .bind(domain)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create_tenant(&self, tenant: NewTenant) -> StoreResult<Tenant> {
        let schema_name = tenant.schema_name.clone();
        sqlx::query_as::<_, Tenant>(
            "INSERT INTO sys_tenant (schema_name, name, domain) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&tenant.schema_name)
        .bind(&tenant.name)
        .bind(&tenant.domain)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique(|| format!("租户 {} 已存在", schema_name)))
    }
}

const USER_FILTER: &str = "tenant_id = $1 AND NOT is_deleted
    AND ($2::text IS NULL OR username LIKE '%' || $2 || '%' OR name LIKE '%' || $2 || '%'
         OR mobile LIKE '%' || $2 || '%')
    AND ($3::bigint IS NULL OR dept_id = $3)
    AND ($4::boolean IS NULL OR is_active = $4)";

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, tenant: &str, user: NewUser, op: &Operator) -> StoreResult<User> {
        let username = user.username.clone();
        let name = user
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| user.username.clone());
        sqlx::query_as::<_, User>(
            "INSERT INTO sys_users (tenant_id, creator, modifier, dept_belong_id, username, email,
                mobile, avatar, name, gender, user_type, password_hash, is_active, is_superuser,
                role_ids, dept_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
             RETURNING *",
        )
        .bind(tenant)
        .bind(op.user_id)
        .bind(&op.username)
        .bind(op.dept_id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.mobile)
        .bind(&user.avatar)
        .bind(&name)
        .bind(user.gender)
        .bind(user.user_type)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.is_superuser)
        .bind(&user.role_ids)
        .bind(user.dept_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique(|| format!("用户名 {} 已存在", username)))
    }

    async fn get_user(&self, tenant: &str, id: i64) -> StoreResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT * FROM sys_users WHERE tenant_id = $1 AND id = $2 AND NOT is_deleted",
        )
        .bind(tenant)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_user_by_account(
        &self,
        tenant: &str,
        account: &str,
    ) -> StoreResult<Option<User>> {
        // 用户名优先，其次邮箱、手机号
        Ok(sqlx::query_as::<_, User>(
            "SELECT * FROM sys_users
             WHERE tenant_id = $1 AND NOT is_deleted
               AND (username = $2 OR email = $2 OR mobile = $2)
             ORDER BY CASE WHEN username = $2 THEN 0 WHEN email = $2 THEN 1 ELSE 2 END, id
             LIMIT 1",
        )
        .bind(tenant)
        .bind(account)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_users(
        &self,
        tenant: &str,
        query: &UserQuery,
        page: PageQuery,
    ) -> StoreResult<Page<User>> {
        let page = page.normalized();
        let search = query.search.as_deref().filter(|s| !s.is_empty());
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM sys_users WHERE {}",
            USER_FILTER
        ))
        .bind(tenant)
        .bind(search)
        .bind(query.dept_id)
        .bind(query.is_active)
        .fetch_one(&self.pool)
        .await?;
        let items = sqlx::query_as::<_, User>(&format!(
            "SELECT * FROM sys_users WHERE {} ORDER BY id LIMIT $5 OFFSET $6",
            USER_FILTER
        ))
        .bind(tenant)
        .bind(search)
        .bind(query.dept_id)
        .bind(query.is_active)
        .bind(page.limit as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(Page {
            page: page.page,
            limit: page.limit,
            total: total as u64,
            items,
        })
    }

    async fn update_user(&self, tenant: &str, user: &User, op: &Operator) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE sys_users SET email = $3, mobile = $4, avatar = $5, name = $6, gender = $7,
                user_type = $8, is_active = $9, is_superuser = $10, role_ids = $11, dept_id = $12,
                description = $13, modifier = COALESCE($14, modifier), update_datetime = now()
             WHERE tenant_id = $1 AND id = $2 AND NOT is_deleted
             RETURNING *",
        )
        .bind(tenant)
        .bind(user.id())
        .bind(&user.email)
        .bind(&user.mobile)
        .bind(&user.avatar)
        .bind(&user.name)
        .bind(user.gender)
        .bind(user.user_type)
        .bind(user.is_active)
        .bind(user.is_superuser)
        .bind(&user.role_ids)
        .bind(user.dept_id)
        .bind(&user.base.description)
        .bind(&op.username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique(|| format!("用户名 {} 已存在", user.username)))?
        .ok_or_else(|| not_found("用户"))
    }

    async fn delete_user(&self, tenant: &str, id: i64, op: &Operator) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE sys_users SET is_deleted = TRUE, modifier = COALESCE($3, modifier),
                update_datetime = now()
             WHERE tenant_id = $1 AND id = $2 AND NOT is_deleted",
        )
        .bind(tenant)
        .bind(id)
        .bind(&op.username)
        .execute(&self.pool)
        .await?;
        expect_affected(result.rows_affected(), "用户")
    }

    async fn record_login_failure(
        &self,
        tenant: &str,
        id: i64,
        max_error_count: i32,
    ) -> StoreResult<LoginFailure> {
        let row = sqlx::query(
            "WITH prev AS (
                SELECT id, is_active FROM sys_users
                WHERE tenant_id = $1 AND id = $2 AND NOT is_deleted
                FOR UPDATE
             )
             UPDATE sys_users u SET login_error_count = u.login_error_count + 1,
                is_active = CASE WHEN u.login_error_count + 1 >= $3 THEN FALSE ELSE u.is_active END
             FROM prev WHERE u.id = prev.id
             RETURNING u.login_error_count, (prev.is_active AND NOT u.is_active) AS locked",
        )
        .bind(tenant)
        .bind(id)
        .bind(max_error_count)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("用户"))?;
        Ok(LoginFailure {
            count: row.try_get("login_error_count")?,
            locked: row.try_get("locked")?,
        })
    }

    async fn record_login_success(
        &self,
        tenant: &str,
        id: i64,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE sys_users SET login_error_count = 0, last_login = $3
             WHERE tenant_id = $1 AND id = $2 AND NOT is_deleted",
        )
        .bind(tenant)
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        expect_affected(result.rows_affected(), "用户")
    }

    async fn set_password(
        &self,
        tenant: &str,
        id: i64,
        password_hash: &str,
        count_change: bool,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE sys_users SET password_hash = $3,
                pwd_change_count = pwd_change_count + CASE WHEN $4 THEN 1 ELSE 0 END,
                update_datetime = now()
             WHERE tenant_id = $1 AND id = $2 AND NOT is_deleted",
        )
        .bind(tenant)
        .bind(id)
        .bind(password_hash)
        .bind(count_change)
        .execute(&self.pool)
        .await?;
        expect_affected(result.rows_affected(), "用户")
    }

    async fn unlock_user(&self, tenant: &str, id: i64, op: &Operator) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE sys_users SET is_active = TRUE, login_error_count = 0,
                modifier = COALESCE($3, modifier), update_datetime = now()
             WHERE tenant_id = $1 AND id = $2 AND NOT is_deleted",
        )
        .bind(tenant)
        .bind(id)
        .bind(&op.username)
        .execute(&self.pool)
        .await?;
        expect_affected(result.rows_affected(), "用户")
    }
}

#[async_trait]
impl RoleStore for PgStore {
    async fn list_roles(&self, tenant: &str) -> StoreResult<Vec<Role>> {
        Ok(sqlx::query_as::<_, Role>(
            "SELECT * FROM sys_role WHERE tenant_id = $1 AND NOT is_deleted ORDER BY sort, id",
        )
        .bind(tenant)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_role(&self, tenant: &str, id: i64) -> StoreResult<Option<Role>> {
        Ok(sqlx::query_as::<_, Role>(
            "SELECT * FROM sys_role WHERE tenant_id = $1 AND id = $2 AND NOT is_deleted",
        )
        .bind(tenant)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn get_roles_by_ids(&self, tenant: &str, ids: &[i64]) -> StoreResult<Vec<Role>> {
        Ok(sqlx::query_as::<_, Role>(
            "SELECT * FROM sys_role WHERE tenant_id = $1 AND id = ANY($2) AND NOT is_deleted",
        )
        .bind(tenant)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_role(
        &self,
        tenant: &str,
        input: RoleInput,
        op: &Operator,
    ) -> StoreResult<Role> {
        let key = input.key.clone();
        sqlx::query_as::<_, Role>(
            "INSERT INTO sys_role (tenant_id, creator, modifier, dept_belong_id, description,
                name, key, sort, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(tenant)
        .bind(op.user_id)
        .bind(&op.username)
        .bind(op.dept_id)
        .bind(&input.description)
        .bind(&input.name)
        .bind(&input.key)
        .bind(input.sort)
        .bind(input.status)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique(|| format!("权限字符 {} 已存在", key)))
    }

    async fn update_role(&self, tenant: &str, role: &Role, op: &Operator) -> StoreResult<Role> {
        sqlx::query_as::<_, Role>(
            "UPDATE sys_role SET name = $3, key = $4, sort = $5, status = $6, description = $7,
                modifier = COALESCE($8, modifier), update_datetime = now()
             WHERE tenant_id = $1 AND id = $2 AND NOT is_deleted
             RETURNING *",
        )
        .bind(tenant)
        .bind(role.base.id)
        .bind(&role.name)
        .bind(&role.key)
        .bind(role.sort)
        .bind(role.status)
        .bind(&role.base.description)
        .bind(&op.username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique(|| format!("权限字符 {} 已存在", role.key)))?
        .ok_or_else(|| not_found("角色"))
    }

    async fn delete_role(&self, tenant: &str, id: i64, op: &Operator) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE sys_role SET is_deleted = TRUE, modifier = COALESCE($3, modifier),
                update_datetime = now()
             WHERE tenant_id = $1 AND id = $2 AND NOT is_deleted",
        )
        .bind(tenant)
        .bind(id)
        .bind(&op.username)
        .execute(&self.pool)
        .await?;
        expect_affected(result.rows_affected(), "角色")
    }
}

#[async_trait]
impl DeptStore for PgStore {
    async fn list_depts(&self, tenant: &str) -> StoreResult<Vec<Dept>> {
        Ok(sqlx::query_as::<_, Dept>(
            "SELECT * FROM sys_dept WHERE tenant_id = $1 AND NOT is_deleted ORDER BY sort, id",
        )
        .bind(tenant)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_dept(&self, tenant: &str, id: i64) -> StoreResult<Option<Dept>> {
        Ok(sqlx::query_as::<_, Dept>(
            "SELECT * FROM sys_dept WHERE tenant_id = $1 AND id = $2 AND NOT is_deleted",
        )
        .bind(tenant)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create_dept(
        &self,
        tenant: &str,
        input: DeptInput,
        op: &Operator,
    ) -> StoreResult<Dept> {
        let key = input.key.clone().filter(|k| !k.is_empty());
        sqlx::query_as::<_, Dept>(
            "INSERT INTO sys_dept (tenant_id, creator, modifier, dept_belong_id, description,
                name, key, sort, owner, phone, email, status, parent_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *",
        )
        .bind(tenant)
        .bind(op.user_id)
        .bind(&op.username)
        .bind(op.dept_id)
        .bind(&input.description)
        .bind(&input.name)
        .bind(&key)
        .bind(input.sort)
        .bind(&input.owner)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(input.status)
        .bind(input.parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique(|| {
            format!("关联字符 {} 已存在", key.clone().unwrap_or_default())
        }))
    }

    async fn update_dept(&self, tenant: &str, dept: &Dept, op: &Operator) -> StoreResult<Dept> {
        sqlx::query_as::<_, Dept>(
            "UPDATE sys_dept SET name = $3, key = $4, sort = $5, owner = $6, phone = $7,
                email = $8, status = $9, parent_id = $10, description = $11,
                modifier = COALESCE($12, modifier), update_datetime = now()
             WHERE tenant_id = $1 AND id = $2 AND NOT is_deleted
             RETURNING *",
        )
        .bind(tenant)
        .bind(dept.id())
        .bind(&dept.name)
        .bind(&dept.key)
        .bind(dept.sort)
        .bind(&dept.owner)
        .bind(&dept.phone)
        .bind(&dept.email)
        .bind(dept.status)
        .bind(dept.parent_id)
        .bind(&dept.base.description)
        .bind(&op.username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique(|| {
            format!("关联字符 {} 已存在", dept.key.clone().unwrap_or_default())
        }))?
        .ok_or_else(|| not_found("部门"))
    }

    async fn delete_depts(&self, tenant: &str, ids: &[i64], op: &Operator) -> StoreResult<()> {
        sqlx::query(
            "UPDATE sys_dept SET is_deleted = TRUE, modifier = COALESCE($3, modifier),
                update_datetime = now()
             WHERE tenant_id = $1 AND id = ANY($2) AND NOT is_deleted",
        )
        .bind(tenant)
        .bind(ids)
        .bind(&op.username)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SystemConfigStore for PgStore {
    async fn list_system_configs(&self, tenant: &str) -> StoreResult<Vec<SystemConfig>> {
        Ok(sqlx::query_as::<_, SystemConfig>(
            "SELECT * FROM sys_system_config WHERE tenant_id = $1 AND NOT is_deleted
             ORDER BY sort, id",
        )
        .bind(tenant)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_system_config(
        &self,
        tenant: &str,
        id: i64,
    ) -> StoreResult<Option<SystemConfig>> {
        Ok(sqlx::query_as::<_, SystemConfig>(
            "SELECT * FROM sys_system_config WHERE tenant_id = $1 AND id = $2 AND NOT is_deleted",
        )
        .bind(tenant)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create_system_config(
        &self,
        tenant: &str,
        input: SystemConfigInput,
        op: &Operator,
    ) -> StoreResult<SystemConfig> {
        let key = input.key.clone();
        sqlx::query_as::<_, SystemConfig>(
            "INSERT INTO sys_system_config (tenant_id, creator, modifier, dept_belong_id,
                parent_id, title, key, value, sort, status, data_options, form_item_type, rule,
                placeholder, setting)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING *",
        )
        .bind(tenant)
        .bind(op.user_id)
        .bind(&op.username)
        .bind(op.dept_id)
        .bind(input.parent_id)
        .bind(&input.title)
        .bind(&input.key)
        .bind(&input.value)
        .bind(input.sort)
        .bind(input.status)
        .bind(&input.data_options)
        .bind(input.form_item_type.unwrap_or(0))
        .bind(&input.rule)
        .bind(&input.placeholder)
        .bind(&input.setting)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique(|| format!("配置键 {} 已存在", key)))
    }

    async fn update_system_config(
        &self,
        tenant: &str,
        config: &SystemConfig,
        op: &Operator,
    ) -> StoreResult<SystemConfig> {
        sqlx::query_as::<_, SystemConfig>(
            "UPDATE sys_system_config SET parent_id = $3, title = $4, key = $5, value = $6,
                sort = $7, status = $8, data_options = $9, form_item_type = $10, rule = $11,
                placeholder = $12, setting = $13, modifier = COALESCE($14, modifier),
                update_datetime = now()
             WHERE tenant_id = $1 AND id = $2 AND NOT is_deleted
             RETURNING *",
        )
        .bind(tenant)
        .bind(config.id())
        .bind(config.parent_id)
        .bind(&config.title)
        .bind(&config.key)
        .bind(&config.value)
        .bind(config.sort)
        .bind(config.status)
        .bind(&config.data_options)
        .bind(config.form_item_type)
        .bind(&config.rule)
        .bind(&config.placeholder)
        .bind(&config.setting)
        .bind(&op.username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique(|| format!("配置键 {} 已存在", config.key)))?
        .ok_or_else(|| not_found("配置项"))
    }

    async fn delete_system_config(&self, tenant: &str, id: i64, op: &Operator) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE sys_system_config SET is_deleted = TRUE, modifier = COALESCE($3, modifier),
                update_datetime = now()
             WHERE tenant_id = $1 AND (id = $2 OR parent_id = $2) AND NOT is_deleted",
        )
        .bind(tenant)
        .bind(id)
        .bind(&op.username)
        .execute(&self.pool)
        .await?;
        expect_affected(result.rows_affected(), "配置项")
    }
}

#[async_trait]
impl OperationLogStore for PgStore {
    async fn create_operation_log(&self, tenant: &str, log: NewOperationLog) -> StoreResult<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO sys_operation_log (tenant_id, creator, request_modular, request_path,
                request_body, request_method, request_msg, request_ip, request_browser,
                response_code, request_os, json_result, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, COALESCE($13, FALSE))
             RETURNING id",
        )
        .bind(tenant)
        .bind(log.creator)
        .bind(&log.request_modular)
        .bind(&log.request_path)
        .bind(&log.request_body)
        .bind(&log.request_method)
        .bind(&log.request_msg)
        .bind(&log.request_ip)
        .bind(&log.request_browser)
        .bind(&log.response_code)
        .bind(&log.request_os)
        .bind(&log.json_result)
        .bind(log.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_operation_log(
        &self,
        tenant: &str,
        id: i64,
        log: NewOperationLog,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE sys_operation_log SET
                creator = COALESCE($3, creator),
                request_modular = COALESCE($4, request_modular),
                request_path = COALESCE($5, request_path),
                request_body = COALESCE($6, request_body),
                request_method = COALESCE($7, request_method),
                request_msg = COALESCE($8, request_msg),
                request_ip = COALESCE($9, request_ip),
                request_browser = COALESCE($10, request_browser),
                response_code = COALESCE($11, response_code),
                request_os = COALESCE($12, request_os),
                json_result = COALESCE($13, json_result),
                status = COALESCE($14, status),
                update_datetime = now()
             WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant)
        .bind(id)
        .bind(log.creator)
        .bind(&log.request_modular)
        .bind(&log.request_path)
        .bind(&log.request_body)
        .bind(&log.request_method)
        .bind(&log.request_msg)
        .bind(&log.request_ip)
        .bind(&log.request_browser)
        .bind(&log.response_code)
        .bind(&log.request_os)
        .bind(&log.json_result)
        .bind(log.status)
        .execute(&self.pool)
        .await?;
        expect_affected(result.rows_affected(), "操作日志")
    }

    async fn get_operation_log(
        &self,
        tenant: &str,
        id: i64,
    ) -> StoreResult<Option<OperationLog>> {
        Ok(sqlx::query_as::<_, OperationLog>(
            "SELECT * FROM sys_operation_log WHERE tenant_id = $1 AND id = $2 AND NOT is_deleted",
        )
        .bind(tenant)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_operation_logs(
        &self,
        tenant: &str,
        page: PageQuery,
    ) -> StoreResult<Page<OperationLog>> {
        let page = page.normalized();
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sys_operation_log WHERE tenant_id = $1 AND NOT is_deleted",
        )
        .bind(tenant)
        .fetch_one(&self.pool)
        .await?;
        let items = sqlx::query_as::<_, OperationLog>(
            "SELECT * FROM sys_operation_log WHERE tenant_id = $1 AND NOT is_deleted
             ORDER BY create_datetime DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(tenant)
        .bind(page.limit as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(Page {
            page: page.page,
            limit: page.limit,
            total: total as u64,
            items,
        })
    }
}

#[async_trait]
impl LoginLogStore for PgStore {
    async fn create_login_log(
        &self,
        tenant: &str,
        log: NewLoginLog,
        op: &Operator,
    ) -> StoreResult<LoginLog> {
        Ok(sqlx::query_as::<_, LoginLog>(
            "INSERT INTO sys_login_log (tenant_id, creator, modifier, dept_belong_id, username,
                ip, agent, browser, os, login_type)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(tenant)
        .bind(op.user_id)
        .bind(&op.username)
        .bind(op.dept_id)
        .bind(&log.username)
        .bind(&log.ip)
        .bind(&log.agent)
        .bind(&log.browser)
        .bind(&log.os)
        .bind(log.login_type)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_login_logs(&self, tenant: &str, page: PageQuery) -> StoreResult<Page<LoginLog>> {
        let page = page.normalized();
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sys_login_log WHERE tenant_id = $1 AND NOT is_deleted",
        )
        .bind(tenant)
        .fetch_one(&self.pool)
        .await?;
        let items = sqlx::query_as::<_, LoginLog>(
            "SELECT * FROM sys_login_log WHERE tenant_id = $1 AND NOT is_deleted
             ORDER BY create_datetime DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(tenant)
        .bind(page.limit as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(Page {
            page: page.page,
            limit: page.limit,
            total: total as u64,
            items,
        })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
