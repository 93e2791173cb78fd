//! 内存存储，用于未配置数据库的部署与测试

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use super::{
    DeptStore, LoginLogStore, OperationLogStore, RoleStore, Store, StoreError, StoreResult,
    SystemConfigStore, TenantStore, UserStore,
};
use crate::modules::system::models::{
    BaseEntity, Dept, DeptInput, LoginFailure, LoginLog, NewLoginLog, NewOperationLog, NewTenant,
    NewUser, OperationLog, Operator, Role, RoleInput, SystemConfig, SystemConfigInput, Tenant,
    User, UserQuery,
};
use crate::response::{Page, PageQuery};

#[derive(Default)]
struct Tables {
    tenants: Vec<Tenant>,
    users: Vec<User>,
    roles: Vec<Role>,
    depts: Vec<Dept>,
    system_configs: Vec<SystemConfig>,
    operation_logs: Vec<OperationLog>,
    login_logs: Vec<LoginLog>,
}

/// 进程内存储
pub struct MemoryStore {
    tables: RwLock<Tables>,
    sequence: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            sequence: AtomicI64::new(1),
        }
    }

    fn next_id(&self) -> i64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }
}

type BaseOf<T> = fn(&T) -> &BaseEntity;

fn live<'a, T>(
    rows: &'a [T],
    tenant: &'a str,
    base: BaseOf<T>,
) -> impl Iterator<Item = &'a T> + 'a {
    rows.iter().filter(move |row| {
        let b = base(*row);
        !b.is_deleted && b.tenant_id == tenant
    })
}

fn live_mut<'a, T>(
    rows: &'a mut [T],
    tenant: &'a str,
    id: i64,
    base: BaseOf<T>,
) -> Option<&'a mut T> {
    rows.iter_mut().find(|row| {
        let b = base(&**row);
        !b.is_deleted && b.tenant_id == tenant && b.id == id
    })
}

fn newest_first<T: Clone>(
    rows: &[T],
    tenant: &str,
    base: BaseOf<T>,
    page: PageQuery,
) -> Page<T> {
    let mut all: Vec<T> = live(rows, tenant, base).cloned().collect();
    all.sort_by(|a, b| {
        base(b)
            .create_datetime
            .cmp(&base(a).create_datetime)
            .then(base(b).id.cmp(&base(a).id))
    });
    Page::slice(all, page)
}

#[async_trait]
impl TenantStore for MemoryStore {
    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>> {
        Ok(self.tables.read().tenants.clone())
    }

    async fn get_tenant_by_schema(&self, schema_name: &str) -> StoreResult<Option<Tenant>> {
        Ok(self
            .tables
            .read()
            .tenants
            .iter()
            .find(|t| t.schema_name == schema_name)
            .cloned())
    }

    async fn get_tenant_by_domain(&self, domain: &str) -> StoreResult<Option<Tenant>> {
        Ok(self
            .tables
            .read()
            .tenants
            .iter()
            .find(|t| t.domain.as_deref() == Some(domain))
            .cloned())
    }

    async fn create_tenant(&self, tenant: NewTenant) -> StoreResult<Tenant> {
        let mut tables = self.tables.write();
        if tables
            .tenants
            .iter()
            .any(|t| t.schema_name == tenant.schema_name)
        {
            return Err(StoreError::Conflict(format!(
                "租户 {} 已存在",
                tenant.schema_name
            )));
        }
        let row = Tenant {
            id: self.next_id(),
            schema_name: tenant.schema_name,
            name: tenant.name,
            domain: tenant.domain,
            create_datetime: Utc::now(),
        };
        tables.tenants.push(row.clone());
        Ok(row)
    }
}

fn user_base(u: &User) -> &BaseEntity {
    &u.base
}

fn ensure_unique_username(tables: &Tables, tenant: &str, username: &str, id: i64) -> StoreResult<()> {
    if live(&tables.users, tenant, user_base).any(|u| u.username == username && u.id() != id) {
        return Err(StoreError::Conflict(format!("用户名 {} 已存在", username)));
    }
    Ok(())
}

fn user_not_found() -> StoreError {
    StoreError::NotFound("用户不存在".to_string())
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, tenant: &str, user: NewUser, op: &Operator) -> StoreResult<User> {
        let mut tables = self.tables.write();
        ensure_unique_username(&tables, tenant, &user.username, 0)?;
        let name = user
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| user.username.clone());
        let row = User {
            base: BaseEntity::new(self.next_id(), tenant, op),
            username: user.username,
            email: user.email,
            mobile: user.mobile,
            avatar: user.avatar,
            name,
            gender: user.gender,
            user_type: user.user_type,
            password_hash: user.password_hash,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            role_ids: user.role_ids,
            dept_id: user.dept_id,
            login_error_count: 0,
            pwd_change_count: 0,
            last_login: None,
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn get_user(&self, tenant: &str, id: i64) -> StoreResult<Option<User>> {
        let tables = self.tables.read();
        let found = live(&tables.users, tenant, user_base)
            .find(|u| u.id() == id)
            .cloned();
        Ok(found)
    }

    async fn find_user_by_account(
        &self,
        tenant: &str,
        account: &str,
    ) -> StoreResult<Option<User>> {
        let tables = self.tables.read();
        let by_username = live(&tables.users, tenant, user_base).find(|u| u.username == account);
        let found = by_username
            .or_else(|| {
                live(&tables.users, tenant, user_base)
                    .find(|u| u.email.as_deref() == Some(account))
            })
            .or_else(|| {
                live(&tables.users, tenant, user_base)
                    .find(|u| u.mobile.as_deref() == Some(account))
            });
        Ok(found.cloned())
    }

    async fn list_users(
        &self,
        tenant: &str,
        query: &UserQuery,
        page: PageQuery,
    ) -> StoreResult<Page<User>> {
        let tables = self.tables.read();
        let mut all: Vec<User> = live(&tables.users, tenant, user_base)
            .filter(|u| query.matches(u))
            .cloned()
            .collect();
        all.sort_by_key(|u| u.id());
        Ok(Page::slice(all, page))
    }

    async fn update_user(&self, tenant: &str, user: &User, op: &Operator) -> StoreResult<User> {
        let mut tables = self.tables.write();
        ensure_unique_username(&tables, tenant, &user.username, user.id())?;
        let row = live_mut(&mut tables.users, tenant, user.id(), user_base)
            .ok_or_else(user_not_found)?;
        row.email = user.email.clone();
        row.mobile = user.mobile.clone();
        row.avatar = user.avatar.clone();
        row.name = user.name.clone();
        row.gender = user.gender;
        row.user_type = user.user_type;
        row.is_active = user.is_active;
        row.is_superuser = user.is_superuser;
        row.role_ids = user.role_ids.clone();
        row.dept_id = user.dept_id;
        row.base.description = user.base.description.clone();
        row.base.touch(op);
        Ok(row.clone())
    }

    async fn delete_user(&self, tenant: &str, id: i64, op: &Operator) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let row = live_mut(&mut tables.users, tenant, id, user_base).ok_or_else(user_not_found)?;
        row.base.is_deleted = true;
        row.base.touch(op);
        Ok(())
    }

    async fn record_login_failure(
        &self,
        tenant: &str,
        id: i64,
        max_error_count: i32,
    ) -> StoreResult<LoginFailure> {
        let mut tables = self.tables.write();
        let row = live_mut(&mut tables.users, tenant, id, user_base).ok_or_else(user_not_found)?;
        row.login_error_count += 1;
        let locked = row.is_active && row.login_error_count >= max_error_count;
        if locked {
            row.is_active = false;
        }
        Ok(LoginFailure {
            count: row.login_error_count,
            locked,
        })
    }

    async fn record_login_success(
        &self,
        tenant: &str,
        id: i64,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let row = live_mut(&mut tables.users, tenant, id, user_base).ok_or_else(user_not_found)?;
        row.login_error_count = 0;
        row.last_login = Some(at);
        Ok(())
    }

    async fn set_password(
        &self,
        tenant: &str,
        id: i64,
        password_hash: &str,
        count_change: bool,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let row = live_mut(&mut tables.users, tenant, id, user_base).ok_or_else(user_not_found)?;
        row.password_hash = password_hash.to_string();
        if count_change {
            row.pwd_change_count += 1;
        }
        row.base.update_datetime = Utc::now();
        Ok(())
    }

    async fn unlock_user(&self, tenant: &str, id: i64, op: &Operator) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let row = live_mut(&mut tables.users, tenant, id, user_base).ok_or_else(user_not_found)?;
        row.is_active = true;
        row.login_error_count = 0;
        row.base.touch(op);
        Ok(())
    }
}

fn role_base(r: &Role) -> &BaseEntity {
    &r.base
}

fn ensure_unique_role_key(tables: &Tables, tenant: &str, key: &str, id: i64) -> StoreResult<()> {
    if live(&tables.roles, tenant, role_base).any(|r| r.key == key && r.base.id != id) {
        return Err(StoreError::Conflict(format!("权限字符 {} 已存在", key)));
    }
    Ok(())
}

fn sorted_by<T: Clone>(rows: impl Iterator<Item = T>, key: impl Fn(&T) -> (i32, i64)) -> Vec<T> {
    let mut all: Vec<T> = rows.collect();
    all.sort_by_key(|row| key(row));
    all
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn list_roles(&self, tenant: &str) -> StoreResult<Vec<Role>> {
        let tables = self.tables.read();
        Ok(sorted_by(
            live(&tables.roles, tenant, role_base).cloned(),
            |r| (r.sort, r.base.id),
        ))
    }

    async fn get_role(&self, tenant: &str, id: i64) -> StoreResult<Option<Role>> {
        let tables = self.tables.read();
        let found = live(&tables.roles, tenant, role_base)
            .find(|r| r.base.id == id)
            .cloned();
        Ok(found)
    }

    async fn get_roles_by_ids(&self, tenant: &str, ids: &[i64]) -> StoreResult<Vec<Role>> {
        let tables = self.tables.read();
        Ok(live(&tables.roles, tenant, role_base)
            .filter(|r| ids.contains(&r.base.id))
            .cloned()
            .collect())
    }

    async fn create_role(
        &self,
        tenant: &str,
        input: RoleInput,
        op: &Operator,
    ) -> StoreResult<Role> {
        let mut tables = self.tables.write();
        ensure_unique_role_key(&tables, tenant, &input.key, 0)?;
        let mut role = Role {
            base: BaseEntity::new(self.next_id(), tenant, op),
            name: String::new(),
            key: String::new(),
            sort: 1,
            status: true,
        };
        input.apply(&mut role);
        tables.roles.push(role.clone());
        Ok(role)
    }

    async fn update_role(&self, tenant: &str, role: &Role, op: &Operator) -> StoreResult<Role> {
        let mut tables = self.tables.write();
        ensure_unique_role_key(&tables, tenant, &role.key, role.base.id)?;
        let row = live_mut(&mut tables.roles, tenant, role.base.id, role_base)
            .ok_or_else(|| StoreError::NotFound("角色不存在".to_string()))?;
        row.name = role.name.clone();
        row.key = role.key.clone();
        row.sort = role.sort;
        row.status = role.status;
        row.base.description = role.base.description.clone();
        row.base.touch(op);
        Ok(row.clone())
    }

    async fn delete_role(&self, tenant: &str, id: i64, op: &Operator) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let row = live_mut(&mut tables.roles, tenant, id, role_base)
            .ok_or_else(|| StoreError::NotFound("角色不存在".to_string()))?;
        row.base.is_deleted = true;
        row.base.touch(op);
        Ok(())
    }
}

fn dept_base(d: &Dept) -> &BaseEntity {
    &d.base
}

fn ensure_unique_dept_key(
    tables: &Tables,
    tenant: &str,
    key: Option<&str>,
    id: i64,
) -> StoreResult<()> {
    if let Some(key) = key {
        if live(&tables.depts, tenant, dept_base)
            .any(|d| d.key.as_deref() == Some(key) && d.id() != id)
        {
            return Err(StoreError::Conflict(format!("关联字符 {} 已存在", key)));
        }
    }
    Ok(())
}

#[async_trait]
impl DeptStore for MemoryStore {
    async fn list_depts(&self, tenant: &str) -> StoreResult<Vec<Dept>> {
        let tables = self.tables.read();
        Ok(sorted_by(
            live(&tables.depts, tenant, dept_base).cloned(),
            |d| (d.sort, d.id()),
        ))
    }

    async fn get_dept(&self, tenant: &str, id: i64) -> StoreResult<Option<Dept>> {
        let tables = self.tables.read();
        let found = live(&tables.depts, tenant, dept_base)
            .find(|d| d.id() == id)
            .cloned();
        Ok(found)
    }

    async fn create_dept(
        &self,
        tenant: &str,
        input: DeptInput,
        op: &Operator,
    ) -> StoreResult<Dept> {
        let mut tables = self.tables.write();
        let mut dept = Dept {
            base: BaseEntity::new(self.next_id(), tenant, op),
            name: String::new(),
            key: None,
            sort: 1,
            owner: None,
            phone: None,
            email: None,
            status: true,
            parent_id: None,
        };
        input.apply(&mut dept);
        ensure_unique_dept_key(&tables, tenant, dept.key.as_deref(), 0)?;
        tables.depts.push(dept.clone());
        Ok(dept)
    }

    async fn update_dept(&self, tenant: &str, dept: &Dept, op: &Operator) -> StoreResult<Dept> {
        let mut tables = self.tables.write();
        ensure_unique_dept_key(&tables, tenant, dept.key.as_deref(), dept.id())?;
        let row = live_mut(&mut tables.depts, tenant, dept.id(), dept_base)
            .ok_or_else(|| StoreError::NotFound("部门不存在".to_string()))?;
        let base = row.base.clone();
        *row = Dept {
            base,
            ..dept.clone()
        };
        row.base.description = dept.base.description.clone();
        row.base.touch(op);
        Ok(row.clone())
    }

    async fn delete_depts(&self, tenant: &str, ids: &[i64], op: &Operator) -> StoreResult<()> {
        let mut tables = self.tables.write();
        for row in tables.depts.iter_mut().filter(|d| {
            d.base.tenant_id == tenant && !d.base.is_deleted && ids.contains(&d.base.id)
        }) {
            row.base.is_deleted = true;
            row.base.touch(op);
        }
        Ok(())
    }
}

fn config_base(c: &SystemConfig) -> &BaseEntity {
    &c.base
}

fn ensure_unique_config_key(
    tables: &Tables,
    tenant: &str,
    key: &str,
    parent_id: Option<i64>,
    id: i64,
) -> StoreResult<()> {
    if live(&tables.system_configs, tenant, config_base)
        .any(|c| c.key == key && c.parent_id == parent_id && c.id() != id)
    {
        return Err(StoreError::Conflict(format!("配置键 {} 已存在", key)));
    }
    Ok(())
}

#[async_trait]
impl SystemConfigStore for MemoryStore {
    async fn list_system_configs(&self, tenant: &str) -> StoreResult<Vec<SystemConfig>> {
        let tables = self.tables.read();
        Ok(sorted_by(
            live(&tables.system_configs, tenant, config_base).cloned(),
            |c| (c.sort, c.id()),
        ))
    }

    async fn get_system_config(
        &self,
        tenant: &str,
        id: i64,
    ) -> StoreResult<Option<SystemConfig>> {
        let tables = self.tables.read();
        let found = live(&tables.system_configs, tenant, config_base)
            .find(|c| c.id() == id)
            .cloned();
        Ok(found)
    }

    async fn create_system_config(
        &self,
        tenant: &str,
        input: SystemConfigInput,
        op: &Operator,
    ) -> StoreResult<SystemConfig> {
        let mut tables = self.tables.write();
        ensure_unique_config_key(&tables, tenant, &input.key, input.parent_id, 0)?;
        let mut config = SystemConfig {
            base: BaseEntity::new(self.next_id(), tenant, op),
            parent_id: None,
            title: String::new(),
            key: String::new(),
            value: None,
            sort: 0,
            status: true,
            data_options: None,
            form_item_type: Some(0),
            rule: None,
            placeholder: None,
            setting: None,
        };
        input.apply(&mut config);
        tables.system_configs.push(config.clone());
        Ok(config)
    }

    async fn update_system_config(
        &self,
        tenant: &str,
        config: &SystemConfig,
        op: &Operator,
    ) -> StoreResult<SystemConfig> {
        let mut tables = self.tables.write();
        ensure_unique_config_key(&tables, tenant, &config.key, config.parent_id, config.id())?;
        let row = live_mut(&mut tables.system_configs, tenant, config.id(), config_base)
            .ok_or_else(|| StoreError::NotFound("配置项不存在".to_string()))?;
        let base = row.base.clone();
        *row = SystemConfig {
            base,
            ..config.clone()
        };
        row.base.touch(op);
        Ok(row.clone())
    }

    async fn delete_system_config(&self, tenant: &str, id: i64, op: &Operator) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if live(&tables.system_configs, tenant, config_base).all(|c| c.id() != id) {
            return Err(StoreError::NotFound("配置项不存在".to_string()));
        }
        for row in tables.system_configs.iter_mut().filter(|c| {
            c.base.tenant_id == tenant
                && !c.base.is_deleted
                && (c.base.id == id || c.parent_id == Some(id))
        }) {
            row.base.is_deleted = true;
            row.base.touch(op);
        }
        Ok(())
    }
}

fn operation_log_base(l: &OperationLog) -> &BaseEntity {
    &l.base
}

#[async_trait]
impl OperationLogStore for MemoryStore {
    async fn create_operation_log(&self, tenant: &str, log: NewOperationLog) -> StoreResult<i64> {
        let operator = Operator {
            user_id: log.creator,
            ..Operator::system()
        };
        let mut row = OperationLog {
            base: BaseEntity::new(self.next_id(), tenant, &operator),
            request_modular: None,
            request_path: None,
            request_body: None,
            request_method: None,
            request_msg: None,
            request_ip: None,
            request_browser: None,
            response_code: None,
            request_os: None,
            json_result: None,
            status: false,
        };
        log.apply(&mut row);
        let id = row.base.id;
        self.tables.write().operation_logs.push(row);
        Ok(id)
    }

    async fn update_operation_log(
        &self,
        tenant: &str,
        id: i64,
        log: NewOperationLog,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let row = live_mut(&mut tables.operation_logs, tenant, id, operation_log_base)
            .ok_or_else(|| StoreError::NotFound("操作日志不存在".to_string()))?;
        log.apply(row);
        row.base.update_datetime = Utc::now();
        Ok(())
    }

    async fn get_operation_log(
        &self,
        tenant: &str,
        id: i64,
    ) -> StoreResult<Option<OperationLog>> {
        let tables = self.tables.read();
        let found = live(&tables.operation_logs, tenant, operation_log_base)
            .find(|l| l.base.id == id)
            .cloned();
        Ok(found)
    }

    async fn list_operation_logs(
        &self,
        tenant: &str,
        page: PageQuery,
    ) -> StoreResult<Page<OperationLog>> {
        let tables = self.tables.read();
        Ok(newest_first(
            &tables.operation_logs,
            tenant,
            operation_log_base,
            page,
        ))
    }
}

fn login_log_base(l: &LoginLog) -> &BaseEntity {
    &l.base
}

#[async_trait]
impl LoginLogStore for MemoryStore {
    async fn create_login_log(
        &self,
        tenant: &str,
        log: NewLoginLog,
        op: &Operator,
    ) -> StoreResult<LoginLog> {
        let row = LoginLog {
            base: BaseEntity::new(self.next_id(), tenant, op),
            username: log.username,
            ip: log.ip,
            agent: log.agent,
            browser: log.browser,
            os: log.os,
            login_type: log.login_type,
        };
        self.tables.write().login_logs.push(row.clone());
        Ok(row)
    }

    async fn list_login_logs(&self, tenant: &str, page: PageQuery) -> StoreResult<Page<LoginLog>> {
        let tables = self.tables.read();
        Ok(newest_first(&tables.login_logs, tenant, login_log_base, page))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::system::models::PUBLIC_SCHEMA;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: Some(format!("{}@example.com", username)),
            mobile: None,
            avatar: None,
            name: None,
            gender: 0,
            user_type: 0,
            password_hash: "hash".to_string(),
            is_active: true,
            is_superuser: false,
            role_ids: vec![],
            dept_id: None,
        }
    }

    #[tokio::test]
    async fn test_user_lookup_and_uniqueness() {
        let store = MemoryStore::new();
        let op = Operator::system();
        let user = store
            .create_user(PUBLIC_SCHEMA, new_user("alice"), &op)
            .await
            .unwrap();
        assert_eq!(user.name, "alice");

        let by_email = store
            .find_user_by_account(PUBLIC_SCHEMA, "alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id(), user.id());

        let dup = store.create_user(PUBLIC_SCHEMA, new_user("alice"), &op).await;
        assert!(matches!(dup, Err(StoreError::Conflict(_))));

        // 其他租户不可见
        assert!(store
            .find_user_by_account("other", "alice")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_login_failure_locks_at_threshold() {
        let store = MemoryStore::new();
        let user = store
            .create_user(PUBLIC_SCHEMA, new_user("bob"), &Operator::system())
            .await
            .unwrap();
        for expected in 1..3 {
            let failure = store
                .record_login_failure(PUBLIC_SCHEMA, user.id(), 3)
                .await
                .unwrap();
            assert_eq!(failure, LoginFailure { count: expected, locked: false });
        }
        let failure = store
            .record_login_failure(PUBLIC_SCHEMA, user.id(), 3)
            .await
            .unwrap();
        assert!(failure.locked);
        let locked = store.get_user(PUBLIC_SCHEMA, user.id()).await.unwrap().unwrap();
        assert!(!locked.is_active);

        store
            .unlock_user(PUBLIC_SCHEMA, user.id(), &Operator::system())
            .await
            .unwrap();
        let unlocked = store.get_user(PUBLIC_SCHEMA, user.id()).await.unwrap().unwrap();
        assert!(unlocked.is_active);
        assert_eq!(unlocked.login_error_count, 0);
    }

    #[tokio::test]
    async fn test_system_config_delete_cascades() {
        let store = MemoryStore::new();
        let op = Operator::system();
        let group = store
            .create_system_config(PUBLIC_SCHEMA, config_input(None, "base"), &op)
            .await
            .unwrap();
        store
            .create_system_config(PUBLIC_SCHEMA, config_input(Some(group.id()), "title"), &op)
            .await
            .unwrap();
        let dup = store
            .create_system_config(PUBLIC_SCHEMA, config_input(Some(group.id()), "title"), &op)
            .await;
        assert!(matches!(dup, Err(StoreError::Conflict(_))));

        store
            .delete_system_config(PUBLIC_SCHEMA, group.id(), &op)
            .await
            .unwrap();
        assert!(store
            .list_system_configs(PUBLIC_SCHEMA)
            .await
            .unwrap()
            .is_empty());
    }

    fn config_input(parent_id: Option<i64>, key: &str) -> SystemConfigInput {
        SystemConfigInput {
            parent_id,
            title: key.to_string(),
            key: key.to_string(),
            value: None,
            sort: 0,
            status: true,
            data_options: None,
            form_item_type: None,
            rule: None,
            placeholder: None,
            setting: None,
        }
    }
}
