//! 初始化数据，可重复执行

use serde_json::json;

use super::{DeptStore, RoleStore, Store, SystemConfigStore, TenantStore, UserStore};
use crate::conf::AppSettings;
use crate::error::AppResult;
use crate::middleware::auth::ADMIN_ROLE_KEY;
use crate::modules::system::models::{
    user::USER_TYPE_BACKEND, Dept, DeptInput, NewTenant, NewUser, Operator, Role, RoleInput,
    SystemConfig, SystemConfigInput, PUBLIC_SCHEMA,
};
use crate::modules::system::password::hash_password;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123456";

const BASE_GROUP_KEY: &str = "base";
const CAPTCHA_STATE_KEY: &str = "captcha_state";
const FORM_ITEM_SWITCH: i32 = 9;

/// 初始化 public 租户
pub async fn seed(store: &dyn Store, settings: &AppSettings) -> AppResult<()> {
    if store.get_tenant_by_schema(PUBLIC_SCHEMA).await?.is_none() {
        store
            .create_tenant(NewTenant {
                schema_name: PUBLIC_SCHEMA.to_string(),
                name: "默认租户".to_string(),
                domain: None,
            })
            .await?;
        tracing::info!("已创建租户 {}", PUBLIC_SCHEMA);
    }
    seed_tenant(store, settings, PUBLIC_SCHEMA).await
}

/// 初始化单个租户的角色、部门、管理员与基础配置
pub async fn seed_tenant(store: &dyn Store, settings: &AppSettings, tenant: &str) -> AppResult<()> {
    let op = Operator::system();
    let role = ensure_admin_role(store, tenant, &op).await?;
    let dept = ensure_root_dept(store, tenant, &op).await?;

    if store.find_user_by_account(tenant, ADMIN_USERNAME).await?.is_none() {
        let password_hash =
            hash_password(ADMIN_PASSWORD.to_string(), settings.password.bcrypt_cost).await?;
        store
            .create_user(
                tenant,
                NewUser {
                    username: ADMIN_USERNAME.to_string(),
                    email: None,
                    mobile: None,
                    avatar: None,
                    name: Some("管理员".to_string()),
                    gender: 0,
                    user_type: USER_TYPE_BACKEND,
                    password_hash,
                    is_active: true,
                    is_superuser: true,
                    role_ids: vec![role.base.id],
                    dept_id: Some(dept.id()),
                },
                &op,
            )
            .await?;
        tracing::info!(tenant, "已创建超级管理员 {}", ADMIN_USERNAME);
    }

    ensure_base_config(store, tenant, &op).await?;
    Ok(())
}

async fn ensure_admin_role(store: &dyn Store, tenant: &str, op: &Operator) -> AppResult<Role> {
    let existing = store
        .list_roles(tenant)
        .await?
        .into_iter()
        .find(|role| role.key == ADMIN_ROLE_KEY);
    match existing {
        Some(role) => Ok(role),
        None => Ok(store
            .create_role(
                tenant,
                RoleInput {
                    name: "管理员".to_string(),
                    key: ADMIN_ROLE_KEY.to_string(),
                    sort: 1,
                    status: true,
                    description: None,
                },
                op,
            )
            .await?),
    }
}

async fn ensure_root_dept(store: &dyn Store, tenant: &str, op: &Operator) -> AppResult<Dept> {
    let existing = store
        .list_depts(tenant)
        .await?
        .into_iter()
        .find(|dept| dept.parent_id.is_none());
    match existing {
        Some(dept) => Ok(dept),
        None => Ok(store
            .create_dept(
                tenant,
                DeptInput {
                    name: "总部".to_string(),
                    key: Some("root".to_string()),
                    sort: 1,
                    owner: None,
                    phone: None,
                    email: None,
                    status: true,
                    parent_id: None,
                    description: None,
                },
                op,
            )
            .await?),
    }
}

async fn ensure_base_config(store: &dyn Store, tenant: &str, op: &Operator) -> AppResult<()> {
    let configs = store.list_system_configs(tenant).await?;
    let group = match configs
        .iter()
        .find(|c| c.parent_id.is_none() && c.key == BASE_GROUP_KEY)
    {
        Some(group) => group.clone(),
        None => {
            store
                .create_system_config(tenant, config_input(None, "基础配置", BASE_GROUP_KEY, None), op)
                .await?
        }
    };
    let has_captcha = configs
        .iter()
        .any(|c: &SystemConfig| c.parent_id == Some(group.id()) && c.key == CAPTCHA_STATE_KEY);
    if !has_captcha {
        let mut input = config_input(Some(group.id()), "开启验证码", CAPTCHA_STATE_KEY, Some(json!(true)));
        input.form_item_type = Some(FORM_ITEM_SWITCH);
        store.create_system_config(tenant, input, op).await?;
    }
    Ok(())
}

fn config_input(
    parent_id: Option<i64>,
    title: &str,
    key: &str,
    value: Option<serde_json::Value>,
) -> SystemConfigInput {
    SystemConfigInput {
        parent_id,
        title: title.to_string(),
        key: key.to_string(),
        value,
        sort: 0,
        status: true,
        data_options: None,
        form_item_type: Some(0),
        rule: None,
        placeholder: None,
        setting: None,
    }
}
