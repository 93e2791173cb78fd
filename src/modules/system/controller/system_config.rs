//! 系统配置管理，所有写操作完成后刷新所属租户的配置缓存

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::middleware::{set_request_msg, CurrentUser};
use crate::modules::system::models::SystemConfigInput;
use crate::response::DetailResponse;
use crate::state::AppState;
use crate::store::SystemConfigStore;

#[derive(Debug, Deserialize)]
pub struct KeyQuery {
    #[serde(default)]
    pub key: String,
}

async fn refresh_cache(state: &AppState, tenant: &str) -> AppResult<()> {
    state
        .config_cache
        .refresh(state.store.as_ref(), tenant)
        .await?;
    Ok(())
}

async fn check_parent(state: &AppState, tenant: &str, input: &SystemConfigInput) -> AppResult<()> {
    if let Some(parent_id) = input.parent_id {
        let parent = state
            .store
            .get_system_config(tenant, parent_id)
            .await?
            .ok_or_else(|| AppError::validation("上级配置不存在"))?;
        if parent.parent_id.is_some() {
            return Err(AppError::validation("配置项只能挂在分组下"));
        }
    }
    Ok(())
}

#[get("/api/system/system_config/")]
pub async fn list(state: web::Data<AppState>, user: CurrentUser) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    let rows = state.store.list_system_configs(&user.tenant).await?;
    Ok(DetailResponse::new(rows).into_response())
}

/// 按键读取缓存中的配置值
#[get("/api/system/system_config/values/")]
pub async fn values(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<KeyQuery>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    let value = state
        .config_cache
        .get_system_config_values(state.store.as_ref(), &user.tenant, &query.key)
        .await?;
    Ok(DetailResponse::new(value.unwrap_or(Value::Null)).into_response())
}

/// 数组类型配置转为字典
#[get("/api/system/system_config/dict/")]
pub async fn dict(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<KeyQuery>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    let dict = state
        .config_cache
        .get_system_config_values_to_dict(state.store.as_ref(), &user.tenant, &query.key)
        .await?;
    Ok(DetailResponse::new(dict).into_response())
}

#[post("/api/system/system_config/")]
pub async fn create(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<SystemConfigInput>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    set_request_msg(&req, "新增系统配置");
    let input = body.into_inner();
    check_parent(&state, &user.tenant, &input).await?;
    let config = state
        .store
        .create_system_config(&user.tenant, input, &user.operator())
        .await?;
    refresh_cache(&state, &user.tenant).await?;
    Ok(DetailResponse::with_msg(config, "新增成功").into_response())
}

#[put("/api/system/system_config/{id}/")]
pub async fn update(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
    body: web::Json<SystemConfigInput>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    set_request_msg(&req, "修改系统配置");
    let id = path.into_inner();
    let input = body.into_inner();
    if input.parent_id == Some(id) {
        return Err(AppError::validation("上级配置不能是自身"));
    }
    check_parent(&state, &user.tenant, &input).await?;
    let mut config = state
        .store
        .get_system_config(&user.tenant, id)
        .await?
        .ok_or_else(|| AppError::not_found("系统配置"))?;
    // 子项只能挂在分组下，分组仍有子项时不能再挂到别处
    if input.parent_id.is_some() {
        let rows = state.store.list_system_configs(&user.tenant).await?;
        if rows.iter().any(|row| row.parent_id == Some(id)) {
            return Err(AppError::validation("该分组下仍有配置项，不能设置上级配置"));
        }
    }
    input.apply(&mut config);
    let config = state
        .store
        .update_system_config(&user.tenant, &config, &user.operator())
        .await?;
    refresh_cache(&state, &user.tenant).await?;
    Ok(DetailResponse::with_msg(config, "更新成功").into_response())
}

#[delete("/api/system/system_config/{id}/")]
pub async fn remove(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    set_request_msg(&req, "删除系统配置");
    state
        .store
        .delete_system_config(&user.tenant, path.into_inner(), &user.operator())
        .await?;
    refresh_cache(&state, &user.tenant).await?;
    Ok(DetailResponse::with_msg(Value::Null, "删除成功").into_response())
}
