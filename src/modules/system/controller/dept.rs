use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::{set_request_msg, CurrentUser};
use crate::modules::system::dept::{self as dept_service, build_tree, descendant_ids, region_name};
use crate::modules::system::models::{Dept, DeptInput};
use crate::response::DetailResponse;
use crate::state::AppState;
use crate::store::DeptStore;

#[derive(Debug, Serialize)]
pub struct DeptDetail {
    #[serde(flatten)]
    pub dept: Dept,
    pub region_name: Option<String>,
    /// 自身及全部下级部门
    pub dept_ids: Vec<i64>,
}

/// 部门树
#[get("/api/system/dept/")]
pub async fn tree(state: web::Data<AppState>, user: CurrentUser) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    let depts = state.store.list_depts(&user.tenant).await?;
    Ok(DetailResponse::new(build_tree(&depts)).into_response())
}

#[get("/api/system/dept/{id}/")]
pub async fn detail(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    let id = path.into_inner();
    let depts = state.store.list_depts(&user.tenant).await?;
    let dept = depts
        .iter()
        .find(|d| d.id() == id)
        .cloned()
        .ok_or_else(|| AppError::not_found("部门"))?;
    Ok(DetailResponse::new(DeptDetail {
        region_name: region_name(&depts, id),
        dept_ids: descendant_ids(&depts, id),
        dept,
    })
    .into_response())
}

#[post("/api/system/dept/")]
pub async fn create(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<DeptInput>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    set_request_msg(&req, "新增部门");
    let dept = dept_service::create_dept(
        state.store.as_ref(),
        &user.tenant,
        body.into_inner(),
        &user.operator(),
    )
    .await?;
    Ok(DetailResponse::with_msg(dept, "新增成功").into_response())
}

#[put("/api/system/dept/{id}/")]
pub async fn update(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
    body: web::Json<DeptInput>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    set_request_msg(&req, "修改部门");
    let dept = dept_service::update_dept(
        state.store.as_ref(),
        &user.tenant,
        path.into_inner(),
        body.into_inner(),
        &user.operator(),
    )
    .await?;
    Ok(DetailResponse::with_msg(dept, "更新成功").into_response())
}

#[delete("/api/system/dept/{id}/")]
pub async fn remove(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    set_request_msg(&req, "删除部门");
    let count = dept_service::delete_dept(
        state.store.as_ref(),
        &user.tenant,
        path.into_inner(),
        &user.operator(),
    )
    .await?;
    Ok(DetailResponse::with_msg(json!({ "count": count }), "删除成功").into_response())
}
