use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::middleware::{set_request_msg, CurrentUser};
use crate::modules::system::dept::region_name;
use crate::modules::system::models::{user::USER_TYPE_BACKEND, NewUser, User, UserQuery, UserUpdate};
use crate::modules::system::password::{hash_password, validate_new_password, verify_password};
use crate::response::{DetailResponse, PageQuery, SuccessResponse};
use crate::state::AppState;
use crate::store::{DeptStore, RoleStore, UserStore};

/// 未指定密码时使用的初始密码
pub const DEFAULT_PASSWORD: &str = "admin123456";

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub avatar: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub gender: i32,
    #[serde(default)]
    pub role_ids: Vec<i64>,
    pub dept_id: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "oldPassword")]
    pub old_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
    #[serde(rename = "newPassword2")]
    pub new_password2: String,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    #[serde(flatten)]
    pub user: User,
    pub role_info: Vec<RoleBrief>,
    pub dept_info: Option<DeptBrief>,
}

#[derive(Debug, Serialize)]
pub struct RoleBrief {
    pub id: i64,
    pub name: String,
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct DeptBrief {
    pub dept_id: i64,
    pub dept_name: String,
    pub region_name: Option<String>,
}

async fn check_refs(
    state: &AppState,
    tenant: &str,
    role_ids: Option<&[i64]>,
    dept_id: Option<i64>,
) -> AppResult<()> {
    if let Some(role_ids) = role_ids {
        let roles = state.store.get_roles_by_ids(tenant, role_ids).await?;
        if roles.len() != role_ids.len() {
            return Err(AppError::validation("角色不存在"));
        }
    }
    if let Some(dept_id) = dept_id {
        state
            .store
            .get_dept(tenant, dept_id)
            .await?
            .ok_or_else(|| AppError::validation("部门不存在"))?;
    }
    Ok(())
}

fn load_user(user: Option<User>) -> AppResult<User> {
    user.ok_or_else(|| AppError::not_found("用户"))
}

#[get("/api/system/user/")]
pub async fn list(
    state: web::Data<AppState>,
    user: CurrentUser,
    page: web::Query<PageQuery>,
    query: web::Query<UserQuery>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    let users = state
        .store
        .list_users(&user.tenant, &query, page.into_inner())
        .await?;
    Ok(SuccessResponse::new(users).into_response())
}

#[post("/api/system/user/")]
pub async fn create(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<CreateUserRequest>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    set_request_msg(&req, "新增用户");
    let body = body.into_inner();
    let username = body.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::validation("用户名不能为空"));
    }
    let password = body
        .password
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PASSWORD.to_string());
    validate_new_password(&password)?;
    check_refs(&state, &user.tenant, Some(body.role_ids.as_slice()), body.dept_id).await?;

    let password_hash = hash_password(password, state.settings.password.bcrypt_cost).await?;
    let created = state
        .store
        .create_user(
            &user.tenant,
            NewUser {
                username,
                email: body.email.filter(|v| !v.is_empty()),
                mobile: body.mobile.filter(|v| !v.is_empty()),
                avatar: body.avatar,
                name: body.name.filter(|v| !v.is_empty()),
                gender: body.gender,
                user_type: USER_TYPE_BACKEND,
                password_hash,
                is_active: body.is_active,
                is_superuser: false,
                role_ids: body.role_ids,
                dept_id: body.dept_id,
            },
            &user.operator(),
        )
        .await?;
    Ok(DetailResponse::with_msg(created, "新增成功").into_response())
}

/// 当前用户信息
#[get("/api/system/user/user_info/")]
pub async fn user_info(state: web::Data<AppState>, user: CurrentUser) -> AppResult<HttpResponse> {
    let roles = state
        .store
        .get_roles_by_ids(&user.tenant, &user.user.role_ids)
        .await?;
    let dept_info = match user.user.dept_id {
        Some(dept_id) => {
            let depts = state.store.list_depts(&user.tenant).await?;
            depts.iter().find(|d| d.id() == dept_id).map(|dept| DeptBrief {
                dept_id,
                dept_name: dept.name.clone(),
                region_name: region_name(&depts, dept_id),
            })
        }
        None => None,
    };
    Ok(DetailResponse::new(UserInfo {
        role_info: roles
            .into_iter()
            .map(|role| RoleBrief {
                id: role.base.id,
                name: role.name,
                key: role.key,
            })
            .collect(),
        dept_info,
        user: user.user,
    })
    .into_response())
}

/// 修改自己的密码
#[put("/api/system/user/change_password/")]
pub async fn change_password(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<ChangePasswordRequest>,
) -> AppResult<HttpResponse> {
    set_request_msg(&req, "修改密码");
    let body = body.into_inner();
    if body.new_password != body.new_password2 {
        return Err(AppError::validation("两次密码不匹配"));
    }
    validate_new_password(&body.new_password)?;
    if !verify_password(body.old_password, user.user.password_hash.clone()).await? {
        return Err(AppError::validation("旧密码不正确"));
    }
    let password_hash =
        hash_password(body.new_password, state.settings.password.bcrypt_cost).await?;
    state
        .store
        .set_password(&user.tenant, user.id(), &password_hash, true)
        .await?;
    Ok(DetailResponse::with_msg(Value::Null, "修改成功").into_response())
}

#[put("/api/system/user/{id}/")]
pub async fn update(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
    body: web::Json<UserUpdate>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    set_request_msg(&req, "修改用户");
    let update = body.into_inner();
    check_refs(&state, &user.tenant, update.role_ids.as_deref(), update.dept_id).await?;
    let mut target = load_user(state.store.get_user(&user.tenant, path.into_inner()).await?)?;
    update.apply(&mut target);
    let updated = state
        .store
        .update_user(&user.tenant, &target, &user.operator())
        .await?;
    Ok(DetailResponse::with_msg(updated, "更新成功").into_response())
}

#[delete("/api/system/user/{id}/")]
pub async fn remove(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    set_request_msg(&req, "删除用户");
    let id = path.into_inner();
    if id == user.id() {
        return Err(AppError::validation("不能删除当前登录用户"));
    }
    state
        .store
        .delete_user(&user.tenant, id, &user.operator())
        .await?;
    Ok(DetailResponse::with_msg(Value::Null, "删除成功").into_response())
}

/// 管理员重置密码
#[put("/api/system/user/{id}/reset_password/")]
pub async fn reset_password(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
    body: web::Json<ResetPasswordRequest>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    set_request_msg(&req, "重置密码");
    let target = load_user(state.store.get_user(&user.tenant, path.into_inner()).await?)?;
    let body = body.into_inner();
    validate_new_password(&body.new_password)?;
    let password_hash =
        hash_password(body.new_password, state.settings.password.bcrypt_cost).await?;
    state
        .store
        .set_password(&user.tenant, target.id(), &password_hash, false)
        .await?;
    Ok(DetailResponse::with_msg(Value::Null, "密码重置成功").into_response())
}

/// 解锁被登录失败锁定的账号
#[put("/api/system/user/{id}/unlock/")]
pub async fn unlock(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    set_request_msg(&req, "解锁用户");
    let target = load_user(state.store.get_user(&user.tenant, path.into_inner()).await?)?;
    state
        .store
        .unlock_user(&user.tenant, target.id(), &user.operator())
        .await?;
    tracing::info!(tenant = %user.tenant, username = %target.username, "账号已解锁");
    Ok(DetailResponse::with_msg(Value::Null, "解锁成功").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::system::controller::test_support::{admin, bearer, seeded_state};
    use crate::modules::system::models::{Operator, PUBLIC_SCHEMA};
    use crate::modules::system::password::verify_password_sync;
    use crate::modules::system::routes::configure_system;
    use actix_web::{test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_create_list_and_update() {
        let state = seeded_state().await;
        let admin = admin(&state).await;
        let auth = bearer(&state, &admin);
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure_system),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/system/user/")
            .insert_header(auth.clone())
            .set_json(json!({"username": "alice", "password": "alice-pass", "dept_id": admin.dept_id}))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["code"], 2000);
        assert_eq!(body["data"]["name"], "alice");
        assert!(body["data"].get("password_hash").is_none());
        let id = body["data"]["id"].as_i64().unwrap();

        let req = test::TestRequest::get()
            .uri("/api/system/user/?page=1&limit=1&search=ali")
            .insert_header(auth.clone())
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["limit"], 1);
        assert_eq!(body["data"][0]["username"], "alice");

        let req = test::TestRequest::put()
            .uri(&format!("/api/system/user/{}/", id))
            .insert_header(auth.clone())
            .set_json(json!({"name": "Alice", "role_ids": [9999]}))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["msg"], "角色不存在");

        let req = test::TestRequest::put()
            .uri(&format!("/api/system/user/{}/", id))
            .insert_header(auth.clone())
            .set_json(json!({"name": "Alice", "is_active": false}))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["data"]["name"], "Alice");
        assert_eq!(body["data"]["is_active"], false);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/system/user/{}/", admin.id()))
            .insert_header(auth)
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["msg"], "不能删除当前登录用户");
    }

    #[actix_web::test]
    async fn test_passwords_and_unlock() {
        let state = seeded_state().await;
        let admin = admin(&state).await;
        let auth = bearer(&state, &admin);
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure_system),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/api/system/user/change_password/")
            .insert_header(auth.clone())
            .set_json(json!({"oldPassword": "bad", "newPassword": "new-pass", "newPassword2": "new-pass"}))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["msg"], "旧密码不正确");

        let req = test::TestRequest::put()
            .uri("/api/system/user/change_password/")
            .insert_header(auth.clone())
            .set_json(json!({"oldPassword": crate::store::seed::ADMIN_PASSWORD, "newPassword": "new-pass", "newPassword2": "new-pass"}))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["code"], 2000);
        let reloaded = state.store.get_user(PUBLIC_SCHEMA, admin.id()).await.unwrap().unwrap();
        assert_eq!(reloaded.pwd_change_count, admin.pwd_change_count + 1);
        assert!(verify_password_sync("new-pass", &reloaded.password_hash));

        // 锁定后由管理员解锁
        for _ in 0..5 {
            state
                .store
                .record_login_failure(PUBLIC_SCHEMA, admin.id(), 5)
                .await
                .unwrap();
        }
        let locked = state.store.get_user(PUBLIC_SCHEMA, admin.id()).await.unwrap().unwrap();
        assert!(!locked.is_active);
        state
            .store
            .unlock_user(PUBLIC_SCHEMA, admin.id(), &Operator::system())
            .await
            .unwrap();
        let user = state.store.get_user(PUBLIC_SCHEMA, admin.id()).await.unwrap().unwrap();
        assert!(user.is_active);
        assert_eq!(user.login_error_count, 0);

        let req = test::TestRequest::put()
            .uri(&format!("/api/system/user/{}/reset_password/", admin.id()))
            .insert_header(auth.clone())
            .set_json(json!({"newPassword": "123"}))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["msg"], "密码长度不能少于6位");

        let req = test::TestRequest::put()
            .uri(&format!("/api/system/user/{}/unlock/", admin.id()))
            .insert_header(auth)
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["msg"], "解锁成功");
    }

    #[actix_web::test]
    async fn test_user_info() {
        let state = seeded_state().await;
        let admin = admin(&state).await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure_system),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/api/system/user/user_info/")
            .insert_header(bearer(&state, &admin))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["data"]["username"], "admin");
        assert_eq!(body["data"]["role_info"][0]["key"], "admin");
        assert_eq!(body["data"]["dept_info"]["region_name"], "总部");
    }
}
