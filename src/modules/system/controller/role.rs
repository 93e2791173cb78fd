use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::middleware::{set_request_msg, CurrentUser};
use crate::modules::system::models::RoleInput;
use crate::response::DetailResponse;
use crate::state::AppState;
use crate::store::RoleStore;

#[get("/api/system/role/")]
pub async fn list(state: web::Data<AppState>, user: CurrentUser) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    let roles = state.store.list_roles(&user.tenant).await?;
    Ok(DetailResponse::new(roles).into_response())
}

#[post("/api/system/role/")]
pub async fn create(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<RoleInput>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    set_request_msg(&req, "新增角色");
    let input = body.into_inner();
    if input.key.trim().is_empty() {
        return Err(AppError::validation("权限字符不能为空"));
    }
    let role = state
        .store
        .create_role(&user.tenant, input, &user.operator())
        .await?;
    Ok(DetailResponse::with_msg(role, "新增成功").into_response())
}

#[put("/api/system/role/{id}/")]
pub async fn update(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
    body: web::Json<RoleInput>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    set_request_msg(&req, "修改角色");
    let mut role = state
        .store
        .get_role(&user.tenant, path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("角色"))?;
    body.into_inner().apply(&mut role);
    let role = state
        .store
        .update_role(&user.tenant, &role, &user.operator())
        .await?;
    Ok(DetailResponse::with_msg(role, "更新成功").into_response())
}

#[delete("/api/system/role/{id}/")]
pub async fn remove(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    set_request_msg(&req, "删除角色");
    state
        .store
        .delete_role(&user.tenant, path.into_inner(), &user.operator())
        .await?;
    Ok(DetailResponse::with_msg(Value::Null, "删除成功").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::system::controller::test_support::{admin, bearer, seeded_state};
    use crate::modules::system::models::{NewUser, Operator, PUBLIC_SCHEMA};
    use crate::modules::system::routes::configure_system;
    use crate::store::UserStore;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_role_crud_and_duplicate_key() {
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
            .uri("/api/system/role/")
            .insert_header(auth.clone())
            .set_json(json!({"name": "运营", "key": "ops"}))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        let id = body["data"]["id"].as_i64().unwrap();

        let req = test::TestRequest::post()
            .uri("/api/system/role/")
            .insert_header(auth.clone())
            .set_json(json!({"name": "运营2", "key": "ops"}))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["code"], 4000);

        let req = test::TestRequest::put()
            .uri(&format!("/api/system/role/{}/", id))
            .insert_header(auth.clone())
            .set_json(json!({"name": "运营部", "key": "ops", "status": false}))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["data"]["name"], "运营部");
        assert_eq!(body["data"]["status"], false);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/system/role/{}/", id))
            .insert_header(auth.clone())
            .to_request();
        test::call_service(&app, req).await;
        let req = test::TestRequest::get()
            .uri("/api/system/role/")
            .insert_header(auth)
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_non_admin_forbidden() {
        let state = seeded_state().await;
        let user = state
            .store
            .create_user(
                PUBLIC_SCHEMA,
                NewUser {
                    username: "guest".to_string(),
                    email: None,
                    mobile: None,
                    avatar: None,
                    name: None,
                    gender: 0,
                    user_type: 0,
                    password_hash: String::new(),
                    is_active: true,
                    is_superuser: false,
                    role_ids: vec![],
                    dept_id: None,
                },
                &Operator::system(),
            )
            .await
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure_system),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/api/system/role/")
            .insert_header(bearer(&state, &user))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
