use actix_web::{get, post, web, HttpRequest, HttpResponse};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::middleware::{set_request_msg, CurrentUser, TenantContext};
use crate::modules::system::login::{self as login_service, ClientInfo, LoginRequest, CAPTCHA_STATE_KEY};
use crate::modules::system::token::TokenType;
use crate::response::DetailResponse;
use crate::state::AppState;
use crate::store::UserStore;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access: String,
}

/// 账号登录
#[utoipa::path(
    post,
    path = "/api/login/",
    request_body = LoginRequest,
    responses((status = 200, description = "登录结果，失败时 code 为 4000", body = login_service::LoginResponse))
)]
#[post("/api/login/")]
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    tenant: TenantContext,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    set_request_msg(&req, "用户登录");
    let resp = login_service::login(
        &state,
        &tenant.schema_name,
        ClientInfo::from_request(&req),
        body.into_inner(),
    )
    .await?;
    Ok(DetailResponse::with_msg(resp, "登录成功").into_response())
}

/// 获取图片验证码；未开启时返回空对象
#[utoipa::path(
    get,
    path = "/api/captcha/",
    responses((status = 200, description = "{hashkey, image_base} 或 {}"))
)]
#[get("/api/captcha/")]
pub async fn captcha(state: web::Data<AppState>, tenant: TenantContext) -> AppResult<HttpResponse> {
    let enabled = state
        .config_cache
        .is_enabled(state.store.as_ref(), &tenant.schema_name, CAPTCHA_STATE_KEY)
        .await?;
    let data = if enabled {
        serde_json::to_value(state.captcha.issue())
            .map_err(|e| AppError::Internal(anyhow!(e)))?
    } else {
        json!({})
    };
    Ok(DetailResponse::new(data).into_response())
}

/// 用刷新令牌换取新的访问令牌
#[utoipa::path(
    post,
    path = "/api/token/refresh/",
    request_body = RefreshRequest,
    responses((status = 200, body = RefreshResponse), (status = 401, description = "刷新令牌无效"))
)]
#[post("/api/token/refresh/")]
pub async fn refresh_token(
    state: web::Data<AppState>,
    tenant: TenantContext,
    body: web::Json<RefreshRequest>,
) -> AppResult<HttpResponse> {
    let claims = state
        .tokens
        .verify(&body.refresh, TokenType::Refresh)
        .map_err(|e| AppError::unauthorized(e.to_string()))?;
    if claims.tenant != tenant.schema_name {
        return Err(AppError::unauthorized("令牌与租户不匹配"));
    }
    let user = state
        .store
        .get_user(&tenant.schema_name, claims.user_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| AppError::unauthorized("用户不存在或已被禁用"))?;
    let access = state
        .tokens
        .issue(user.id(), &user.username, &tenant.schema_name, TokenType::Access)
        .map_err(|e| AppError::Internal(anyhow!("签发令牌失败: {}", e)))?;
    Ok(DetailResponse::new(RefreshResponse { access }).into_response())
}

#[utoipa::path(
    post,
    path = "/api/logout/",
    responses((status = 200, description = "注销成功"), (status = 401, description = "未认证"))
)]
#[post("/api/logout/")]
pub async fn logout(req: HttpRequest, user: CurrentUser) -> AppResult<HttpResponse> {
    set_request_msg(&req, "用户注销");
    tracing::info!(tenant = %user.tenant, username = %user.user.username, "用户注销");
    Ok(DetailResponse::with_msg(serde_json::Value::Null, "注销成功").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::system::controller::test_support::{admin, bearer, seeded_state};
    use crate::modules::system::routes::configure_system;
    use crate::store::seed;
    use actix_web::{test, App};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_captcha_then_login() {
        let state = seeded_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure_system),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/captcha/").to_request()).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 2000);
        assert_eq!(body["data"]["hashkey"].as_str().unwrap().len(), 40);

        // 缺少验证码
        let req = test::TestRequest::post()
            .uri("/api/login/")
            .set_json(json!({"username": "admin", "password": seed::ADMIN_PASSWORD}))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["code"], 4000);
        assert_eq!(body["msg"], "验证码不能为空");
    }

    #[actix_web::test]
    async fn test_malformed_login_body_returns_validation_code() {
        let state = seeded_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure_system),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/login/")
            .set_json(json!({"username": "admin"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 4000);
        assert!(body["msg"].as_str().unwrap().contains("missing field `password`"));

        // 非法路径参数
        let req = test::TestRequest::delete()
            .uri("/api/system/role/abc/")
            .insert_header(bearer(&state, &admin(&state).await))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["code"], 4000);
    }

    #[actix_web::test]
    async fn test_refresh_and_logout() {
        let state = seeded_state().await;
        let admin = admin(&state).await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure_system),
        )
        .await;

        let pair = state
            .tokens
            .issue_pair(admin.id(), &admin.username, "public")
            .unwrap();
        let req = test::TestRequest::post()
            .uri("/api/token/refresh/")
            .set_json(json!({"refresh": pair.refresh}))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["code"], 2000);
        assert!(state
            .tokens
            .verify(body["data"]["access"].as_str().unwrap(), TokenType::Access)
            .is_ok());

        // 访问令牌不能当刷新令牌用
        let req = test::TestRequest::post()
            .uri("/api/token/refresh/")
            .set_json(json!({"refresh": pair.access}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/logout/")
            .insert_header(bearer(&state, &admin))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["msg"], "注销成功");

        let req = test::TestRequest::post().uri("/api/logout/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }
}
