use actix_web::HttpResponse;
use utoipa::OpenApi;

use crate::modules::system::controller::auth::{RefreshRequest, RefreshResponse};
use crate::modules::system::login::{LoginRequest, LoginResponse};

pub const OPENAPI_PATH: &str = "/api-doc/openapi.json";

/// OpenAPI 文档聚合
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::system::controller::auth::login,
        crate::modules::system::controller::auth::captcha,
        crate::modules::system::controller::auth::refresh_token,
        crate::modules::system::controller::auth::logout,
        crate::modules::system::controller::init_settings::init_settings,
    ),
    components(schemas(LoginRequest, LoginResponse, RefreshRequest, RefreshResponse)),
    tags(
        (name = "Auth", description = "登录、验证码与令牌相关接口")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_auth_paths() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        assert!(paths.contains_key("/api/login/"));
        assert!(paths.contains_key("/api/init/settings/"));
        assert!(doc["components"]["schemas"].get("LoginRequest").is_some());
    }
}
