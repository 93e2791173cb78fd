//! 当前登录用户提取器与角色校验

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::error::{AppError, AppResult};
use crate::middleware::tenant::TenantContext;
use crate::modules::system::models::{Operator, User};
use crate::modules::system::token::{Claims, TokenType};
use crate::state::AppState;
use crate::store::{RoleStore, UserStore};

/// 超级管理员角色的权限字符
pub const ADMIN_ROLE_KEY: &str = "admin";

/// 取出 `Authorization: JWT <token>` 或 `Bearer <token>` 中的令牌
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("JWT") || scheme.eq_ignore_ascii_case("Bearer") {
        let token = token.trim();
        (!token.is_empty()).then(|| token.to_string())
    } else {
        None
    }
}

/// 校验访问令牌但不查库，操作日志用它取 creator
pub fn access_claims(state: &AppState, req: &HttpRequest) -> Option<Claims> {
    let token = bearer_token(req)?;
    state.tokens.verify(&token, TokenType::Access).ok()
}

/// 已认证的当前用户
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub tenant: String,
}

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.user.id()
    }

    /// 写操作的审计信息
    pub fn operator(&self) -> Operator {
        Operator {
            user_id: Some(self.user.id()),
            username: Some(self.user.username.clone()),
            dept_id: self.user.dept_id,
        }
    }

    /// 超级管理员直接通过；否则需持有任一启用中的指定角色
    pub async fn require_role(&self, state: &AppState, keys: &[&str]) -> AppResult<()> {
        if self.user.is_superuser {
            return Ok(());
        }
        let roles = state
            .store
            .get_roles_by_ids(&self.tenant, &self.user.role_ids)
            .await?;
        if roles
            .iter()
            .any(|role| role.status && keys.contains(&role.key.as_str()))
        {
            Ok(())
        } else {
            Err(AppError::forbidden("没有权限执行该操作"))
        }
    }

    pub async fn require_admin(&self, state: &AppState) -> AppResult<()> {
        self.require_role(state, &[ADMIN_ROLE_KEY]).await
    }

    async fn authenticate(req: &HttpRequest) -> AppResult<CurrentUser> {
        let state = req
            .app_data::<web::Data<AppState>>()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("应用状态未注册")))?;
        let token = bearer_token(req)
            .ok_or_else(|| AppError::unauthorized("身份认证信息未提供"))?;
        let claims = state
            .tokens
            .verify(&token, TokenType::Access)
            .map_err(|e| AppError::unauthorized(e.to_string()))?;
        let tenant = TenantContext::resolve(req).await?;
        if claims.tenant != tenant.schema_name {
            return Err(AppError::unauthorized("令牌与租户不匹配"));
        }
        let user = state
            .store
            .get_user(&tenant.schema_name, claims.user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| AppError::unauthorized("用户不存在或已被禁用"))?;
        Ok(CurrentUser {
            user,
            tenant: tenant.schema_name,
        })
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { CurrentUser::authenticate(&req).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_schemes() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "JWT abc"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc"));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer xyz"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("xyz"));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic xyz"))
            .to_http_request();
        assert_eq!(bearer_token(&req), None);
        assert_eq!(bearer_token(&TestRequest::default().to_http_request()), None);
    }
}
