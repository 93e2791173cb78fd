//! 登录流程：验证码、账号查找、失败计数锁定、签发令牌

use actix_web::HttpRequest;
use anyhow::anyhow;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::comm::request_util::{get_browser, get_os, get_request_ip, get_user_agent};
use crate::error::{AppError, AppResult};
use crate::modules::system::models::{
    login_log::LOGIN_TYPE_NORMAL, LoginFailure, NewLoginLog, Operator, User,
};
use crate::modules::system::password::verify_password;
use crate::state::AppState;
use crate::store::{LoginLogStore, UserStore};

pub const CAPTCHA_STATE_KEY: &str = "base.captcha_state";

pub const MSG_BAD_CREDENTIALS: &str = "账号/密码错误";
pub const MSG_LOCKED: &str = "账号已被锁定,联系管理员解锁";

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub captcha: Option<String>,
    #[serde(rename = "captchaKey")]
    pub captcha_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub name: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub username: String,
    pub avatar: Option<String>,
    pub user_type: i32,
}

/// 登录日志需要的客户端信息
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip: String,
    pub agent: String,
    pub browser: String,
    pub os: String,
}

impl ClientInfo {
    pub fn from_request(req: &HttpRequest) -> Self {
        let agent = get_user_agent(req);
        Self {
            ip: get_request_ip(req),
            browser: get_browser(&agent),
            os: get_os(&agent),
            agent,
        }
    }
}

/// 密码错误后返回给客户端的提示
pub fn failure_message(failure: LoginFailure, max_error_count: i32) -> String {
    if failure.locked {
        MSG_LOCKED.to_string()
    } else {
        format!(
            "{};重试{}次后将被锁定~",
            MSG_BAD_CREDENTIALS,
            (max_error_count - failure.count).max(0)
        )
    }
}

pub async fn login(
    state: &AppState,
    tenant: &str,
    client: ClientInfo,
    request: LoginRequest,
) -> AppResult<LoginResponse> {
    let store = state.store.as_ref();

    if state
        .config_cache
        .is_enabled(store, tenant, CAPTCHA_STATE_KEY)
        .await?
    {
        state
            .captcha
            .validate(request.captcha_key.as_deref(), request.captcha.as_deref())?;
    }

    let user = store
        .find_user_by_account(tenant, request.username.trim())
        .await?
        .ok_or_else(|| AppError::validation(MSG_BAD_CREDENTIALS))?;
    if !user.is_active {
        return Err(AppError::validation(MSG_LOCKED));
    }

    if !verify_password(request.password, user.password_hash.clone()).await? {
        let max_error_count = state.settings.login.max_error_count;
        let failure = store
            .record_login_failure(tenant, user.id(), max_error_count)
            .await?;
        if failure.locked {
            tracing::warn!(tenant, username = %user.username, "连续登录失败，账号已锁定");
        }
        return Err(AppError::validation(failure_message(failure, max_error_count)));
    }

    store.record_login_success(tenant, user.id(), Utc::now()).await?;
    let operator = Operator {
        user_id: Some(user.id()),
        username: Some(user.username.clone()),
        dept_id: user.dept_id,
    };
    store
        .create_login_log(
            tenant,
            NewLoginLog {
                username: user.username.clone(),
                ip: client.ip,
                agent: client.agent,
                browser: client.browser,
                os: client.os,
                login_type: LOGIN_TYPE_NORMAL,
            },
            &operator,
        )
        .await?;
    tracing::info!(tenant, username = %user.username, "登录成功");

    issue_response(state, tenant, &user)
}

fn issue_response(state: &AppState, tenant: &str, user: &User) -> AppResult<LoginResponse> {
    let pair = state
        .tokens
        .issue_pair(user.id(), &user.username, tenant)
        .map_err(|e| AppError::Internal(anyhow!("签发令牌失败: {}", e)))?;
    Ok(LoginResponse {
        access: pair.access,
        refresh: pair.refresh,
        name: user.name.clone(),
        user_id: user.id(),
        username: user.username.clone(),
        avatar: user.avatar.clone(),
        user_type: user.user_type,
    })
}
