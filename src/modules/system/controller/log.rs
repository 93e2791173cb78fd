use actix_web::{get, web, HttpResponse};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::response::{PageQuery, SuccessResponse};
use crate::state::AppState;
use crate::store::{LoginLogStore, OperationLogStore};

/// 操作日志，按时间倒序
#[get("/api/system/operation_log/")]
pub async fn operation_logs(
    state: web::Data<AppState>,
    user: CurrentUser,
    page: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    let logs = state
        .store
        .list_operation_logs(&user.tenant, page.into_inner())
        .await?;
    Ok(SuccessResponse::new(logs).into_response())
}

/// 登录日志，按时间倒序
#[get("/api/system/login_log/")]
pub async fn login_logs(
    state: web::Data<AppState>,
    user: CurrentUser,
    page: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    user.require_admin(&state).await?;
    let logs = state
        .store
        .list_login_logs(&user.tenant, page.into_inner())
        .await?;
    Ok(SuccessResponse::new(logs).into_response())
}
