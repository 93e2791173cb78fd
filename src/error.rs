use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// 业务错误码：校验失败 / 业务拒绝
pub const CODE_VALIDATION: i32 = 4000;
/// 成功响应码
pub const CODE_SUCCESS: i32 = 2000;

/// 统一的应用错误类型
#[derive(Error, Debug)]
pub enum AppError {
    #[error("配置错误: {0}")]
    Config(#[from] crate::comm::config::ConfigError),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("内部错误: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// 创建校验错误
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// 创建认证错误
    pub fn unauthorized<T: Into<String>>(message: T) -> Self {
        Self::Unauthorized(message.into())
    }

    /// 创建权限错误
    pub fn forbidden<T: Into<String>>(message: T) -> Self {
        Self::Forbidden(message.into())
    }

    /// 创建资源未找到错误
    pub fn not_found<T: Into<String>>(resource: T) -> Self {
        Self::NotFound(resource.into())
    }

    /// 获取响应体中的业务码
    pub fn error_code(&self) -> i32 {
        match self {
            AppError::Validation(_) => CODE_VALIDATION,
            AppError::Unauthorized(_) => 401,
            AppError::Forbidden(_) => 403,
            AppError::NotFound(_) => 404,
            AppError::Store(StoreError::Conflict(_)) => CODE_VALIDATION,
            AppError::Store(StoreError::NotFound(_)) => 404,
            AppError::Config(_) | AppError::Store(_) | AppError::Internal(_) => 500,
        }
    }
}

impl ResponseError for AppError {
    /// 校验与业务错误以 HTTP 200 返回，由业务码区分
    fn status_code(&self) -> StatusCode {
        match self.error_code() {
            CODE_VALIDATION => StatusCode::OK,
            401 => StatusCode::UNAUTHORIZED,
            403 => StatusCode::FORBIDDEN,
            404 => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = self.error_code();
        let message = self.to_string();

        // 记录错误日志
        match code {
            500 => tracing::error!(error = %message, "internal error"),
            _ => tracing::info!(code, error = %message, "client error"),
        }

        HttpResponse::build(self.status_code()).json(json!({
            "code": code,
            "msg": message,
            "data": serde_json::Value::Null,
        }))
    }
}

/// 应用结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 请求体、查询参数、路径参数解析失败时同样返回 `{code: 4000, msg, data}`
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    );
}
