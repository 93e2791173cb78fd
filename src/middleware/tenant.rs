//! 租户解析
//!
//! 非租户模式下所有请求属于 `public`。租户模式下依次按请求头（schema_name）
//! 与访问域名查找租户；请求头指定了不存在的租户时返回 404，域名未绑定时回落到 `public`。

use actix_web::{dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::error::{AppError, AppResult};
use crate::modules::system::models::PUBLIC_SCHEMA;
use crate::state::AppState;
use crate::store::TenantStore;

/// 当前请求所属租户
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub schema_name: String,
}

impl TenantContext {
    pub fn public() -> Self {
        Self {
            schema_name: PUBLIC_SCHEMA.to_string(),
        }
    }

    /// 解析并缓存到请求扩展中，同一请求只查一次存储
    pub async fn resolve(req: &HttpRequest) -> AppResult<TenantContext> {
        if let Some(ctx) = req.extensions().get::<TenantContext>() {
            return Ok(ctx.clone());
        }
        let state = req
            .app_data::<web::Data<AppState>>()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("应用状态未注册")))?;
        let ctx = resolve_uncached(state, req).await?;
        req.extensions_mut().insert(ctx.clone());
        Ok(ctx)
    }
}

async fn resolve_uncached(state: &AppState, req: &HttpRequest) -> AppResult<TenantContext> {
    if !state.settings.tenant.enabled {
        return Ok(TenantContext::public());
    }

    let header = req
        .headers()
        .get(state.settings.tenant.header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(schema_name) = header {
        return match state.store.get_tenant_by_schema(schema_name).await? {
            Some(tenant) => Ok(TenantContext {
                schema_name: tenant.schema_name,
            }),
            None => Err(AppError::not_found(format!("租户 {} 不存在", schema_name))),
        };
    }

    let host = req.connection_info().host().to_string();
    let domain = host.split(':').next().unwrap_or_default();
    match state.store.get_tenant_by_domain(domain).await? {
        Some(tenant) => Ok(TenantContext {
            schema_name: tenant.schema_name,
        }),
        None => Ok(TenantContext::public()),
    }
}

impl FromRequest for TenantContext {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { TenantContext::resolve(&req).await })
    }
}
