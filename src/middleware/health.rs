//! 存活与就绪探针
//!
//! `GET /healthz` 只要进程在运行就返回 `OK`；
//! `GET /readiness` 需要存储可用，否则返回 500。

use actix_web::{
    body::BoxBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web, Error, HttpResponse,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::state::AppState;
use crate::store::Store;

pub const HEALTHZ_PATH: &str = "/healthz";
pub const READINESS_PATH: &str = "/readiness";

#[derive(Debug, Clone, Default)]
pub struct HealthCheck;

impl HealthCheck {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Transform<S, ServiceRequest> for HealthCheck
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = HealthCheckService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HealthCheckService {
            service: Rc::new(service),
        }))
    }
}

pub struct HealthCheckService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for HealthCheckService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            if req.method() != Method::GET {
                return service.call(req).await;
            }
            let path = req.path().to_string();
            match path.as_str() {
                HEALTHZ_PATH => Ok(req.into_response(HttpResponse::Ok().body("OK"))),
                READINESS_PATH => {
                    let ready = match req.app_data::<web::Data<AppState>>() {
                        Some(state) => match state.store.ping().await {
                            Ok(()) => true,
                            Err(e) => {
                                tracing::error!(error = %e, "就绪检查失败");
                                false
                            }
                        },
                        None => false,
                    };
                    let response = if ready {
                        HttpResponse::Ok().body("OK")
                    } else {
                        HttpResponse::InternalServerError().body("db: cannot connect to database.")
                    };
                    Ok(req.into_response(response))
                }
                _ => service.call(req).await,
            }
        })
    }
}
