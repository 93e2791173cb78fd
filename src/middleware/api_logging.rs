//! 接口操作日志中间件
//!
//! 处理器执行前采集请求信息（路由表能对应到模块时立即建档），
//! 执行后读取响应中的 `code`/`msg` 补全记录。请求体回填给处理器，
//! 响应体原样返回；日志写入失败只记录错误，不影响响应。

use actix_http::BoxedPayloadStream;
use actix_web::{
    body::{to_bytes, BoxBody},
    dev::{self, forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::PayloadError,
    http::header,
    web, Error, HttpMessage, HttpRequest,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use futures_util::stream::{self, StreamExt};
use serde_json::{json, Value};
use std::rc::Rc;

use crate::bootstrap::route_registry::global_module_for_path;
use crate::comm::request_util::{
    get_browser, get_os, get_request_data, get_request_ip, get_user_agent, mask_password,
};
use crate::error::CODE_SUCCESS;
use crate::middleware::auth::access_claims;
use crate::middleware::tenant::TenantContext;
use crate::modules::system::models::{NewOperationLog, PUBLIC_SCHEMA};
use crate::state::AppState;
use crate::store::OperationLogStore;

/// 请求体采集上限，与 `web::JsonConfig` 的默认上限一致
pub const MAX_CAPTURE_BYTES: usize = 2 * 1024 * 1024;

/// 处理器写入的操作说明，落到日志的 request_msg
#[derive(Debug, Clone)]
pub struct RequestMsg(pub String);

pub fn set_request_msg(req: &HttpRequest, msg: impl Into<String>) {
    req.extensions_mut().insert(RequestMsg(msg.into()));
}

#[derive(Debug, Clone, Default)]
pub struct ApiLogging;

impl ApiLogging {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Transform<S, ServiceRequest> for ApiLogging
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = ApiLoggingService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiLoggingService {
            service: Rc::new(service),
        }))
    }
}

pub struct ApiLoggingService<S> {
    service: Rc<S>,
}

/// 处理器执行前采集的信息
struct RequestSnapshot {
    tenant: String,
    path: String,
    method: String,
    body: String,
    ip: String,
    os: String,
    browser: String,
    creator: Option<i64>,
}

impl<S> Service<ServiceRequest> for ApiLoggingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .cloned()
                .filter(|state| state.settings.api_log.should_log(req.method().as_str()));
            let Some(state) = state else {
                return service.call(req).await;
            };

            // 读取请求体后回填；超限或读取失败时不采集，已读部分原样交回处理器
            let (body, payload) = buffer_payload(req.take_payload(), MAX_CAPTURE_BYTES).await;
            req.set_payload(payload);
            let body = body.unwrap_or_default();

            let snapshot = snapshot(&state, req.request(), &body).await;
            let module = global_module_for_path(&snapshot.path);
            let log_id = match &module {
                Some(module) => create_log(&state, &snapshot, module).await,
                None => None,
            };

            let res = service.call(req).await?;

            let (http_req, res) = res.into_parts();
            let (res, body) = res.into_parts();
            let body = to_bytes(body)
                .await
                .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;

            let request_msg = http_req
                .extensions()
                .get::<RequestMsg>()
                .map(|msg| msg.0.clone());
            let module = module.or_else(|| {
                state
                    .settings
                    .api_log
                    .model_map
                    .get(&snapshot.path)
                    .cloned()
            });
            let record = finish_record(snapshot.clone_fields(), &body, res.status().as_u16(), module, request_msg);
            persist(&state, &snapshot.tenant, log_id, record).await;

            let res = res.set_body(BoxBody::new(body));
            Ok(ServiceResponse::new(http_req, res))
        })
    }
}

impl RequestSnapshot {
    fn clone_fields(&self) -> NewOperationLog {
        NewOperationLog {
            request_path: Some(self.path.clone()),
            request_method: Some(self.method.clone()),
            request_body: Some(self.body.clone()),
            request_ip: Some(self.ip.clone()),
            request_os: Some(self.os.clone()),
            request_browser: Some(self.browser.clone()),
            creator: self.creator,
            ..NewOperationLog::default()
        }
    }
}

async fn buffer_payload(
    mut payload: dev::Payload,
    limit: usize,
) -> (Option<web::Bytes>, dev::Payload) {
    let mut chunks: Vec<Result<web::Bytes, PayloadError>> = Vec::new();
    let mut size = 0;
    while let Some(item) = payload.next().await {
        match item {
            Ok(chunk) => {
                size += chunk.len();
                chunks.push(Ok(chunk));
                if size > limit {
                    tracing::debug!(limit, "请求体超出采集上限，跳过记录");
                    return (None, chain_payload(chunks, payload));
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "读取请求体失败，跳过记录");
                chunks.push(Err(e));
                return (None, chain_payload(chunks, payload));
            }
        }
    }

    let mut buf = web::BytesMut::with_capacity(size);
    for chunk in chunks.into_iter().flatten() {
        buf.extend_from_slice(&chunk);
    }
    let body = buf.freeze();
    (Some(body.clone()), bytes_to_payload(body))
}

/// 已读出的分块在前，剩余的原始流在后
fn chain_payload(head: Vec<Result<web::Bytes, PayloadError>>, rest: dev::Payload) -> dev::Payload {
    let payload: BoxedPayloadStream = Box::pin(stream::iter(head).chain(rest));
    dev::Payload::Stream { payload }
}

fn bytes_to_payload(buf: web::Bytes) -> dev::Payload {
    let (_, mut payload) = actix_http::h1::Payload::create(true);
    payload.unread_data(buf);
    dev::Payload::from(payload)
}

async fn snapshot(state: &AppState, req: &HttpRequest, body: &[u8]) -> RequestSnapshot {
    let tenant = match TenantContext::resolve(req).await {
        Ok(ctx) => ctx.schema_name,
        Err(_) => PUBLIC_SCHEMA.to_string(),
    };
    let creator = access_claims(state, req)
        .filter(|claims| claims.tenant == tenant)
        .map(|claims| claims.user_id);
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let data = mask_password(&get_request_data(req.query_string(), content_type, body));
    let user_agent = get_user_agent(req);
    RequestSnapshot {
        tenant,
        path: req.path().to_string(),
        method: req.method().to_string(),
        body: data.to_string(),
        ip: get_request_ip(req),
        os: get_os(&user_agent),
        browser: get_browser(&user_agent),
        creator,
    }
}

async fn create_log(state: &AppState, snapshot: &RequestSnapshot, module: &str) -> Option<i64> {
    let log = NewOperationLog {
        request_modular: Some(module.to_string()),
        ..snapshot.clone_fields()
    };
    match state.store.create_operation_log(&snapshot.tenant, log).await {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::error!(error = %e, path = %snapshot.path, "写入操作日志失败");
            None
        }
    }
}

/// 由响应补全日志字段；非 JSON 响应以 HTTP 状态码作为 response_code
fn finish_record(
    mut record: NewOperationLog,
    body: &[u8],
    http_status: u16,
    module: Option<String>,
    request_msg: Option<String>,
) -> NewOperationLog {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    let code = parsed.as_ref().and_then(|v| v.get("code")).cloned();
    let msg = parsed.as_ref().and_then(|v| v.get("msg")).cloned();

    let response_code = match &code {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => http_status.to_string(),
    };
    let success = code
        .as_ref()
        .and_then(|c| match c {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
        .is_some_and(|c| c == CODE_SUCCESS as i64);

    record.request_modular = module;
    record.request_msg = request_msg;
    record.response_code = Some(response_code);
    record.json_result = Some(
        json!({
            "code": code.unwrap_or(Value::Null),
            "msg": msg.unwrap_or(Value::Null),
        })
        .to_string(),
    );
    record.status = Some(success);
    record
}

async fn persist(state: &AppState, tenant: &str, log_id: Option<i64>, record: NewOperationLog) {
    let result = match log_id {
        Some(id) => state.store.update_operation_log(tenant, id, record).await,
        None => state.store.create_operation_log(tenant, record).await.map(|_| ()),
    };
    if let Err(e) = result {
        tracing::error!(error = %e, "更新操作日志失败");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::AppSettings;
    use crate::response::PageQuery;
    use crate::store::MemoryStore;
    use actix_web::{test, App, HttpResponse};
    use std::sync::Arc;

    async fn echo(req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
        set_request_msg(&req, "echo");
        HttpResponse::Ok().json(json!({"code": 2000, "msg": "ok", "data": body.into_inner()}))
    }

    async fn body_len(body: web::Bytes) -> HttpResponse {
        HttpResponse::Ok().json(json!({"code": 2000, "msg": "ok", "data": body.len()}))
    }

    async fn fail() -> HttpResponse {
        HttpResponse::Ok().json(json!({"code": 4000, "msg": "账号/密码错误", "data": null}))
    }

    fn app_state(settings: AppSettings) -> (web::Data<AppState>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let state = web::Data::new(AppState::new(settings, store.clone()));
        (state, store)
    }

    #[actix_web::test]
    async fn test_logs_masked_body_and_result() {
        let mut settings = AppSettings::default();
        settings
            .api_log
            .model_map
            .insert("/echo".to_string(), "回显".to_string());
        let (state, store) = app_state(settings);
        let app = test::init_service(
            App::new()
                .app_data(state)
                .wrap(ApiLogging::new())
                .route("/echo", web::post().to(echo)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/echo?page=1")
            .insert_header(("X-Forwarded-For", "1.1.1.1, 2.2.2.2"))
            .set_json(json!({"username": "admin", "password": "secret"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body: Value = test::read_body_json(resp).await;
        // 处理器拿到了完整请求体，响应原样返回
        assert_eq!(body["data"]["password"], "secret");

        let logs = store
            .list_operation_logs(PUBLIC_SCHEMA, PageQuery::default())
            .await
            .unwrap();
        assert_eq!(logs.total, 1);
        let log = &logs.items[0];
        assert_eq!(log.request_modular.as_deref(), Some("回显"));
        assert_eq!(log.request_ip.as_deref(), Some("2.2.2.2"));
        assert_eq!(log.request_method.as_deref(), Some("POST"));
        assert_eq!(log.request_msg.as_deref(), Some("echo"));
        assert_eq!(log.response_code.as_deref(), Some("2000"));
        assert!(log.status);
        let logged: Value = serde_json::from_str(log.request_body.as_deref().unwrap()).unwrap();
        assert_eq!(logged["password"], "********");
        assert_eq!(logged["page"], "1");
    }

    #[actix_web::test]
    async fn test_business_failure_and_method_filter() {
        let mut settings = AppSettings::default();
        settings.api_log.methods = vec!["POST".to_string()];
        let (state, store) = app_state(settings);
        let app = test::init_service(
            App::new()
                .app_data(state)
                .wrap(ApiLogging::new())
                .route("/fail", web::post().to(fail))
                .route("/fail", web::get().to(fail)),
        )
        .await;

        test::call_service(&app, test::TestRequest::get().uri("/fail").to_request()).await;
        test::call_service(&app, test::TestRequest::post().uri("/fail").to_request()).await;

        let logs = store
            .list_operation_logs(PUBLIC_SCHEMA, PageQuery::default())
            .await
            .unwrap();
        assert_eq!(logs.total, 1);
        assert!(!logs.items[0].status);
        assert_eq!(logs.items[0].response_code.as_deref(), Some("4000"));
        let result: Value = serde_json::from_str(logs.items[0].json_result.as_deref().unwrap()).unwrap();
        assert_eq!(result["msg"], "账号/密码错误");
    }

    #[actix_web::test]
    async fn test_disabled_logging_skips_store() {
        let mut settings = AppSettings::default();
        settings.api_log.enable = false;
        let (state, store) = app_state(settings);
        let app = test::init_service(
            App::new()
                .app_data(state)
                .wrap(ApiLogging::new())
                .route("/fail", web::post().to(fail)),
        )
        .await;
        test::call_service(&app, test::TestRequest::post().uri("/fail").to_request()).await;
        let logs = store
            .list_operation_logs(PUBLIC_SCHEMA, PageQuery::default())
            .await
            .unwrap();
        assert_eq!(logs.total, 0);
    }

    #[actix_web::test]
    async fn test_finish_record_non_json_uses_http_status() {
        let record = finish_record(NewOperationLog::default(), b"OK", 200, None, None);
        assert_eq!(record.response_code.as_deref(), Some("200"));
        assert_eq!(record.status, Some(false));
    }

    #[actix_web::test]
    async fn test_body_above_default_payload_limit_reaches_handler() {
        let (state, store) = app_state(AppSettings::default());
        let app = test::init_service(
            App::new()
                .app_data(state)
                .wrap(ApiLogging::new())
                .route("/echo", web::post().to(echo)),
        )
        .await;

        let note = "x".repeat(300 * 1024);
        let req = test::TestRequest::post()
            .uri("/echo")
            .set_json(json!({"note": note, "password": "secret"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["note"].as_str().unwrap().len(), 300 * 1024);

        let logs = store
            .list_operation_logs(PUBLIC_SCHEMA, PageQuery::default())
            .await
            .unwrap();
        assert_eq!(logs.total, 1);
        let logged: Value =
            serde_json::from_str(logs.items[0].request_body.as_deref().unwrap()).unwrap();
        assert_eq!(logged["password"], "********");
        assert_eq!(logged["note"].as_str().unwrap().len(), 300 * 1024);
    }

    #[actix_web::test]
    async fn test_body_over_capture_limit_passes_through() {
        let (state, store) = app_state(AppSettings::default());
        let app = test::init_service(
            App::new()
                .app_data(state)
                .app_data(web::PayloadConfig::new(8 * 1024 * 1024))
                .wrap(ApiLogging::new())
                .route("/upload", web::post().to(body_len)),
        )
        .await;

        let size = MAX_CAPTURE_BYTES + 1024;
        let req = test::TestRequest::post()
            .uri("/upload")
            .set_payload(vec![b'a'; size])
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["data"], size);

        // 仍然记录，只是不带请求体
        let logs = store
            .list_operation_logs(PUBLIC_SCHEMA, PageQuery::default())
            .await
            .unwrap();
        assert_eq!(logs.total, 1);
        assert_eq!(logs.items[0].response_code.as_deref(), Some("2000"));
    }
}
