use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::api::openapi::{openapi_json, OPENAPI_PATH};
use crate::bootstrap::route_registry::{configure_global_routes, get_global_route_registry};
use crate::comm::config::get_global_config_manager;
use crate::comm::tracing::init_tracing;
use crate::conf::AppSettings;
use crate::error::configure_extractors;
use crate::middleware::{ApiLogging, HealthCheck};
use crate::state::AppState;
use crate::store::{self, seed, DynStore, MemoryStore};

pub const APP_NAME: &str = "vgo-admin";

/// 挂载全局注册的路由与 OpenAPI 文档
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    configure_extractors(cfg);
    configure_global_routes(cfg);
    cfg.route(OPENAPI_PATH, web::get().to(openapi_json));
}

/// 应用启动器
pub struct AppBootstrap {
    settings: AppSettings,
    store: Option<DynStore>,
}

impl AppBootstrap {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            settings,
            store: None,
        }
    }

    /// 从全局配置管理器加载配置
    pub fn from_global_config() -> anyhow::Result<Self> {
        let manager = get_global_config_manager()?;
        let settings = AppSettings::load(&manager).context("加载配置失败")?;
        Ok(Self::new(settings))
    }

    /// 设置主机地址
    pub fn with_host(mut self, host: String) -> Self {
        self.settings.server.host = host;
        self
    }

    /// 设置端口
    pub fn with_port(mut self, port: u16) -> Self {
        self.settings.server.port = port;
        self
    }

    /// 设置工作线程数
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.settings.server.workers = Some(workers);
        self
    }

    /// 使用指定的存储，跳过按配置连接
    pub fn with_store(mut self, store: DynStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// 准备共享状态：连接存储、内存存储写入初始数据、加载配置缓存
    pub async fn build_state(&self) -> anyhow::Result<web::Data<AppState>> {
        let store = match &self.store {
            Some(store) => Arc::clone(store),
            None if self.settings.database.url.as_deref().is_some_and(|u| !u.is_empty()) => {
                store::connect(&self.settings.database).await?
            }
            None => {
                let memory: DynStore = Arc::new(MemoryStore::new());
                seed::seed(memory.as_ref(), &self.settings).await?;
                info!("内存存储已写入初始数据");
                memory
            }
        };

        let state = AppState::new(self.settings.clone(), store);
        state
            .config_cache
            .refresh_all(state.store.as_ref())
            .await
            .context("加载系统配置失败")?;
        Ok(web::Data::new(state))
    }

    /// 运行应用服务器
    #[instrument(skip(self))]
    pub async fn run(self) -> anyhow::Result<()> {
        init_tracing(APP_NAME, &self.settings.logging)?;
        if let Ok(manager) = get_global_config_manager() {
            manager.print_sources_info();
        }

        crate::init_routes();
        get_global_route_registry().print_routes_info();

        let state = self.build_state().await?;
        let server = &self.settings.server;
        info!(host = %server.host, port = server.port, "启动应用服务器");

        let mut http = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .wrap(ApiLogging::new())
                .wrap(HealthCheck::new())
                .wrap(Logger::default())
                .configure(configure_app)
        });
        if let Some(workers) = server.workers {
            http = http.workers(workers);
        }

        let result = http
            .bind((server.host.as_str(), server.port))
            .with_context(|| format!("绑定 {}:{} 失败", server.host, server.port))?
            .run()
            .await;
        if let Err(e) = &result {
            error!("服务器运行失败: {}", e);
        }
        result.context("服务器运行失败")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use serde_json::Value;

    #[actix_web::test]
    async fn test_build_state_seeds_memory_store() {
        let mut settings = AppSettings::default();
        settings.password.bcrypt_cost = 4;
        let state = AppBootstrap::new(settings).build_state().await.unwrap();
        assert!(state
            .config_cache
            .is_enabled(state.store.as_ref(), "public", "base.captcha_state")
            .await
            .unwrap());

        crate::init_routes();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .wrap(ApiLogging::new())
                .wrap(HealthCheck::new())
                .configure(configure_app),
        )
        .await;
        let req = test::TestRequest::get().uri(OPENAPI_PATH).to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert!(body["paths"].get("/api/login/").is_some());

        let req = test::TestRequest::get().uri("/healthz").to_request();
        assert_eq!(test::read_body(test::call_service(&app, req).await).await, "OK");

        // 请求体缺字段走统一响应格式
        let req = test::TestRequest::post()
            .uri("/api/login/")
            .set_json(serde_json::json!({"username": "admin"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 4000);
        assert!(body["msg"].as_str().unwrap().contains("password"));
        assert!(body["data"].is_null());
    }

    #[actix_web::test]
    async fn test_builder_overrides() {
        let bootstrap = AppBootstrap::new(AppSettings::default())
            .with_host("127.0.0.1".to_string())
            .with_port(9000)
            .with_workers(2);
        assert_eq!(bootstrap.settings().server.host, "127.0.0.1");
        assert_eq!(bootstrap.settings().server.port, 9000);
        assert_eq!(bootstrap.settings().server.workers, Some(2));
    }
}
