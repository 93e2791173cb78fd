use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::TenantContext;
use crate::response::DetailResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InitSettingsQuery {
    /// `|` 分隔的键前缀
    pub key: Option<String>,
}

/// 前端初始化所需的系统配置，不含仅后台可见的项
#[utoipa::path(
    get,
    path = "/api/init/settings/",
    params(("key" = Option<String>, Query, description = "以 | 分隔的键前缀")),
    responses((status = 200, description = "扁平化的配置键值"))
)]
#[get("/api/init/settings/")]
pub async fn init_settings(
    state: web::Data<AppState>,
    tenant: TenantContext,
    query: web::Query<InitSettingsQuery>,
) -> AppResult<HttpResponse> {
    let config = state
        .config_cache
        .get_system_config(state.store.as_ref(), &tenant.schema_name)
        .await?;
    let values = config.frontend_values(query.key.as_deref().filter(|k| !k.is_empty()));
    Ok(DetailResponse::new(values).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::system::controller::test_support::seeded_state;
    use crate::modules::system::models::{Operator, SystemConfigInput, PUBLIC_SCHEMA};
    use crate::modules::system::routes::configure_system;
    use crate::store::SystemConfigStore;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn test_hides_backend_only_and_filters_prefix() {
        let state = seeded_state().await;
        let base = state
            .store
            .list_system_configs(PUBLIC_SCHEMA)
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.key == "base")
            .unwrap();
        state
            .store
            .create_system_config(
                PUBLIC_SCHEMA,
                SystemConfigInput {
                    parent_id: Some(base.id()),
                    title: "密钥".to_string(),
                    key: "secret".to_string(),
                    value: Some(json!("s3cr3t")),
                    sort: 2,
                    status: false,
                    data_options: None,
                    form_item_type: Some(0),
                    rule: None,
                    placeholder: None,
                    setting: None,
                },
                &Operator::system(),
            )
            .await
            .unwrap();
        state
            .config_cache
            .refresh(state.store.as_ref(), PUBLIC_SCHEMA)
            .await
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure_system),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/init/settings/").to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["data"]["base.captcha_state"], true);
        assert!(body["data"].get("base.secret").is_none());

        let req = test::TestRequest::get()
            .uri("/api/init/settings/?key=login|other")
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["data"], json!({}));
    }
}
