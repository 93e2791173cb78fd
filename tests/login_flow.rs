use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;

use vgo_admin::bootstrap::configure_app;
use vgo_admin::conf::AppSettings;
use vgo_admin::middleware::{ApiLogging, HealthCheck};
use vgo_admin::modules::system::captcha::{CaptchaStore, FixedChallengeGenerator};
use vgo_admin::state::AppState;
use vgo_admin::store::{seed, MemoryStore};

const ANSWER: &str = "7g3k";

async fn state() -> web::Data<AppState> {
    let store = Arc::new(MemoryStore::new());
    let mut settings = AppSettings::default();
    settings.password.bcrypt_cost = 4;
    seed::seed(&*store, &settings).await.unwrap();
    let state = AppState::new(settings, store).with_captcha(CaptchaStore::new(
        Box::new(FixedChallengeGenerator(ANSWER.to_string())),
        300,
    ));
    state
        .config_cache
        .refresh_all(state.store.as_ref())
        .await
        .unwrap();
    web::Data::new(state)
}

macro_rules! app {
    ($state:expr) => {{
        vgo_admin::init_routes();
        test::init_service(
            App::new()
                .app_data($state.clone())
                .wrap(ApiLogging::new())
                .wrap(HealthCheck::new())
                .configure(configure_app),
        )
        .await
    }};
}

macro_rules! call_json {
    ($app:expr, $req:expr) => {{
        let body: Value = test::read_body_json(test::call_service(&$app, $req).await).await;
        body
    }};
}

macro_rules! login {
    ($app:expr, $username:expr, $password:expr) => {{
        let captcha = call_json!($app, test::TestRequest::get().uri("/api/captcha/").to_request());
        let hashkey = captcha["data"]["hashkey"].as_str().unwrap().to_string();
        call_json!(
            $app,
            test::TestRequest::post()
                .uri("/api/login/")
                .insert_header(("User-Agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.71 Safari/537.36"))
                .set_json(json!({
                    "username": $username,
                    "password": $password,
                    "captcha": ANSWER.to_uppercase(),
                    "captchaKey": hashkey,
                }))
                .to_request()
        )
    }};
}

#[actix_web::test]
async fn login_then_access_protected_endpoints() {
    let state = state().await;
    let app = app!(state);

    let body = login!(app, "admin", "wrong-password");
    assert_eq!(body["code"], 4000);
    assert_eq!(body["msg"], "账号/密码错误;重试4次后将被锁定~");

    let body = login!(app, "admin", seed::ADMIN_PASSWORD);
    assert_eq!(body["code"], 2000);
    assert_eq!(body["data"]["username"], "admin");
    let access = body["data"]["access"].as_str().unwrap().to_string();

    let body = call_json!(
        app,
        test::TestRequest::get()
            .uri("/api/system/user/user_info/")
            .insert_header(("Authorization", format!("JWT {}", access)))
            .to_request()
    );
    assert_eq!(body["data"]["login_error_count"], 0);
    assert!(body["data"]["last_login"].is_string());

    let body = call_json!(
        app,
        test::TestRequest::get()
            .uri("/api/system/login_log/")
            .insert_header(("Authorization", format!("Bearer {}", access)))
            .to_request()
    );
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["os"], "Windows 10");

    // 登录请求被记入操作日志，密码已脱敏
    let body = call_json!(
        app,
        test::TestRequest::get()
            .uri("/api/system/operation_log/?limit=100")
            .insert_header(("Authorization", format!("JWT {}", access)))
            .to_request()
    );
    let logins: Vec<&Value> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|log| log["request_path"] == "/api/login/")
        .collect();
    assert_eq!(logins.len(), 2);
    for log in &logins {
        assert_eq!(log["request_modular"], "登录模块");
        let request_body: Value =
            serde_json::from_str(log["request_body"].as_str().unwrap()).unwrap();
        assert_eq!(request_body["password"], "********");
    }
    assert!(logins.iter().any(|log| log["status"] == true && log["response_code"] == "2000"));
    assert!(logins.iter().any(|log| log["status"] == false && log["response_code"] == "4000"));
}

#[actix_web::test]
async fn lockout_and_admin_unlock() {
    let state = state().await;
    let app = app!(state);

    let body = login!(app, "admin", seed::ADMIN_PASSWORD);
    let admin_auth = format!("JWT {}", body["data"]["access"].as_str().unwrap());

    let body = call_json!(
        app,
        test::TestRequest::post()
            .uri("/api/system/user/")
            .insert_header(("Authorization", admin_auth.clone()))
            .set_json(json!({"username": "bob", "password": "bob-secret"}))
            .to_request()
    );
    let bob_id = body["data"]["id"].as_i64().unwrap();

    for _ in 0..4 {
        let body = login!(app, "bob", "nope");
        assert_eq!(body["code"], 4000);
    }
    let body = login!(app, "bob", "nope");
    assert_eq!(body["msg"], "账号已被锁定,联系管理员解锁");
    let body = login!(app, "bob", "bob-secret");
    assert_eq!(body["msg"], "账号已被锁定,联系管理员解锁");

    let body = call_json!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/system/user/{}/unlock/", bob_id))
            .insert_header(("Authorization", admin_auth))
            .to_request()
    );
    assert_eq!(body["code"], 2000);

    let body = login!(app, "bob", "bob-secret");
    assert_eq!(body["code"], 2000);
    let refresh = body["data"]["refresh"].as_str().unwrap().to_string();
    let body = call_json!(
        app,
        test::TestRequest::post()
            .uri("/api/token/refresh/")
            .set_json(json!({ "refresh": refresh }))
            .to_request()
    );
    assert!(body["data"]["access"].is_string());
}

#[actix_web::test]
async fn captcha_is_one_shot_and_probes_answer() {
    let state = state().await;
    let app = app!(state);

    let captcha = call_json!(app, test::TestRequest::get().uri("/api/captcha/").to_request());
    let hashkey = captcha["data"]["hashkey"].as_str().unwrap().to_string();
    assert!(captcha["data"]["image_base"]
        .as_str()
        .unwrap()
        .starts_with("data:image/"));

    let attempt = |answer: &str| {
        test::TestRequest::post()
            .uri("/api/login/")
            .set_json(json!({
                "username": "admin",
                "password": seed::ADMIN_PASSWORD,
                "captcha": answer,
                "captchaKey": hashkey,
            }))
            .to_request()
    };
    let body = call_json!(app, attempt("zzzz"));
    assert_eq!(body["msg"], "图片验证码错误");
    let body = call_json!(app, attempt(ANSWER));
    assert_eq!(body["msg"], "验证码过期");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/readiness").to_request()).await;
    assert!(resp.status().is_success());
    let body = call_json!(
        app,
        test::TestRequest::get()
            .uri("/api/init/settings/?key=base")
            .to_request()
    );
    assert_eq!(body["data"]["base.captcha_state"], true);
}
