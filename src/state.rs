//! 应用共享状态，通过 `web::Data<AppState>` 注入各处理器

use crate::conf::AppSettings;
use crate::modules::system::captcha::CaptchaStore;
use crate::modules::system::dispatch::SystemConfigCache;
use crate::modules::system::token::TokenService;
use crate::store::DynStore;

pub struct AppState {
    pub settings: AppSettings,
    pub store: DynStore,
    pub config_cache: SystemConfigCache,
    pub captcha: CaptchaStore,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(settings: AppSettings, store: DynStore) -> Self {
        Self {
            config_cache: SystemConfigCache::new(settings.tenant.enabled),
            captcha: CaptchaStore::from_settings(&settings.captcha),
            tokens: TokenService::new(&settings.jwt),
            settings,
            store,
        }
    }

    /// 替换验证码存储（测试中使用固定答案）
    pub fn with_captcha(mut self, captcha: CaptchaStore) -> Self {
        self.captcha = captcha;
        self
    }
}
