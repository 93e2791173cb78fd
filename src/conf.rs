//! 强类型应用配置
//!
//! 由 [`ConfigManager`] 整体反序列化得到，每个字段都有默认值，
//! 因此空配置也能启动（使用内存存储）。

use serde::Deserialize;
use std::collections::HashMap;

use crate::comm::config::{ConfigError, ConfigManager};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            workers: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// 未配置时使用内存存储
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// 令牌配置，有效期单位为分钟
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_lifetime: i64,
    pub refresh_token_lifetime: i64,
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: "vgo-admin-insecure-secret-change-me".to_string(),
            access_token_lifetime: 1440,
            refresh_token_lifetime: 1440,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptchaSettings {
    pub length: usize,
    /// 秒
    pub timeout: i64,
    pub width: u32,
    pub height: u32,
}

impl Default for CaptchaSettings {
    fn default() -> Self {
        Self {
            length: 4,
            timeout: 300,
            width: 130,
            height: 40,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoginSettings {
    pub max_error_count: i32,
}

impl Default for LoginSettings {
    fn default() -> Self {
        Self { max_error_count: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordSettings {
    pub bcrypt_cost: u32,
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// 操作日志中间件配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiLogSettings {
    pub enable: bool,
    /// 需要记录的方法，包含 `ALL` 时记录全部
    pub methods: Vec<String>,
    /// 请求路径 → 模块名，路由表未覆盖时使用
    pub model_map: HashMap<String, String>,
}

impl Default for ApiLogSettings {
    fn default() -> Self {
        Self {
            enable: true,
            methods: vec!["ALL".to_string()],
            model_map: HashMap::new(),
        }
    }
}

impl ApiLogSettings {
    pub fn should_log(&self, method: &str) -> bool {
        self.enable
            && self
                .methods
                .iter()
                .any(|m| m.eq_ignore_ascii_case("ALL") || m.eq_ignore_ascii_case(method))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TenantSettings {
    pub enabled: bool,
    pub header: String,
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            header: "X-Tenant".to_string(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub jwt: JwtSettings,
    pub captcha: CaptchaSettings,
    pub login: LoginSettings,
    pub password: PasswordSettings,
    pub api_log: ApiLogSettings,
    pub tenant: TenantSettings,
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl AppSettings {
    /// 从配置管理器加载并校验
    pub fn load(manager: &ConfigManager) -> Result<Self, ConfigError> {
        let settings: AppSettings = manager.deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(invalid("jwt.secret", "不能为空"));
        }
        if self.server.port != 0 && self.server.port < 1024 {
            return Err(invalid("server.port", "端口必须为 0 或不小于 1024"));
        }
        if self.login.max_error_count <= 0 {
            return Err(invalid("login.max_error_count", "必须大于 0"));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(invalid(
                "logging.level",
                &format!("未知日志级别 {}", self.logging.level),
            ));
        }
        if self.captcha.length == 0 || self.captcha.timeout <= 0 {
            return Err(invalid("captcha", "长度与有效期必须大于 0"));
        }
        Ok(())
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::config::ConfigSource;

    fn load(toml: &str) -> Result<AppSettings, ConfigError> {
        let manager = ConfigManager::from_sources(vec![ConfigSource::Toml(toml.to_string())]).unwrap();
        AppSettings::load(&manager)
    }

    #[test]
    fn test_defaults_from_empty_config() {
        let settings = load("").unwrap();
        assert_eq!(settings.jwt.access_token_lifetime, 1440);
        assert_eq!(settings.captcha.length, 4);
        assert_eq!(settings.captcha.timeout, 300);
        assert_eq!(settings.login.max_error_count, 5);
        assert!(settings.database.url.is_none());
        assert_eq!(settings.tenant.header, "X-Tenant");
    }

    #[test]
    fn test_overrides() {
        let settings = load(
            "[server]\nport = 9000\n[api_log]\nmethods = [\"POST\", \"DELETE\"]\n[api_log.model_map]\n\"/api/login/\" = \"登录模块\"\n",
        )
        .unwrap();
        assert_eq!(settings.server.port, 9000);
        assert!(settings.api_log.should_log("post"));
        assert!(!settings.api_log.should_log("GET"));
        assert_eq!(
            settings.api_log.model_map.get("/api/login/").map(String::as_str),
            Some("登录模块")
        );
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(load("[jwt]\nsecret = \"\"").is_err());
        assert!(load("[server]\nport = 80").is_err());
        assert!(load("[login]\nmax_error_count = 0").is_err());
        assert!(load("[logging]\nlevel = \"loud\"").is_err());
        assert!(load("[server]\nport = 0").is_ok());
    }
}
