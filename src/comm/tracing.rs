use anyhow::Result;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

use crate::conf::LoggingSettings;

/// 初始化全局日志订阅器
///
/// `RUST_LOG` 优先于配置中的 `logging.level`；`logging.json` 为真时输出 bunyan JSON，
/// 否则输出紧凑文本格式。重复初始化（例如测试中）会被忽略。
pub fn init_tracing(app_name: &str, settings: &LoggingSettings) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{},sqlx=warn", settings.level)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.json {
        let formatting_layer = BunyanFormattingLayer::new(app_name.into(), std::io::stdout);
        let subscriber = Registry::default()
            .with(env_filter)
            .with(JsonStorageLayer)
            .with(formatting_layer);
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            tracing::debug!("全局日志订阅器已存在");
        }
    } else {
        let subscriber = Registry::default()
            .with(env_filter)
            .with(fmt::layer().compact().with_target(false));
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            tracing::debug!("全局日志订阅器已存在");
        }
    }
    Ok(())
}
