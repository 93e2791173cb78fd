//! 分层配置加载
//!
//! 依次叠加 `config/development.toml`、`config/default.toml`、
//! `config/production.toml` 与 `VGO__` 前缀的环境变量，后者覆盖前者。

use anyhow::{anyhow, Result};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use lazy_static::lazy_static;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::sync::Arc;

lazy_static! {
    static ref GLOBAL_CONFIG_MANAGER: RwLock<Option<Arc<ConfigManager>>> = RwLock::new(None);
}

const CONFIG_FILES: [&str; 3] = [
    "config/development.toml",
    "config/default.toml",
    "config/production.toml",
];
const ENV_PREFIX: &str = "VGO";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("配置项 '{key}' 无效: {message}")]
    Invalid { key: String, message: String },
    #[error("配置初始化失败: {message}")]
    InitializationError { message: String },
}

/// 配置源
pub enum ConfigSource {
    /// 文件不存在且非必需时跳过
    File { path: String, required: bool },
    Env {
        prefix: &'static str,
        separator: &'static str,
    },
    /// 内联 TOML 文本
    Toml(String),
}

impl ConfigSource {
    fn describe(&self) -> String {
        match self {
            ConfigSource::File { path, required } => format!("文件 {} (必需: {})", path, required),
            ConfigSource::Env { prefix, separator } => {
                format!("环境变量 {}{}*", prefix, separator)
            }
            ConfigSource::Toml(content) => format!("内联 TOML ({} 字节)", content.len()),
        }
    }

    /// 返回的布尔值表示是否真正加载
    fn apply(
        self,
        builder: ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<(ConfigBuilder<config::builder::DefaultState>, bool)> {
        match self {
            ConfigSource::File { path, required } => {
                if !std::path::Path::new(&path).exists() {
                    if required {
                        return Err(anyhow!("必需的配置文件不存在: {}", path));
                    }
                    return Ok((builder, false));
                }
                let file = File::with_name(&path).format(FileFormat::Toml).required(required);
                Ok((builder.add_source(file), true))
            }
            ConfigSource::Env { prefix, separator } => {
                let env = Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator(separator)
                    .ignore_empty(true);
                Ok((builder.add_source(env), true))
            }
            ConfigSource::Toml(content) => Ok((
                builder.add_source(File::from_str(&content, FileFormat::Toml)),
                true,
            )),
        }
    }
}

/// 已加载的配置源，`loaded` 为 false 表示被跳过
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub description: String,
    pub priority: usize,
    pub loaded: bool,
}

pub struct ConfigManager {
    config: Config,
    sources: Vec<LoadedSource>,
}

impl ConfigManager {
    /// 默认配置源
    pub fn new() -> Result<Self> {
        let mut sources: Vec<ConfigSource> = CONFIG_FILES
            .iter()
            .map(|path| ConfigSource::File {
                path: path.to_string(),
                required: false,
            })
            .collect();
        sources.push(ConfigSource::Env {
            prefix: ENV_PREFIX,
            separator: ENV_SEPARATOR,
        });
        Self::from_sources(sources)
    }

    /// 按给定顺序叠加，越靠后优先级越高
    pub fn from_sources(sources: Vec<ConfigSource>) -> Result<Self> {
        let mut builder = Config::builder();
        let mut loaded_sources = Vec::with_capacity(sources.len());

        for (index, source) in sources.into_iter().enumerate() {
            let description = source.describe();
            let (next, loaded) = source.apply(builder)?;
            builder = next;
            loaded_sources.push(LoadedSource {
                description,
                priority: index + 1,
                loaded,
            });
        }

        let config = builder
            .build()
            .map_err(|e| anyhow!("构建配置失败: {}", e))?;
        Ok(Self {
            config,
            sources: loaded_sources,
        })
    }

    /// 整体反序列化为强类型配置
    pub fn deserialize<T: DeserializeOwned>(&self) -> std::result::Result<T, ConfigError> {
        self.config
            .clone()
            .try_deserialize::<T>()
            .map_err(|e| ConfigError::InitializationError {
                message: e.to_string(),
            })
    }

    /// (总计, 已加载, 跳过)
    pub fn get_sources_stats(&self) -> (usize, usize, usize) {
        let total = self.sources.len();
        let loaded = self.sources.iter().filter(|s| s.loaded).count();
        (total, loaded, total - loaded)
    }

    pub fn print_sources_info(&self) {
        for source in &self.sources {
            tracing::info!(
                priority = source.priority,
                loaded = source.loaded,
                "{}",
                source.description
            );
        }
        let (total, loaded, skipped) = self.get_sources_stats();
        tracing::info!(total, loaded, skipped, "配置源加载完成");
    }
}

/// 全局配置管理器，首次调用时加载
pub fn get_global_config_manager() -> Result<Arc<ConfigManager>> {
    if let Some(manager) = GLOBAL_CONFIG_MANAGER.read().as_ref() {
        return Ok(Arc::clone(manager));
    }
    let mut slot = GLOBAL_CONFIG_MANAGER.write();
    match slot.as_ref() {
        Some(manager) => Ok(Arc::clone(manager)),
        None => {
            let manager = Arc::new(ConfigManager::new()?);
            *slot = Some(Arc::clone(&manager));
            Ok(manager)
        }
    }
}
