//! 系统配置缓存
//!
//! 每个租户一份扁平化的 `分组key.子项key → 值` 映射。重建在锁外完成，
//! 完成后整体替换，读者不会看到构建到一半的映射。每次重建在读库前领取代次，
//! 落后于已缓存代次的结果直接丢弃。

use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::models::system_config::{FORM_ITEM_ARRAY, FORM_ITEM_IMG};
use super::models::{SystemConfig, PUBLIC_SCHEMA};
use crate::error::{AppError, AppResult};
use crate::store::{Store, StoreResult, SystemConfigStore, TenantStore};

pub type ConfigMap = BTreeMap<String, Value>;

/// 一个租户的配置快照
#[derive(Debug, Clone, Default)]
pub struct TenantConfig {
    pub values: ConfigMap,
    /// status 为 false 的子项，只对后台可见
    pub backend_only: BTreeSet<String>,
}

impl TenantConfig {
    /// 前端可见的配置，可按 `|` 分隔的键前缀过滤
    pub fn frontend_values(&self, prefixes: Option<&str>) -> ConfigMap {
        let prefixes: Vec<&str> = prefixes
            .map(|p| p.split('|').map(str::trim).filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();
        self.values
            .iter()
            .filter(|(k, _)| !self.backend_only.contains(*k))
            .filter(|(k, _)| prefixes.is_empty() || prefixes.iter().any(|p| k.starts_with(*p)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// 将配置行扁平化
///
/// 只处理子项（有 parent_id），按 sort 排序；图片类型取第一张的 url，
/// 数组类型整理为按 key 排序的 `{key, title, value}` 列表。
pub fn flatten(rows: &[SystemConfig]) -> TenantConfig {
    let parents: HashMap<i64, &str> = rows
        .iter()
        .filter(|r| r.parent_id.is_none())
        .map(|r| (r.id(), r.key.as_str()))
        .collect();

    let mut children: Vec<&SystemConfig> = rows.iter().filter(|r| r.parent_id.is_some()).collect();
    children.sort_by_key(|r| r.sort);

    let mut config = TenantConfig::default();
    for row in children {
        let Some(parent_key) = row.parent_id.and_then(|id| parents.get(&id)) else {
            continue;
        };
        let key = format!("{}.{}", parent_key, row.key);
        let value = normalize_value(row.form_item_type, row.value.clone().unwrap_or(Value::Null));
        if !row.status {
            config.backend_only.insert(key.clone());
        }
        config.values.insert(key, value);
    }
    config
}

fn normalize_value(form_item_type: Option<i32>, value: Value) -> Value {
    if !truthy(&value) {
        return value;
    }
    match form_item_type {
        Some(FORM_ITEM_IMG) => match &value {
            Value::Array(items) => items
                .first()
                .and_then(|first| first.get("url"))
                .cloned()
                .unwrap_or(Value::Null),
            _ => value,
        },
        Some(FORM_ITEM_ARRAY) => match value {
            Value::Array(items) => {
                let mut list: Vec<Value> = items
                    .iter()
                    .map(|item| {
                        json!({
                            "key": item.get("key").cloned().unwrap_or(Value::Null),
                            "title": item.get("title").cloned().unwrap_or(Value::Null),
                            "value": item.get("value").cloned().unwrap_or(Value::Null),
                        })
                    })
                    .collect();
                list.sort_by_key(|item| sort_key(&item["key"]));
                Value::Array(list)
            }
            other => other,
        },
        _ => value,
    }
}

fn sort_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// 与 Python 一致的真值判断：null、false、0、空串、空数组、空对象为假
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

struct CachedConfig {
    generation: u64,
    config: Arc<TenantConfig>,
}

/// 进程内的系统配置缓存
pub struct SystemConfigCache {
    tenant_mode: bool,
    generation: AtomicU64,
    tenants: RwLock<HashMap<String, CachedConfig>>,
}

impl SystemConfigCache {
    pub fn new(tenant_mode: bool) -> Self {
        Self {
            tenant_mode,
            generation: AtomicU64::new(0),
            tenants: RwLock::new(HashMap::new()),
        }
    }

    fn schema<'a>(&self, tenant: &'a str) -> &'a str {
        if self.tenant_mode {
            tenant
        } else {
            PUBLIC_SCHEMA
        }
    }

    /// 重建单个租户的配置
    pub async fn refresh(&self, store: &dyn Store, tenant: &str) -> StoreResult<Arc<TenantConfig>> {
        let schema = self.schema(tenant);
        // 先领代次再读库，代次更大的重建读到的数据不会更旧
        let generation = self.next_generation();
        let rows = store.list_system_configs(schema).await?;
        Ok(self.install(schema, generation, Arc::new(flatten(&rows))))
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// 写入快照；已缓存的代次更新时保留原快照并返回它
    fn install(&self, schema: &str, generation: u64, config: Arc<TenantConfig>) -> Arc<TenantConfig> {
        let mut tenants = self.tenants.write();
        if let Some(cached) = tenants.get(schema) {
            if cached.generation > generation {
                tracing::debug!(tenant = schema, generation, "丢弃过期的配置快照");
                return Arc::clone(&cached.config);
            }
        }
        tracing::debug!(tenant = schema, generation, entries = config.values.len(), "系统配置已刷新");
        tenants.insert(
            schema.to_string(),
            CachedConfig {
                generation,
                config: Arc::clone(&config),
            },
        );
        config
    }

    /// 租户模式下重建全部租户，否则只重建 public
    pub async fn refresh_all(&self, store: &dyn Store) -> StoreResult<()> {
        if self.tenant_mode {
            for tenant in store.list_tenants().await? {
                self.refresh(store, &tenant.schema_name).await?;
            }
        } else {
            self.refresh(store, PUBLIC_SCHEMA).await?;
        }
        Ok(())
    }

    /// 租户配置，缓存缺失时即时构建
    pub async fn get_system_config(
        &self,
        store: &dyn Store,
        tenant: &str,
    ) -> StoreResult<Arc<TenantConfig>> {
        let cached = self
            .tenants
            .read()
            .get(self.schema(tenant))
            .map(|cached| Arc::clone(&cached.config));
        match cached {
            Some(config) => Ok(config),
            None => self.refresh(store, tenant).await,
        }
    }

    /// 按键取值
    ///
    /// - `分组.子项`：该值，不存在为 `None`
    /// - `分组`：该分组下全部子项
    /// - 空串：全部配置
    pub async fn get_system_config_values(
        &self,
        store: &dyn Store,
        tenant: &str,
        key: &str,
    ) -> StoreResult<Option<Value>> {
        let config = self.get_system_config(store, tenant).await?;
        Ok(lookup(&config.values, key))
    }

    /// 数组类型配置转为 `{key: value}`
    pub async fn get_system_config_values_to_dict(
        &self,
        store: &dyn Store,
        tenant: &str,
        key: &str,
    ) -> AppResult<Map<String, Value>> {
        let value = self
            .get_system_config_values(store, tenant, key)
            .await?
            .ok_or_else(|| AppError::validation(format!("{}配置不存在", key)))?;
        Ok(to_dict(&value))
    }

    /// 配置项是否为真，缺失视为假
    pub async fn is_enabled(&self, store: &dyn Store, tenant: &str, key: &str) -> StoreResult<bool> {
        let config = self.get_system_config(store, tenant).await?;
        Ok(config.values.get(key).is_some_and(truthy))
    }
}

pub fn lookup(values: &ConfigMap, key: &str) -> Option<Value> {
    if key.is_empty() {
        return Some(Value::Object(
            values.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        ));
    }
    if key.contains('.') {
        return values.get(key).cloned();
    }
    let prefix = format!("{}.", key);
    Some(Value::Object(
        values
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    ))
}

pub fn to_dict(value: &Value) -> Map<String, Value> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let key = item.get("key")?;
                    Some((sort_key(key), item.get("value").cloned().unwrap_or(Value::Null)))
                })
                .collect()
        })
        .unwrap_or_default()
}
