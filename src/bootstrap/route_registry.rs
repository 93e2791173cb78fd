use actix_web::web;
use lazy_static::lazy_static;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::{BTreeSet, HashMap};

/// 路由配置函数类型
pub type RouteConfigFn = fn(&mut web::ServiceConfig);

/// 路由信息结构
#[derive(Debug, Clone)]
pub struct RouteInfo {
    pub name: String,
    pub description: String,
    /// 模块名，同时作为操作日志的 request_modular
    pub module: String,
    /// 该组路由的公共路径前缀
    pub path_prefix: String,
    pub config_fn: RouteConfigFn,
}

/// 全局路由注册器
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: HashMap<String, RouteInfo>,
}

impl RouteRegistry {
    /// 创建新的路由注册器
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册路由，同名覆盖
    pub fn register_route(&mut self, route_info: RouteInfo) {
        self.routes.insert(route_info.name.clone(), route_info);
    }

    /// 获取所有路由
    pub fn get_routes(&self) -> &HashMap<String, RouteInfo> {
        &self.routes
    }

    /// 获取指定模块的路由
    pub fn get_routes_by_module(&self, module: &str) -> Vec<&RouteInfo> {
        self.routes
            .values()
            .filter(|route| route.module == module)
            .collect()
    }

    /// 配置所有路由到 ServiceConfig
    ///
    /// 前缀长的先注册，避免被短前缀的 scope 抢先匹配
    pub fn configure_all_routes(&self, cfg: &mut web::ServiceConfig) {
        let mut routes: Vec<&RouteInfo> = self.routes.values().collect();
        routes.sort_by(|a, b| {
            b.path_prefix
                .len()
                .cmp(&a.path_prefix.len())
                .then_with(|| a.name.cmp(&b.name))
        });
        for route_info in routes {
            (route_info.config_fn)(cfg);
        }
    }

    /// 请求路径所属的模块（最长前缀匹配）
    pub fn module_for_path(&self, path: &str) -> Option<String> {
        self.routes
            .values()
            .filter(|route| !route.path_prefix.is_empty() && path.starts_with(&route.path_prefix))
            .max_by_key(|route| route.path_prefix.len())
            .map(|route| route.module.clone())
    }

    /// 获取路由统计信息
    pub fn get_stats(&self) -> (usize, Vec<String>) {
        let modules: BTreeSet<String> =
            self.routes.values().map(|route| route.module.clone()).collect();
        (self.routes.len(), modules.into_iter().collect())
    }

    /// 打印路由信息
    pub fn print_routes_info(&self) {
        let (total, modules) = self.get_stats();
        for module in modules {
            for route in self.get_routes_by_module(&module) {
                tracing::info!(
                    module = %module,
                    route = %route.name,
                    prefix = %route.path_prefix,
                    "{}",
                    route.description
                );
            }
        }
        tracing::info!(total, "路由注册完成");
    }
}

// 全局路由注册器实例
lazy_static! {
    static ref GLOBAL_ROUTE_REGISTRY: RwLock<RouteRegistry> = RwLock::new(RouteRegistry::new());
}

/// 获取全局路由注册器的读锁
pub fn get_global_route_registry() -> RwLockReadGuard<'static, RouteRegistry> {
    GLOBAL_ROUTE_REGISTRY.read()
}

/// 获取全局路由注册器的写锁
pub fn get_global_route_registry_mut() -> RwLockWriteGuard<'static, RouteRegistry> {
    GLOBAL_ROUTE_REGISTRY.write()
}

/// 注册路由到全局注册器
pub fn register_global_route(route_info: RouteInfo) {
    get_global_route_registry_mut().register_route(route_info);
}

/// 配置所有全局路由
pub fn configure_global_routes(cfg: &mut web::ServiceConfig) {
    get_global_route_registry().configure_all_routes(cfg);
}

/// 请求路径在全局注册器中对应的模块
pub fn global_module_for_path(path: &str) -> Option<String> {
    get_global_route_registry().module_for_path(path)
}

/// 便捷宏：注册路由
#[macro_export]
macro_rules! register_route {
    ($name:expr, $description:expr, $module:expr, $prefix:expr, $config_fn:expr) => {
        $crate::bootstrap::route_registry::register_global_route(
            $crate::bootstrap::route_registry::RouteInfo {
                name: $name.to_string(),
                description: $description.to_string(),
                module: $module.to_string(),
                path_prefix: $prefix.to_string(),
                config_fn: $config_fn,
            },
        );
    };
}

/// 便捷宏：批量注册路由
#[macro_export]
macro_rules! register_routes {
    ($(($name:expr, $description:expr, $module:expr, $prefix:expr, $config_fn:expr)),* $(,)?) => {
        $(
            $crate::register_route!($name, $description, $module, $prefix, $config_fn);
        )*
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_cfg: &mut web::ServiceConfig) {}

    fn route(name: &str, module: &str, prefix: &str) -> RouteInfo {
        RouteInfo {
            name: name.to_string(),
            description: String::new(),
            module: module.to_string(),
            path_prefix: prefix.to_string(),
            config_fn: noop,
        }
    }

    #[test]
    fn test_module_for_path_prefers_longest_prefix() {
        let mut registry = RouteRegistry::new();
        registry.register_route(route("system", "系统管理", "/api/system/"));
        registry.register_route(route("user", "用户管理", "/api/system/user/"));
        registry.register_route(route("health", "健康检查", ""));

        assert_eq!(
            registry.module_for_path("/api/system/user/1/").as_deref(),
            Some("用户管理")
        );
        assert_eq!(
            registry.module_for_path("/api/system/role/").as_deref(),
            Some("系统管理")
        );
        assert_eq!(registry.module_for_path("/healthz"), None);

        let (total, modules) = registry.get_stats();
        assert_eq!(total, 3);
        assert_eq!(modules.len(), 3);
    }
}
