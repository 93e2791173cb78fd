use serde::{Deserialize, Serialize};

use super::BaseEntity;

/// 接口操作日志
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OperationLog {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub base: BaseEntity,
    pub request_modular: Option<String>,
    pub request_path: Option<String>,
    pub request_body: Option<String>,
    pub request_method: Option<String>,
    pub request_msg: Option<String>,
    pub request_ip: Option<String>,
    pub request_browser: Option<String>,
    pub response_code: Option<String>,
    pub request_os: Option<String>,
    pub json_result: Option<String>,
    pub status: bool,
}

/// 中间件写入的日志字段，`None` 表示保持原值
#[derive(Debug, Clone, Default)]
pub struct NewOperationLog {
    pub request_modular: Option<String>,
    pub request_path: Option<String>,
    pub request_body: Option<String>,
    pub request_method: Option<String>,
    pub request_msg: Option<String>,
    pub request_ip: Option<String>,
    pub request_browser: Option<String>,
    pub response_code: Option<String>,
    pub request_os: Option<String>,
    pub json_result: Option<String>,
    pub status: Option<bool>,
    pub creator: Option<i64>,
}

impl NewOperationLog {
    /// 将非空字段合并到已有记录
    pub fn apply(self, log: &mut OperationLog) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if self.$field.is_some() { log.$field = self.$field; })*
            };
        }
        merge!(
            request_modular,
            request_path,
            request_body,
            request_method,
            request_msg,
            request_ip,
            request_browser,
            response_code,
            request_os,
            json_result
        );
        if let Some(status) = self.status {
            log.status = status;
        }
        if self.creator.is_some() {
            log.base.creator = self.creator;
        }
    }
}
