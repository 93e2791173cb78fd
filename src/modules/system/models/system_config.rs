use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::BaseEntity;

/// 表单类型：图片
pub const FORM_ITEM_IMG: i32 = 7;
/// 表单类型：数组
pub const FORM_ITEM_ARRAY: i32 = 11;

/// 系统配置项
///
/// 无 `parent_id` 的行是分组，子项的完整键为 `分组key.子项key`；
/// 同一分组下 `key` 唯一。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SystemConfig {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub base: BaseEntity,
    pub parent_id: Option<i64>,
    pub title: String,
    pub key: String,
    pub value: Option<Value>,
    pub sort: i32,
    /// false 表示仅后台可见
    pub status: bool,
    pub data_options: Option<Value>,
    /// 0 text, 1 datetime, 2 date, 3 textarea, 4 select, 5 checkbox, 6 radio, 7 img,
    /// 8 file, 9 switch, 10 number, 11 array, 12 imgs, 13 foreignkey, 14 manytomany, 15 time
    pub form_item_type: Option<i32>,
    pub rule: Option<Value>,
    pub placeholder: Option<String>,
    pub setting: Option<Value>,
}

impl SystemConfig {
    pub fn id(&self) -> i64 {
        self.base.id
    }
}

/// 创建 / 修改配置项的请求体
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfigInput {
    pub parent_id: Option<i64>,
    pub title: String,
    pub key: String,
    pub value: Option<Value>,
    #[serde(default)]
    pub sort: i32,
    #[serde(default = "default_true")]
    pub status: bool,
    pub data_options: Option<Value>,
    #[serde(default)]
    pub form_item_type: Option<i32>,
    pub rule: Option<Value>,
    pub placeholder: Option<String>,
    pub setting: Option<Value>,
}

fn default_true() -> bool {
    true
}

impl SystemConfigInput {
    pub fn apply(self, config: &mut SystemConfig) {
        config.parent_id = self.parent_id;
        config.title = self.title;
        config.key = self.key;
        config.value = self.value;
        config.sort = self.sort;
        config.status = self.status;
        config.data_options = self.data_options;
        config.form_item_type = self.form_item_type.or(Some(0));
        config.rule = self.rule;
        config.placeholder = self.placeholder;
        config.setting = self.setting;
    }
}
