//! 统一响应封装
//!
//! 成功: `{"code": 2000, "msg": "success", "data": ...}`
//! 分页: `{"code": 2000, "msg": "success", "page": 1, "limit": 20, "total": 0, "data": [...]}`

use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

use crate::error::CODE_SUCCESS;

/// 单条数据响应
#[derive(Debug, Serialize, Deserialize)]
pub struct DetailResponse<T> {
    pub code: i32,
    pub msg: String,
    pub data: T,
}

impl<T: Serialize> DetailResponse<T> {
    pub fn new(data: T) -> Self {
        Self::with_msg(data, "success")
    }

    pub fn with_msg(data: T, msg: impl Into<String>) -> Self {
        Self {
            code: CODE_SUCCESS,
            msg: msg.into(),
            data,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::Ok().json(self)
    }
}

/// 分页列表响应
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub code: i32,
    pub msg: String,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub data: Vec<T>,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(page: Page<T>) -> Self {
        Self {
            code: CODE_SUCCESS,
            msg: "success".to_string(),
            page: page.page,
            limit: page.limit,
            total: page.total,
            data: page.items,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::Ok().json(self)
    }
}

/// 分页查询参数
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl PageQuery {
    /// 页码从 1 开始，每页条数限制在 1..=1000
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, 1000),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page.max(1) - 1) * self.limit
    }
}

/// 一页数据
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// 对已排序的完整结果做内存分页
    pub fn slice(all: Vec<T>, query: PageQuery) -> Self {
        let query = query.normalized();
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect();
        Self {
            page: query.page,
            limit: query.limit,
            total,
            items,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            page: self.page,
            limit: self.limit,
            total: self.total,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}
