//! 密码哈希（bcrypt），计算放到阻塞线程池执行

use anyhow::anyhow;

use crate::error::{AppError, AppResult};

pub fn hash_password_sync(password: &str, cost: u32) -> AppResult<String> {
    bcrypt::hash(password, cost).map_err(|e| AppError::Internal(anyhow!("密码哈希失败: {}", e)))
}

/// 格式错误的哈希视为不匹配
pub fn verify_password_sync(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}

pub async fn hash_password(password: String, cost: u32) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password_sync(&password, cost))
        .await
        .map_err(|e| AppError::Internal(anyhow!("密码哈希任务失败: {}", e)))?
}

pub async fn verify_password(password: String, password_hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password_sync(&password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(anyhow!("密码校验任务失败: {}", e)))
}

/// 新密码的基本要求
pub fn validate_new_password(password: &str) -> AppResult<()> {
    if password.chars().count() < 6 {
        return Err(AppError::validation("密码长度不能少于6位"));
    }
    Ok(())
}
