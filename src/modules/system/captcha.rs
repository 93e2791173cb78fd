//! 图片验证码的签发与一次性校验

use captcha_rs::CaptchaBuilder;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use thiserror::Error;

use crate::conf::CaptchaSettings;
use crate::error::AppError;

const HASHKEY_LEN: usize = 40;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptchaError {
    #[error("验证码不能为空")]
    Empty,
    #[error("验证码过期")]
    Expired,
    #[error("图片验证码错误")]
    Mismatch,
}

impl From<CaptchaError> for AppError {
    fn from(e: CaptchaError) -> Self {
        AppError::validation(e.to_string())
    }
}

/// 生成的挑战：答案与展示用的图片
pub struct Challenge {
    pub response: String,
    /// `data:image/...;base64,` 形式
    pub image_base: String,
}

pub trait ChallengeGenerator: Send + Sync {
    fn generate(&self) -> Challenge;
}

/// 基于 captcha-rs 的图片验证码
pub struct ImageChallengeGenerator {
    length: usize,
    width: u32,
    height: u32,
}

impl ImageChallengeGenerator {
    pub fn new(settings: &CaptchaSettings) -> Self {
        Self {
            length: settings.length,
            width: settings.width,
            height: settings.height,
        }
    }
}

impl ChallengeGenerator for ImageChallengeGenerator {
    fn generate(&self) -> Challenge {
        let captcha = CaptchaBuilder::new()
            .length(self.length)
            .width(self.width)
            .height(self.height)
            .dark_mode(false)
            .complexity(5) // min: 1, max: 10
            .compression(40) // min: 1, max: 99
            .build();
        let image = captcha.to_base64();
        let image_base = if image.starts_with("data:") {
            image
        } else {
            format!("data:image/png;base64,{}", image)
        };
        Challenge {
            response: captcha.text,
            image_base,
        }
    }
}

struct Entry {
    response: String,
    expiration: DateTime<Utc>,
}

/// 返回给前端的验证码
#[derive(Debug, Clone, Serialize)]
pub struct IssuedCaptcha {
    pub hashkey: String,
    pub image_base: String,
}

/// 验证码存储
pub struct CaptchaStore {
    generator: Box<dyn ChallengeGenerator>,
    timeout: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl CaptchaStore {
    pub fn new(generator: Box<dyn ChallengeGenerator>, timeout_secs: i64) -> Self {
        Self {
            generator,
            timeout: Duration::seconds(timeout_secs),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_settings(settings: &CaptchaSettings) -> Self {
        Self::new(
            Box::new(ImageChallengeGenerator::new(settings)),
            settings.timeout,
        )
    }

    pub fn issue(&self) -> IssuedCaptcha {
        self.issue_at(Utc::now())
    }

    /// 签发新验证码，同时清理过期条目
    pub fn issue_at(&self, now: DateTime<Utc>) -> IssuedCaptcha {
        let challenge = self.generator.generate();
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| entry.expiration > now);

        let mut hashkey = make_hashkey(&challenge.response);
        while entries.contains_key(&hashkey) {
            hashkey = make_hashkey(&challenge.response);
        }
        entries.insert(
            hashkey.clone(),
            Entry {
                response: challenge.response.to_lowercase(),
                expiration: now + self.timeout,
            },
        );
        IssuedCaptcha {
            hashkey,
            image_base: challenge.image_base,
        }
    }

    pub fn validate(&self, hashkey: Option<&str>, answer: Option<&str>) -> Result<(), CaptchaError> {
        self.validate_at(hashkey, answer, Utc::now())
    }

    /// 一次性校验：无论结果如何，条目都会被移除
    pub fn validate_at(
        &self,
        hashkey: Option<&str>,
        answer: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), CaptchaError> {
        let hashkey = hashkey.map(str::trim).filter(|s| !s.is_empty());
        let answer = answer.map(str::trim).filter(|s| !s.is_empty());
        let (Some(hashkey), Some(answer)) = (hashkey, answer) else {
            return Err(CaptchaError::Empty);
        };
        let entry = self
            .entries
            .lock()
            .remove(hashkey)
            .ok_or(CaptchaError::Expired)?;
        if entry.expiration <= now {
            return Err(CaptchaError::Expired);
        }
        if entry.response != answer.to_lowercase() {
            return Err(CaptchaError::Mismatch);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn make_hashkey(response: &str) -> String {
    let mut salt = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut salt);
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(response.as_bytes());
    let mut hashkey = hex::encode(hasher.finalize());
    hashkey.truncate(HASHKEY_LEN);
    hashkey
}

/// 固定答案的生成器，测试使用
pub struct FixedChallengeGenerator(pub String);

impl ChallengeGenerator for FixedChallengeGenerator {
    fn generate(&self) -> Challenge {
        Challenge {
            response: self.0.clone(),
            image_base: "data:image/png;base64,".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn store() -> CaptchaStore {
        CaptchaStore::new(Box::new(FixedChallengeGenerator("AbCd".to_string())), 300)
    }

    #[test]
    fn test_validate_is_one_shot_and_case_insensitive() {
        let store = store();
        let issued = store.issue();
        assert_eq!(issued.hashkey.len(), 40);
        assert!(issued.image_base.starts_with("data:image/"));

        assert_eq!(store.validate(Some(&issued.hashkey), Some("abcd")), Ok(()));
        assert_eq!(
            store.validate(Some(&issued.hashkey), Some("abcd")),
            Err(CaptchaError::Expired)
        );
    }

    #[test]
    fn test_mismatch_consumes_entry() {
        let store = store();
        let issued = store.issue();
        assert_eq!(
            store.validate(Some(&issued.hashkey), Some("zzzz")),
            Err(CaptchaError::Mismatch)
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_empty_and_expired() {
        let store = store();
        assert_eq!(store.validate(None, Some("x")), Err(CaptchaError::Empty));
        assert_eq!(store.validate(Some("k"), Some("  ")), Err(CaptchaError::Empty));

        let now = Utc::now();
        let issued = store.issue_at(now);
        assert_eq!(
            store.validate_at(Some(&issued.hashkey), Some("abcd"), now + Duration::seconds(301)),
            Err(CaptchaError::Expired)
        );
    }

    #[test]
    fn test_issue_purges_expired() {
        let store = store();
        let now = Utc::now();
        store.issue_at(now);
        store.issue_at(now);
        assert_eq!(store.len(), 2);
        store.issue_at(now + Duration::seconds(600));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_concurrent_issue_unique_hashkeys() {
        let store = Arc::new(store());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..50).map(|_| store.issue().hashkey).collect::<Vec<_>>()
                })
            })
            .collect();
        let keys: HashSet<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        assert_eq!(keys.len(), 400);
    }

    #[test]
    fn test_image_generator_produces_data_uri() {
        let generator = ImageChallengeGenerator::new(&CaptchaSettings::default());
        let challenge = generator.generate();
        assert_eq!(challenge.response.chars().count(), 4);
        assert!(challenge.image_base.starts_with("data:image/"));
    }
}
