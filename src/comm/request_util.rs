//! 请求信息提取：客户端 IP、操作系统、浏览器、请求参数

use actix_web::HttpRequest;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

/// 密码类字段的脱敏占位
pub const MASKED_VALUE: &str = "********";

const OS_RULES: &[(&str, &str)] = &[
    (r"Windows NT 10\.0", "Windows 10"),
    (r"Windows NT 6\.3", "Windows 8.1"),
    (r"Windows NT 6\.2", "Windows 8"),
    (r"Windows NT 6\.1", "Windows 7"),
    (r"Windows", "Windows"),
    (r"Android", "Android"),
    (r"iPhone|iPad|iPod", "iOS"),
    (r"Mac OS X", "Mac OS X"),
    (r"CrOS", "Chrome OS"),
    (r"Linux", "Linux"),
];

// 顺序重要：Edge/Opera 的 UA 中同样带有 Chrome/Safari 字样
const BROWSER_RULES: &[(&str, &str)] = &[
    (r"Edg(?:e|A|iOS)?/([\d.]+)", "Edge"),
    (r"OPR/([\d.]+)", "Opera"),
    (r"MicroMessenger/([\d.]+)", "WeChat"),
    (r"Firefox/([\d.]+)", "Firefox"),
    (r"Chrome/([\d.]+)", "Chrome"),
    (r"Version/([\d.]+).*Safari/", "Safari"),
    (r"MSIE ([\d.]+)", "IE"),
    (r"Trident/.*rv:([\d.]+)", "IE"),
    (r"PostmanRuntime/([\d.]+)", "PostmanRuntime"),
    (r"curl/([\d.]+)", "curl"),
];

lazy_static! {
    static ref OS_PATTERNS: Vec<(Regex, &'static str)> = compile(OS_RULES);
    static ref BROWSER_PATTERNS: Vec<(Regex, &'static str)> = compile(BROWSER_RULES);
}

fn compile(rules: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    rules
        .iter()
        .map(|(pattern, name)| (Regex::new(pattern).unwrap(), *name))
        .collect()
}

/// 客户端 IP：X-Forwarded-For 的最后一项，其次连接对端地址，否则 `unknown`
pub fn get_request_ip(req: &HttpRequest) -> String {
    let forwarded = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next_back())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// 请求头中的 User-Agent
pub fn get_user_agent(req: &HttpRequest) -> String {
    req.headers()
        .get("User-Agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn get_os(user_agent: &str) -> String {
    OS_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(user_agent))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| "Other".to_string())
}

pub fn get_browser(user_agent: &str) -> String {
    for (pattern, name) in BROWSER_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(user_agent) {
            return match caps.get(1) {
                Some(version) => format!("{} {}", name, version.as_str()),
                None => name.to_string(),
            };
        }
    }
    "Other".to_string()
}

/// 解析 `a=1&b=2` 形式的编码串
pub fn parse_urlencoded(input: &str) -> Map<String, Value> {
    let mut map = Map::new();
    for pair in input.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key);
        if key.is_empty() {
            continue;
        }
        map.insert(key, Value::String(decode_component(value)));
    }
    map
}

fn decode_component(raw: &str) -> String {
    let replaced = raw.replace('+', " ");
    urlencoding::decode(&replaced)
        .map(|s| s.into_owned())
        .unwrap_or(replaced)
}

/// 合并查询参数与请求体（JSON 对象或表单），请求体同名字段覆盖查询参数
pub fn get_request_data(query_string: &str, content_type: &str, body: &[u8]) -> Value {
    let mut data = parse_urlencoded(query_string);
    if !body.is_empty() {
        if content_type.starts_with("application/x-www-form-urlencoded") {
            data.extend(parse_urlencoded(&String::from_utf8_lossy(body)));
        } else if let Ok(Value::Object(json)) = serde_json::from_slice::<Value>(body) {
            data.extend(json);
        }
    }
    Value::Object(data)
}

/// 顶层字段名包含 `password` 的值统一脱敏
pub fn mask_password(data: &Value) -> Value {
    match data {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    if k.to_lowercase().contains("password") {
                        (k.clone(), Value::String(MASKED_VALUE.to_string()))
                    } else {
                        (k.clone(), v.clone())
                    }
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use serde_json::json;

    const CHROME_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.71 Safari/537.36";

    #[test]
    fn test_builtin_patterns_compile() {
        assert_eq!(OS_PATTERNS.len(), OS_RULES.len());
        assert_eq!(BROWSER_PATTERNS.len(), BROWSER_RULES.len());
    }

    #[test]
    fn test_ip_uses_last_forwarded_entry() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "10.0.0.1, 172.16.0.2"))
            .to_http_request();
        assert_eq!(get_request_ip(&req), "172.16.0.2");
    }

    #[test]
    fn test_ip_falls_back_to_peer_then_unknown() {
        let req = TestRequest::default()
            .peer_addr("192.168.1.9:5000".parse().unwrap())
            .to_http_request();
        assert_eq!(get_request_ip(&req), "192.168.1.9");
        assert_eq!(get_request_ip(&TestRequest::default().to_http_request()), "unknown");
    }

    #[test]
    fn test_os_and_browser() {
        assert_eq!(get_os(CHROME_WIN), "Windows 10");
        assert_eq!(get_browser(CHROME_WIN), "Chrome 120.0.6099.71");
        assert_eq!(get_browser("curl/8.4.0"), "curl 8.4.0");
        assert_eq!(get_os(""), "Other");
        assert_eq!(get_browser(""), "Other");
    }

    #[test]
    fn test_request_data_merges_query_and_json() {
        let data = get_request_data(
            "page=1&name=a+b",
            "application/json",
            br#"{"name": "x", "password": "secret"}"#,
        );
        assert_eq!(data["page"], "1");
        assert_eq!(data["name"], "x");

        let form = get_request_data("", "application/x-www-form-urlencoded", b"user=%E5%BC%A0");
        assert_eq!(form["user"], "张");
    }

    #[test]
    fn test_mask_password() {
        let masked = mask_password(&json!({"username": "admin", "password": "x", "old_password": "y"}));
        assert_eq!(masked["username"], "admin");
        assert_eq!(masked["password"], MASKED_VALUE);
        assert_eq!(masked["old_password"], MASKED_VALUE);
    }
}
