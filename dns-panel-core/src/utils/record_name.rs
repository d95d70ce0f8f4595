//! 记录名规范化
//!
//! 表单中输入的名称统一按以下顺序处理（添加与编辑一致）：
//! 1. 去掉首尾空白，再去掉末尾的 `.`
//! 2. 空字符串或 `@` 表示根记录，结果为域名本身
//! 3. 已经等于域名或以 `.{domain}` 结尾（不区分大小写）的视为完整域名，原样保留
//! 4. 其余情况拼接为 `{label}.{domain}`
//!
//! 包含空白、`@`（单独使用除外）、空标签（`a..b`）或以 `.` 开头的输入会被拒绝。

use crate::error::{CoreError, CoreResult};

/// 规范化域名：去空白、去末尾点
fn normalize_domain_name(name: &str) -> &str {
    name.trim().trim_end_matches('.')
}

/// 将表单输入解析为完整记录名
///
/// 如: "www" + "example.com" -> "www.example.com"
/// 如: "@" / "" + "example.com" -> "example.com"
pub fn resolve_record_name(input: &str, domain: &str) -> CoreResult<String> {
    let domain = normalize_domain_name(domain);
    let label = normalize_domain_name(input);

    if label.is_empty() || label == "@" {
        return Ok(domain.to_string());
    }
    if label.chars().any(char::is_whitespace) {
        return Err(invalid(input, "must not contain whitespace"));
    }
    if label.starts_with('.') {
        return Err(invalid(input, "must not start with '.'"));
    }
    if label.contains('@') {
        return Err(invalid(input, "'@' can only be used alone for the apex record"));
    }
    if label.split('.').any(str::is_empty) {
        return Err(invalid(input, "contains an empty label"));
    }

    if is_within_domain(label, domain) {
        Ok(label.to_string())
    } else {
        Ok(format!("{label}.{domain}"))
    }
}

/// 完整记录名是否等于域名或是其子域（不区分大小写）
pub fn is_within_domain(name: &str, domain: &str) -> bool {
    let name = normalize_domain_name(name).to_ascii_lowercase();
    let domain = normalize_domain_name(domain).to_ascii_lowercase();
    name == domain || name.ends_with(&format!(".{domain}"))
}

fn invalid(input: &str, reason: &str) -> CoreError {
    CoreError::Validation(format!("invalid record name \"{}\": {reason}", input.trim()))
}
