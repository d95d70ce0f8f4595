//! 工具函数模块

/// 记录名规范化（标签 <-> 完整域名）
pub mod record_name;
