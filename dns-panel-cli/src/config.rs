//! 配置加载
//!
//! 优先级：命令行参数 > 环境变量 `DNS_PANEL_BASE_URL` > 配置文件 > 默认值。
//! 环境变量由 clap 直接合并到 `--base-url` 参数中。

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use dns_panel_client::ClientConfig;
use dns_panel_core::types::ControllerConfig;
use serde::Deserialize;

/// 配置目录下的应用子目录
const APP_DIR: &str = "dns-panel";
const CONFIG_FILE: &str = "config.toml";

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub list: ListSection,
}

/// `[list]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListSection {
    pub page_size: Option<u32>,
    pub search_debounce_ms: Option<u64>,
    pub list_notice_secs: Option<u64>,
    pub form_notice_secs: Option<u64>,
}

/// Platform default location, e.g. `~/.config/dns-panel/config.toml`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Load the config file.
///
/// An explicitly given path must exist; a missing file at the default
/// location just means defaults.
pub fn load(explicit: Option<&Path>) -> Result<FileConfig> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match default_path() {
            Some(path) => (path, false),
            None => return Ok(FileConfig::default()),
        },
    };

    if !path.exists() {
        if required {
            bail!("config file not found: {}", path.display());
        }
        log::debug!("No config file at {}, using defaults", path.display());
        return Ok(FileConfig::default());
    }

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config = parse(&raw).with_context(|| format!("invalid config in {}", path.display()))?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn parse(raw: &str) -> Result<FileConfig> {
    Ok(toml::from_str(raw)?)
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client: ClientConfig,
    pub controller: ControllerConfig,
}

impl Settings {
    /// Merge the file with the `--base-url` argument (already merged with the
    /// environment by clap).
    pub fn resolve(file: &FileConfig, base_url: Option<&str>) -> Result<Self> {
        let Some(base_url) = base_url.or(file.base_url.as_deref()) else {
            bail!("no backend configured: pass --base-url, set DNS_PANEL_BASE_URL or add base_url to the config file");
        };
        let mut client = ClientConfig::from_base_url(base_url)?;
        if let Some(secs) = file.connect_timeout_secs {
            client.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.request_timeout_secs {
            client.request_timeout = Duration::from_secs(secs);
        }

        let mut controller = ControllerConfig::default();
        let list = &file.list;
        if let Some(page_size) = list.page_size {
            controller.page_size = page_size;
        }
        if let Some(ms) = list.search_debounce_ms {
            controller.search_debounce = Duration::from_millis(ms);
        }
        if let Some(secs) = list.list_notice_secs {
            controller.list_notice_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = list.form_notice_secs {
            controller.form_notice_ttl = Duration::from_secs(secs);
        }
        controller.validate()?;

        Ok(Self { client, controller })
    }
}
