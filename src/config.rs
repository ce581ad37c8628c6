//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `GYMINI__*` 覆盖（双下划线表示嵌套，如 `GYMINI__STORE__BACKEND=sqlite`）。
//! API 凭据不进配置文件，启动时由 Credentials 从环境变量读取，缺失即报错。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::core::AgentError;
use crate::llm::{RetryConfig, MAX_RETRY_DELAY};

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub store: StoreSection,
    pub search: SearchSection,
}

/// 默认作者签名（GetCreator 的回复）
pub const DEFAULT_CREATOR: &str =
    "I was created by the Gymini team to help you log workouts and train smarter.";

/// [app] 段：人设名、CLI 说话人标签、作者签名
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
    pub speaker_label: String,
    pub creator: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "Gymini".to_string(),
            speaker_label: "Gymini".to_string(),
            creator: DEFAULT_CREATOR.to_string(),
        }
    }
}

/// [llm] 段：后端选择与重试
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：deepseek / openai / mock
    pub provider: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub retry: RetrySection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "deepseek".to_string(),
            model: None,
            base_url: None,
            retry: RetrySection::default(),
        }
    }
}

/// [llm.retry] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    pub max_attempts: u32,
    pub initial_delay_secs: f64,
    pub backoff: f64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_secs: 1.0,
            backoff: 2.0,
        }
    }
}

impl RetrySection {
    /// 校验并转为 RetryConfig
    pub fn to_retry_config(&self) -> Result<RetryConfig, AgentError> {
        if self.max_attempts == 0 {
            return Err(AgentError::ConfigError("llm.retry.max_attempts must be >= 1".into()));
        }
        if !self.backoff.is_finite() || self.backoff < 1.0 {
            return Err(AgentError::ConfigError("llm.retry.backoff must be >= 1".into()));
        }
        let max_delay = MAX_RETRY_DELAY.as_secs_f64();
        if !self.initial_delay_secs.is_finite()
            || self.initial_delay_secs < 0.0
            || self.initial_delay_secs > max_delay
        {
            return Err(AgentError::ConfigError(format!(
                "llm.retry.initial_delay_secs must be between 0 and {max_delay}"
            )));
        }
        Ok(RetryConfig {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_secs_f64(self.initial_delay_secs),
            backoff: self.backoff,
        })
    }
}

/// 存储后端（显式选择）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
}

/// [store] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub backend: StoreBackend,
    pub path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: PathBuf::from("workspace/gymini.db"),
        }
    }
}

/// [search] 段：Tip Source 端点、结果数、超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub endpoint: String,
    /// 可被环境变量 GYMINI_SEARCH_ENGINE_ID 覆盖
    pub engine_id: Option<String>,
    pub num_results: u32,
    pub timeout_secs: u64,
    /// 格式化时保留的结果条数
    pub max_tips: usize,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            endpoint: "https://www.googleapis.com/customsearch/v1".to_string(),
            engine_id: None,
            num_results: 5,
            timeout_secs: 15,
            max_tips: 3,
        }
    }
}

pub const SEARCH_API_KEY_VAR: &str = "GYMINI_SEARCH_API_KEY";
pub const SEARCH_ENGINE_ID_VAR: &str = "GYMINI_SEARCH_ENGINE_ID";

/// 启动时读取的凭据
#[derive(Clone)]
pub struct Credentials {
    pub llm_api_key: Option<String>,
    pub search_api_key: String,
    pub search_engine_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "***"))
            .field("search_api_key", &"***")
            .field("search_engine_id", &self.search_engine_id)
            .finish()
    }
}

/// 各 provider 对应的 API Key 环境变量；mock 不需要
pub fn llm_key_var(provider: &str) -> Option<&'static str> {
    match provider.to_lowercase().as_str() {
        "deepseek" => Some("DEEPSEEK_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        _ => None,
    }
}

fn required_env(var: &str, lookup: &impl Fn(&str) -> Option<String>) -> Result<String, AgentError> {
    lookup(var)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AgentError::MissingCredential(var.to_string()))
}

impl Credentials {
    pub fn from_env(cfg: &AppConfig) -> Result<Self, AgentError> {
        Self::from_lookup(cfg, |k| std::env::var(k).ok())
    }

    /// 以任意查找函数读取（测试时注入）
    pub fn from_lookup(
        cfg: &AppConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AgentError> {
        let llm_api_key = match llm_key_var(&cfg.llm.provider) {
            Some(var) => Some(required_env(var, &lookup)?),
            None => None,
        };
        let search_api_key = required_env(SEARCH_API_KEY_VAR, &lookup)?;
        let search_engine_id = match lookup(SEARCH_ENGINE_ID_VAR).filter(|v| !v.trim().is_empty()) {
            Some(id) => id,
            None => cfg
                .search
                .engine_id
                .clone()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AgentError::MissingCredential(SEARCH_ENGINE_ID_VAR.to_string()))?,
        };
        Ok(Self {
            llm_api_key,
            search_api_key,
            search_engine_id,
        })
    }
}

/// 从 config 目录加载配置，环境变量 GYMINI__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 GYMINI__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("GYMINI")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.app.name, "Gymini");
        assert_eq!(cfg.app.creator, DEFAULT_CREATOR);
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert_eq!(cfg.search.max_tips, 3);
        let retry = cfg.llm.retry.to_retry_config().unwrap();
        assert_eq!(retry, RetryConfig::default());
    }

    #[test]
    fn test_invalid_retry_rejected() {
        let mut section = RetrySection::default();
        section.max_attempts = 0;
        assert!(section.to_retry_config().is_err());
        let mut section = RetrySection::default();
        section.backoff = 0.5;
        assert!(section.to_retry_config().is_err());
        let mut section = RetrySection::default();
        section.initial_delay_secs = 1e300;
        assert!(section.to_retry_config().is_err());
        let mut section = RetrySection::default();
        section.initial_delay_secs = f64::NAN;
        assert!(section.to_retry_config().is_err());
    }

    #[test]
    fn test_missing_llm_key_is_error() {
        let cfg = AppConfig::default();
        let err = Credentials::from_lookup(
            &cfg,
            env(&[(SEARCH_API_KEY_VAR, "k"), (SEARCH_ENGINE_ID_VAR, "cx")]),
        )
        .unwrap_err();
        assert!(matches!(err, AgentError::MissingCredential(v) if v == "DEEPSEEK_API_KEY"));
    }

    #[test]
    fn test_missing_search_key_is_error() {
        let mut cfg = AppConfig::default();
        cfg.llm.provider = "mock".into();
        let err = Credentials::from_lookup(&cfg, env(&[(SEARCH_ENGINE_ID_VAR, "cx")])).unwrap_err();
        assert!(matches!(err, AgentError::MissingCredential(v) if v == SEARCH_API_KEY_VAR));
    }

    #[test]
    fn test_engine_id_from_config() {
        let mut cfg = AppConfig::default();
        cfg.llm.provider = "openai".into();
        cfg.search.engine_id = Some("cfg-cx".into());
        let creds = Credentials::from_lookup(
            &cfg,
            env(&[("OPENAI_API_KEY", "sk-secret"), (SEARCH_API_KEY_VAR, "k")]),
        )
        .unwrap();
        assert_eq!(creds.search_engine_id, "cfg-cx");
        assert_eq!(creds.llm_api_key.as_deref(), Some("sk-secret"));
        assert!(!format!("{creds:?}").contains("sk-secret"));
    }

    #[test]
    fn test_sections_parse_from_toml() {
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "[store]\nbackend = \"sqlite\"\npath = \"/tmp/x.db\"\n[llm.retry]\nmax_attempts = 3\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.store.backend, StoreBackend::Sqlite);
        assert_eq!(cfg.llm.retry.max_attempts, 3);
        assert_eq!(cfg.llm.retry.backoff, 2.0);
        assert_eq!(cfg.app.speaker_label, "Gymini");
    }
}
