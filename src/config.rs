use serde::{Deserialize, Serialize};

/// 比对服务默认监听端口
pub const DEFAULT_MATCHER_PORT: u16 = 8000;
pub const DEFAULT_MATCHER_BASE_URL: &str = "http://127.0.0.1:8000";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub matcher: MatcherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 外部比对服务 (/match-columns) 的地址配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub base_url: String,
    pub default_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            matcher: MatcherConfig::default(),
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MATCHER_BASE_URL.to_string(),
            default_port: DEFAULT_MATCHER_PORT,
        }
    }
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            matcher: MatcherConfig {
                base_url: std::env::var("MATCHER_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_MATCHER_BASE_URL.to_string()),
                default_port: std::env::var("MATCHER_DEFAULT_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(DEFAULT_MATCHER_PORT),
            },
        }
    }

    /// 分层加载: 内置默认值 -> recon.toml (可选) -> 环境变量
    pub fn load() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("matcher.base_url", defaults.matcher.base_url)?
            .set_default("matcher.default_port", i64::from(defaults.matcher.default_port))?
            .add_source(config::File::with_name("recon").required(false))
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("matcher.base_url", std::env::var("MATCHER_BASE_URL").ok())?
            .set_override_option(
                "matcher.default_port",
                std::env::var("MATCHER_DEFAULT_PORT").ok(),
            )?
            .build()?
            .try_deserialize()
    }
}

impl MatcherConfig {
    /// 启动时确定比对服务地址: 本服务监听在比对服务默认端口上时走同源地址,
    /// 否则使用配置的绝对地址。只看配置, 不看请求头。
    pub fn resolve_base_url(&self, server_port: u16) -> String {
        if server_port == self.default_port {
            format!("http://127.0.0.1:{}", server_port)
        } else {
            self.base_url.trim_end_matches('/').to_string()
        }
    }
}
