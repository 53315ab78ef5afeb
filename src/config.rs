use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub fanout: FanoutConfig,
    pub clients: ClientListConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 远程SQL接口配置
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

/// 多期间查询的分批参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FanoutConfig {
    pub batch_size: usize,
    pub batch_pause_ms: u64,
}

/// 内部客户名单
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientListConfig {
    pub internal_rfcs: Vec<String>,
    pub internal_name_prefixes: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3001/api/sql/query".to_string(),
            username: String::new(),
            password: String::new(),
            timeout_secs: 25,
            max_attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

// 密码不进日志
impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"***")
            .field("timeout_secs", &self.timeout_secs)
            .field("max_attempts", &self.max_attempts)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .finish()
    }
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            batch_size: 3,
            batch_pause_ms: 250,
        }
    }
}

impl Default for ClientListConfig {
    fn default() -> Self {
        Self {
            internal_rfcs: vec![
                "CIN850101AB1".to_string(),
                "GCO900215KL3".to_string(),
                "SCO030510QW2".to_string(),
            ],
            internal_name_prefixes: vec![
                "GRUPO CORPORATIVO".to_string(),
                "SERVICIOS CORPORATIVOS".to_string(),
            ],
        }
    }
}

/// COBRANZA_ 前缀环境变量, 名单用逗号分隔
/// 例: COBRANZA_CLIENTS__INTERNAL_RFCS=AAA010101AAA,BBB010101BBB
fn environment() -> Environment {
    Environment::with_prefix("COBRANZA")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("clients.internal_rfcs")
        .with_list_parse_key("clients.internal_name_prefixes")
}

impl AppConfig {
    /// 从环境变量加载配置
    ///
    /// 顺序: 默认值 -> cobranza.toml (可选, 路径由 COBRANZA_CONFIG 指定)
    /// -> COBRANZA_ 前缀环境变量 -> SQL_API_USERNAME / SQL_API_PASSWORD
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var("COBRANZA_CONFIG").unwrap_or_else(|_| "cobranza".to_string());

        Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(environment())
            .set_override_option("upstream.username", std::env::var("SQL_API_USERNAME").ok())?
            .set_override_option("upstream.password", std::env::var("SQL_API_PASSWORD").ok())?
            .build()?
            .try_deserialize()
    }
}
