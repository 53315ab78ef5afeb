use crate::config::UpstreamConfig;
use crate::db::guard::validate_query;
use crate::error::QueryError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};

/// 只读SQL执行器
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// 执行查询, 返回原始行
    async fn fetch_rows(&self, sql: &str) -> Result<Vec<Value>, QueryError>;
}

/// 执行查询并反序列化为指定行类型
pub async fn query_as<T: DeserializeOwned>(
    executor: &dyn QueryExecutor,
    sql: &str,
) -> Result<Vec<T>, QueryError> {
    let rows = executor.fetch_rows(sql).await?;
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(QueryError::from))
        .collect()
}

#[derive(Debug, Serialize)]
struct QueryRequest {
    query: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<Value>,
}

/// 上游以 2xx 返回的错误说明, 例如 `{"error":"invalid token"}`
#[derive(Debug, Deserialize)]
struct ErrorReply {
    #[serde(alias = "message")]
    error: String,
}

/// 远程SQL接口客户端
///
/// 令牌在构造时由用户名/密码计算一次, 随客户端一起传递
#[derive(Clone)]
pub struct QueryClient {
    endpoint: String,
    token: String,
    max_attempts: u32,
    retry_delay: Duration,
    client: reqwest::Client,
}

impl QueryClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, QueryError> {
        if config.endpoint.trim().is_empty() {
            return Err(QueryError::Config("upstream endpoint is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            token: auth_token(&config.username, &config.password),
            max_attempts: config.max_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            client,
        })
    }

    /// 校验并执行查询, 固定次数重试
    pub async fn execute(&self, sql: &str) -> Result<Vec<Value>, QueryError> {
        if let Err(e) = validate_query(sql) {
            tracing::warn!("Rejected query before sending: {}", e);
            return Err(e);
        }

        let body = QueryRequest {
            query: STANDARD.encode(sql),
        };

        let mut attempt = 1;
        loop {
            let start = Instant::now();
            match self.send_once(&body).await {
                Ok(rows) => {
                    tracing::debug!(
                        "查询完成, {} 行, 耗时: {:?} (attempt {})",
                        rows.len(),
                        start.elapsed(),
                        attempt
                    );
                    return Ok(rows);
                }
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(
                        "Upstream attempt {}/{} failed: {}",
                        attempt,
                        self.max_attempts,
                        e
                    );
                    attempt += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    tracing::error!("Upstream query failed after {} attempts: {}", attempt, e);
                    return Err(e);
                }
            }
        }
    }

    async fn send_once(&self, body: &QueryRequest) -> Result<Vec<Value>, QueryError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(QueryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        match serde_json::from_slice::<QueryResponse>(&bytes) {
            Ok(parsed) => Ok(parsed.results),
            Err(e) => match serde_json::from_slice::<ErrorReply>(&bytes) {
                Ok(reply) => Err(QueryError::Upstream(reply.error)),
                Err(_) => Err(QueryError::Decode(e)),
            },
        }
    }
}

#[async_trait]
impl QueryExecutor for QueryClient {
    async fn fetch_rows(&self, sql: &str) -> Result<Vec<Value>, QueryError> {
        self.execute(sql).await
    }
}

/// base64(username:password)
pub fn auth_token(username: &str, password: &str) -> String {
    STANDARD.encode(format!("{}:{}", username, password))
}
