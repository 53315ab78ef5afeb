use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// 远程查询错误
#[derive(Error, Debug)]
pub enum QueryError {
    /// 未通过只读检查, 不会发出请求
    #[error("query rejected: {0}")]
    Disallowed(String),

    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    /// 2xx 但返回了错误说明而不是 results
    #[error("upstream reported an error: {0}")]
    Upstream(String),

    #[error("failed to decode upstream rows: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("query client misconfigured: {0}")]
    Config(String),
}

impl QueryError {
    pub fn is_disallowed(&self) -> bool {
        matches!(self, QueryError::Disallowed(_))
    }
}

/// 接口层错误
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidParams(&'static str),

    #[error(transparent)]
    Upstream(#[from] QueryError),

    #[error("export failed: {0}")]
    Export(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidParams(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            success: false,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
