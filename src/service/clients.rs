use crate::config::ClientListConfig;
use crate::models::ClientRow;
use std::collections::HashSet;

/// 内部客户过滤器 (集团内公司不计入对外催收报表)
#[derive(Debug, Clone)]
pub struct ClientFilter {
    internal_rfcs: HashSet<String>,
    name_prefixes: Vec<String>,
}

impl ClientFilter {
    pub fn new(config: &ClientListConfig) -> Self {
        Self {
            internal_rfcs: config
                .internal_rfcs
                .iter()
                .map(|r| normalize(r))
                .filter(|r| !r.is_empty())
                .collect(),
            name_prefixes: config
                .internal_name_prefixes
                .iter()
                .map(|p| normalize(p))
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn is_internal_client(&self, rfc: &str, name: &str) -> bool {
        if self.internal_rfcs.contains(&normalize(rfc)) {
            return true;
        }
        let name = normalize(name);
        self.name_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    pub fn is_external_client(&self, rfc: &str, name: &str) -> bool {
        !self.is_internal_client(rfc, name)
    }

    pub fn is_internal<R: ClientRow>(&self, row: &R) -> bool {
        self.is_internal_client(row.rfc(), row.client_name())
    }

    /// 拆分为 (内部, 外部)
    pub fn partition<R: ClientRow>(&self, rows: Vec<R>) -> (Vec<R>, Vec<R>) {
        rows.into_iter().partition(|r| self.is_internal(r))
    }

    /// 仅保留外部客户
    pub fn external_only<R: ClientRow>(&self, rows: Vec<R>) -> Vec<R> {
        rows.into_iter().filter(|r| !self.is_internal(r)).collect()
    }
}

impl Default for ClientFilter {
    fn default() -> Self {
        Self::new(&ClientListConfig::default())
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}
