use crate::error::QueryError;

/// 禁止出现的关键字 (写操作 / DDL / 过程调用)
const BANNED_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "CREATE", "TRUNCATE", "MERGE", "EXEC",
    "EXECUTE", "GRANT", "REVOKE", "DENY", "BACKUP", "RESTORE", "SHUTDOWN", "DBCC", "INTO",
];

fn tokens(upper: &str) -> impl Iterator<Item = &str> {
    upper
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
}

/// 筛选值能否拼进查询而不被只读检查拒绝: 不含分号, 不含禁用关键字
pub fn is_safe_literal(value: &str) -> bool {
    let upper = value.to_ascii_uppercase();
    !upper.contains(';') && !tokens(&upper).any(|t| BANNED_KEYWORDS.contains(&t))
}

/// 只读检查: 必须以 SELECT / WITH 开头, 且不包含禁用关键字
pub fn validate_query(sql: &str) -> Result<(), QueryError> {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return Err(QueryError::Disallowed("empty query".to_string()));
    }

    let upper = trimmed.to_ascii_uppercase();
    let mut tokens = tokens(&upper);

    match tokens.next() {
        Some("SELECT") | Some("WITH") => {}
        Some(first) => {
            return Err(QueryError::Disallowed(format!(
                "only SELECT/WITH statements are allowed, got {}",
                first
            )))
        }
        None => return Err(QueryError::Disallowed("empty query".to_string())),
    }

    // 允许末尾一个分号, 不允许多语句
    let body = upper.strip_suffix(';').unwrap_or(&upper);
    if body.contains(';') {
        return Err(QueryError::Disallowed(
            "multiple statements are not allowed".to_string(),
        ));
    }

    if let Some(kw) = tokens.find(|t| BANNED_KEYWORDS.contains(t)) {
        return Err(QueryError::Disallowed(format!("keyword {} is not allowed", kw)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_select_and_cte() {
        assert!(validate_query("SELECT Rfc, Total FROM Cartera").is_ok());
        assert!(validate_query("  with x AS (SELECT 1 AS a) SELECT a FROM x;").is_ok());
    }

    #[test]
    fn rejects_delete_prefix() {
        let err = validate_query("DELETE FROM x").unwrap_err();
        assert!(err.is_disallowed());
    }

    #[test]
    fn rejects_banned_keyword_inside_select() {
        assert!(validate_query("SELECT * INTO backup_tbl FROM Cartera").is_err());
        assert!(validate_query("WITH d AS (SELECT 1 a) DELETE FROM Cartera").is_err());
        assert!(validate_query("select 1; drop table Cartera").is_err());
    }

    #[test]
    fn column_names_containing_keywords_are_fine() {
        assert!(validate_query("SELECT UpdatedAt, CreatedBy FROM Cobros").is_ok());
    }

    #[test]
    fn filter_values_that_would_break_the_query() {
        assert!(is_safe_literal("Insurgentes Sur"));
        assert!(is_safe_literal("O'Higgins"));
        assert!(!is_safe_literal("Insurgentes; Sur"));
        assert!(!is_safe_literal("Norte delete"));
    }

    #[test]
    fn rejects_empty() {
        assert!(validate_query("   ").is_err());
        assert!(validate_query(";").is_err());
    }
}
