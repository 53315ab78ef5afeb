use chrono::NaiveDate;

/// 截止日类报表的查询条件
#[derive(Debug, Clone, PartialEq)]
pub struct CutoffFilter {
    pub cutoff: NaiveDate,
    pub company: i64,
    pub office: Option<String>,
    pub unit: Option<String>,
}

/// 年度类报表的查询条件
#[derive(Debug, Clone, PartialEq)]
pub struct YearFilter {
    pub year: i32,
    pub company: i64,
    pub office: Option<String>,
    pub unit: Option<String>,
}

/// 字符串字面量: 单引号加倍
pub fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn date_literal(date: NaiveDate) -> String {
    format!("'{}'", date.format("%Y-%m-%d"))
}

fn push_optional(sql: &mut String, column: &str, value: &Option<String>) {
    if let Some(v) = value {
        sql.push_str(&format!("\n          AND {} = {}", column, sql_literal(v)));
    }
}

/// 截止日的应收余额明细, Dias = 截止日 - 到期日
pub fn cartera_sql(filter: &CutoffFilter) -> String {
    let cutoff = date_literal(filter.cutoff);
    let mut sql = format!(
        r#"
        SELECT c.Rfc, c.Cliente, c.Oficina, c.Unidad, c.Factura, c.FechaVencimiento,
               DATEDIFF(day, c.FechaVencimiento, {cutoff}) AS Dias,
               c.Saldo AS Total
        FROM dbo.CarteraClientes c
        WHERE c.IdEmpresa = {company}
          AND c.Saldo <> 0
          AND c.FechaEmision <= {cutoff}"#,
        cutoff = cutoff,
        company = filter.company,
    );
    push_optional(&mut sql, "c.Oficina", &filter.office);
    push_optional(&mut sql, "c.Unidad", &filter.unit);
    sql.push_str("\n        ORDER BY Dias DESC");
    sql
}

/// 单月收款合计 [start, end)
pub fn month_collected_sql(
    company: i64,
    office: &Option<String>,
    start: NaiveDate,
    end: NaiveDate,
) -> String {
    let mut sql = format!(
        r#"
        SELECT COALESCE(SUM(p.Importe), 0) AS TotalCobrado,
               COUNT(*) AS Pagos
        FROM dbo.Cobros p
        WHERE p.IdEmpresa = {company}
          AND p.FechaPago >= {start}
          AND p.FechaPago < {end}"#,
        company = company,
        start = date_literal(start),
        end = date_literal(end),
    );
    push_optional(&mut sql, "p.Oficina", office);
    sql
}

fn year_bounds(year: i32) -> (String, String) {
    (format!("'{:04}-01-01'", year), format!("'{:04}-01-01'", year + 1))
}

/// 年度付款明细, DiasAtraso = 付款日 - 到期日
pub fn cobros_year_sql(filter: &YearFilter) -> String {
    let (start, end) = year_bounds(filter.year);
    let mut sql = format!(
        r#"
        SELECT p.Rfc, p.Cliente, p.FechaPago AS Fecha,
               DATEDIFF(day, p.FechaVencimiento, p.FechaPago) AS DiasAtraso,
               p.Importe
        FROM dbo.Cobros p
        WHERE p.IdEmpresa = {company}
          AND p.FechaPago >= {start}
          AND p.FechaPago < {end}"#,
        company = filter.company,
        start = start,
        end = end,
    );
    push_optional(&mut sql, "p.Oficina", &filter.office);
    push_optional(&mut sql, "p.Unidad", &filter.unit);
    sql
}

/// 年度开票明细: 已开票 (已盖章) / 待开票
pub fn facturacion_year_sql(filter: &YearFilter) -> String {
    let (start, end) = year_bounds(filter.year);
    let mut sql = format!(
        r#"
        SELECT f.FechaEmision AS Fecha,
               CASE WHEN f.Timbrada = 1 THEN f.Total ELSE 0 END AS Facturado,
               CASE WHEN f.Timbrada = 1 THEN 0 ELSE f.Total END AS Pendiente
        FROM dbo.Facturas f
        WHERE f.IdEmpresa = {company}
          AND f.FechaEmision >= {start}
          AND f.FechaEmision < {end}"#,
        company = filter.company,
        start = start,
        end = end,
    );
    push_optional(&mut sql, "f.Oficina", &filter.office);
    push_optional(&mut sql, "f.Unidad", &filter.unit);
    sql
}
