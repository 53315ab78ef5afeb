use super::aging::{percentage, round2};
use crate::models::{CarteraRow, GroupTotal};
use indexmap::IndexMap;

pub const NO_OFFICE: &str = "SIN OFICINA";
pub const DEFAULT_TOP_CLIENTS: usize = 10;
pub const MAX_TOP_CLIENTS: usize = 100;

struct Acc {
    label: String,
    amount: f64,
    count: usize,
}

/// 按 key 累加余额, 保留首次出现的顺序与名称
fn accumulate<K, L>(rows: &[CarteraRow], key: K, label: L) -> IndexMap<String, Acc>
where
    K: Fn(&CarteraRow) -> String,
    L: Fn(&CarteraRow) -> String,
{
    let mut groups: IndexMap<String, Acc> = IndexMap::new();
    for row in rows {
        let Some(balance) = row.balance() else {
            continue;
        };
        let acc = groups.entry(key(row)).or_insert_with(|| Acc {
            label: label(row),
            amount: 0.0,
            count: 0,
        });
        acc.amount += balance;
        acc.count += 1;
    }
    groups
}

/// 金额降序; 金额相同保持原顺序
fn finish(groups: IndexMap<String, Acc>) -> Vec<GroupTotal> {
    let total: f64 = groups.values().map(|a| a.amount).sum();
    let mut out: Vec<GroupTotal> = groups
        .into_iter()
        .map(|(key, acc)| GroupTotal {
            key,
            label: acc.label,
            amount: round2(acc.amount),
            count: acc.count,
            percentage: percentage(acc.amount, total),
        })
        .collect();
    out.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    out
}

fn office_key(row: &CarteraRow) -> String {
    let office = row.oficina.trim();
    if office.is_empty() {
        NO_OFFICE.to_string()
    } else {
        office.to_uppercase()
    }
}

/// 按办公室汇总余额
pub fn group_by_office(rows: &[CarteraRow]) -> Vec<GroupTotal> {
    finish(accumulate(rows, office_key, office_key))
}

/// 按客户 (RFC) 汇总, 取前 limit 名; 占比以全部客户合计为基数
pub fn top_clients(rows: &[CarteraRow], limit: usize) -> Vec<GroupTotal> {
    let mut groups = finish(accumulate(
        rows,
        |r| r.rfc.trim().to_uppercase(),
        |r| r.cliente.trim().to_string(),
    ));
    groups.truncate(limit);
    groups
}

pub fn groups_total(rows: &[CarteraRow]) -> f64 {
    round2(rows.iter().filter_map(|r| r.balance()).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(rfc: &str, cliente: &str, oficina: &str, total: f64) -> CarteraRow {
        CarteraRow {
            rfc: rfc.to_string(),
            cliente: cliente.to_string(),
            oficina: oficina.to_string(),
            unidad: String::new(),
            factura: String::new(),
            fecha_vencimiento: None,
            dias: Some(10),
            total: Some(total),
        }
    }

    #[test]
    fn offices_sorted_by_amount() {
        let rows = vec![
            row("A", "a", "Monterrey", 100.0),
            row("B", "b", "cdmx", 300.0),
            row("C", "c", "CDMX", 100.0),
            row("D", "d", "", 0.0),
            row("E", "e", " ", 100.0),
        ];
        let groups = group_by_office(&rows);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].key, "CDMX");
        assert_eq!(groups[0].amount, 400.0);
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].percentage, 66.67);
        // 金额相同按首次出现顺序
        assert_eq!(groups[1].key, "MONTERREY");
        assert_eq!(groups[2].key, NO_OFFICE);
    }

    #[test]
    fn top_clients_truncates_and_keeps_first_name() {
        let rows = vec![
            row("aaa", "Alfa SA", "X", 10.0),
            row("AAA", "ALFA S.A.", "X", 15.0),
            row("BBB", "Beta", "X", 50.0),
            row("CCC", "Gamma", "X", 5.0),
        ];
        let top = top_clients(&rows, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].key, "BBB");
        assert_eq!(top[1].key, "AAA");
        assert_eq!(top[1].label, "Alfa SA");
        assert_eq!(top[1].amount, 25.0);
        assert_eq!(top[1].percentage, 31.25);
        assert_eq!(groups_total(&rows), 80.0);
    }
}
