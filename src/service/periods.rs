use super::aging::round2;
use crate::models::{
    CobroRow, FacturacionRow, InvoicingTotals, MonthlyInvoicing, WeeklySummary, WeeklyTotals,
};
use chrono::{Datelike, Months, NaiveDate};
use std::collections::BTreeMap;

const MONTH_LABELS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

/// 月份简称, month 取 1..=12
pub fn month_label(month: u32) -> &'static str {
    MONTH_LABELS[(month.clamp(1, 12) - 1) as usize]
}

pub fn week_label(iso_year: i32, week: u32) -> String {
    format!("{}-W{:02}", iso_year, week)
}

/// 截止月 (含) 往前 count 个月的 (年, 月) 列表, 按时间升序
pub fn trailing_months(cutoff: NaiveDate, count: u32) -> Vec<(i32, u32)> {
    let first_of_month = cutoff.with_day(1).unwrap_or(cutoff);
    (0..count)
        .rev()
        .filter_map(|back| first_of_month.checked_sub_months(Months::new(back)))
        .map(|d| (d.year(), d.month()))
        .collect()
}

/// 某月的 [起, 止) 日期
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = start.checked_add_months(Months::new(1))?;
    Some((start, end))
}

/// 按 ISO 周汇总付款: DiasAtraso > 0 计入逾期, 否则按时
pub fn group_by_iso_week(rows: &[CobroRow]) -> Vec<WeeklySummary> {
    let mut weeks: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();

    for row in rows {
        let (Some(date), Some(amount)) = (row.fecha, row.importe) else {
            continue;
        };
        if amount == 0.0 {
            continue;
        }
        let iso = date.iso_week();
        let entry = weeks.entry((iso.year(), iso.week())).or_insert((0.0, 0.0));
        if row.dias_atraso.unwrap_or(0) > 0 {
            entry.0 += amount;
        } else {
            entry.1 += amount;
        }
    }

    weeks
        .into_iter()
        .map(|((iso_year, week), (overdue, on_time))| WeeklySummary {
            iso_year,
            week,
            label: week_label(iso_year, week),
            overdue: round2(overdue),
            on_time: round2(on_time),
            total: round2(overdue + on_time),
        })
        .collect()
}

pub fn weekly_totals(weeks: &[WeeklySummary]) -> WeeklyTotals {
    let overdue: f64 = weeks.iter().map(|w| w.overdue).sum();
    let on_time: f64 = weeks.iter().map(|w| w.on_time).sum();
    WeeklyTotals {
        overdue: round2(overdue),
        on_time: round2(on_time),
        total: round2(overdue + on_time),
    }
}

/// 按月汇总开票: 输出 12 个月 (缺失月份补 0), 只统计指定年份
pub fn group_invoicing_by_month(rows: &[FacturacionRow], year: i32) -> Vec<MonthlyInvoicing> {
    let mut sums = [(0.0f64, 0.0f64); 12];

    for row in rows {
        let Some(date) = row.fecha else {
            continue;
        };
        if date.year() != year {
            continue;
        }
        let slot = &mut sums[date.month0() as usize];
        slot.0 += row.facturado.unwrap_or(0.0);
        slot.1 += row.pendiente.unwrap_or(0.0);
    }

    sums.iter()
        .enumerate()
        .map(|(idx, &(invoiced, pending))| {
            let month = idx as u32 + 1;
            MonthlyInvoicing {
                month,
                label: month_label(month).to_string(),
                invoiced: round2(invoiced),
                pending: round2(pending),
                total: round2(invoiced + pending),
            }
        })
        .collect()
}

pub fn invoicing_totals(months: &[MonthlyInvoicing]) -> InvoicingTotals {
    let invoiced: f64 = months.iter().map(|m| m.invoiced).sum();
    let pending: f64 = months.iter().map(|m| m.pending).sum();
    InvoicingTotals {
        invoiced: round2(invoiced),
        pending: round2(pending),
        total: round2(invoiced + pending),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cobro(fecha: NaiveDate, dias_atraso: i64, importe: f64) -> CobroRow {
        CobroRow {
            rfc: "AAA010101AAA".to_string(),
            cliente: "Cliente".to_string(),
            fecha: Some(fecha),
            dias_atraso: Some(dias_atraso),
            importe: Some(importe),
        }
    }

    #[test]
    fn trailing_months_cross_year_boundary() {
        let months = trailing_months(date(2024, 2, 29), 6);
        assert_eq!(
            months,
            vec![(2023, 9), (2023, 10), (2023, 11), (2023, 12), (2024, 1), (2024, 2)]
        );
    }

    #[test]
    fn month_bounds_handle_december() {
        let (start, end) = month_bounds(2023, 12).unwrap();
        assert_eq!(start, date(2023, 12, 1));
        assert_eq!(end, date(2024, 1, 1));
        assert!(month_bounds(2023, 13).is_none());
    }

    #[test]
    fn weekly_split_overdue_and_on_time() {
        let rows = vec![
            cobro(date(2024, 1, 2), 0, 100.0),
            cobro(date(2024, 1, 3), 5, 40.0),
            cobro(date(2024, 1, 10), -2, 60.0),
        ];
        let weeks = group_by_iso_week(&rows);
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].label, "2024-W01");
        assert_eq!(weeks[0].on_time, 100.0);
        assert_eq!(weeks[0].overdue, 40.0);
        assert_eq!(weeks[0].total, 140.0);
        assert_eq!(weeks[1].week, 2);
        assert_eq!(weekly_totals(&weeks).total, 200.0);
    }

    #[test]
    fn iso_week_year_differs_from_calendar_year() {
        // 2021-01-01 属于 2020 年第 53 周
        let weeks = group_by_iso_week(&[cobro(date(2021, 1, 1), 0, 10.0)]);
        assert_eq!(weeks[0].iso_year, 2020);
        assert_eq!(weeks[0].week, 53);
    }

    #[test]
    fn invoicing_is_zero_filled_and_year_scoped() {
        let rows = vec![
            FacturacionRow {
                fecha: Some(date(2024, 3, 5)),
                facturado: Some(1000.0),
                pendiente: Some(250.0),
            },
            FacturacionRow {
                fecha: Some(date(2024, 3, 20)),
                facturado: Some(500.0),
                pendiente: None,
            },
            FacturacionRow {
                fecha: Some(date(2023, 3, 20)),
                facturado: Some(999.0),
                pendiente: None,
            },
            FacturacionRow {
                fecha: None,
                facturado: Some(1.0),
                pendiente: None,
            },
        ];
        let months = group_invoicing_by_month(&rows, 2024);
        assert_eq!(months.len(), 12);
        assert_eq!(months[2].label, "Mar");
        assert_eq!(months[2].invoiced, 1500.0);
        assert_eq!(months[2].pending, 250.0);
        assert_eq!(months[2].total, 1750.0);
        assert_eq!(invoicing_totals(&months).total, 1750.0);
    }
}
