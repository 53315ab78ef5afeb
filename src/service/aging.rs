use crate::models::{AgingBucket, CarteraRow};

/// 账龄区间 (含两端)
pub const AGING_RANGES: [(i64, i64); 5] = [(1, 30), (31, 60), (61, 90), (91, 120), (121, 5000)];

/// 保留两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 占比 (百分数, 两位小数); 合计为 0 时返回 0
pub fn percentage(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        round2(part / total * 100.0)
    }
}

/// 天数所属区间下标; 超出 [1, 5000] 返回 None
pub fn classify_days(days: i64) -> Option<usize> {
    AGING_RANGES
        .iter()
        .position(|&(lo, hi)| days >= lo && days <= hi)
}

pub fn range_label(index: usize) -> String {
    let (lo, hi) = AGING_RANGES[index];
    format!("{}-{}", lo, hi)
}

/// 账龄分桶: 五个区间始终按顺序输出
pub fn aging_buckets(rows: &[CarteraRow]) -> Vec<AgingBucket> {
    let mut sums = [0.0f64; 5];
    let mut counts = [0usize; 5];

    for row in rows {
        let (Some(days), Some(balance)) = (row.dias, row.balance()) else {
            continue;
        };
        if let Some(idx) = classify_days(days) {
            sums[idx] += balance;
            counts[idx] += 1;
        }
    }

    let total: f64 = sums.iter().sum();

    (0..AGING_RANGES.len())
        .map(|idx| AgingBucket {
            range: range_label(idx),
            amount: round2(sums[idx]),
            count: counts[idx],
            percentage: percentage(sums[idx], total),
        })
        .collect()
}

/// 已分桶金额合计
pub fn bucket_total(buckets: &[AgingBucket]) -> f64 {
    round2(buckets.iter().map(|b| b.amount).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(dias: Option<i64>, total: Option<f64>) -> CarteraRow {
        CarteraRow {
            rfc: "AAA010101AAA".to_string(),
            cliente: "Cliente".to_string(),
            oficina: "CDMX".to_string(),
            unidad: String::new(),
            factura: "F-1".to_string(),
            fecha_vencimiento: None,
            dias,
            total,
        }
    }

    #[test]
    fn classify_boundaries() {
        assert_eq!(classify_days(0), None);
        assert_eq!(classify_days(1), Some(0));
        assert_eq!(classify_days(30), Some(0));
        assert_eq!(classify_days(31), Some(1));
        assert_eq!(classify_days(120), Some(3));
        assert_eq!(classify_days(121), Some(4));
        assert_eq!(classify_days(5000), Some(4));
        assert_eq!(classify_days(5001), None);
        assert_eq!(classify_days(-3), None);
    }

    #[test]
    fn known_rows_produce_expected_buckets() {
        let rows = vec![
            row(Some(15), Some(100.0)),
            row(Some(45), Some(200.0)),
            row(Some(200), Some(50.0)),
        ];
        let buckets = aging_buckets(&rows);

        assert_eq!(buckets.len(), 5);
        assert_eq!(buckets[0].range, "1-30");
        assert_eq!(buckets[0].amount, 100.0);
        assert_eq!(buckets[0].percentage, 28.57);
        assert_eq!(buckets[1].amount, 200.0);
        assert_eq!(buckets[1].percentage, 57.14);
        assert_eq!(buckets[2].amount, 0.0);
        assert_eq!(buckets[3].amount, 0.0);
        assert_eq!(buckets[4].range, "121-5000");
        assert_eq!(buckets[4].amount, 50.0);
        assert_eq!(buckets[4].percentage, 14.29);
    }

    #[test]
    fn out_of_range_null_and_zero_rows_are_excluded() {
        let rows = vec![
            row(Some(0), Some(10.0)),
            row(Some(6000), Some(10.0)),
            row(None, Some(10.0)),
            row(Some(10), None),
            row(Some(10), Some(0.0)),
            row(Some(10), Some(25.5)),
        ];
        let buckets = aging_buckets(&rows);
        assert_eq!(buckets[0].amount, 25.5);
        assert_eq!(buckets[0].count, 1);
        assert_eq!(bucket_total(&buckets), 25.5);
    }

    #[test]
    fn bucket_sum_matches_in_range_rows() {
        let rows: Vec<CarteraRow> = (0..400)
            .map(|i| row(Some(i * 17 - 50), Some((i % 13) as f64 * 10.25)))
            .collect();
        let expected: f64 = rows
            .iter()
            .filter(|r| matches!(r.dias, Some(d) if (1..=5000).contains(&d)))
            .filter_map(|r| r.total)
            .sum();
        let buckets = aging_buckets(&rows);
        assert!((bucket_total(&buckets) - round2(expected)).abs() < 0.01);
    }

    #[test]
    fn percentages_sum_to_hundred() {
        let rows = vec![
            row(Some(5), Some(33.33)),
            row(Some(35), Some(33.33)),
            row(Some(65), Some(33.34)),
            row(Some(95), Some(12.0)),
            row(Some(400), Some(7.0)),
        ];
        let sum: f64 = aging_buckets(&rows).iter().map(|b| b.percentage).sum();
        assert!((sum - 100.0).abs() <= 0.05);
    }

    #[test]
    fn zero_total_gives_zero_percentages() {
        let buckets = aging_buckets(&[]);
        assert!(buckets.iter().all(|b| b.percentage == 0.0 && b.amount == 0.0));
    }
}
