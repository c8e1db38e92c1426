use std::collections::HashMap;

use crate::analyzers::aggregate::reliability_indices;
use crate::analyzers::types::TrendRow;
use crate::record::OutageRecord;

/// Computes the system-wide per-month SAIFI/SAIDI trend across all feeders,
/// one row per month in first-appearance order so the worksheet ordering of
/// the workbook is preserved.
pub fn monthly_trend(records: &[OutageRecord]) -> Vec<TrendRow> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&OutageRecord>> = HashMap::new();

    for record in records {
        let month = record.month.as_str();
        if !groups.contains_key(month) {
            order.push(month);
        }
        groups.entry(month).or_default().push(record);
    }

    order
        .into_iter()
        .map(|month| {
            let ix = reliability_indices(&groups[month]);
            TrendRow {
                month: month.to_string(),
                interruptions: ix.interruptions,
                distinct_customers: ix.distinct_customers,
                saifi: ix.saifi,
                saidi: ix.saidi,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(feeder: &str, month: &str, customers: f64, elapsed: f64) -> OutageRecord {
        OutageRecord {
            feeder: feeder.to_string(),
            month: month.to_string(),
            interruption_time: None,
            restoration_time: None,
            customer_count: customers,
            elapsed_time: elapsed,
            fault_category: "Earth Fault".to_string(),
            duration_hours: None,
            date: None,
            week: None,
        }
    }

    #[test]
    fn test_months_keep_worksheet_order() {
        let records = vec![
            record("A", "January", 120.0, 2.0),
            record("B", "February", 60.0, 1.0),
            record("B", "January", 60.0, 1.0),
        ];
        let trend = monthly_trend(&records);
        let months: Vec<_> = trend.iter().map(|t| t.month.as_str()).collect();
        assert_eq!(months, ["January", "February"]);
    }

    #[test]
    fn test_trend_saifi_is_computed_not_constant() {
        // Three events over two distinct customer groups.
        let records = vec![
            record("A", "January", 120.0, 2.0),
            record("A", "January", 120.0, 1.0),
            record("B", "January", 60.0, 3.0),
        ];
        let trend = monthly_trend(&records);

        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].interruptions, 3);
        assert_eq!(trend[0].distinct_customers, 2);
        assert!((trend[0].saifi - 1.5).abs() < 1e-9);

        let expected_saidi = (2.0 * 120.0 + 1.0 * 120.0 + 3.0 * 60.0) / 300.0;
        assert!((trend[0].saidi - expected_saidi).abs() < 1e-9);
    }

    #[test]
    fn test_empty_records_empty_trend() {
        assert!(monthly_trend(&[]).is_empty());
    }
}
