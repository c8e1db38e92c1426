use std::collections::BTreeMap;

use crate::analyzers::types::FaultSummary;
use crate::analyzers::utility::quantile;
use crate::record::OutageRecord;

/// Summarizes elapsed outage time per fault category as a five-number
/// summary (the data behind a duration-by-category box plot), ordered by
/// category name.
pub fn fault_summaries(records: &[OutageRecord]) -> Vec<FaultSummary> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.fault_category.as_str())
            .or_default()
            .push(record.elapsed_time);
    }

    groups
        .into_iter()
        .map(|(category, mut values)| {
            values.sort_by(f64::total_cmp);
            FaultSummary {
                fault_category: category.to_string(),
                count: values.len(),
                min: quantile(&values, 0.0),
                q1: quantile(&values, 0.25),
                median: quantile(&values, 0.5),
                q3: quantile(&values, 0.75),
                max: quantile(&values, 1.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fault: &str, elapsed: f64) -> OutageRecord {
        OutageRecord {
            feeder: "Bombo 1".to_string(),
            month: "January".to_string(),
            interruption_time: None,
            restoration_time: None,
            customer_count: 100.0,
            elapsed_time: elapsed,
            fault_category: fault.to_string(),
            duration_hours: None,
            date: None,
            week: None,
        }
    }

    #[test]
    fn test_summaries_are_ordered_by_category() {
        let records = vec![
            record("Vegetation", 1.0),
            record("Earth Fault", 2.0),
            record("Overcurrent", 3.0),
        ];
        let summaries = fault_summaries(&records);
        let categories: Vec<_> = summaries.iter().map(|s| s.fault_category.as_str()).collect();
        assert_eq!(categories, ["Earth Fault", "Overcurrent", "Vegetation"]);
    }

    #[test]
    fn test_five_number_summary() {
        let records: Vec<_> = [1.0, 2.0, 3.0, 4.0]
            .into_iter()
            .map(|e| record("Earth Fault", e))
            .collect();
        let summary = &fault_summaries(&records)[0];

        assert_eq!(summary.count, 4);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q1, 1.75);
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.q3, 3.25);
        assert_eq!(summary.max, 4.0);
    }

    #[test]
    fn test_single_sample_collapses() {
        let records = vec![record("Conductor Cut", 2.5)];
        let summary = &fault_summaries(&records)[0];
        assert_eq!(summary.min, 2.5);
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.max, 2.5);
    }

    #[test]
    fn test_empty_input_yields_no_summaries() {
        assert!(fault_summaries(&[]).is_empty());
    }
}
