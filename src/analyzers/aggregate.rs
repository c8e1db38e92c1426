use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::analyzers::period::Granularity;
use crate::analyzers::types::{MetricsRow, MetricsTables};
use crate::analyzers::utility::distinct_values;
use crate::record::OutageRecord;

/// The reliability indices of one record group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Indices {
    pub interruptions: usize,
    pub distinct_customers: usize,
    pub saifi: f64,
    pub saidi: f64,
    pub caidi: f64,
}

/// Computes SAIFI/SAIDI/CAIDI for one group of records.
///
/// SAIFI divides the event count by the number of unique `Customer No`
/// values; SAIDI is the customer-count-weighted mean outage duration. Both
/// default to 0 when their denominator is not positive, and CAIDI is
/// SAIDI/SAIFI with the same guard, so empty or degenerate groups never
/// raise a division error.
pub(crate) fn reliability_indices(group: &[&OutageRecord]) -> Indices {
    let interruptions = group.len();
    let distinct_customers = distinct_values(group.iter().map(|r| r.customer_count));

    let saifi = if distinct_customers > 0 {
        interruptions as f64 / distinct_customers as f64
    } else {
        0.0
    };

    let mut weighted_hours = 0.0;
    let mut customer_sum = 0.0;
    for record in group {
        weighted_hours += record.outage_hours() * record.customer_count;
        customer_sum += record.customer_count;
    }
    let saidi = if customer_sum > 0.0 {
        weighted_hours / customer_sum
    } else {
        0.0
    };

    let caidi = if saifi > 0.0 { saidi / saifi } else { 0.0 };

    Indices {
        interruptions,
        distinct_customers,
        saifi,
        saidi,
        caidi,
    }
}

type GroupKey = (String, String, Option<NaiveDate>, Option<String>);

/// Groups records by (feeder, month) plus the granularity's time bucket and
/// computes one [`MetricsRow`] per group.
///
/// Records whose bucket key is absent (no parseable interruption timestamp)
/// are skipped for the daily and weekly tables; the monthly table includes
/// every record. The group map is ordered, so output order is independent of
/// input order.
pub fn aggregate(records: &[OutageRecord], granularity: Granularity) -> Vec<MetricsRow> {
    let mut groups: BTreeMap<GroupKey, Vec<&OutageRecord>> = BTreeMap::new();

    for record in records {
        let (date, week) = match granularity {
            Granularity::Daily => match record.date {
                Some(d) => (Some(d), None),
                None => continue,
            },
            Granularity::Weekly => match &record.week {
                Some(w) => (None, Some(w.clone())),
                None => continue,
            },
            Granularity::Monthly => (None, None),
        };
        groups
            .entry((record.feeder.clone(), record.month.clone(), date, week))
            .or_default()
            .push(record);
    }

    groups
        .into_iter()
        .map(|((feeder, month, date, week), group)| {
            let ix = reliability_indices(&group);
            MetricsRow {
                feeder,
                month,
                date,
                week,
                interruptions: ix.interruptions,
                distinct_customers: ix.distinct_customers,
                saifi: ix.saifi,
                saidi: ix.saidi,
                caidi: ix.caidi,
            }
        })
        .collect()
}

/// Runs the aggregator once per granularity, producing the three independent
/// tables the period selector draws from.
pub fn compute_tables(records: &[OutageRecord]) -> MetricsTables {
    MetricsTables {
        daily: aggregate(records, Granularity::Daily),
        weekly: aggregate(records, Granularity::Weekly),
        monthly: aggregate(records, Granularity::Monthly),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RawOutageRow, normalize_worksheet};

    const TOLERANCE: f64 = 1e-9;

    fn record(
        feeder: &str,
        month: &str,
        interruption: &str,
        restoration: &str,
        customers: f64,
        elapsed: f64,
    ) -> OutageRecord {
        let raw = RawOutageRow {
            feeder_name: feeder.to_string(),
            interruption_time: interruption.to_string(),
            restoration_time: restoration.to_string(),
            customer_no: customers.to_string(),
            elapsed_time: elapsed.to_string(),
            fault_category: "Earth Fault".to_string(),
        };
        normalize_worksheet(month, std::slice::from_ref(&raw))
            .records
            .into_iter()
            .next()
            .unwrap()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < TOLERANCE, "{a} != {b}");
    }

    #[test]
    fn test_indices_for_shared_customer_value() {
        // Two events on the same 10-customer group: SAIFI 2/1, SAIDI is the
        // weighted mean of the elapsed exposures, CAIDI their ratio.
        let a = record("A", "Jan", "", "", 10.0, 5.0);
        let b = record("A", "Jan", "", "", 10.0, 15.0);
        let ix = reliability_indices(&[&a, &b]);

        assert_eq!(ix.interruptions, 2);
        assert_eq!(ix.distinct_customers, 1);
        assert_close(ix.saifi, 2.0);
        assert_close(ix.saidi, (5.0 * 10.0 + 15.0 * 10.0) / 20.0);
        assert_close(ix.caidi, ix.saidi / 2.0);
    }

    #[test]
    fn test_indices_empty_group_defaults_to_zero() {
        let ix = reliability_indices(&[]);
        assert_eq!(ix.saifi, 0.0);
        assert_eq!(ix.saidi, 0.0);
        assert_eq!(ix.caidi, 0.0);
    }

    #[test]
    fn test_caidi_identity_holds() {
        let a = record("A", "Jan", "05/01/2025 08:00:00", "05/01/2025 10:00:00", 120.0, 2.0);
        let b = record("A", "Jan", "12/01/2025 09:00:00", "12/01/2025 12:00:00", 85.0, 3.0);
        let ix = reliability_indices(&[&a, &b]);
        assert!(ix.saifi > 0.0);
        assert_close(ix.caidi, ix.saidi / ix.saifi);
    }

    #[test]
    fn test_timestamp_duration_preferred_over_elapsed() {
        // 08:00 -> 10:30 is 2.5h even though the sheet says 99h elapsed.
        let a = record("A", "Jan", "05/01/2025 08:00:00", "05/01/2025 10:30:00", 50.0, 99.0);
        let ix = reliability_indices(&[&a]);
        assert_close(ix.saidi, 2.5);
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let records = vec![
            record("A", "Jan", "05/01/2025 08:00:00", "05/01/2025 10:00:00", 120.0, 2.0),
            record("B", "Jan", "06/01/2025 08:00:00", "06/01/2025 09:00:00", 60.0, 1.0),
            record("A", "Jan", "05/01/2025 14:00:00", "05/01/2025 15:00:00", 130.0, 1.0),
            record("A", "Feb", "03/02/2025 06:00:00", "03/02/2025 08:00:00", 120.0, 2.0),
        ];
        let mut shuffled = records.clone();
        shuffled.reverse();
        shuffled.swap(0, 2);

        for granularity in [Granularity::Daily, Granularity::Weekly, Granularity::Monthly] {
            let forward = aggregate(&records, granularity);
            let backward = aggregate(&shuffled, granularity);
            assert_eq!(forward.len(), backward.len());
            for (f, b) in forward.iter().zip(&backward) {
                assert_eq!(f.feeder, b.feeder);
                assert_eq!(f.month, b.month);
                assert_eq!(f.date, b.date);
                assert_eq!(f.week, b.week);
                assert_close(f.saifi, b.saifi);
                assert_close(f.saidi, b.saidi);
                assert_close(f.caidi, b.caidi);
            }
        }
    }

    #[test]
    fn test_daily_and_weekly_skip_undated_records() {
        let records = vec![
            record("A", "Jan", "bad timestamp", "", 120.0, 2.0),
            record("A", "Jan", "05/01/2025 08:00:00", "05/01/2025 10:00:00", 120.0, 2.0),
        ];
        let tables = compute_tables(&records);

        assert_eq!(tables.daily.len(), 1);
        assert_eq!(tables.daily[0].interruptions, 1);
        assert_eq!(tables.weekly.len(), 1);
        // The monthly table still counts both.
        assert_eq!(tables.monthly[0].interruptions, 2);
    }

    #[test]
    fn test_daily_saidi_reconciles_with_monthly() {
        let records = vec![
            record("A", "Jan", "05/01/2025 08:00:00", "05/01/2025 10:00:00", 120.0, 2.0),
            record("A", "Jan", "05/01/2025 20:00:00", "05/01/2025 23:00:00", 130.0, 3.0),
            record("A", "Jan", "12/01/2025 09:00:00", "12/01/2025 10:30:00", 85.0, 1.5),
        ];
        let tables = compute_tables(&records);
        let monthly = &tables.monthly[0];

        // Sum of each day's customer-weighted contribution equals the
        // monthly weighted numerator.
        let mut daily_numerator = 0.0;
        for day in &tables.daily {
            let day_customers: f64 = records
                .iter()
                .filter(|r| r.date == day.date)
                .map(|r| r.customer_count)
                .sum();
            daily_numerator += day.saidi * day_customers;
        }
        let monthly_customers: f64 = records.iter().map(|r| r.customer_count).sum();
        assert_close(daily_numerator / monthly_customers, monthly.saidi);
    }

    #[test]
    fn test_tables_group_key_columns() {
        let records = vec![record(
            "A",
            "Jan",
            "05/01/2025 08:00:00",
            "05/01/2025 10:00:00",
            120.0,
            2.0,
        )];
        let tables = compute_tables(&records);

        assert!(tables.daily[0].date.is_some());
        assert!(tables.daily[0].week.is_none());
        assert!(tables.weekly[0].week.is_some());
        assert!(tables.weekly[0].date.is_none());
        assert!(tables.monthly[0].date.is_none());
        assert!(tables.monthly[0].week.is_none());
    }
}
