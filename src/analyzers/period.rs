use clap::ValueEnum;

use crate::analyzers::types::{MetricsRow, MetricsTables};

/// Time bucket the report axis runs over. Each value maps to one of the
/// precomputed tables; selections carry no state between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    /// The group-key field a time-series chart should use as its x axis.
    pub fn axis_field(self) -> &'static str {
        match self {
            Granularity::Daily => "date",
            Granularity::Weekly => "week",
            Granularity::Monthly => "month",
        }
    }

    fn table(self, tables: &MetricsTables) -> &[MetricsRow] {
        match self {
            Granularity::Daily => &tables.daily,
            Granularity::Weekly => &tables.weekly,
            Granularity::Monthly => &tables.monthly,
        }
    }
}

/// Week filter for weekly reports. `AllWeeks` is the sentinel that keeps
/// every week of the month, for trend charts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WeekSelection {
    #[default]
    AllWeeks,
    Week(String),
}

impl WeekSelection {
    /// Parses user input: empty, `all`, or `all weeks` (case-insensitive)
    /// mean no filter; anything else is an exact week-label match.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("all")
            || trimmed.eq_ignore_ascii_case("all weeks")
        {
            WeekSelection::AllWeeks
        } else {
            WeekSelection::Week(trimmed.to_string())
        }
    }
}

/// The rows matching one user selection, borrowed from the precomputed
/// tables, plus the axis field a chart should plot them against.
#[derive(Debug)]
pub struct Selection<'a> {
    pub rows: Vec<&'a MetricsRow>,
    pub axis: &'static str,
}

impl Selection<'_> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Filters the table for `granularity` down to `month`, optionally a single
/// canonical `feeder`, and (for weekly reports) a single week. An empty
/// result is a normal outcome, rendered by callers as a "no metrics
/// available" notice.
pub fn select<'a>(
    tables: &'a MetricsTables,
    granularity: Granularity,
    month: &str,
    feeder: Option<&str>,
    week: &WeekSelection,
) -> Selection<'a> {
    let rows = granularity
        .table(tables)
        .iter()
        .filter(|row| row.month == month)
        .filter(|row| feeder.is_none_or(|f| row.feeder == f))
        .filter(|row| match (granularity, week) {
            (Granularity::Weekly, WeekSelection::Week(w)) => row.week.as_deref() == Some(w.as_str()),
            _ => true,
        })
        .collect();

    Selection {
        rows,
        axis: granularity.axis_field(),
    }
}
