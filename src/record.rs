//! Raw worksheet rows and their normalization into aggregation-ready records.
//!
//! Field-level parse failures are recovered locally (the field becomes
//! `None`); only rows missing a required field after parsing are excluded,
//! and those are counted rather than silently lost.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use unicode_normalization::UnicodeNormalization;

/// One row as it appears in a worksheet CSV.
///
/// Every field is kept as a raw string here; cleaning and type coercion
/// happen in [`normalize_worksheet`], never at read time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOutageRow {
    #[serde(rename = "Feeder Name", default)]
    pub feeder_name: String,
    #[serde(rename = "Interruption Time", default)]
    pub interruption_time: String,
    #[serde(rename = "Restoration Time", default)]
    pub restoration_time: String,
    #[serde(rename = "Customer No", default)]
    pub customer_no: String,
    #[serde(rename = "Elapsed Time", default)]
    pub elapsed_time: String,
    #[serde(rename = "Fault Category", default)]
    pub fault_category: String,
}

/// A cleaned outage record that passed the exclusion policy.
///
/// `customer_count`, `elapsed_time`, and `fault_category` are guaranteed
/// present; the timestamps and everything derived from them may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct OutageRecord {
    pub feeder: String,
    pub month: String,
    pub interruption_time: Option<NaiveDateTime>,
    pub restoration_time: Option<NaiveDateTime>,
    pub customer_count: f64,
    /// Upstream-computed customer-interruption exposure, in hours.
    pub elapsed_time: f64,
    pub fault_category: String,
    pub duration_hours: Option<f64>,
    pub date: Option<NaiveDate>,
    /// ISO-week label of the interruption, e.g. `2025-W07`.
    pub week: Option<String>,
}

impl OutageRecord {
    /// The duration measure used when weighting SAIDI contributions: the
    /// timestamp-derived duration when both timestamps parsed, otherwise the
    /// upstream elapsed-time exposure.
    pub fn outage_hours(&self) -> f64 {
        self.duration_hours.unwrap_or(self.elapsed_time)
    }
}

/// The normalization result for one worksheet.
#[derive(Debug, Clone)]
pub struct NormalizedBatch {
    pub month: String,
    pub records: Vec<OutageRecord>,
    /// Rows excluded because a required field was missing or unparseable.
    pub rejected: usize,
}

/// Canonicalizes a feeder name so that grouping is never fragmented by
/// formatting differences: NFKD-folded, whitespace (including non-breaking
/// spaces) collapsed to single spaces, trimmed, and title-cased.
pub fn clean_feeder_name(name: &str) -> String {
    let folded: String = name.nfkd().collect();
    let collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    title_case(&collapsed)
}

/// Uppercases the first letter of every alphabetic run and lowercases the
/// rest, so `"BOMBO 1"`, `"bombo 1"`, and `"Bombo 1"` all agree.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alphabetic = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_alphabetic {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alphabetic = true;
        } else {
            out.push(ch);
            prev_alphabetic = false;
        }
    }
    out
}

// Day-first date ordering, matching how the worksheets are filled in.
const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

/// Parses a worksheet timestamp, trying datetime formats first and bare
/// dates (midnight) second. Unparseable input is `None`, never an error.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Parses a worksheet numeric field, tolerating surrounding whitespace and
/// thousands separators. Unparseable input is `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim().replace(',', "");
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn iso_week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

fn normalize_row(month: &str, row: &RawOutageRow) -> Option<OutageRecord> {
    let customer_count = parse_number(&row.customer_no)?;
    let elapsed_time = parse_number(&row.elapsed_time)?;
    let fault_category = row.fault_category.trim();
    if fault_category.is_empty() {
        return None;
    }

    let interruption_time = parse_timestamp(&row.interruption_time);
    let restoration_time = parse_timestamp(&row.restoration_time);
    let duration_hours = match (interruption_time, restoration_time) {
        (Some(start), Some(end)) => Some((end - start).num_seconds() as f64 / 3600.0),
        _ => None,
    };
    let date = interruption_time.map(|t| t.date());
    let week = date.map(iso_week_label);

    Some(OutageRecord {
        feeder: clean_feeder_name(&row.feeder_name),
        month: month.to_string(),
        interruption_time,
        restoration_time,
        customer_count,
        elapsed_time,
        fault_category: fault_category.to_string(),
        duration_hours,
        date,
        week,
    })
}

/// Cleans and type-coerces a worksheet's raw rows, applying the exclusion
/// policy: rows with an unparseable `Customer No` or `Elapsed Time`, or an
/// empty `Fault Category`, are dropped and counted in `rejected`.
pub fn normalize_worksheet(month: &str, rows: &[RawOutageRow]) -> NormalizedBatch {
    let mut records = Vec::with_capacity(rows.len());
    let mut rejected = 0;

    for row in rows {
        match normalize_row(month, row) {
            Some(record) => records.push(record),
            None => rejected += 1,
        }
    }

    NormalizedBatch {
        month: month.to_string(),
        records,
        rejected,
    }
}
