use crate::errors::TrendError;
use crate::models::{SummaryRow, TrendSummary, UnifiedRecord};
use crate::table::{LocalitySeries, UnifiedTable};
use chrono::{Duration, NaiveDate};

pub const LOOKBACK_DAYS: i64 = 14;
pub const SUMMARY_HEADERS: [&str; 2] = ["Local Conditions", ""];

pub fn compute_trend(
    table: &UnifiedTable,
    locality: &str,
    as_of: NaiveDate,
) -> Result<TrendSummary, TrendError> {
    let series = table
        .series(locality)
        .ok_or_else(|| TrendError::UnknownLocality {
            locality: locality.to_string(),
        })?;

    let yesterday = as_of - Duration::days(1);
    let back14 = as_of - Duration::days(LOOKBACK_DAYS);
    let back28 = as_of - Duration::days(2 * LOOKBACK_DAYS);

    let (anchor, used_fallback) = match (series.get(as_of), series.get(yesterday)) {
        (Some(today), _) => (today, false),
        (None, Some(previous)) => (previous, true),
        (None, None) => return Err(missing(locality, yesterday)),
    };
    let start = require(series, locality, back14)?;
    let baseline = require(series, locality, back28)?;

    let overflow = || TrendError::Overflow {
        locality: locality.to_string(),
    };
    let recent_new_cases = anchor
        .total_cases
        .checked_sub(start.total_cases)
        .ok_or_else(overflow)?;
    let prior_new_cases = start
        .total_cases
        .checked_sub(baseline.total_cases)
        .ok_or_else(overflow)?;
    let change = recent_new_cases
        .checked_sub(prior_new_cases)
        .ok_or_else(overflow)?;
    if prior_new_cases == 0 {
        return Err(TrendError::NoBaseline {
            locality: locality.to_string(),
        });
    }

    Ok(TrendSummary {
        locality: anchor.locality.clone(),
        health_district: anchor.vdh_health_district.clone(),
        as_of,
        anchor_date: anchor.report_date,
        used_fallback,
        back14,
        back28,
        recent_new_cases,
        prior_new_cases,
        change,
        percent_change: round2(100.0 * change as f64 / prior_new_cases as f64),
    })
}

// Window labels end at `as_of` even when yesterday's report supplied the total.
pub fn summary_rows(summary: &TrendSummary) -> Vec<SummaryRow> {
    let row = |label: String, value: String| SummaryRow { label, value };
    vec![
        row("Locality".into(), summary.locality.clone()),
        row("VDH Health District".into(), summary.health_district.clone()),
        row(
            format!("New Cases: {} to {}", summary.back14, summary.as_of),
            summary.recent_new_cases.to_string(),
        ),
        row(
            format!("New Cases: {} to {}", summary.back28, summary.back14),
            summary.prior_new_cases.to_string(),
        ),
        row("Total change in new cases".into(), summary.change.to_string()),
        row(
            "Percent change in new cases".into(),
            format!("{:.2}", summary.percent_change),
        ),
    ]
}

fn require<'a>(
    series: &'a LocalitySeries,
    locality: &str,
    date: NaiveDate,
) -> Result<&'a UnifiedRecord, TrendError> {
    series.get(date).ok_or_else(|| missing(locality, date))
}

fn missing(locality: &str, date: NaiveDate) -> TrendError {
    TrendError::MissingData {
        locality: locality.to_string(),
        date,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
