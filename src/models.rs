use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One flat Socrata row, field name to JSON value.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone)]
pub struct RawDataset {
    pub name: String,
    pub records: Vec<RawRecord>,
}

/// County code used to join cases to population.
///
/// Digit-only codes are zero-padded to five characters so that `51003`,
/// `"51003"` and `" 51003 "` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Fips(String);

impl Fips {
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.chars().all(|c| c.is_ascii_digit()) && trimmed.len() < 5 {
            return Some(Self(format!("{trimmed:0>5}")));
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseReport {
    pub locality: String,
    pub vdh_health_district: String,
    pub fips: Fips,
    pub report_date: NaiveDate,
    pub total_cases: i64,
    pub hospitalizations: i64,
    pub deaths: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationRecord {
    pub fips: Fips,
    pub year: i32,
    pub population_estimate: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnifiedRecord {
    pub locality: String,
    pub vdh_health_district: String,
    pub fips: Fips,
    pub report_date: NaiveDate,
    pub total_cases: i64,
    pub hospitalizations: i64,
    pub deaths: i64,
    pub population_estimate: i64,
}

impl UnifiedRecord {
    pub fn from_parts(case: CaseReport, population_estimate: i64) -> Self {
        Self {
            locality: case.locality,
            vdh_health_district: case.vdh_health_district,
            fips: case.fips,
            report_date: case.report_date,
            total_cases: case.total_cases,
            hospitalizations: case.hospitalizations,
            deaths: case.deaths,
            population_estimate,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub matched: usize,
    pub unmatched: usize,
    pub unmatched_fips: Vec<Fips>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    pub locality: String,
    pub health_district: String,
    pub as_of: NaiveDate,
    /// Date of the row that supplied the recent window end: `as_of` or the day before.
    pub anchor_date: NaiveDate,
    pub used_fallback: bool,
    pub back14: NaiveDate,
    pub back28: NaiveDate,
    pub recent_new_cases: i64,
    pub prior_new_cases: i64,
    pub change: i64,
    pub percent_change: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SummaryResponse {
    Ok {
        headers: [&'static str; 2],
        rows: Vec<SummaryRow>,
        summary: TrendSummary,
    },
    Unavailable {
        locality: String,
        reason: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    TotalCases,
    Hospitalizations,
    Deaths,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Self::TotalCases, Self::Hospitalizations, Self::Deaths];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomePoint {
    pub report_date: NaiveDate,
    pub outcome: Outcome,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalityRate {
    pub locality: String,
    pub fips: Fips,
    pub total_cases: i64,
    pub population_estimate: i64,
    pub cases_per_100: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RatesResponse {
    pub report_date: Option<NaiveDate>,
    pub geojson_url: String,
    pub rows: Vec<LocalityRate>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub locality: Option<String>,
    pub as_of: Option<String>,
}
