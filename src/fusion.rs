use crate::errors::{PipelineError, SchemaError};
use crate::models::{CaseReport, Fips, JoinReport, PopulationRecord, RawDataset, RawRecord, UnifiedRecord};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{info, warn};

pub const POPULATION_YEAR: i32 = 2019;

pub fn parse_case_reports(dataset: &RawDataset) -> Result<Vec<CaseReport>, SchemaError> {
    dataset
        .records
        .iter()
        .enumerate()
        .map(|(row, record)| {
            let field = FieldReader {
                dataset: &dataset.name,
                row,
                record,
            };
            Ok(CaseReport {
                locality: field.text("locality")?,
                vdh_health_district: field.text("vdh_health_district")?,
                fips: field.fips("fips")?,
                report_date: field.date("report_date")?,
                total_cases: field.integer("total_cases")?,
                hospitalizations: field.integer("hospitalizations")?,
                deaths: field.integer("deaths")?,
            })
        })
        .collect()
}

/// Keeps rows for `year`. Rows with a missing or unreadable year are dropped,
/// not rejected.
pub fn filter_population_year(dataset: &RawDataset, year: i32) -> Vec<(usize, &RawRecord)> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.get("year").and_then(as_integer) == Some(i64::from(year)))
        .collect()
}

pub fn parse_population(dataset: &RawDataset, year: i32) -> Result<Vec<PopulationRecord>, SchemaError> {
    filter_population_year(dataset, year)
        .into_iter()
        .map(|(row, record)| {
            let field = FieldReader {
                dataset: &dataset.name,
                row,
                record,
            };
            Ok(PopulationRecord {
                fips: field.fips("fips")?,
                year,
                population_estimate: field.integer("population_estimate")?,
            })
        })
        .collect()
}

pub fn aggregate_population(records: &[PopulationRecord]) -> Vec<PopulationRecord> {
    let mut totals: BTreeMap<&Fips, (i32, i64)> = BTreeMap::new();
    for record in records {
        let entry = totals.entry(&record.fips).or_insert((record.year, 0));
        entry.1 = entry.1.saturating_add(record.population_estimate);
    }

    totals
        .into_iter()
        .map(|(fips, (year, population_estimate))| PopulationRecord {
            fips: fips.clone(),
            year,
            population_estimate,
        })
        .collect()
}

/// Inner join validated as many-to-one.
///
/// A case row whose FIPS appears more than once in `population` is a
/// [`PipelineError::JoinIntegrity`]. Rows without a match are left out and
/// counted in the returned [`JoinReport`].
pub fn join_cases(
    cases: Vec<CaseReport>,
    population: &[PopulationRecord],
) -> Result<(Vec<UnifiedRecord>, JoinReport), PipelineError> {
    let mut index: HashMap<&Fips, Vec<i64>> = HashMap::new();
    for record in population {
        index.entry(&record.fips).or_default().push(record.population_estimate);
    }

    let mut joined = Vec::with_capacity(cases.len());
    let mut unmatched = 0usize;
    let mut unmatched_fips = BTreeSet::new();

    for case in cases {
        match index.get(&case.fips).map(Vec::as_slice) {
            Some([estimate]) => {
                let estimate = *estimate;
                joined.push(UnifiedRecord::from_parts(case, estimate));
            }
            Some(matches) if matches.len() > 1 => {
                return Err(PipelineError::JoinIntegrity {
                    fips: case.fips.to_string(),
                    matches: matches.len(),
                });
            }
            _ => {
                unmatched += 1;
                unmatched_fips.insert(case.fips);
            }
        }
    }

    let report = JoinReport {
        matched: joined.len(),
        unmatched,
        unmatched_fips: unmatched_fips.into_iter().collect(),
    };
    Ok((joined, report))
}

pub fn fuse(
    cases: &RawDataset,
    population: &RawDataset,
) -> Result<(Vec<UnifiedRecord>, JoinReport), PipelineError> {
    let cases = parse_case_reports(cases)?;
    let population_rows = parse_population(population, POPULATION_YEAR)?;
    let population = aggregate_population(&population_rows);
    info!(
        "fusing {} case reports with {} population rows ({} fips) for {POPULATION_YEAR}",
        cases.len(),
        population_rows.len(),
        population.len()
    );

    let (joined, report) = join_cases(cases, &population)?;
    info!("join matched {} rows", report.matched);
    if report.unmatched > 0 {
        let codes: Vec<&str> = report.unmatched_fips.iter().map(Fips::as_str).collect();
        warn!(
            "{} case rows have no population match: fips {}",
            report.unmatched,
            codes.join(", ")
        );
    }
    Ok((joined, report))
}

struct FieldReader<'a> {
    dataset: &'a str,
    row: usize,
    record: &'a RawRecord,
}

impl FieldReader<'_> {
    fn error(&self, field: &str, reason: impl Into<String>) -> SchemaError {
        SchemaError {
            dataset: self.dataset.to_string(),
            row: self.row,
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    fn value(&self, field: &str) -> Result<&Value, SchemaError> {
        match self.record.get(field) {
            None | Some(Value::Null) => Err(self.error(field, "is missing")),
            Some(value) => Ok(value),
        }
    }

    fn text(&self, field: &str) -> Result<String, SchemaError> {
        match self.value(field)? {
            Value::String(text) => Ok(text.trim().to_string()),
            Value::Number(number) => Ok(number.to_string()),
            _ => Err(self.error(field, "is not text")),
        }
    }

    fn integer(&self, field: &str) -> Result<i64, SchemaError> {
        let value = self.value(field)?;
        as_integer(value).ok_or_else(|| self.error(field, format!("is not an integer: {value}")))
    }

    fn fips(&self, field: &str) -> Result<Fips, SchemaError> {
        let raw = match self.value(field)? {
            number @ Value::Number(_) => as_integer(number)
                .map(|code| code.to_string())
                .ok_or_else(|| self.error(field, format!("is not an integer: {number}")))?,
            _ => self.text(field)?,
        };
        Fips::new(&raw).ok_or_else(|| self.error(field, "is blank"))
    }

    fn date(&self, field: &str) -> Result<NaiveDate, SchemaError> {
        let text = self.text(field)?;
        parse_report_date(&text).ok_or_else(|| self.error(field, format!("is not a date: {text}")))
    }
}

/// Accepts JSON integers, integral floats and numeric strings such as `"12"` or `"12.0"`.
/// Values outside the `i64` range are rejected rather than clamped.
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(integral_f64)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(integral_f64))
        }
        _ => None,
    }
}

fn integral_f64(value: f64) -> Option<i64> {
    // 2^63 is exact in f64; anything at or above it does not fit.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (value.is_finite() && value.fract() == 0.0 && (-LIMIT..LIMIT).contains(&value))
        .then(|| value as i64)
}

pub fn parse_report_date(text: &str) -> Option<NaiveDate> {
    let day = text.trim().split('T').next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
