use crate::errors::PipelineError;
use crate::models::UnifiedRecord;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Reports for one locality, at most one per date.
#[derive(Debug, Clone, Default)]
pub struct LocalitySeries {
    rows: BTreeMap<NaiveDate, UnifiedRecord>,
}

impl LocalitySeries {
    pub fn get(&self, date: NaiveDate) -> Option<&UnifiedRecord> {
        self.rows.get(&date)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &UnifiedRecord> {
        self.rows.values()
    }
}

#[derive(Debug, Clone, Default)]
pub struct UnifiedTable {
    series: BTreeMap<String, LocalitySeries>,
}

impl UnifiedTable {
    pub fn from_records(records: Vec<UnifiedRecord>) -> Result<Self, PipelineError> {
        let mut series: BTreeMap<String, LocalitySeries> = BTreeMap::new();
        for record in records {
            let rows = &mut series.entry(record.locality.clone()).or_default().rows;
            match rows.entry(record.report_date) {
                Entry::Occupied(_) => {
                    return Err(PipelineError::DuplicateReport {
                        locality: record.locality,
                        date: record.report_date,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
            }
        }
        Ok(Self { series })
    }

    pub fn series(&self, locality: &str) -> Option<&LocalitySeries> {
        self.series.get(locality).filter(|series| !series.is_empty())
    }

    pub fn localities(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn records(&self) -> impl Iterator<Item = &UnifiedRecord> {
        self.series.values().flat_map(LocalitySeries::records)
    }

    pub fn len(&self) -> usize {
        self.series.values().map(LocalitySeries::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn latest_report_date(&self) -> Option<NaiveDate> {
        self.series
            .values()
            .filter_map(|series| series.rows.keys().next_back().copied())
            .max()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{Fips, UnifiedRecord};
    use chrono::NaiveDate;

    pub fn record(locality: &str, fips: &str, date: NaiveDate, total_cases: i64) -> UnifiedRecord {
        UnifiedRecord {
            locality: locality.to_string(),
            vdh_health_district: format!("{locality} District"),
            fips: Fips::new(fips).unwrap(),
            report_date: date,
            total_cases,
            hospitalizations: total_cases / 10,
            deaths: total_cases / 100,
            population_estimate: 50_000,
        }
    }
}
