use crate::models::{LocalityRate, Outcome, OutcomePoint, UnifiedRecord};
use crate::table::UnifiedTable;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default)]
struct DayTotals {
    total_cases: i64,
    hospitalizations: i64,
    deaths: i64,
}

impl DayTotals {
    fn add(&mut self, record: &UnifiedRecord) {
        self.total_cases = self.total_cases.saturating_add(record.total_cases);
        self.hospitalizations = self.hospitalizations.saturating_add(record.hospitalizations);
        self.deaths = self.deaths.saturating_add(record.deaths);
    }

    fn get(&self, outcome: Outcome) -> i64 {
        match outcome {
            Outcome::TotalCases => self.total_cases,
            Outcome::Hospitalizations => self.hospitalizations,
            Outcome::Deaths => self.deaths,
        }
    }
}

/// Statewide sums per report date in long form, grouped by outcome then date.
pub fn statewide_series(table: &UnifiedTable) -> Vec<OutcomePoint> {
    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for record in table.records() {
        days.entry(record.report_date).or_default().add(record);
    }

    let mut points = Vec::with_capacity(days.len() * Outcome::ALL.len());
    for outcome in Outcome::ALL {
        points.extend(days.iter().map(|(&report_date, totals)| OutcomePoint {
            report_date,
            outcome,
            count: totals.get(outcome),
        }));
    }
    points
}

/// Cases per 100 residents for every locality reporting on the latest date.
pub fn latest_rates(table: &UnifiedTable) -> (Option<NaiveDate>, Vec<LocalityRate>) {
    let Some(latest) = table.latest_report_date() else {
        return (None, Vec::new());
    };

    let rows = table
        .records()
        .filter(|record| record.report_date == latest)
        .map(|record| LocalityRate {
            locality: record.locality.clone(),
            fips: record.fips.clone(),
            total_cases: record.total_cases,
            population_estimate: record.population_estimate,
            cases_per_100: (record.population_estimate > 0)
                .then(|| 100.0 * record.total_cases as f64 / record.population_estimate as f64),
        })
        .collect();

    (Some(latest), rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::fixtures::record;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 4, d).unwrap()
    }

    fn sample() -> UnifiedTable {
        UnifiedTable::from_records(vec![
            record("Albemarle", "51003", day(1), 100),
            record("Albemarle", "51003", day(2), 200),
            record("Charlottesville", "51540", day(1), 50),
            record("Charlottesville", "51540", day(2), 60),
            record("Norton", "51720", day(1), 5),
        ])
        .unwrap()
    }

    #[test]
    fn statewide_series_sums_each_day() {
        let points = statewide_series(&sample());
        assert_eq!(points.len(), 6);

        let totals: Vec<(NaiveDate, i64)> = points
            .iter()
            .filter(|p| p.outcome == Outcome::TotalCases)
            .map(|p| (p.report_date, p.count))
            .collect();
        assert_eq!(totals, vec![(day(1), 155), (day(2), 260)]);

        let hospitalizations = points
            .iter()
            .find(|p| p.outcome == Outcome::Hospitalizations && p.report_date == day(2))
            .expect("missing point");
        assert_eq!(hospitalizations.count, 26);
    }

    #[test]
    fn statewide_series_is_ordered_by_outcome() {
        let outcomes: Vec<Outcome> = statewide_series(&sample()).iter().map(|p| p.outcome).collect();
        let mut sorted = outcomes.clone();
        sorted.sort();
        assert_eq!(outcomes, sorted);
        assert_eq!(outcomes[0], Outcome::TotalCases);
    }

    #[test]
    fn latest_rates_use_max_report_date() {
        let (date, rows) = latest_rates(&sample());
        assert_eq!(date, Some(day(2)));
        assert_eq!(rows.len(), 2);
        let albemarle = rows.iter().find(|r| r.locality == "Albemarle").unwrap();
        assert_eq!(albemarle.cases_per_100, Some(0.4));
    }

    #[test]
    fn zero_population_has_no_rate() {
        let mut row = record("Empty", "51999", day(1), 5);
        row.population_estimate = 0;
        let table = UnifiedTable::from_records(vec![row]).unwrap();
        let (_, rows) = latest_rates(&table);
        assert_eq!(rows[0].cases_per_100, None);
    }
}
