//! Drug poisoning statistics from the document store

use serde::Serialize;

use crate::query::aggregate::round_to;
use crate::query::{ResultRow, format_float};
use crate::store::{DocumentStore, DrugPoisoningStatistic};

/// Decimal places of the death share of the population
pub const POPULATION_SHARE_PLACES: i32 = 8;

/// One (sex, race, age range) cell for a year and state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrugPoisoningResult {
    pub sex: String,
    pub race: String,
    pub age_range: String,
    pub deaths: i64,
    pub population: i64,
    /// `None` when the population is missing or zero
    pub death_pct_of_population: Option<f64>,
}

impl ResultRow for DrugPoisoningResult {
    const HEADINGS: &'static [&'static str] = &[
        "Sex",
        "Race",
        "AgeRange",
        "Deaths",
        "Population",
        "Deaths % of Population",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.sex.clone(),
            self.race.clone(),
            self.age_range.clone(),
            self.deaths.to_string(),
            self.population.to_string(),
            self.death_pct_of_population.map(format_float).unwrap_or_default(),
        ]
    }
}

/// Deaths as a percentage of population, rounded to 8 places
#[must_use]
pub fn death_percentage(deaths: i64, population: i64) -> Option<f64> {
    if population <= 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let pct = deaths as f64 * 100.0 / population as f64;
    Some(round_to(pct, POPULATION_SHARE_PLACES))
}

/// Every statistic for `year` whose state matches `state` ignoring case,
/// ordered by sex, race and age range label
pub fn drug_poisoning(
    document: &dyn DocumentStore,
    year: i32,
    state: &str,
) -> Vec<DrugPoisoningResult> {
    let state = state.to_lowercase();
    let mut rows: Vec<DrugPoisoningResult> = document
        .select(&|s: &DrugPoisoningStatistic| s.year == year && s.state.to_lowercase() == state)
        .into_iter()
        .map(|s| DrugPoisoningResult {
            sex: s.sex.clone(),
            race: s.race.clone(),
            age_range: s.age_range.label(),
            deaths: s.deaths,
            population: s.population,
            death_pct_of_population: death_percentage(s.deaths, s.population),
        })
        .collect();

    rows.sort_by(|a, b| {
        (a.sex.as_str(), a.race.as_str(), a.age_range.as_str()).cmp(&(
            b.sex.as_str(),
            b.race.as_str(),
            b.age_range.as_str(),
        ))
    });
    rows
}
