//! Queries over the causes of death, alone or joined with nutrition data

use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::Result;
use crate::filter::Expr;
use crate::query::aggregate::{
    HEART_DISEASE, NO_EXERCISE_QUESTION, NO_EXERCISE_THRESHOLD, leading_causes,
    location_names, weighted_by_location, weighted_by_location_name,
};
use crate::query::{ResultRow, format_float};
use crate::store::RelationalStore;
use crate::store::rows::{CauseOfDeathRow, CauseRow, scan_rows};

/// Leading cause of death of one state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadingCause {
    pub year: i32,
    pub state: String,
    pub cause_name: String,
    pub deaths: i64,
}

impl ResultRow for LeadingCause {
    const HEADINGS: &'static [&'static str] =
        &["Year", "State", "Max Cause Of Death", "Number of Deaths"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.year.to_string(),
            self.state.clone(),
            self.cause_name.clone(),
            self.deaths.to_string(),
        ]
    }
}

/// Inactivity of a state whose leading cause of death is heart disease
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeartDiseaseInactivity {
    pub year: i32,
    pub state: String,
    pub cause_name: String,
    pub no_exercise_pct: f64,
}

impl ResultRow for HeartDiseaseInactivity {
    const HEADINGS: &'static [&'static str] =
        &["Year", "State", "Max Cause of Death", "% People w/ No Exercise"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.year.to_string(),
            self.state.clone(),
            self.cause_name.clone(),
            format_float(self.no_exercise_pct),
        ]
    }
}

/// One cause of death in a state with high inactivity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InactivityCauseOfDeath {
    pub year: i32,
    pub state: String,
    pub no_exercise_pct: f64,
    pub cause_name_expanded: String,
    pub deaths: i64,
    pub age_adjusted_death_rate: f64,
}

impl ResultRow for InactivityCauseOfDeath {
    const HEADINGS: &'static [&'static str] = &[
        "Year",
        "State",
        "% People w/ No Exercise",
        "Leading Causes Of Death",
        "Deaths",
        "Age Adjusted Death Rate",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.year.to_string(),
            self.state.clone(),
            format_float(self.no_exercise_pct),
            self.cause_name_expanded.clone(),
            self.deaths.to_string(),
            format_float(self.age_adjusted_death_rate),
        ]
    }
}

/// One row per state reporting in `year`: the cause with the most deaths,
/// ignoring "All causes". Ties go to the alphabetically first cause name.
pub fn leading_cause_of_death(store: &dyn RelationalStore, year: i32) -> Result<Vec<LeadingCause>> {
    Ok(leading_causes(store, year)?
        .into_iter()
        .filter_map(|(state, leaders)| {
            leaders.into_iter().next().map(|row| LeadingCause {
                year: row.year,
                state,
                cause_name: row.cause_name,
                deaths: row.deaths,
            })
        })
        .collect())
}

/// States whose leading cause of death in `year` is heart disease, with
/// their weighted no-exercise percentage, ordered by state
///
/// A state's inactivity is taken from every `LocationID` whose name equals
/// the state name.
pub fn heart_disease_inactivity(
    store: &dyn RelationalStore,
    year: i32,
) -> Result<Vec<HeartDiseaseInactivity>> {
    let by_location = weighted_by_location(store, year, NO_EXERCISE_QUESTION)?;
    let names = location_names(store)?;
    let mut by_state: FxHashMap<&str, Vec<(i32, f64)>> = FxHashMap::default();
    for (location_id, pct) in &by_location {
        if let Some(name) = names.get(location_id) {
            by_state.entry(name.as_str()).or_default().push((*location_id, *pct));
        }
    }

    let mut results = Vec::new();
    for leader in leading_cause_of_death(store, year)? {
        if leader.cause_name != HEART_DISEASE {
            continue;
        }
        let Some(locations) = by_state.get(leader.state.as_str()) else {
            continue;
        };
        for (_, pct) in locations.iter().sorted_by_key(|(id, _)| *id) {
            results.push(HeartDiseaseInactivity {
                year,
                state: leader.state.clone(),
                cause_name: leader.cause_name.clone(),
                no_exercise_pct: *pct,
            });
        }
    }
    Ok(results)
}

/// Every cause of death in `year` for states whose weighted no-exercise
/// percentage exceeds 30, ordered by state then expanded cause name
pub fn inactivity_and_causes(
    store: &dyn RelationalStore,
    year: i32,
) -> Result<Vec<InactivityCauseOfDeath>> {
    let inactive: FxHashMap<String, f64> =
        weighted_by_location_name(store, year, NO_EXERCISE_QUESTION)?
            .into_iter()
            .filter(|(_, pct)| *pct > NO_EXERCISE_THRESHOLD)
            .collect();
    if inactive.is_empty() {
        return Ok(Vec::new());
    }

    let deaths: Vec<CauseOfDeathRow> = scan_rows(store, Some(&Expr::eq("Year", year)))?;
    let causes: Vec<CauseRow> = scan_rows(store, None)?;
    let expanded: FxHashMap<&str, Vec<&str>> = causes
        .iter()
        .map(|c| (c.cause_name.as_str(), c.cause_name_expanded.as_str()))
        .into_group_map()
        .into_iter()
        .collect();

    let mut results = Vec::new();
    for row in &deaths {
        let Some(&pct) = inactive.get(&row.state) else {
            continue;
        };
        let Some(labels) = expanded.get(row.cause_name.as_str()) else {
            continue;
        };
        for label in labels {
            results.push(InactivityCauseOfDeath {
                year,
                state: row.state.clone(),
                no_exercise_pct: pct,
                cause_name_expanded: (*label).to_string(),
                deaths: row.deaths,
                age_adjusted_death_rate: row.age_adjusted_death_rate,
            });
        }
    }

    results.sort_by(|a, b| {
        a.state
            .cmp(&b.state)
            .then_with(|| a.cause_name_expanded.cmp(&b.cause_name_expanded))
    });
    Ok(results)
}
