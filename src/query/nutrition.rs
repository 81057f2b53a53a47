//! Queries over the nutrition and physical activity survey

use serde::Serialize;

use crate::error::Result;
use crate::filter::Expr;
use crate::query::aggregate::{
    NO_EXERCISE_QUESTION, OVERWEIGHT_QUESTION, OVERWEIGHT_THRESHOLD, distinct_by_key,
    location_names, weighted_by_location,
};
use crate::query::chronic::{StratifiedValue, StratumLabels, location_filter};
use crate::query::{ResultRow, format_float};
use crate::store::RelationalStore;
use crate::store::rows::{NutritionRow, scan_rows};

/// Nutrition values at or below this are missing
pub const MISSING_NUMERIC_VALUE: i32 = -1;

/// Overweight and inactivity of one location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverweightInactivity {
    pub year: i32,
    pub location: String,
    pub overweight_pct: f64,
    pub no_exercise_pct: f64,
}

impl ResultRow for OverweightInactivity {
    const HEADINGS: &'static [&'static str] = &[
        "Year",
        "Location",
        "% People Overweight",
        "% People w/ No Exercise",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.year.to_string(),
            self.location.clone(),
            format_float(self.overweight_pct),
            format_float(self.no_exercise_pct),
        ]
    }
}

/// Locations whose weighted overweight percentage in `year` exceeds 35,
/// with their weighted no-exercise percentage, ordered by `LocationID`
///
/// Only locations with both figures are reported.
pub fn overweight_and_inactivity(
    store: &dyn RelationalStore,
    year: i32,
) -> Result<Vec<OverweightInactivity>> {
    let overweight = weighted_by_location(store, year, OVERWEIGHT_QUESTION)?;
    let no_exercise = weighted_by_location(store, year, NO_EXERCISE_QUESTION)?;
    if overweight.is_empty() || no_exercise.is_empty() {
        return Ok(Vec::new());
    }
    let names = location_names(store)?;

    let mut ids: Vec<i32> = overweight
        .iter()
        .filter(|(_, pct)| **pct > OVERWEIGHT_THRESHOLD)
        .map(|(id, _)| *id)
        .filter(|id| no_exercise.contains_key(id))
        .collect();
    ids.sort_unstable();

    Ok(ids
        .into_iter()
        .filter_map(|id| {
            Some(OverweightInactivity {
                year,
                location: names.get(&id)?.clone(),
                overweight_pct: *overweight.get(&id)?,
                no_exercise_pct: *no_exercise.get(&id)?,
            })
        })
        .collect())
}

/// Distinct strata of a nutrition question for a start year and state
///
/// Values must be strictly greater than `-1`. Rows keep their storage
/// order.
pub fn nutrition_stratified(
    store: &dyn RelationalStore,
    year: i32,
    state: &str,
    question_id: &str,
) -> Result<Vec<StratifiedValue<f64>>> {
    let Some(location) = location_filter(store, state)? else {
        return Ok(Vec::new());
    };
    let filter = Expr::all(vec![
        Expr::eq("YearStart", year),
        Expr::eq("QuestionID", question_id),
        Expr::gt("DataValue", MISSING_NUMERIC_VALUE),
        location,
    ]);
    let facts: Vec<NutritionRow> = scan_rows(store, Some(&filter))?;
    let labels = StratumLabels::load(store)?;

    let rows = facts
        .into_iter()
        .filter_map(|fact| {
            labels.label(
                &fact.stratification_id,
                &fact.data_value_type_id,
                fact.data_value_unit,
                fact.data_value?,
            )
        })
        .collect();

    Ok(distinct_by_key(rows, |row: &StratifiedValue<f64>| {
        (
            row.stratification_category.clone(),
            row.stratification.clone(),
            row.data_value_unit.clone(),
            row.data_value_type.clone(),
            row.data_value.to_bits(),
        )
    }))
}
