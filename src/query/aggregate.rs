//! Aggregation shared by the queries
//!
//! Sample-weighted survey percentages, leading-cause selection and
//! first-occurrence de-duplication.

use std::hash::Hash;

use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::Result;
use crate::filter::Expr;
use crate::store::RelationalStore;
use crate::store::rows::{CauseOfDeathRow, LocationRow, NutritionRow, scan_rows};

/// Nutrition question: no leisure-time physical activity
pub const NO_EXERCISE_QUESTION: &str = "Q047";
/// Nutrition question: overweight
pub const OVERWEIGHT_QUESTION: &str = "Q037";
/// Synthetic aggregate cause, never a leading cause
pub const ALL_CAUSES: &str = "All causes";
pub const HEART_DISEASE: &str = "Heart disease";
/// Overweight percentage a state must exceed in the overweight query
pub const OVERWEIGHT_THRESHOLD: f64 = 35.0;
/// Inactivity percentage a state must exceed in the inactivity query
pub const NO_EXERCISE_THRESHOLD: f64 = 30.0;

/// Decimal places of weighted survey percentages
pub const PERCENTAGE_PLACES: i32 = 3;

/// Round half away from zero to `places` decimal places
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Running sample-weighted percentage
///
/// `100 * sum(sample_size * value / 100) / sum(sample_size)`. A stratum
/// without a value still counts towards the sample total.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedPercentage {
    weighted_sum: Option<f64>,
    sample_total: i64,
}

impl WeightedPercentage {
    /// Add one stratum; strata with no sample are ignored
    pub fn add(&mut self, sample_size: i64, value: Option<f64>) {
        if sample_size <= 0 {
            return;
        }
        self.sample_total += sample_size;
        if let Some(value) = value {
            #[allow(clippy::cast_precision_loss)]
            let weight = sample_size as f64;
            *self.weighted_sum.get_or_insert(0.0) += weight * value / 100.0;
        }
    }

    /// The rounded percentage, or `None` if no stratum had both a sample
    /// and a value
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        let weighted_sum = self.weighted_sum?;
        if self.sample_total <= 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let total = self.sample_total as f64;
        Some(round_to(100.0 * (weighted_sum / total), PERCENTAGE_PLACES))
    }
}

/// Weighted percentage over `(sample_size, value)` strata
#[must_use]
pub fn weighted_percentage(strata: impl IntoIterator<Item = (i64, f64)>) -> Option<f64> {
    let mut acc = WeightedPercentage::default();
    for (sample_size, value) in strata {
        acc.add(sample_size, Some(value));
    }
    acc.value()
}

/// Weighted percentage per `LocationID` for one question, over strata
/// whose survey period is exactly `year`
pub fn weighted_by_location(
    store: &dyn RelationalStore,
    year: i32,
    question_id: &str,
) -> Result<FxHashMap<i32, f64>> {
    let filter = Expr::all(vec![
        Expr::eq("QuestionID", question_id),
        Expr::eq("YearStart", year),
        Expr::eq("YearEnd", year),
        Expr::gt("SampleSize", 0),
    ]);
    let rows: Vec<NutritionRow> = scan_rows(store, Some(&filter))?;

    let mut groups: FxHashMap<i32, WeightedPercentage> = FxHashMap::default();
    for row in &rows {
        groups
            .entry(row.location_id)
            .or_default()
            .add(row.sample_size.unwrap_or_default(), row.data_value);
    }

    Ok(groups
        .into_iter()
        .filter_map(|(location, acc)| acc.value().map(|value| (location, value)))
        .collect())
}

/// Weighted percentage per location name for one question
///
/// Strata are pooled across every `LocationID` sharing a `LocationDesc`;
/// strata whose location is unknown are dropped.
pub fn weighted_by_location_name(
    store: &dyn RelationalStore,
    year: i32,
    question_id: &str,
) -> Result<FxHashMap<String, f64>> {
    let filter = Expr::all(vec![
        Expr::eq("QuestionID", question_id),
        Expr::eq("YearStart", year),
        Expr::eq("YearEnd", year),
        Expr::gt("SampleSize", 0),
    ]);
    let rows: Vec<NutritionRow> = scan_rows(store, Some(&filter))?;
    let names = location_names(store)?;

    let mut groups: FxHashMap<String, WeightedPercentage> = FxHashMap::default();
    for row in &rows {
        if let Some(name) = names.get(&row.location_id) {
            groups
                .entry(name.clone())
                .or_default()
                .add(row.sample_size.unwrap_or_default(), row.data_value);
        }
    }

    Ok(groups
        .into_iter()
        .filter_map(|(name, acc)| acc.value().map(|value| (name, value)))
        .collect())
}

/// `LocationID` to `LocationDesc`
pub fn location_names(store: &dyn RelationalStore) -> Result<FxHashMap<i32, String>> {
    let locations: Vec<LocationRow> = scan_rows(store, None)?;
    Ok(locations
        .into_iter()
        .map(|location| (location.location_id, location.location_desc))
        .collect())
}

/// Causes of death in `year` tied for the most deaths in each state,
/// excluding the synthetic "All causes"
///
/// Keys are states in ascending order; each value holds every tied row
/// ordered by cause name.
pub fn leading_causes(
    store: &dyn RelationalStore,
    year: i32,
) -> Result<Vec<(String, Vec<CauseOfDeathRow>)>> {
    let filter = Expr::all(vec![
        Expr::eq("Year", year),
        Expr::not_eq("CauseName", ALL_CAUSES),
    ]);
    let rows: Vec<CauseOfDeathRow> = scan_rows(store, Some(&filter))?;

    Ok(rows
        .into_iter()
        .into_group_map_by(|row| row.state.clone())
        .into_iter()
        .sorted_by(|a, b| a.0.cmp(&b.0))
        .map(|(state, causes)| {
            let max_deaths = causes.iter().map(|row| row.deaths).max().unwrap_or_default();
            let leaders = causes
                .into_iter()
                .filter(|row| row.deaths == max_deaths)
                .sorted_by(|a, b| a.cause_name.cmp(&b.cause_name))
                .collect();
            (state, leaders)
        })
        .collect())
}

/// Keep the first occurrence of every key, preserving order
pub fn distinct_by_key<T, K: Eq + Hash>(items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut seen = FxHashSet::default();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}
