//! The seven analytical queries
//!
//! Every query reads through the injected store traits, aggregates and
//! joins in memory, and returns a [`ResultSet`] of typed rows in a fully
//! deterministic order. An empty result set is a normal outcome meaning
//! there is no data for the parameters.

pub mod aggregate;
pub mod chronic;
pub mod drug;
pub mod mortality;
pub mod nutrition;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::error::Result;
use crate::store::lookup::{self, Dataset, YearRange};
use crate::store::{DocumentStore, RelationalStore};
use crate::utils::logging::{log_query, render_table};

pub use chronic::StratifiedValue;
pub use drug::DrugPoisoningResult;
pub use mortality::{HeartDiseaseInactivity, InactivityCauseOfDeath, LeadingCause};
pub use nutrition::OverweightInactivity;

/// A typed result row with fixed column headings
pub trait ResultRow: Serialize {
    /// Column headings, one per cell
    const HEADINGS: &'static [&'static str];

    /// Display text of each cell, in heading order
    fn cells(&self) -> Vec<String>;
}

/// Ordered rows of one query plus their headings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet<R> {
    pub headings: &'static [&'static str],
    pub rows: Vec<R>,
}

impl<R: ResultRow> ResultSet<R> {
    #[must_use]
    pub fn new(rows: Vec<R>) -> Self {
        Self {
            headings: R::HEADINGS,
            rows,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Aligned plain-text table
    #[must_use]
    pub fn to_table(&self) -> String {
        let cells: Vec<Vec<String>> = self.rows.iter().map(ResultRow::cells).collect();
        render_table(self.headings, &cells)
    }

    /// JSON array of row objects
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.rows)?)
    }
}

/// Display a float the way the results show percentages and rates:
/// whole numbers keep one decimal place
#[must_use]
pub fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Parameters of the stratified chronic disease query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChronicDiseaseParams {
    pub year_start: i32,
    pub year_end: i32,
    pub state: String,
    pub question_id: String,
}

/// Entry point for all queries and lookups
///
/// Holds the stores for the lifetime of the process. Parameters are
/// assumed to be validated against the lookups before a query is called.
#[derive(Clone)]
pub struct QueryEngine {
    relational: Arc<dyn RelationalStore>,
    document: Arc<dyn DocumentStore>,
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("drug_poisoning_statistics", &self.document.statistics().len())
            .finish_non_exhaustive()
    }
}

fn timed<R: ResultRow>(
    name: &str,
    parameters: &str,
    run: impl FnOnce() -> Result<Vec<R>>,
) -> Result<ResultSet<R>> {
    let start = Instant::now();
    let rows = run()?;
    log_query(name, parameters, rows.len(), start.elapsed());
    Ok(ResultSet::new(rows))
}

impl QueryEngine {
    pub fn new(relational: Arc<dyn RelationalStore>, document: Arc<dyn DocumentStore>) -> Self {
        Self {
            relational,
            document,
        }
    }

    #[must_use]
    pub fn relational(&self) -> &dyn RelationalStore {
        self.relational.as_ref()
    }

    #[must_use]
    pub fn document(&self) -> &dyn DocumentStore {
        self.document.as_ref()
    }

    /// Query 1: the leading cause of death in every state for `year`
    pub fn leading_cause_of_death(&self, year: i32) -> Result<ResultSet<LeadingCause>> {
        timed("leading_cause_of_death", &year.to_string(), || {
            mortality::leading_cause_of_death(self.relational(), year)
        })
    }

    /// Query 2: states with more than 35% overweight and their inactivity
    pub fn overweight_and_inactivity(&self, year: i32) -> Result<ResultSet<OverweightInactivity>> {
        timed("overweight_and_inactivity", &year.to_string(), || {
            nutrition::overweight_and_inactivity(self.relational(), year)
        })
    }

    /// Query 3: inactivity in states where heart disease leads
    pub fn heart_disease_inactivity(&self, year: i32) -> Result<ResultSet<HeartDiseaseInactivity>> {
        timed("heart_disease_inactivity", &year.to_string(), || {
            mortality::heart_disease_inactivity(self.relational(), year)
        })
    }

    /// Query 4: stratified chronic disease indicator values
    pub fn chronic_disease_stratified(
        &self,
        params: &ChronicDiseaseParams,
    ) -> Result<ResultSet<StratifiedValue<String>>> {
        let parameters = format!(
            "{}, {}, {}, {}",
            params.year_start, params.year_end, params.state, params.question_id
        );
        timed("chronic_disease_stratified", &parameters, || {
            chronic::chronic_disease_stratified(self.relational(), params)
        })
    }

    /// Query 5: stratified nutrition survey values
    pub fn nutrition_stratified(
        &self,
        year: i32,
        state: &str,
        question_id: &str,
    ) -> Result<ResultSet<StratifiedValue<f64>>> {
        let parameters = format!("{year}, {state}, {question_id}");
        timed("nutrition_stratified", &parameters, || {
            nutrition::nutrition_stratified(self.relational(), year, state, question_id)
        })
    }

    /// Query 6: states with more than 30% inactivity and their causes of death
    pub fn inactivity_and_causes(&self, year: i32) -> Result<ResultSet<InactivityCauseOfDeath>> {
        timed("inactivity_and_causes", &year.to_string(), || {
            mortality::inactivity_and_causes(self.relational(), year)
        })
    }

    /// Query 7: drug poisoning statistics for a year and state
    pub fn drug_poisoning(&self, year: i32, state: &str) -> Result<ResultSet<DrugPoisoningResult>> {
        let parameters = format!("{year}, {state}");
        timed("drug_poisoning", &parameters, || {
            Ok(drug::drug_poisoning(self.document(), year, state))
        })
    }

    pub fn leading_cause_year_range(&self) -> Result<Option<YearRange>> {
        lookup::leading_cause_year_range(self.relational())
    }

    pub fn nutrition_year_range(&self) -> Result<Option<YearRange>> {
        lookup::nutrition_year_range(self.relational())
    }

    pub fn chronic_disease_year_ranges(&self) -> Result<Option<(YearRange, YearRange)>> {
        lookup::chronic_disease_year_ranges(self.relational())
    }

    #[must_use]
    pub fn drug_poisoning_year_range(&self) -> Option<YearRange> {
        lookup::drug_poisoning_year_range(self.document())
    }

    pub fn shared_year_range(&self) -> Result<Option<YearRange>> {
        lookup::shared_year_range(self.relational())
    }

    pub fn states_for(&self, dataset: Dataset) -> Result<BTreeSet<String>> {
        lookup::states_for(self.relational(), self.document(), dataset)
    }

    pub fn topics_for(&self, dataset: Dataset) -> Result<Vec<(String, String)>> {
        lookup::topics_for(self.relational(), dataset)
    }

    pub fn questions_for(&self, topic_id: &str, dataset: Dataset) -> Result<Vec<(String, String)>> {
        lookup::questions_for(self.relational(), topic_id, dataset)
    }
}
