//! Interaction layer
//!
//! Turns validated parameters into query calls and renders the results.
//! The interactive menu lives in [`session`], parameter validation in
//! [`validate`] and the command line definition in [`args`].

pub mod args;
pub mod session;
pub mod validate;

use std::fmt;

use crate::error::Result;
use crate::query::{ChronicDiseaseParams, QueryEngine, ResultRow, ResultSet};

/// Printed instead of a table when a query returns no rows
pub const EMPTY_RESULT_MESSAGE: &str = "Sorry, there is no data available for those parameters.";

/// How results are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned plain-text table
    #[default]
    Table,
    /// JSON array of row objects
    Json,
}

/// A fully parameterized request for one of the seven queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRequest {
    LeadingCause { year: i32 },
    OverweightInactivity { year: i32 },
    HeartDiseaseInactivity { year: i32 },
    ChronicDisease(ChronicDiseaseParams),
    NutritionStratified {
        year: i32,
        state: String,
        question_id: String,
    },
    InactivityCauses { year: i32 },
    DrugPoisoning { year: i32, state: String },
}

impl QueryRequest {
    /// Menu number of the query
    #[must_use]
    pub const fn option(&self) -> u8 {
        match self {
            Self::LeadingCause { .. } => 1,
            Self::OverweightInactivity { .. } => 2,
            Self::HeartDiseaseInactivity { .. } => 3,
            Self::ChronicDisease(_) => 4,
            Self::NutritionStratified { .. } => 5,
            Self::InactivityCauses { .. } => 6,
            Self::DrugPoisoning { .. } => 7,
        }
    }
}

impl fmt::Display for QueryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeadingCause { year }
            | Self::OverweightInactivity { year }
            | Self::HeartDiseaseInactivity { year }
            | Self::InactivityCauses { year } => write!(f, "Results for Year: {year}"),
            Self::ChronicDisease(params) => write!(
                f,
                "Results for Years: {}-{}, State: {}, Question: {}",
                params.year_start, params.year_end, params.state, params.question_id
            ),
            Self::NutritionStratified {
                year,
                state,
                question_id,
            } => write!(
                f,
                "Results for Year: {year}, State: {state}, Question: {question_id}"
            ),
            Self::DrugPoisoning { year, state } => {
                write!(f, "Results for Year: {year}, State: {state}")
            }
        }
    }
}

/// Render a result set in the requested format
///
/// An empty set renders as the no-data message in table form and as an
/// empty JSON array in JSON form.
pub fn render<R: ResultRow>(results: &ResultSet<R>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => results.to_json(),
        OutputFormat::Table if results.is_empty() => Ok(EMPTY_RESULT_MESSAGE.to_string()),
        OutputFormat::Table => Ok(results.to_table()),
    }
}

/// Run a request against the engine and render its result
pub fn execute(engine: &QueryEngine, request: &QueryRequest, format: OutputFormat) -> Result<String> {
    match request {
        QueryRequest::LeadingCause { year } => {
            render(&engine.leading_cause_of_death(*year)?, format)
        }
        QueryRequest::OverweightInactivity { year } => {
            render(&engine.overweight_and_inactivity(*year)?, format)
        }
        QueryRequest::HeartDiseaseInactivity { year } => {
            render(&engine.heart_disease_inactivity(*year)?, format)
        }
        QueryRequest::ChronicDisease(params) => {
            render(&engine.chronic_disease_stratified(params)?, format)
        }
        QueryRequest::NutritionStratified {
            year,
            state,
            question_id,
        } => render(&engine.nutrition_stratified(*year, state, question_id)?, format),
        QueryRequest::InactivityCauses { year } => {
            render(&engine.inactivity_and_causes(*year)?, format)
        }
        QueryRequest::DrugPoisoning { year, state } => {
            render(&engine.drug_poisoning(*year, state)?, format)
        }
    }
}
