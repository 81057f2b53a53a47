//! Parameter validation against the discovered domains
//!
//! Every failure is `ParameterOutOfRange`; the engine only ever sees
//! parameters that passed through here.

use std::collections::BTreeSet;

use crate::app::QueryRequest;
use crate::error::{Error, Result};
use crate::query::{ChronicDiseaseParams, QueryEngine};
use crate::store::lookup::{self, Dataset, YearRange};

/// Parse a year and check it against `range`
pub fn parse_year(input: &str, range: Option<YearRange>) -> Result<i32> {
    let input = input.trim();
    let year = input
        .parse::<i32>()
        .ok()
        .filter(|_| input.chars().all(|c| c.is_ascii_digit()));
    match (year, range) {
        (Some(year), Some(range)) if range.contains(year) => Ok(year),
        _ => Err(Error::out_of_range("year", input).into()),
    }
}

/// Match a state name ignoring case and return its stored spelling
pub fn resolve_state(input: &str, states: &BTreeSet<String>) -> Result<String> {
    let wanted = input.trim().to_lowercase();
    states
        .iter()
        .find(|state| state.to_lowercase() == wanted)
        .cloned()
        .ok_or_else(|| Error::out_of_range("state", input.trim()).into())
}

/// Parse a zero-based index into a list of `len` choices
pub fn parse_index(input: &str, len: usize, parameter: &str) -> Result<usize> {
    let input = input.trim();
    input
        .parse::<usize>()
        .ok()
        .filter(|&index| index < len && input.chars().all(|c| c.is_ascii_digit()))
        .ok_or_else(|| Error::out_of_range(parameter, input).into())
}

/// Parse a menu choice between 1 and 7
pub fn parse_option(input: &str) -> Result<u8> {
    let input = input.trim();
    input
        .parse::<u8>()
        .ok()
        .filter(|option| (1..=7).contains(option))
        .ok_or_else(|| Error::out_of_range("option", input).into())
}

fn check_question(engine: &QueryEngine, question_id: &str, dataset: Dataset) -> Result<()> {
    let ids = lookup::question_ids_for(engine.relational(), dataset)?;
    if ids.contains(question_id) {
        Ok(())
    } else {
        Err(Error::out_of_range("question", question_id).into())
    }
}

/// Validate a request built outside the interactive menu
///
/// Returns the request with its state replaced by the stored spelling.
pub fn validate_request(engine: &QueryEngine, request: &QueryRequest) -> Result<QueryRequest> {
    let validated = match request {
        QueryRequest::LeadingCause { year } => QueryRequest::LeadingCause {
            year: parse_year(&year.to_string(), engine.leading_cause_year_range()?)?,
        },
        QueryRequest::OverweightInactivity { year } => QueryRequest::OverweightInactivity {
            year: parse_year(&year.to_string(), engine.nutrition_year_range()?)?,
        },
        QueryRequest::HeartDiseaseInactivity { year } => QueryRequest::HeartDiseaseInactivity {
            year: parse_year(&year.to_string(), engine.shared_year_range()?)?,
        },
        QueryRequest::InactivityCauses { year } => QueryRequest::InactivityCauses {
            year: parse_year(&year.to_string(), engine.shared_year_range()?)?,
        },
        QueryRequest::ChronicDisease(params) => {
            let ranges = engine.chronic_disease_year_ranges()?;
            let year_start = parse_year(&params.year_start.to_string(), ranges.map(|r| r.0))?;
            let year_end = parse_year(&params.year_end.to_string(), ranges.map(|r| r.1))?;
            let states = engine.states_for(Dataset::ChronicDiseaseIndicator)?;
            let state = resolve_state(&params.state, &states)?;
            check_question(engine, &params.question_id, Dataset::ChronicDiseaseIndicator)?;
            QueryRequest::ChronicDisease(ChronicDiseaseParams {
                year_start,
                year_end,
                state,
                question_id: params.question_id.clone(),
            })
        }
        QueryRequest::NutritionStratified {
            year,
            state,
            question_id,
        } => {
            let year = parse_year(&year.to_string(), engine.nutrition_year_range()?)?;
            let state = resolve_state(state, &engine.states_for(Dataset::Nutrition)?)?;
            check_question(engine, question_id, Dataset::Nutrition)?;
            QueryRequest::NutritionStratified {
                year,
                state,
                question_id: question_id.clone(),
            }
        }
        QueryRequest::DrugPoisoning { year, state } => QueryRequest::DrugPoisoning {
            year: parse_year(&year.to_string(), engine.drug_poisoning_year_range())?,
            state: resolve_state(state, &engine.states_for(Dataset::DrugPoisoning)?)?,
        },
    };
    Ok(validated)
}
