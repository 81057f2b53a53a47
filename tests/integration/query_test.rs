use std::collections::BTreeSet;
use std::sync::Arc;

use nchs_explorer::query::aggregate::weighted_percentage;
use nchs_explorer::store::rows::CauseOfDeathRow;
use nchs_explorer::{ChronicDiseaseParams, DrugPoisoningDocument, QueryEngine, Result, TableStore};

use crate::utils::{OHIO, deaths, fixture_engine, fixture_store, survey};

/// The leading cause query returns one row per reporting state
#[test]
fn test_leading_cause_one_row_per_state() -> Result<()> {
    let engine = fixture_engine()?;
    let results = engine.leading_cause_of_death(2015)?;

    let all = deaths();
    let states: BTreeSet<&str> = all
        .iter()
        .filter(|row| row.year == 2015)
        .map(|row| row.state.as_str())
        .collect();
    assert_eq!(results.len(), states.len());
    assert!(results.rows.iter().all(|row| row.cause_name != "All causes"));

    let rows: Vec<(&str, &str, i64)> = results
        .rows
        .iter()
        .map(|r| (r.state.as_str(), r.cause_name.as_str(), r.deaths))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Ohio", "Heart disease", 300),
            ("Texas", "Heart disease", 500),
            // Tie: the alphabetically first cause wins
            ("Utah", "Cancer", 120),
        ]
    );
    Ok(())
}

#[test]
fn test_leading_cause_single_state_scenario() -> Result<()> {
    let row = |cause: &str, deaths: i64| CauseOfDeathRow {
        year: 2015,
        cause_name: cause.to_string(),
        state: "Ohio".to_string(),
        deaths,
        age_adjusted_death_rate: 0.0,
    };
    let store = TableStore::default().with_rows(&[
        row("Heart disease", 100),
        row("All causes", 500),
        row("Cancer", 80),
    ])?;
    let engine = QueryEngine::new(
        Arc::new(store),
        Arc::new(DrugPoisoningDocument::default()),
    );

    let results = engine.leading_cause_of_death(2015)?;
    assert_eq!(results.len(), 1);
    assert_eq!(results.rows[0].year, 2015);
    assert_eq!(results.rows[0].state, "Ohio");
    assert_eq!(results.rows[0].cause_name, "Heart disease");
    assert_eq!(results.rows[0].deaths, 100);
    Ok(())
}

#[test]
fn test_leading_cause_year_without_data_is_empty() -> Result<()> {
    let engine = fixture_engine()?;
    assert!(engine.leading_cause_of_death(1999)?.is_empty());
    Ok(())
}

#[test]
fn test_weighted_percentage_of_two_strata() {
    assert_eq!(weighted_percentage([(100, 20.0), (100, 40.0)]), Some(30.0));
}

/// Overweight must exceed 35; Utah sits exactly on it and Texas has no
/// inactivity figure
#[test]
fn test_overweight_threshold() -> Result<()> {
    let engine = fixture_engine()?;
    let results = engine.overweight_and_inactivity(2015)?;

    assert_eq!(results.len(), 1);
    let ohio = &results.rows[0];
    assert_eq!(ohio.location, "Ohio");
    assert_eq!(ohio.overweight_pct, 40.0);
    assert_eq!(ohio.no_exercise_pct, 30.0);
    Ok(())
}

/// Utah ties heart disease with cancer, and cancer leads
#[test]
fn test_heart_disease_states_with_inactivity() -> Result<()> {
    let engine = fixture_engine()?;
    let results = engine.heart_disease_inactivity(2015)?;

    let rows: Vec<(&str, f64)> = results
        .rows
        .iter()
        .map(|r| (r.state.as_str(), r.no_exercise_pct))
        .collect();
    assert_eq!(rows, vec![("Ohio", 30.0)]);
    assert!(results.rows.iter().all(|r| r.cause_name == "Heart disease"));
    Ok(())
}

#[test]
fn test_heart_disease_states_agree_with_leading_cause() -> Result<()> {
    let engine = fixture_engine()?;
    let heart_led: BTreeSet<String> = engine
        .leading_cause_of_death(2015)?
        .rows
        .into_iter()
        .filter(|r| r.cause_name == "Heart disease")
        .map(|r| r.state)
        .collect();
    let reported: BTreeSet<String> = engine
        .heart_disease_inactivity(2015)?
        .rows
        .into_iter()
        .map(|r| r.state)
        .collect();
    assert!(reported.is_subset(&heart_led));
    assert!(!reported.contains("Utah"));
    Ok(())
}

/// A survey stratum without a value still counts its sample
#[test]
fn test_null_survey_value_is_tolerated() -> Result<()> {
    let mut blank = survey(OHIO, "Q047", "FEMALE", 100, 0.0);
    blank.data_value = None;
    let store = fixture_store()?.with_rows(&[blank])?;
    let engine = QueryEngine::new(
        Arc::new(store),
        Arc::new(DrugPoisoningDocument::default()),
    );

    // Ohio Q047: 100 * (100 * 0.2 + 100 * 0.4) / 300 = 20
    let results = engine.heart_disease_inactivity(2015)?;
    assert_eq!(results.rows[0].no_exercise_pct, 20.0);
    assert!(engine.overweight_and_inactivity(2015)?.rows.iter().all(|r| r.location == "Ohio"));

    let strata = engine.nutrition_stratified(2015, "Ohio", "Q047")?;
    assert_eq!(strata.len(), 3);
    Ok(())
}

/// Inactivity must exceed 30; Ohio sits exactly on it
#[test]
fn test_inactivity_threshold_lists_every_cause() -> Result<()> {
    let engine = fixture_engine()?;
    let results = engine.inactivity_and_causes(2015)?;

    assert!(results.rows.iter().all(|r| r.state == "Utah"));
    let causes: Vec<&str> = results
        .rows
        .iter()
        .map(|r| r.cause_name_expanded.as_str())
        .collect();
    assert_eq!(
        causes,
        vec!["All causes", "Diseases of heart", "Malignant neoplasms"]
    );
    assert!(results.rows.iter().all(|r| r.no_exercise_pct == 31.0));
    assert_eq!(results.rows[1].deaths, 120);
    assert_eq!(results.rows[1].age_adjusted_death_rate, 118.0);
    Ok(())
}

/// Text `-1` is excluded but `-1.0` is a distinct value and stays
#[test]
fn test_chronic_disease_text_sentinel() -> Result<()> {
    let engine = fixture_engine()?;
    let params = ChronicDiseaseParams {
        year_start: 2012,
        year_end: 2014,
        state: "Ohio".to_string(),
        question_id: "CAN4_1".to_string(),
    };
    let results = engine.chronic_disease_stratified(&params)?;

    let rows: Vec<(&str, &str)> = results
        .rows
        .iter()
        .map(|r| (r.stratification.as_str(), r.data_value.as_str()))
        .collect();
    assert_eq!(rows, vec![("Male", "-1.0"), ("Total", "45.2")]);
    assert_eq!(results.rows[0].data_value_type, "Crude Prevalence");
    assert_eq!(results.rows[0].stratification_category, "Sex");
    Ok(())
}

#[test]
fn test_chronic_disease_needs_exact_year_pair() -> Result<()> {
    let engine = fixture_engine()?;
    let params = ChronicDiseaseParams {
        year_start: 2012,
        year_end: 2013,
        state: "Ohio".to_string(),
        question_id: "CAN4_1".to_string(),
    };
    assert!(engine.chronic_disease_stratified(&params)?.is_empty());
    Ok(())
}

/// Numeric `-1` is excluded; the start year alone selects rows
#[test]
fn test_nutrition_numeric_sentinel() -> Result<()> {
    let engine = fixture_engine()?;

    let overweight = engine.nutrition_stratified(2015, "Ohio", "Q037")?;
    let values: Vec<f64> = overweight.rows.iter().map(|r| r.data_value).collect();
    assert_eq!(values, vec![40.0]);

    let inactivity = engine.nutrition_stratified(2015, "Ohio", "Q047")?;
    let values: Vec<f64> = inactivity.rows.iter().map(|r| r.data_value).collect();
    assert_eq!(values, vec![20.0, 40.0, 55.5]);
    Ok(())
}

#[test]
fn test_nutrition_minus_one_float_is_missing() -> Result<()> {
    let store = fixture_store()?.with_rows(&[survey(OHIO, "Q037", "FEMALE", 0, -1.0)])?;
    let engine = QueryEngine::new(
        Arc::new(store),
        Arc::new(DrugPoisoningDocument::default()),
    );
    let results = engine.nutrition_stratified(2015, "Ohio", "Q037")?;
    assert!(results.rows.iter().all(|r| r.data_value > -1.0));
    Ok(())
}

#[test]
fn test_drug_poisoning_share_of_population() -> Result<()> {
    let engine = fixture_engine()?;
    let results = engine.drug_poisoning(2014, "ohio")?;

    let rows: Vec<(&str, Option<f64>)> = results
        .rows
        .iter()
        .map(|r| (r.sex.as_str(), r.death_pct_of_population))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Both Sexes", None),
            ("Female", Some(5.0)),
            ("Male", Some(33.33333333)),
        ]
    );
    assert_eq!(results.rows[1].age_range, "15-24");
    Ok(())
}

/// Repeating a query returns identical results
#[test]
fn test_queries_are_idempotent() -> Result<()> {
    let engine = fixture_engine()?;
    assert_eq!(
        engine.leading_cause_of_death(2015)?,
        engine.leading_cause_of_death(2015)?
    );
    assert_eq!(
        engine.overweight_and_inactivity(2015)?,
        engine.overweight_and_inactivity(2015)?
    );
    assert_eq!(
        engine.heart_disease_inactivity(2015)?,
        engine.heart_disease_inactivity(2015)?
    );
    assert_eq!(
        engine.inactivity_and_causes(2015)?,
        engine.inactivity_and_causes(2015)?
    );
    assert_eq!(
        engine.nutrition_stratified(2015, "Ohio", "Q047")?,
        engine.nutrition_stratified(2015, "Ohio", "Q047")?
    );
    assert_eq!(
        engine.drug_poisoning(2014, "Ohio")?,
        engine.drug_poisoning(2014, "Ohio")?
    );

    let params = ChronicDiseaseParams {
        year_start: 2012,
        year_end: 2014,
        state: "Ohio".to_string(),
        question_id: "CAN4_1".to_string(),
    };
    assert_eq!(
        engine.chronic_disease_stratified(&params)?.to_json()?,
        engine.chronic_disease_stratified(&params)?.to_json()?
    );
    assert_eq!(
        engine.inactivity_and_causes(2015)?.to_table(),
        fixture_engine()?.inactivity_and_causes(2015)?.to_table()
    );
    Ok(())
}

#[test]
fn test_table_rendering() -> Result<()> {
    let engine = fixture_engine()?;
    let table = engine.overweight_and_inactivity(2015)?.to_table();
    let lines: Vec<&str> = table.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Year"));
    assert!(lines[2].contains("Ohio"));
    assert!(lines[2].contains("40.0"));
    assert!(lines[2].ends_with("30.0"));
    Ok(())
}
