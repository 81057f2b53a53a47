//! Stratified indicator values, shared by the chronic disease and
//! nutrition breakdown queries

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::Result;
use crate::filter::{Expr, LiteralValue};
use crate::query::aggregate::distinct_by_key;
use crate::query::{ChronicDiseaseParams, ResultRow};
use crate::store::RelationalStore;
use crate::store::rows::{
    ChronicDiseaseRow, DataValueTypeRow, LocationRow, StratificationRow, scan_rows,
};

/// Text the loader writes for a missing chronic disease value
pub const MISSING_TEXT_VALUE: &str = "-1";

/// One stratum of a question's answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StratifiedValue<V> {
    pub stratification_category: String,
    pub stratification: String,
    pub data_value_unit: Option<String>,
    pub data_value_type: String,
    pub data_value: V,
}

impl<V: Serialize + DisplayValue> ResultRow for StratifiedValue<V> {
    const HEADINGS: &'static [&'static str] = &[
        "Stratification Category",
        "Stratification",
        "Data Value Unit",
        "Data Value Type",
        "Data Value",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.stratification_category.clone(),
            self.stratification.clone(),
            self.data_value_unit.clone().unwrap_or_default(),
            self.data_value_type.clone(),
            self.data_value.display_value(),
        ]
    }
}

/// Cell text of a data value
pub trait DisplayValue {
    fn display_value(&self) -> String;
}

impl DisplayValue for String {
    fn display_value(&self) -> String {
        self.clone()
    }
}

impl DisplayValue for f64 {
    fn display_value(&self) -> String {
        crate::query::format_float(*self)
    }
}

/// Dimension lookups for resolving stratified facts
pub(crate) struct StratumLabels {
    stratifications: FxHashMap<String, StratificationRow>,
    value_types: FxHashMap<String, String>,
}

impl StratumLabels {
    pub(crate) fn load(store: &dyn RelationalStore) -> Result<Self> {
        let stratifications: Vec<StratificationRow> = scan_rows(store, None)?;
        let value_types: Vec<DataValueTypeRow> = scan_rows(store, None)?;
        Ok(Self {
            stratifications: stratifications
                .into_iter()
                .map(|s| (s.stratification_id.clone(), s))
                .collect(),
            value_types: value_types
                .into_iter()
                .map(|t| (t.data_value_type_id, t.data_value_type))
                .collect(),
        })
    }

    /// Label a fact; `None` when either dimension row is missing
    pub(crate) fn label<V>(
        &self,
        stratification_id: &str,
        data_value_type_id: &str,
        data_value_unit: Option<String>,
        data_value: V,
    ) -> Option<StratifiedValue<V>> {
        let stratification = self.stratifications.get(stratification_id)?;
        let data_value_type = self.value_types.get(data_value_type_id)?;
        Some(StratifiedValue {
            stratification_category: stratification.stratification_category.clone(),
            stratification: stratification.stratification.clone(),
            data_value_unit,
            data_value_type: data_value_type.clone(),
            data_value,
        })
    }
}

/// Filter on `LocationID` matching every location named exactly `state`,
/// or `None` when no location has that name
pub(crate) fn location_filter(store: &dyn RelationalStore, state: &str) -> Result<Option<Expr>> {
    let locations: Vec<LocationRow> =
        scan_rows(store, Some(&Expr::eq("LocationDesc", state)))?;
    if locations.is_empty() {
        return Ok(None);
    }
    Ok(Some(Expr::In(
        "LocationID".to_string(),
        locations
            .into_iter()
            .map(|l| LiteralValue::from(l.location_id))
            .collect(),
    )))
}

/// Distinct strata of a chronic disease question for an exact
/// start/end year pair and state
///
/// Values equal to the text `-1` are excluded, as are missing values.
/// Rows keep their storage order.
pub fn chronic_disease_stratified(
    store: &dyn RelationalStore,
    params: &ChronicDiseaseParams,
) -> Result<Vec<StratifiedValue<String>>> {
    let Some(location) = location_filter(store, &params.state)? else {
        return Ok(Vec::new());
    };
    let filter = Expr::all(vec![
        Expr::eq("YearStart", params.year_start),
        Expr::eq("YearEnd", params.year_end),
        Expr::eq("QuestionID", params.question_id.as_str()),
        Expr::not_eq("DataValue", MISSING_TEXT_VALUE),
        location,
    ]);
    let facts: Vec<ChronicDiseaseRow> = scan_rows(store, Some(&filter))?;
    let labels = StratumLabels::load(store)?;

    let rows = facts
        .into_iter()
        .filter_map(|fact| {
            let value = fact.data_value?;
            labels.label(
                &fact.stratification_id,
                &fact.data_value_type_id,
                fact.data_value_unit,
                value,
            )
        })
        .collect();

    Ok(distinct_by_key(rows, |row: &StratifiedValue<String>| {
        (
            row.stratification_category.clone(),
            row.stratification.clone(),
            row.data_value_unit.clone(),
            row.data_value_type.clone(),
            row.data_value.clone(),
        )
    }))
}
