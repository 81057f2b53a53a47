//! Typed rows of the relational tables
//!
//! Each struct mirrors one table's declared columns, bound by name with
//! serde so that `serde_arrow` can move rows in and out of record batches.

use arrow_schema::FieldRef;
use arrow::record_batch::RecordBatch;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filter::Expr;
use crate::schema::Table;
use crate::store::RelationalStore;

/// A row type bound to one table
pub trait TableRow: Serialize + DeserializeOwned {
    /// The table this row is read from
    const TABLE: Table;
}

/// `LeadingCauseOfDeath`: one row per (year, state, cause)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CauseOfDeathRow {
    pub year: i32,
    pub cause_name: String,
    pub state: String,
    pub deaths: i64,
    pub age_adjusted_death_rate: f64,
}

/// `Cause`: short cause name to its expanded label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CauseRow {
    pub cause_name: String,
    pub cause_name_expanded: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRow {
    #[serde(rename = "LocationID")]
    pub location_id: i32,
    #[serde(rename = "LocationAbbr")]
    pub location_abbr: Option<String>,
    #[serde(rename = "LocationDesc")]
    pub location_desc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRow {
    #[serde(rename = "TopicID")]
    pub topic_id: String,
    #[serde(rename = "Topic")]
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRow {
    #[serde(rename = "QuestionID")]
    pub question_id: String,
    #[serde(rename = "Question")]
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataValueTypeRow {
    #[serde(rename = "DataValueTypeID")]
    pub data_value_type_id: String,
    #[serde(rename = "DataValueType")]
    pub data_value_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratificationRow {
    #[serde(rename = "StratificationID1")]
    pub stratification_id: String,
    #[serde(rename = "StratificationCategoryID1")]
    pub stratification_category_id: Option<String>,
    #[serde(rename = "Stratification1")]
    pub stratification: String,
    #[serde(rename = "StratificationCategory1")]
    pub stratification_category: String,
}

/// `Nutrition`: one stratified survey observation
///
/// `DataValue` is `-1` and `SampleSize` is `0` where the source had no
/// value; either may also be null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionRow {
    #[serde(rename = "YearStart")]
    pub year_start: i32,
    #[serde(rename = "YearEnd")]
    pub year_end: i32,
    #[serde(rename = "DataValueUnit")]
    pub data_value_unit: Option<String>,
    #[serde(rename = "DataValue")]
    pub data_value: Option<f64>,
    #[serde(rename = "SampleSize")]
    pub sample_size: Option<i64>,
    #[serde(rename = "TopicID")]
    pub topic_id: String,
    #[serde(rename = "DataValueTypeID")]
    pub data_value_type_id: String,
    #[serde(rename = "StratificationID1")]
    pub stratification_id: String,
    #[serde(rename = "QuestionID")]
    pub question_id: String,
    #[serde(rename = "LocationID")]
    pub location_id: i32,
}

/// `ChronicDiseaseIndicator`: one stratified indicator value, kept as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChronicDiseaseRow {
    #[serde(rename = "YearStart")]
    pub year_start: i32,
    #[serde(rename = "YearEnd")]
    pub year_end: i32,
    #[serde(rename = "DataValueUnit")]
    pub data_value_unit: Option<String>,
    #[serde(rename = "DataValue")]
    pub data_value: Option<String>,
    #[serde(rename = "TopicID")]
    pub topic_id: String,
    #[serde(rename = "StratificationID1")]
    pub stratification_id: String,
    #[serde(rename = "DataValueTypeID")]
    pub data_value_type_id: String,
    #[serde(rename = "QuestionID")]
    pub question_id: String,
    #[serde(rename = "LocationID")]
    pub location_id: i32,
}

impl TableRow for CauseOfDeathRow {
    const TABLE: Table = Table::LeadingCauseOfDeath;
}
impl TableRow for CauseRow {
    const TABLE: Table = Table::Cause;
}
impl TableRow for LocationRow {
    const TABLE: Table = Table::Location;
}
impl TableRow for TopicRow {
    const TABLE: Table = Table::TopicInformation;
}
impl TableRow for QuestionRow {
    const TABLE: Table = Table::QuestionInformation;
}
impl TableRow for DataValueTypeRow {
    const TABLE: Table = Table::DataValueTypeInformation;
}
impl TableRow for StratificationRow {
    const TABLE: Table = Table::StratificationInformation;
}
impl TableRow for NutritionRow {
    const TABLE: Table = Table::Nutrition;
}
impl TableRow for ChronicDiseaseRow {
    const TABLE: Table = Table::ChronicDiseaseIndicator;
}

/// Decode record batches into typed rows, preserving row order
pub fn decode_rows<R: TableRow>(batches: &[RecordBatch]) -> Result<Vec<R>> {
    let mut rows = Vec::with_capacity(batches.iter().map(RecordBatch::num_rows).sum());
    for batch in batches {
        let decoded: Vec<R> = serde_arrow::from_record_batch(batch).map_err(|e| {
            anyhow::anyhow!("Failed to deserialize {} rows: {}", R::TABLE, e)
        })?;
        rows.extend(decoded);
    }
    Ok(rows)
}

/// Encode typed rows into a record batch with the table's declared schema
pub fn encode_rows<R: TableRow>(rows: &[R]) -> Result<RecordBatch> {
    let fields: Vec<FieldRef> = R::TABLE.schema().fields().iter().cloned().collect();
    serde_arrow::to_record_batch(&fields, &rows)
        .map_err(|e| anyhow::anyhow!("Failed to serialize {} rows: {}", R::TABLE, e))
}

/// Scan a table and decode the matching rows
pub fn scan_rows<R: TableRow>(
    store: &dyn RelationalStore,
    filter: Option<&Expr>,
) -> Result<Vec<R>> {
    let batches = store.scan(R::TABLE, filter)?;
    decode_rows(&batches)
}
