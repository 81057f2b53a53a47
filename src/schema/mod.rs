//! Table definitions and schema compatibility for the relational store.
//!
//! Table and column names are the loader's contract and must match
//! field-for-field. Each table only declares the columns the query layer
//! reads; any other column in a file is projected away on load.

use std::fmt;
use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use itertools::Itertools;

use crate::error::{Error, Result};

/// The relational tables produced by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    LeadingCauseOfDeath,
    Cause,
    Location,
    TopicInformation,
    QuestionInformation,
    DataValueTypeInformation,
    StratificationInformation,
    Nutrition,
    ChronicDiseaseIndicator,
}

impl Table {
    /// Every table, in load order
    pub const ALL: [Table; 9] = [
        Table::LeadingCauseOfDeath,
        Table::Cause,
        Table::Location,
        Table::TopicInformation,
        Table::QuestionInformation,
        Table::DataValueTypeInformation,
        Table::StratificationInformation,
        Table::Nutrition,
        Table::ChronicDiseaseIndicator,
    ];

    /// Table name as written by the loader
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LeadingCauseOfDeath => "LeadingCauseOfDeath",
            Self::Cause => "Cause",
            Self::Location => "Location",
            Self::TopicInformation => "TopicInformation",
            Self::QuestionInformation => "QuestionInformation",
            Self::DataValueTypeInformation => "DataValueTypeInformation",
            Self::StratificationInformation => "StratificationInformation",
            Self::Nutrition => "Nutrition",
            Self::ChronicDiseaseIndicator => "ChronicDiseaseIndicator",
        }
    }

    /// Columns the query layer reads from this table
    #[must_use]
    pub fn schema(self) -> SchemaRef {
        let fields = match self {
            Self::LeadingCauseOfDeath => vec![
                Field::new("Year", DataType::Int32, false),
                Field::new("CauseName", DataType::Utf8, false),
                Field::new("State", DataType::Utf8, false),
                Field::new("Deaths", DataType::Int64, false),
                Field::new("AgeAdjustedDeathRate", DataType::Float64, false),
            ],
            Self::Cause => vec![
                Field::new("CauseName", DataType::Utf8, false),
                Field::new("CauseNameExpanded", DataType::Utf8, false),
            ],
            Self::Location => vec![
                Field::new("LocationID", DataType::Int32, false),
                Field::new("LocationAbbr", DataType::Utf8, true),
                Field::new("LocationDesc", DataType::Utf8, false),
            ],
            Self::TopicInformation => vec![
                Field::new("TopicID", DataType::Utf8, false),
                Field::new("Topic", DataType::Utf8, false),
            ],
            Self::QuestionInformation => vec![
                Field::new("QuestionID", DataType::Utf8, false),
                Field::new("Question", DataType::Utf8, false),
            ],
            Self::DataValueTypeInformation => vec![
                Field::new("DataValueTypeID", DataType::Utf8, false),
                Field::new("DataValueType", DataType::Utf8, false),
            ],
            Self::StratificationInformation => vec![
                Field::new("StratificationID1", DataType::Utf8, false),
                Field::new("StratificationCategoryID1", DataType::Utf8, true),
                Field::new("Stratification1", DataType::Utf8, false),
                Field::new("StratificationCategory1", DataType::Utf8, false),
            ],
            Self::Nutrition => vec![
                Field::new("YearStart", DataType::Int32, false),
                Field::new("YearEnd", DataType::Int32, false),
                Field::new("DataValueUnit", DataType::Utf8, true),
                Field::new("DataValue", DataType::Float64, true),
                Field::new("SampleSize", DataType::Int64, true),
                Field::new("TopicID", DataType::Utf8, false),
                Field::new("DataValueTypeID", DataType::Utf8, false),
                Field::new("StratificationID1", DataType::Utf8, false),
                Field::new("QuestionID", DataType::Utf8, false),
                Field::new("LocationID", DataType::Int32, false),
            ],
            // DataValue stays text: the loader writes it unconverted
            Self::ChronicDiseaseIndicator => vec![
                Field::new("YearStart", DataType::Int32, false),
                Field::new("YearEnd", DataType::Int32, false),
                Field::new("DataValueUnit", DataType::Utf8, true),
                Field::new("DataValue", DataType::Utf8, true),
                Field::new("TopicID", DataType::Utf8, false),
                Field::new("StratificationID1", DataType::Utf8, false),
                Field::new("DataValueTypeID", DataType::Utf8, false),
                Field::new("QuestionID", DataType::Utf8, false),
                Field::new("LocationID", DataType::Int32, false),
            ],
        };
        Arc::new(Schema::new(fields))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A struct that represents the compatibility of a loaded table with
/// the columns the query layer expects
#[derive(Debug)]
pub struct SchemaCompatibilityReport {
    /// Whether the table can be used as is (after casting)
    pub compatible: bool,
    /// List of incompatibility issues, if any
    pub issues: Vec<SchemaIssue>,
}

/// A schema compatibility issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// The table with the issue
    pub table: String,
    /// Column concerned
    pub column: String,
    /// Description of the incompatibility
    pub description: String,
}

/// Whether a value of `actual` can be cast into `expected` without
/// losing the meaning of the column
#[must_use]
pub fn types_compatible(actual: &DataType, expected: &DataType) -> bool {
    use DataType::{
        Float32, Float64, Int8, Int16, Int32, Int64, LargeUtf8, UInt8, UInt16, UInt32, Utf8,
        Utf8View,
    };

    if actual == expected {
        return true;
    }
    match expected {
        Int32 | Int64 => matches!(actual, Int8 | Int16 | Int32 | Int64 | UInt8 | UInt16 | UInt32),
        Float64 => matches!(
            actual,
            Float32 | Float64 | Int8 | Int16 | Int32 | Int64 | UInt8 | UInt16 | UInt32
        ),
        Utf8 => matches!(actual, Utf8 | LargeUtf8 | Utf8View),
        _ => false,
    }
}

/// Compare a file schema against the expected table schema
#[must_use]
pub fn check_table_schema(table: Table, file_schema: &Schema) -> SchemaCompatibilityReport {
    let expected = table.schema();
    let mut issues = Vec::new();

    for field in expected.fields() {
        match file_schema.field_with_name(field.name()) {
            Ok(actual) => {
                if !types_compatible(actual.data_type(), field.data_type()) {
                    issues.push(SchemaIssue {
                        table: table.name().to_string(),
                        column: field.name().clone(),
                        description: format!(
                            "Field type mismatch for '{}': {} vs {}",
                            field.name(),
                            actual.data_type(),
                            field.data_type()
                        ),
                    });
                }
            }
            Err(_) => issues.push(SchemaIssue {
                table: table.name().to_string(),
                column: field.name().clone(),
                description: format!("Missing column '{}'", field.name()),
            }),
        }
    }

    SchemaCompatibilityReport {
        compatible: issues.is_empty(),
        issues,
    }
}

/// Project a batch onto the table's declared columns, casting each
/// column to its declared type
pub fn adapt_record_batch(table: Table, batch: &RecordBatch) -> Result<RecordBatch> {
    let expected = table.schema();
    let report = check_table_schema(table, batch.schema().as_ref());
    if !report.compatible {
        return Err(Error::InvalidDataType {
            column: report
                .issues
                .iter()
                .map(|issue| format!("{}.{}", issue.table, issue.column))
                .join(", "),
            expected: report.issues.iter().map(|issue| &issue.description).join("; "),
        }
        .into());
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(expected.fields().len());
    for field in expected.fields() {
        let column = batch
            .column_by_name(field.name())
            .ok_or_else(|| Error::ColumnNotFound {
                column: field.name().clone(),
            })?;
        let column = if column.data_type() == field.data_type() {
            column.clone()
        } else {
            log::debug!(
                "Casting {}.{} from {} to {}",
                table,
                field.name(),
                column.data_type(),
                field.data_type()
            );
            cast(column, field.data_type())?
        };
        columns.push(column);
    }

    // Nullability comes from the file, not the declaration
    let fields: Vec<Field> = expected
        .fields()
        .iter()
        .map(|f| f.as_ref().clone().with_nullable(true))
        .collect();
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
