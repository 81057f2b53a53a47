//! Expression-based filtering for table scans
//!
//! `Expr` is the predicate language of the relational store: comparisons,
//! set membership and null checks over one column, combined with
//! AND/OR/NOT. Evaluation is vectorized with Arrow's comparison kernels.

use std::collections::HashSet;

use arrow::array::{ArrayRef, BooleanArray, Datum, Float64Array, Int64Array, StringArray};
use arrow::compute::kernels::cmp;
use arrow::compute::{and, cast, is_null, not, or};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::error::{Error, Result};
use crate::filter::core::{BatchFilter, filter_record_batch};

/// Represents a filter expression over the columns of a table
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column equals a literal value
    Eq(String, LiteralValue),

    /// Column not equals a literal value
    NotEq(String, LiteralValue),

    /// Column is greater than a literal value
    Gt(String, LiteralValue),

    /// Column is greater than or equal to a literal value
    GtEq(String, LiteralValue),

    /// Column is less than a literal value
    Lt(String, LiteralValue),

    /// Column is less than or equal to a literal value
    LtEq(String, LiteralValue),

    /// Column is in a set of values
    In(String, Vec<LiteralValue>),

    /// Column is not in a set of values
    NotIn(String, Vec<LiteralValue>),

    /// Column is null
    IsNull(String),

    /// Column is not null
    IsNotNull(String),

    /// Logical AND of expressions
    And(Vec<Expr>),

    /// Logical OR of expressions
    Or(Vec<Expr>),

    /// Logical NOT of an expression
    Not(Box<Expr>),
}

/// Represents a literal value that can be used in filter expressions
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Integer value
    Int(i64),

    /// Floating point value
    Float(f64),

    /// String value
    String(String),

    /// Null value
    Null,
}

impl From<i32> for LiteralValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl Expr {
    /// `column = value`
    pub fn eq(column: &str, value: impl Into<LiteralValue>) -> Self {
        Self::Eq(column.to_string(), value.into())
    }

    /// `column != value`
    pub fn not_eq(column: &str, value: impl Into<LiteralValue>) -> Self {
        Self::NotEq(column.to_string(), value.into())
    }

    /// `column > value`
    pub fn gt(column: &str, value: impl Into<LiteralValue>) -> Self {
        Self::Gt(column.to_string(), value.into())
    }

    /// `column < value`
    pub fn lt(column: &str, value: impl Into<LiteralValue>) -> Self {
        Self::Lt(column.to_string(), value.into())
    }

    /// Conjunction of expressions
    #[must_use]
    pub fn all(exprs: Vec<Expr>) -> Self {
        Self::And(exprs)
    }

    /// Returns a set of all column names required by this expression
    #[must_use]
    pub fn required_columns(&self) -> HashSet<String> {
        let mut columns = HashSet::new();
        self.collect_required_columns(&mut columns);
        columns
    }

    fn collect_required_columns(&self, columns: &mut HashSet<String>) {
        match self {
            Self::Eq(col, _)
            | Self::NotEq(col, _)
            | Self::Gt(col, _)
            | Self::GtEq(col, _)
            | Self::Lt(col, _)
            | Self::LtEq(col, _)
            | Self::In(col, _)
            | Self::NotIn(col, _)
            | Self::IsNull(col)
            | Self::IsNotNull(col) => {
                columns.insert(col.clone());
            }
            Self::And(exprs) | Self::Or(exprs) => {
                for expr in exprs {
                    expr.collect_required_columns(columns);
                }
            }
            Self::Not(expr) => expr.collect_required_columns(columns),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum CmpOp {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
}

/// A filter that evaluates an expression against a record batch
#[derive(Debug, Clone)]
pub struct ExpressionFilter {
    expr: Expr,
}

impl ExpressionFilter {
    /// Create a new expression filter
    #[must_use]
    pub fn new(expr: Expr) -> Self {
        Self { expr }
    }
}

impl BatchFilter for ExpressionFilter {
    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let mask = evaluate_expr(batch, &self.expr)?;
        filter_record_batch(batch, &mask)
    }

    fn required_columns(&self) -> HashSet<String> {
        self.expr.required_columns()
    }
}

/// Evaluate an expression against a record batch
///
/// Returns a mask with one entry per row. Comparisons involving nulls
/// yield null, which `filter_record_batch` treats as false.
pub fn evaluate_expr(batch: &RecordBatch, expr: &Expr) -> Result<BooleanArray> {
    match expr {
        Expr::And(exprs) => {
            let mut result = BooleanArray::from(vec![true; batch.num_rows()]);
            for expr in exprs {
                let mask = evaluate_expr(batch, expr)?;
                result = and(&result, &mask).map_err(|e| Error::Filter(e.to_string()))?;
            }
            Ok(result)
        }
        Expr::Or(exprs) => {
            let mut result = BooleanArray::from(vec![false; batch.num_rows()]);
            for expr in exprs {
                let mask = evaluate_expr(batch, expr)?;
                result = or(&result, &mask).map_err(|e| Error::Filter(e.to_string()))?;
            }
            Ok(result)
        }
        Expr::Not(inner) => {
            let mask = evaluate_expr(batch, inner)?;
            Ok(not(&mask).map_err(|e| Error::Filter(e.to_string()))?)
        }
        Expr::Eq(col, value) => compare(batch, col, CmpOp::Eq, value),
        Expr::NotEq(col, value) => compare(batch, col, CmpOp::NotEq, value),
        Expr::Gt(col, value) => compare(batch, col, CmpOp::Gt, value),
        Expr::GtEq(col, value) => compare(batch, col, CmpOp::GtEq, value),
        Expr::Lt(col, value) => compare(batch, col, CmpOp::Lt, value),
        Expr::LtEq(col, value) => compare(batch, col, CmpOp::LtEq, value),
        Expr::In(col, values) => {
            let alternatives = values
                .iter()
                .map(|v| Expr::Eq(col.clone(), v.clone()))
                .collect();
            evaluate_expr(batch, &Expr::Or(alternatives))
        }
        Expr::NotIn(col, values) => {
            let mask = evaluate_expr(batch, &Expr::In(col.clone(), values.clone()))?;
            Ok(not(&mask).map_err(|e| Error::Filter(e.to_string()))?)
        }
        Expr::IsNull(col) => {
            let column = column_by_name(batch, col)?;
            Ok(is_null(column.as_ref()).map_err(|e| Error::Filter(e.to_string()))?)
        }
        Expr::IsNotNull(col) => {
            let mask = evaluate_expr(batch, &Expr::IsNull(col.clone()))?;
            Ok(not(&mask).map_err(|e| Error::Filter(e.to_string()))?)
        }
    }
}

fn column_by_name<'a>(batch: &'a RecordBatch, col_name: &str) -> Result<&'a ArrayRef> {
    batch.column_by_name(col_name).ok_or_else(|| {
        Error::ColumnNotFound {
            column: col_name.to_string(),
        }
        .into()
    })
}

fn is_integer(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
    )
}

fn is_float(data_type: &DataType) -> bool {
    matches!(data_type, DataType::Float32 | DataType::Float64)
}

fn cast_column(column: &ArrayRef, col_name: &str, target: &DataType) -> Result<ArrayRef> {
    if column.data_type() == target {
        return Ok(column.clone());
    }
    cast(column, target).map_err(|e| {
        Error::Filter(format!("Cannot compare column '{col_name}' as {target}: {e}")).into()
    })
}

/// Compare a column against a literal.
///
/// Text literals only compare against text columns, so a text comparison
/// never matches a numeric value by coincidence. Numeric literals widen
/// the column to int64 or float64 first.
fn compare(
    batch: &RecordBatch,
    col_name: &str,
    op: CmpOp,
    literal: &LiteralValue,
) -> Result<BooleanArray> {
    let column = column_by_name(batch, col_name)?;
    let data_type = column.data_type();

    match literal {
        LiteralValue::Null => Ok(BooleanArray::new_null(batch.num_rows())),
        LiteralValue::String(s) => {
            if !matches!(data_type, DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View) {
                return Err(Error::InvalidDataType {
                    column: col_name.to_string(),
                    expected: "string".to_string(),
                }
                .into());
            }
            let lhs = cast_column(column, col_name, &DataType::Utf8)?;
            apply(op, &lhs, &StringArray::new_scalar(s.as_str()))
        }
        LiteralValue::Int(n) if is_integer(data_type) => {
            let lhs = cast_column(column, col_name, &DataType::Int64)?;
            apply(op, &lhs, &Int64Array::new_scalar(*n))
        }
        LiteralValue::Int(n) if is_float(data_type) => {
            let lhs = cast_column(column, col_name, &DataType::Float64)?;
            #[allow(clippy::cast_precision_loss)]
            let value = *n as f64;
            apply(op, &lhs, &Float64Array::new_scalar(value))
        }
        LiteralValue::Float(x) if is_integer(data_type) || is_float(data_type) => {
            let lhs = cast_column(column, col_name, &DataType::Float64)?;
            apply(op, &lhs, &Float64Array::new_scalar(*x))
        }
        LiteralValue::Int(_) | LiteralValue::Float(_) => Err(Error::InvalidDataType {
            column: col_name.to_string(),
            expected: "numeric".to_string(),
        }
        .into()),
    }
}

fn apply(op: CmpOp, lhs: &dyn Datum, rhs: &dyn Datum) -> Result<BooleanArray> {
    let result = match op {
        CmpOp::Eq => cmp::eq(lhs, rhs),
        CmpOp::NotEq => cmp::neq(lhs, rhs),
        CmpOp::Gt => cmp::gt(lhs, rhs),
        CmpOp::GtEq => cmp::gt_eq(lhs, rhs),
        CmpOp::Lt => cmp::lt(lhs, rhs),
        CmpOp::LtEq => cmp::lt_eq(lhs, rhs),
    };
    Ok(result.map_err(|e| Error::Filter(e.to_string()))?)
}
