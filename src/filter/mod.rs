//! Filtering capabilities for table scans
//!
//! An expression-based filtering system that selects rows of Arrow record
//! batches by column values. The relational store evaluates these
//! expressions for every parameterized read.

pub mod core;
pub mod expr;

pub use self::core::{BatchFilter, filter_batches, filter_record_batch};
pub use self::expr::{Expr, ExpressionFilter, LiteralValue, evaluate_expr};
