//! Filter clause definitions.

use core::fmt;
use larder_core::{Document, Value};

/// Comparison operator of a filter clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterOp {
    /// `field == operand`
    Eq,
    /// `field < operand`
    Lt,
    /// `field <= operand`
    Le,
    /// `field > operand`
    Gt,
    /// `field >= operand`
    Ge,
}

impl FilterOp {
    /// Returns the operator symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            FilterOp::Eq => "==",
            FilterOp::Lt => "<",
            FilterOp::Le => "<=",
            FilterOp::Gt => ">",
            FilterOp::Ge => ">=",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A filter clause compares one field to a literal operand.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub operand: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, operand: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            operand: operand.into(),
        }
    }

    pub fn eq(field: impl Into<String>, operand: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, operand)
    }

    pub fn lt(field: impl Into<String>, operand: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Lt, operand)
    }

    pub fn le(field: impl Into<String>, operand: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Le, operand)
    }

    pub fn gt(field: impl Into<String>, operand: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Gt, operand)
    }

    pub fn ge(field: impl Into<String>, operand: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Ge, operand)
    }

    /// Evaluates the clause against a document. Missing fields read as null.
    pub fn eval(&self, doc: &Document) -> bool {
        let value = doc.value(&self.field);
        match self.op {
            FilterOp::Eq => value == &self.operand,
            FilterOp::Lt => value < &self.operand,
            FilterOp::Le => value <= &self.operand,
            FilterOp::Gt => value > &self.operand,
            FilterOp::Ge => value >= &self.operand,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.operand)
    }
}
