//! Expressions producing boolean series.
//!
//! A comparison involving a null is false. Boolean combinators treat null
//! inputs as false.

use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::marker::PhantomData;
use std::sync::Arc;

use colframe_error::Result;

use super::{ExprRef, Expression, Input, eval_pair};
use crate::frame::DataFrame;
use crate::scalar::{DataType, ScalarValue};
use crate::series::Series;
use crate::series::boolean::BooleanSeries;

pub trait ComparisonOperation: Debug + Sync + Send + Copy + 'static {
    const SYMBOL: &'static str;

    fn compare(ord: Ordering) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct EqOperation;

impl ComparisonOperation for EqOperation {
    const SYMBOL: &'static str = "=";

    fn compare(ord: Ordering) -> bool {
        ord.is_eq()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NotEqOperation;

impl ComparisonOperation for NotEqOperation {
    const SYMBOL: &'static str = "!=";

    fn compare(ord: Ordering) -> bool {
        ord.is_ne()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LtOperation;

impl ComparisonOperation for LtOperation {
    const SYMBOL: &'static str = "<";

    fn compare(ord: Ordering) -> bool {
        ord.is_lt()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LtEqOperation;

impl ComparisonOperation for LtEqOperation {
    const SYMBOL: &'static str = "<=";

    fn compare(ord: Ordering) -> bool {
        ord.is_le()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GtOperation;

impl ComparisonOperation for GtOperation {
    const SYMBOL: &'static str = ">";

    fn compare(ord: Ordering) -> bool {
        ord.is_gt()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GtEqOperation;

impl ComparisonOperation for GtEqOperation {
    const SYMBOL: &'static str = ">=";

    fn compare(ord: Ordering) -> bool {
        ord.is_ge()
    }
}

pub struct Comparison<O: ComparisonOperation> {
    left: ExprRef,
    right: ExprRef,
    _op: PhantomData<O>,
}

impl<O: ComparisonOperation> Comparison<O> {
    pub fn new(left: ExprRef, right: ExprRef) -> Self {
        Comparison {
            left,
            right,
            _op: PhantomData,
        }
    }

    fn eval_input(&self, input: Input<'_>) -> Result<Series> {
        let (l, r) = eval_pair(self.left.as_ref(), self.right.as_ref(), input)?;
        Ok(Series::Boolean(compare_series::<O>(&l, &r)))
    }
}

impl<O: ComparisonOperation> Debug for Comparison<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparison")
            .field("op", &O::SYMBOL)
            .field("left", &self.left)
            .field("right", &self.right)
            .finish()
    }
}

impl<O: ComparisonOperation> Expression for Comparison<O> {
    fn name(&self) -> String {
        format!("{} {} {}", self.left.name(), O::SYMBOL, self.right.name())
    }

    fn datatype(&self) -> DataType {
        DataType::Boolean
    }

    fn eval(&self, frame: &DataFrame) -> Result<Series> {
        self.eval_input(Input::Frame(frame))
    }

    fn eval_series(&self, series: &Series) -> Result<Series> {
        self.eval_input(Input::Series(series))
    }
}

fn compare_series<O: ComparisonOperation>(left: &Series, right: &Series) -> BooleanSeries {
    match (left, right) {
        (Series::Int64(l), Series::Int64(r)) => l
            .iter()
            .zip(r.iter())
            .map(|(a, b)| O::compare(a.cmp(&b)))
            .collect(),
        (Series::Float64(l), Series::Float64(r)) => l
            .iter()
            .zip(r.iter())
            .map(|(a, b)| O::compare(a.total_cmp(&b)))
            .collect(),
        _ => left
            .iter()
            .zip(right.iter())
            .map(|(a, b)| !a.is_null() && !b.is_null() && O::compare(a.total_cmp(&b)))
            .collect(),
    }
}

pub fn eq(left: ExprRef, right: ExprRef) -> ExprRef {
    Arc::new(Comparison::<EqOperation>::new(left, right))
}

pub fn ne(left: ExprRef, right: ExprRef) -> ExprRef {
    Arc::new(Comparison::<NotEqOperation>::new(left, right))
}

pub fn lt(left: ExprRef, right: ExprRef) -> ExprRef {
    Arc::new(Comparison::<LtOperation>::new(left, right))
}

pub fn le(left: ExprRef, right: ExprRef) -> ExprRef {
    Arc::new(Comparison::<LtEqOperation>::new(left, right))
}

pub fn gt(left: ExprRef, right: ExprRef) -> ExprRef {
    Arc::new(Comparison::<GtOperation>::new(left, right))
}

pub fn ge(left: ExprRef, right: ExprRef) -> ExprRef {
    Arc::new(Comparison::<GtEqOperation>::new(left, right))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NullCheck {
    IsNull,
    IsNotNull,
}

#[derive(Debug)]
pub struct NullCondition {
    check: NullCheck,
    input: ExprRef,
}

impl NullCondition {
    fn eval_input(&self, input: Input<'_>) -> Result<Series> {
        let series = input.eval(self.input.as_ref())?;
        let want_null = self.check == NullCheck::IsNull;

        let values: BooleanSeries = match &series {
            // Primitive storage can't hold nulls.
            Series::Object(s) => s.iter().map(|v| v.is_null() == want_null).collect(),
            other => vec![!want_null; other.len()].into(),
        };
        Ok(Series::Boolean(values))
    }
}

impl Expression for NullCondition {
    fn name(&self) -> String {
        match self.check {
            NullCheck::IsNull => format!("{} is null", self.input.name()),
            NullCheck::IsNotNull => format!("{} is not null", self.input.name()),
        }
    }

    fn datatype(&self) -> DataType {
        DataType::Boolean
    }

    fn eval(&self, frame: &DataFrame) -> Result<Series> {
        self.eval_input(Input::Frame(frame))
    }

    fn eval_series(&self, series: &Series) -> Result<Series> {
        self.eval_input(Input::Series(series))
    }
}

pub fn is_null(input: ExprRef) -> ExprRef {
    Arc::new(NullCondition {
        check: NullCheck::IsNull,
        input,
    })
}

pub fn is_not_null(input: ExprRef) -> ExprRef {
    Arc::new(NullCondition {
        check: NullCheck::IsNotNull,
        input,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoolOp {
    And,
    Or,
}

#[derive(Debug)]
pub struct BooleanCondition {
    op: BoolOp,
    left: ExprRef,
    right: ExprRef,
}

impl BooleanCondition {
    fn eval_input(&self, input: Input<'_>) -> Result<Series> {
        let (l, r) = eval_pair(self.left.as_ref(), self.right.as_ref(), input)?;
        let (l, r) = (l.try_to_boolean()?, r.try_to_boolean()?);
        let out = match self.op {
            BoolOp::And => l.and(&r)?,
            BoolOp::Or => l.or(&r)?,
        };
        Ok(Series::Boolean(out))
    }
}

impl Expression for BooleanCondition {
    fn name(&self) -> String {
        let op = match self.op {
            BoolOp::And => "and",
            BoolOp::Or => "or",
        };
        format!("{} {op} {}", self.left.name(), self.right.name())
    }

    fn datatype(&self) -> DataType {
        DataType::Boolean
    }

    fn eval(&self, frame: &DataFrame) -> Result<Series> {
        self.eval_input(Input::Frame(frame))
    }

    fn eval_series(&self, series: &Series) -> Result<Series> {
        self.eval_input(Input::Series(series))
    }
}

pub fn and(left: ExprRef, right: ExprRef) -> ExprRef {
    Arc::new(BooleanCondition {
        op: BoolOp::And,
        left,
        right,
    })
}

pub fn or(left: ExprRef, right: ExprRef) -> ExprRef {
    Arc::new(BooleanCondition {
        op: BoolOp::Or,
        left,
        right,
    })
}

#[derive(Debug)]
pub struct Not {
    input: ExprRef,
}

impl Not {
    fn eval_input(&self, input: Input<'_>) -> Result<Series> {
        let series = input.eval(self.input.as_ref())?;
        Ok(Series::Boolean(series.try_to_boolean()?.not()))
    }
}

impl Expression for Not {
    fn name(&self) -> String {
        format!("not {}", self.input.name())
    }

    fn datatype(&self) -> DataType {
        DataType::Boolean
    }

    fn eval(&self, frame: &DataFrame) -> Result<Series> {
        self.eval_input(Input::Frame(frame))
    }

    fn eval_series(&self, series: &Series) -> Result<Series> {
        self.eval_input(Input::Series(series))
    }
}

pub fn not(input: ExprRef) -> ExprRef {
    Arc::new(Not { input })
}

/// Evaluate a condition against a series and return its mask.
pub fn eval_mask(condition: &dyn Expression, series: &Series) -> Result<BooleanSeries> {
    condition.eval_series(series)?.try_to_boolean()
}

/// Whether `value` satisfies `condition` when evaluated as a one-value
/// series.
pub fn test_value(condition: &dyn Expression, value: &ScalarValue) -> Result<bool> {
    let mask = eval_mask(condition, &Series::from_values(vec![value.clone()]))?;
    mask.get_bool(0)
}
