use std::fmt::{self, Debug};
use std::marker::PhantomData;
use std::sync::Arc;

use colframe_error::Result;

use super::{ExprRef, Expression, Input, eval_pair};
use crate::frame::DataFrame;
use crate::scalar::decimal::Decimal;
use crate::scalar::{DataType, ScalarValue};
use crate::series::Series;

pub trait ArithOperation: Debug + Sync + Send + Copy + 'static {
    const SYMBOL: &'static str;

    /// Integer kernel. `None` on overflow or division by zero, which yields
    /// a null.
    fn int(left: i64, right: i64) -> Option<i64>;

    fn float(left: f64, right: f64) -> f64;

    /// Decimal kernel. `None` when the result doesn't stay a decimal, in
    /// which case the float kernel is used.
    fn decimal(_left: Decimal, _right: Decimal) -> Option<Decimal> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AddOperation;

impl ArithOperation for AddOperation {
    const SYMBOL: &'static str = "+";

    fn int(left: i64, right: i64) -> Option<i64> {
        left.checked_add(right)
    }

    fn float(left: f64, right: f64) -> f64 {
        left + right
    }

    fn decimal(left: Decimal, right: Decimal) -> Option<Decimal> {
        Some(left + right)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SubOperation;

impl ArithOperation for SubOperation {
    const SYMBOL: &'static str = "-";

    fn int(left: i64, right: i64) -> Option<i64> {
        left.checked_sub(right)
    }

    fn float(left: f64, right: f64) -> f64 {
        left - right
    }

    fn decimal(left: Decimal, right: Decimal) -> Option<Decimal> {
        Some(left - right)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MulOperation;

impl ArithOperation for MulOperation {
    const SYMBOL: &'static str = "*";

    fn int(left: i64, right: i64) -> Option<i64> {
        left.checked_mul(right)
    }

    fn float(left: f64, right: f64) -> f64 {
        left * right
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DivOperation;

impl ArithOperation for DivOperation {
    const SYMBOL: &'static str = "/";

    fn int(left: i64, right: i64) -> Option<i64> {
        left.checked_div(right)
    }

    fn float(left: f64, right: f64) -> f64 {
        left / right
    }
}

/// Binary arithmetic over two expressions.
///
/// Integer operands produce `Int64`, any float operand produces `Float64`.
/// Nulls propagate.
pub struct ArithExpr<O: ArithOperation> {
    left: ExprRef,
    right: ExprRef,
    _op: PhantomData<O>,
}

impl<O: ArithOperation> ArithExpr<O> {
    pub fn new(left: ExprRef, right: ExprRef) -> Self {
        ArithExpr {
            left,
            right,
            _op: PhantomData,
        }
    }

    fn eval_input(&self, input: Input<'_>) -> Result<Series> {
        let (l, r) = eval_pair(self.left.as_ref(), self.right.as_ref(), input)?;
        eval_arith::<O>(&l, &r)
    }
}

impl<O: ArithOperation> Debug for ArithExpr<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArithExpr")
            .field("op", &O::SYMBOL)
            .field("left", &self.left)
            .field("right", &self.right)
            .finish()
    }
}

impl<O: ArithOperation> Expression for ArithExpr<O> {
    fn name(&self) -> String {
        format!("{} {} {}", self.left.name(), O::SYMBOL, self.right.name())
    }

    fn datatype(&self) -> DataType {
        result_type::<O>(self.left.datatype(), self.right.datatype())
    }

    fn eval(&self, frame: &DataFrame) -> Result<Series> {
        self.eval_input(Input::Frame(frame))
    }

    fn eval_series(&self, series: &Series) -> Result<Series> {
        self.eval_input(Input::Series(series))
    }
}

pub fn add(left: ExprRef, right: ExprRef) -> ExprRef {
    Arc::new(ArithExpr::<AddOperation>::new(left, right))
}

pub fn sub(left: ExprRef, right: ExprRef) -> ExprRef {
    Arc::new(ArithExpr::<SubOperation>::new(left, right))
}

pub fn mul(left: ExprRef, right: ExprRef) -> ExprRef {
    Arc::new(ArithExpr::<MulOperation>::new(left, right))
}

pub fn div(left: ExprRef, right: ExprRef) -> ExprRef {
    Arc::new(ArithExpr::<DivOperation>::new(left, right))
}

fn result_type<O: ArithOperation>(left: DataType, right: DataType) -> DataType {
    use DataType as D;

    match (left, right) {
        (D::Int32 | D::Int64, D::Int32 | D::Int64) => D::Int64,
        (D::Float64, b) if b.is_numeric() => D::Float64,
        (a, D::Float64) if a.is_numeric() => D::Float64,
        (D::Decimal, b) | (b, D::Decimal) if b.is_numeric() => {
            if O::decimal(Decimal::ZERO, Decimal::ZERO).is_some() {
                D::Decimal
            } else {
                D::Float64
            }
        }
        _ => D::Any,
    }
}

fn ints(series: &Series) -> Option<Vec<i64>> {
    match series {
        Series::Int32(s) => Some(s.iter().map(i64::from).collect()),
        Series::Int64(s) => Some(s.values().to_vec()),
        _ => None,
    }
}

fn floats(series: &Series) -> Option<Vec<f64>> {
    match series {
        Series::Int32(s) => Some(s.iter().map(f64::from).collect()),
        Series::Int64(s) => Some(s.iter().map(|v| v as f64).collect()),
        Series::Float64(s) => Some(s.values().to_vec()),
        _ => None,
    }
}

fn eval_arith<O: ArithOperation>(left: &Series, right: &Series) -> Result<Series> {
    if let (Some(l), Some(r)) = (ints(left), ints(right)) {
        let out: Option<Vec<i64>> = l.iter().zip(&r).map(|(a, b)| O::int(*a, *b)).collect();
        if let Some(values) = out {
            return Ok(Series::from(values));
        }
        // Some rows overflowed, fall through to the boxed path to null them.
    } else if let (Some(l), Some(r)) = (floats(left), floats(right)) {
        let values: Vec<f64> = l.iter().zip(&r).map(|(a, b)| O::float(*a, *b)).collect();
        return Ok(Series::from(values));
    }

    left.iter()
        .zip(right.iter())
        .map(|(a, b)| apply::<O>(&a, &b))
        .collect::<Result<Vec<_>>>()
        .map(Series::from_values)
}

fn apply<O: ArithOperation>(left: &ScalarValue, right: &ScalarValue) -> Result<ScalarValue> {
    use ScalarValue as S;

    Ok(match (left, right) {
        (S::Null, _) | (_, S::Null) => S::Null,
        (S::Int32(_) | S::Int64(_), S::Int32(_) | S::Int64(_)) => {
            O::int(left.try_as_i64()?, right.try_as_i64()?).into()
        }
        (S::Decimal(_), S::Decimal(_) | S::Int32(_) | S::Int64(_))
        | (S::Int32(_) | S::Int64(_), S::Decimal(_)) => {
            match O::decimal(left.try_as_decimal()?, right.try_as_decimal()?) {
                Some(d) => S::Decimal(d),
                None => S::Float64(O::float(left.try_as_f64()?, right.try_as_f64()?)),
            }
        }
        _ => S::Float64(O::float(left.try_as_f64()?, right.try_as_f64()?)),
    })
}
