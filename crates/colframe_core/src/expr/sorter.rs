use std::cmp::Ordering;

use colframe_error::{DbError, Result};

use super::ExprRef;
use crate::frame::DataFrame;
use crate::scalar::ScalarValue;
use crate::series::Series;
use crate::series::selection::SelectionVector;

/// Sort key: an expression and a direction. Nulls sort last in both
/// directions.
#[derive(Debug, Clone)]
pub struct Sorter {
    expr: ExprRef,
    ascending: bool,
}

impl Sorter {
    pub fn asc(expr: ExprRef) -> Self {
        Sorter {
            expr,
            ascending: true,
        }
    }

    pub fn desc(expr: ExprRef) -> Self {
        Sorter {
            expr,
            ascending: false,
        }
    }

    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    pub fn compare(&self, a: &ScalarValue, b: &ScalarValue) -> Ordering {
        match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) if self.ascending => a.total_cmp(b),
            (false, false) => b.total_cmp(a),
        }
    }

    /// Evaluate the sort key for every row of `frame`.
    pub fn eval_keys(&self, frame: &DataFrame) -> Result<Vec<ScalarValue>> {
        Ok(self.expr.eval(frame)?.to_values())
    }

    /// Positions of `series` in sorted order. Stable.
    pub fn sort_index(&self, series: &Series) -> Result<SelectionVector> {
        let keys = self.expr.eval_series(series)?;
        if keys.len() != series.len() {
            return Err(DbError::shape_mismatch(format!(
                "Sort key produced {} values for a series of length {}",
                keys.len(),
                series.len()
            )));
        }

        let keys = keys.to_values();
        Ok(SelectionVector::sorted(keys.len(), |a, b| {
            self.compare(&keys[a], &keys[b])
        }))
    }

    pub fn sort_series(&self, series: &Series) -> Result<Series> {
        series.take(&self.sort_index(series)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::arith::mul;
    use crate::expr::{col, col_at, lit};
    use crate::frame::testutil::{frame_of, rows_of};

    #[test]
    fn sort_series_both_directions() {
        let s = Series::from_values(vec![2_i64.into(), ScalarValue::Null, 1_i64.into(), 3_i64.into()]);

        let asc = Sorter::asc(col_at(0)).sort_series(&s).unwrap();
        assert_eq!(
            vec![1_i64.into(), 2_i64.into(), 3_i64.into(), ScalarValue::Null],
            asc.to_values()
        );

        let desc = Sorter::desc(col_at(0)).sort_series(&s).unwrap();
        assert_eq!(
            vec![3_i64.into(), 2_i64.into(), 1_i64.into(), ScalarValue::Null],
            desc.to_values()
        );
    }

    #[test]
    fn sort_by_expression() {
        let s = Series::from(vec![1_i64, 2, 3]);
        let sorted = Sorter::asc(mul(col_at(0), lit(-1_i64))).sort_series(&s).unwrap();
        assert_eq!(&[3, 2, 1], sorted.as_int64().unwrap().values());
    }

    #[test]
    fn sort_frame_is_stable() {
        let df = frame_of(
            &["k", "v"],
            vec![
                vec![2.into(), "a".into()],
                vec![1.into(), "b".into()],
                vec![2.into(), "c".into()],
                vec![1.into(), "d".into()],
            ],
        );

        let sorted = df.sort(&[Sorter::desc(col("k"))]).unwrap();
        assert_eq!(
            vec![
                vec![ScalarValue::Int32(2), "a".into()],
                vec![ScalarValue::Int32(2), "c".into()],
                vec![ScalarValue::Int32(1), "b".into()],
                vec![ScalarValue::Int32(1), "d".into()],
            ],
            rows_of(&sorted)
        );

        let sorted = df
            .sort(&[Sorter::asc(col("k")), Sorter::desc(col("v"))])
            .unwrap();
        assert_eq!(ScalarValue::from("d"), sorted.get("v", 0).unwrap());
        assert_eq!(ScalarValue::from("a"), sorted.get("v", 3).unwrap());
    }
}
