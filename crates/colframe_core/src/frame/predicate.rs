use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::scalar::ScalarValue;

type PredicateFn = dyn Fn(&ScalarValue) -> bool + Send + Sync;

/// Test applied to a single value. Cheap to clone and composable.
#[derive(Clone)]
pub struct ValuePredicate {
    func: Arc<PredicateFn>,
}

impl ValuePredicate {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&ScalarValue) -> bool + Send + Sync + 'static,
    {
        ValuePredicate {
            func: Arc::new(func),
        }
    }

    /// Matches values equal to any of `values`. An empty set matches nothing.
    pub fn is_in(values: impl IntoIterator<Item = ScalarValue>) -> Self {
        let mut values: Vec<ScalarValue> = values.into_iter().collect();
        match values.len() {
            0 => Self::new(|_| false),
            1 => {
                let value = values.remove(0);
                Self::new(move |v| *v == value)
            }
            _ => Self::new(move |v| values.contains(v)),
        }
    }

    pub fn test(&self, value: &ScalarValue) -> bool {
        (self.func)(value)
    }

    pub fn and(self, other: ValuePredicate) -> Self {
        Self::new(move |v| self.test(v) && other.test(v))
    }

    pub fn or(self, other: ValuePredicate) -> Self {
        Self::new(move |v| self.test(v) || other.test(v))
    }

    pub fn negate(self) -> Self {
        Self::new(move |v| !self.test(v))
    }
}

impl Debug for ValuePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuePredicate").finish_non_exhaustive()
    }
}
