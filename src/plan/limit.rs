// src/plan/limit.rs

use std::fmt;
use std::num::NonZeroUsize;

use crate::errors::{PlanrunError, Result};

/// Maximum number of leaf tasks allowed in flight at once.
///
/// The default is unbounded. Container nodes never count against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConcurrencyLimit(Option<NonZeroUsize>);

impl ConcurrencyLimit {
    pub fn unbounded() -> Self {
        Self(None)
    }

    /// A limit of `n` concurrent leaves. `0` is rejected.
    pub fn new(n: usize) -> Result<Self> {
        NonZeroUsize::new(n)
            .map(|n| Self(Some(n)))
            .ok_or(PlanrunError::InvalidLimit(n))
    }

    /// `None` when unbounded.
    pub fn get(&self) -> Option<usize> {
        self.0.map(NonZeroUsize::get)
    }

    /// Whether one more leaf may start while `in_flight` are running.
    pub fn has_capacity(&self, in_flight: usize) -> bool {
        match self.0 {
            Some(max) => in_flight < max.get(),
            None => true,
        }
    }
}

impl fmt::Display for ConcurrencyLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(n) => write!(f, "{n}"),
            None => f.write_str("unbounded"),
        }
    }
}
