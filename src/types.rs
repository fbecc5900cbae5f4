use std::fmt;

/// Ordering semantics of one sibling group.
///
/// - `Series`: siblings run strictly in declaration order, each waiting for
///   its predecessor to settle.
/// - `Parallel`: siblings have no mutual ordering and may run concurrently,
///   bounded only by the concurrency limit.
///
/// The top level of a plan is always `Series`; nested lists alternate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Series,
    Parallel,
}

impl Mode {
    /// The mode used for a list nested directly inside a group of this mode.
    pub fn flipped(self) -> Self {
        match self {
            Mode::Series => Mode::Parallel,
            Mode::Parallel => Mode::Series,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Series => f.write_str("series"),
            Mode::Parallel => f.write_str("parallel"),
        }
    }
}
