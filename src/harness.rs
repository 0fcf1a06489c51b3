//! Benchmark trial loop and the cross-strategy correctness oracle.
//!
//! The harness owns no state between invocations: it re-zeroes the profit
//! array before each timed trial, times exactly the strategy invocation,
//! then recomputes the result with the canonical flat strategy and compares
//! element-wise. Divergence is a correctness defect and fails the whole run;
//! there is no partial-success reporting.

use std::time::{Duration, Instant};

use crate::array::DenseArray;
use crate::reduce::{reduce_revenue, Element, ProblemDims, Strategy};
use crate::{ReduceError, Result, VALIDATION_MAX_RELATIVE};

/// Element-wise comparison against the canonical reference.
///
/// Integer-like types compare exactly. Floats compare exactly when
/// `max_relative` is zero, otherwise within a relative epsilon, which is how
/// the harness tolerates the reordered summation trees of the vectorized
/// and parallel strategies.
pub trait ToleranceEq: Copy {
    fn tolerance_eq(self, other: Self, max_relative: f64) -> bool;
}

macro_rules! impl_exact_tolerance {
    ($($t:ty),*) => {
        $(impl ToleranceEq for $t {
            #[inline]
            fn tolerance_eq(self, other: Self, _max_relative: f64) -> bool {
                self == other
            }
        })*
    };
}

impl_exact_tolerance!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_float_tolerance {
    ($($t:ty),*) => {
        $(impl ToleranceEq for $t {
            #[inline]
            fn tolerance_eq(self, other: Self, max_relative: f64) -> bool {
                if self == other {
                    return true;
                }
                let a = self as f64;
                let b = other as f64;
                (a - b).abs() <= max_relative * a.abs().max(b.abs())
            }
        })*
    };
}

impl_float_tolerance!(f32, f64);

/// Summary over the recorded trial durations.
#[derive(Clone, Copy, Debug)]
pub struct SummaryStats {
    pub min: Duration,
    pub mean: Duration,
    pub median: Duration,
}

/// Everything one benchmark session produces.
#[derive(Debug)]
pub struct BenchReport {
    pub strategy: Strategy,
    pub timings: Vec<Duration>,
    pub stats: SummaryStats,
}

/// Minimum, arithmetic mean and median of a non-empty duration sequence.
///
/// For an even count the median averages the two central sorted values.
pub fn summarize(timings: &[Duration]) -> SummaryStats {
    debug_assert!(!timings.is_empty());
    let min = timings.iter().copied().min().unwrap_or_default();
    let mean = timings.iter().sum::<Duration>() / timings.len().max(1) as u32;

    let mut sorted = timings.to_vec();
    sorted.sort();
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2
    } else {
        sorted[mid]
    };

    SummaryStats { min, mean, median }
}

/// Compare a strategy's output against a freshly computed canonical result.
///
/// Strategies that keep the canonical accumulation order must match exactly;
/// the reordering strategies get [`VALIDATION_MAX_RELATIVE`]. Any inequality
/// aborts the run with [`ReduceError::ValidationDivergence`].
pub fn validate_against_canonical<T>(
    strategy: Strategy,
    profit: &DenseArray<T>,
    revenue: &DenseArray<T>,
    cost: &DenseArray<T>,
    dims: &ProblemDims,
) -> Result<()>
where
    T: Element + ToleranceEq,
{
    let mut reference = DenseArray::<T>::zeroed(&dims.slot_dims());
    reduce_revenue(Strategy::CANONICAL, revenue, cost, &mut reference, dims)?;

    let max_relative = if strategy.reorders_accumulation() {
        VALIDATION_MAX_RELATIVE
    } else {
        0.0
    };
    for i in 0..reference.len() {
        let actual = profit[i];
        let expected = reference[i];
        if !actual.tolerance_eq(expected, max_relative) {
            return Err(ReduceError::ValidationDivergence {
                index: i,
                expected: format!("{expected:?}"),
                actual: format!("{actual:?}"),
            });
        }
    }
    Ok(())
}

/// Run `trials` timed invocations of `strategy`, then validate the last
/// run's output against the canonical reference.
///
/// Inputs must already be populated; the harness allocates and re-zeroes
/// the profit array itself. Timing covers only the strategy invocation,
/// never the reset or the validation.
pub fn run_benchmark<T>(
    strategy: Strategy,
    dims: &ProblemDims,
    trials: usize,
    revenue: &DenseArray<T>,
    cost: &DenseArray<T>,
) -> Result<BenchReport>
where
    T: Element + ToleranceEq,
{
    if trials == 0 {
        return Err(ReduceError::NoTrials);
    }

    let mut profit = DenseArray::<T>::zeroed(&dims.slot_dims());
    let mut timings = Vec::with_capacity(trials);
    for _ in 0..trials {
        profit.fill(|_| T::zero());
        let start = Instant::now();
        reduce_revenue(strategy, revenue, cost, &mut profit, dims)?;
        timings.push(start.elapsed());
    }

    validate_against_canonical(strategy, &profit, revenue, cost, dims)?;

    let stats = summarize(&timings);
    Ok(BenchReport {
        strategy,
        timings,
        stats,
    })
}
