//! The interchangeable reduction strategies.
//!
//! Every strategy computes the same contract over pre-allocated buffers:
//! given read-only `revenue[geos, teams, N, M]` and `cost[geos, teams, N]`
//! and a pre-zeroed mutable `profit[geos, teams, N]`,
//!
//! ```text
//! profit[g, t, n] += sum_m revenue[g, t, n, m]
//! profit[g, t, n] -= cost[g, t, n]
//! ```
//!
//! for every slot in the full domain. The strategies differ only in how they
//! walk that domain and how they accumulate the inner cohort sum; the
//! flat-scalar strategy is the canonical reference the others are validated
//! against.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use num_traits::Zero;

use crate::array::DenseArray;
use crate::simd::{self, MaybeSimdSum};
use crate::threading::{parallel_for_slots, ParallelBackend};
use crate::{ReduceError, Result};

/// Element types the reduction kernels accept.
///
/// Implemented for anything copyable with the arithmetic the contract needs;
/// in practice the benchmark exercises `f32` and `f64`.
pub trait Element:
    Copy
    + Send
    + Sync
    + PartialEq
    + fmt::Debug
    + Zero
    + Add<Output = Self>
    + Sub<Output = Self>
    + AddAssign
    + SubAssign
    + MaybeSimdSum
    + 'static
{
}

impl<T> Element for T where
    T: Copy
        + Send
        + Sync
        + PartialEq
        + fmt::Debug
        + Zero
        + Add<Output = T>
        + Sub<Output = T>
        + AddAssign
        + SubAssign
        + MaybeSimdSum
        + 'static
{
}

/// Problem dimensions shared by every strategy.
///
/// `time_steps` is the per-series length `N`; `cohorts` is the innermost
/// dimension `M` that gets summed away.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProblemDims {
    pub geos: usize,
    pub teams: usize,
    pub time_steps: usize,
    pub cohorts: usize,
}

impl ProblemDims {
    pub fn new(geos: usize, teams: usize, time_steps: usize, cohorts: usize) -> Self {
        Self {
            geos,
            teams,
            time_steps,
            cohorts,
        }
    }

    /// Number of output slots: `geos * teams * time_steps`.
    #[inline]
    pub fn slots(&self) -> usize {
        self.geos * self.teams * self.time_steps
    }

    /// Shape of the revenue array.
    #[inline]
    pub fn revenue_dims(&self) -> [usize; 4] {
        [self.geos, self.teams, self.time_steps, self.cohorts]
    }

    /// Shape of the cost and profit arrays.
    #[inline]
    pub fn slot_dims(&self) -> [usize; 3] {
        [self.geos, self.teams, self.time_steps]
    }
}

/// One interchangeable reduction algorithm.
///
/// Selected once per benchmark session and fixed for all trials.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Four nested loops, every access through a coordinate list. The
    /// easy-to-audit statement of intent, not a performance baseline.
    Coordinate,
    /// Flat loop over collapsed `geo x team x time`, strict left-to-right
    /// inner sum. The canonical reference all others are checked against.
    Flat,
    /// Flat outer loop with a wide-vector (chunk-accumulated) inner sum.
    Vectorized,
    /// Flat body distributed over the fork-join work-stealing backend.
    WorkStealing,
    /// Flat body distributed over the managed thread-team backend.
    ThreadTeam,
}

impl Strategy {
    /// Every strategy, in benchmark order.
    pub const ALL: [Strategy; 5] = [
        Strategy::Coordinate,
        Strategy::Flat,
        Strategy::Vectorized,
        Strategy::WorkStealing,
        Strategy::ThreadTeam,
    ];

    /// The designated ground truth for cross-strategy validation.
    pub const CANONICAL: Strategy = Strategy::Flat;

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Coordinate => "coordinate",
            Strategy::Flat => "flat",
            Strategy::Vectorized => "vectorized",
            Strategy::WorkStealing => "work-stealing",
            Strategy::ThreadTeam => "thread-team",
        }
    }

    /// Whether this strategy's summation tree may differ from the canonical
    /// strict left-to-right order, so equality checks need a floating-point
    /// tolerance.
    pub fn reorders_accumulation(&self) -> bool {
        match self {
            Strategy::Coordinate | Strategy::Flat => false,
            Strategy::Vectorized | Strategy::WorkStealing | Strategy::ThreadTeam => true,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = ReduceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "coordinate" => Ok(Strategy::Coordinate),
            "flat" => Ok(Strategy::Flat),
            "vectorized" => Ok(Strategy::Vectorized),
            "work-stealing" => Ok(Strategy::WorkStealing),
            "thread-team" => Ok(Strategy::ThreadTeam),
            other => Err(ReduceError::UnknownStrategy(other.to_string())),
        }
    }
}

pub(crate) fn ensure_shape(actual: &[usize], expected: &[usize]) -> Result<()> {
    if actual.len() != expected.len() {
        return Err(ReduceError::RankMismatch(actual.len(), expected.len()));
    }
    if actual != expected {
        return Err(ReduceError::ShapeMismatch(
            actual.to_vec(),
            expected.to_vec(),
        ));
    }
    Ok(())
}

/// Run one reduction strategy over the full domain.
///
/// `profit` must be zeroed beforehand; the kernels accumulate into it.
/// Shapes are validated against `dims` up front; inside the kernels all
/// addressing is trusted (debug assertions only).
pub fn reduce_revenue<T: Element>(
    strategy: Strategy,
    revenue: &DenseArray<T>,
    cost: &DenseArray<T>,
    profit: &mut DenseArray<T>,
    dims: &ProblemDims,
) -> Result<()> {
    ensure_shape(revenue.dims(), &dims.revenue_dims())?;
    ensure_shape(cost.dims(), &dims.slot_dims())?;
    ensure_shape(profit.dims(), &dims.slot_dims())?;

    match strategy {
        Strategy::Coordinate => coordinate_kernel(revenue, cost, profit, dims),
        Strategy::Flat => flat_kernel(
            revenue.as_slice(),
            cost.as_slice(),
            profit.as_mut_slice(),
            dims.cohorts,
        ),
        Strategy::Vectorized => vectorized_kernel(
            revenue.as_slice(),
            cost.as_slice(),
            profit.as_mut_slice(),
            dims.cohorts,
        ),
        Strategy::WorkStealing => parallel_kernel(
            ParallelBackend::WorkStealing,
            revenue.as_slice(),
            cost.as_slice(),
            profit.as_mut_slice(),
            dims.cohorts,
        ),
        Strategy::ThreadTeam => parallel_kernel(
            ParallelBackend::ThreadTeam,
            revenue.as_slice(),
            cost.as_slice(),
            profit.as_mut_slice(),
            dims.cohorts,
        ),
    }
    Ok(())
}

/// One slot of the flat contract: left-to-right cohort sum, then the cost
/// subtraction. Shared by the flat and both parallel kernels so they are
/// bit-identical per slot.
#[inline]
fn flat_slot<T: Element>(revenue: &[T], cost: &[T], cohorts: usize, i: usize, slot: &mut T) {
    let row = &revenue[i * cohorts..i * cohorts + cohorts];
    let mut acc = *slot;
    for &v in row {
        acc = acc + v;
    }
    *slot = acc - cost[i];
}

fn coordinate_kernel<T: Element>(
    revenue: &DenseArray<T>,
    cost: &DenseArray<T>,
    profit: &mut DenseArray<T>,
    dims: &ProblemDims,
) {
    for geo in 0..dims.geos {
        for team in 0..dims.teams {
            for time in 0..dims.time_steps {
                for cohort in 0..dims.cohorts {
                    *profit.get_mut(&[geo, team, time]) +=
                        *revenue.get(&[geo, team, time, cohort]);
                }
                *profit.get_mut(&[geo, team, time]) -= *cost.get(&[geo, team, time]);
            }
        }
    }
}

fn flat_kernel<T: Element>(revenue: &[T], cost: &[T], profit: &mut [T], cohorts: usize) {
    for (i, slot) in profit.iter_mut().enumerate() {
        flat_slot(revenue, cost, cohorts, i, slot);
    }
}

fn vectorized_kernel<T: Element>(revenue: &[T], cost: &[T], profit: &mut [T], cohorts: usize) {
    for (i, slot) in profit.iter_mut().enumerate() {
        let row = &revenue[i * cohorts..i * cohorts + cohorts];
        *slot = *slot + simd::row_sum(row) - cost[i];
    }
}

fn parallel_kernel<T: Element>(
    backend: ParallelBackend,
    revenue: &[T],
    cost: &[T],
    profit: &mut [T],
    cohorts: usize,
) {
    parallel_for_slots(backend, profit, |i, slot| {
        flat_slot(revenue, cost, cohorts, i, slot)
    });
}
