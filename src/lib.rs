//! Benchmarked profit reduction over dense revenue/cost arrays.
//!
//! The crate computes one numeric reduction under five interchangeable
//! execution strategies and validates them against each other: given a
//! 4-dimensional `revenue` array and a 3-dimensional `cost` array, each
//! `profit` cell sums a contiguous run of revenue values and subtracts the
//! matching cost,
//!
//! ```text
//! profit[g, t, n] = sum_m revenue[g, t, n, m] - cost[g, t, n]
//! ```
//!
//! # Core Types
//!
//! - [`DenseArray`]: owning, contiguous, row-major n-dimensional buffer with
//!   coordinate and flat addressing
//! - [`Strategy`]: one of five algorithm variants (coordinate scalar, flat
//!   scalar, vectorized, and two parallel backends) sharing a single
//!   reduction contract
//! - [`ProblemDims`]: the `geos x teams x N x M` problem description
//!
//! # Primary API
//!
//! - [`reduce_revenue`]: run one strategy over pre-allocated buffers
//! - [`run_benchmark`]: timed trials plus validation against the canonical
//!   flat-scalar reference
//! - [`validate_against_canonical`]: the cross-strategy correctness oracle
//!
//! # Example
//!
//! ```rust
//! use cohort_reduce::{reduce_revenue, DenseArray, ProblemDims, Strategy};
//!
//! let dims = ProblemDims::new(1, 1, 2, 3);
//! let mut revenue = DenseArray::<f32>::uninit(&dims.revenue_dims());
//! revenue.fill(|i| i as f32);
//! let cost = DenseArray::<f32>::zeroed(&dims.slot_dims());
//! let mut profit = DenseArray::<f32>::zeroed(&dims.slot_dims());
//!
//! reduce_revenue(Strategy::Flat, &revenue, &cost, &mut profit, &dims).unwrap();
//! assert_eq!(profit[0], 0.0 + 1.0 + 2.0);
//! assert_eq!(profit[1], 3.0 + 4.0 + 5.0);
//! ```
//!
//! # Accumulation order
//!
//! The flat-scalar strategy is canonical: its strict left-to-right cohort
//! sum is the oracle every other strategy is checked against. The
//! vectorized strategy accumulates fixed-width chunks instead, which is an
//! accepted rounding trade-off; validation compares it within
//! [`VALIDATION_MAX_RELATIVE`] rather than bit-exactly.

mod array;
mod harness;
mod reduce;
mod simd;
mod threading;

// ============================================================================
// Dense storage
// ============================================================================
pub use array::DenseArray;

// ============================================================================
// Reduction strategies
// ============================================================================
pub use reduce::{reduce_revenue, Element, ProblemDims, Strategy};

// ============================================================================
// SIMD kernels
// ============================================================================
pub use simd::{chunked_sum, row_sum, MaybeSimdSum, CHUNK_WIDTH};

// ============================================================================
// Parallel backends
// ============================================================================
pub use threading::{parallel_for_slots, ParallelBackend};

// ============================================================================
// Benchmark harness
// ============================================================================
pub use harness::{
    run_benchmark, summarize, validate_against_canonical, BenchReport, SummaryStats, ToleranceEq,
};

// ============================================================================
// Constants
// ============================================================================

/// Minimum slot count a fork-join subrange must exceed to keep splitting.
///
/// Below this, the per-task overhead outweighs the parallelism; the range
/// runs serially on the current worker.
pub const MIN_PARALLEL_LENGTH: usize = 1 << 12;

/// Relative tolerance for validating strategies whose summation tree
/// differs from the canonical left-to-right order.
pub const VALIDATION_MAX_RELATIVE: f64 = 1e-4;

// ============================================================================
// Error types
// ============================================================================

/// Errors that can occur while setting up or validating a reduction run.
///
/// Shape and rank mismatches are caught at the `reduce_revenue` boundary;
/// inside the kernels, addressing is a trusted precondition guarded only by
/// debug assertions. A validation divergence is always fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum ReduceError {
    /// Array ranks do not match.
    #[error("rank mismatch: {0} vs {1}")]
    RankMismatch(usize, usize),

    /// Array shape does not match the problem dimensions.
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// Strategy selector did not name a known strategy.
    #[error("unknown strategy {0:?} (expected one of: coordinate, flat, vectorized, work-stealing, thread-team)")]
    UnknownStrategy(String),

    /// The harness needs at least one timed trial.
    #[error("trial count must be at least 1")]
    NoTrials,

    /// A strategy's output differs from the canonical flat-scalar result.
    #[error("output diverges from canonical reference at slot {index}: {actual} != {expected}")]
    ValidationDivergence {
        index: usize,
        expected: String,
        actual: String,
    },
}

/// Result type for reduction operations.
pub type Result<T> = std::result::Result<T, ReduceError>;
