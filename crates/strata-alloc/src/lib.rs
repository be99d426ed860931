#![deny(missing_docs)]

//! Covariate-stratified balanced randomization.
//!
//! Subjects are encoded into a numeric covariate matrix, each column is
//! binarized, subjects with identical binary profiles form strata, and arms
//! are drawn within strata so that every stratum and the whole cohort stay
//! within one subject of an even split.

/// Orchestration of a full allocation call.
pub mod allocate;
/// Post-allocation balance diagnostics.
pub mod balance;
/// Per-column discretization to `{0, 1}`.
pub mod binarize;
/// Partitioning of subjects into strata.
pub mod blocker;
/// Covariate configuration schema.
pub mod config;
/// Raw attribute to numeric matrix encoding.
pub mod encoder;
/// Stable hashing of serializable payloads.
pub mod hash;
/// Dense matrix containers.
pub mod matrix;
/// Within-stratum randomization and the cross-stratum tally.
pub mod randomizer;
/// Canonical JSON and YAML helpers.
pub mod serde;

pub use crate::allocate::{
    allocate, allocate_and_annotate, allocate_seeded, AllocationRecord, AllocationResult,
};
pub use crate::balance::{BalanceReport, CovariateBalance, StratumBalance};
pub use crate::binarize::binarize;
pub use crate::blocker::{block, Stratum};
pub use crate::config::{CovariateSpec, NominalEncoding, ARM_COUNT};
pub use crate::encoder::{encode_covariates, ColumnDescriptor, CovariateKind, EncodedCovariates};
pub use crate::hash::stable_hash_string;
pub use crate::matrix::{BinaryMatrix, CovariateMatrix, Matrix};
pub use crate::randomizer::{
    randomize_strata, randomize_stratum, LeftoverPolicy, StratumAllocation, Tally,
};
pub use crate::serde::{from_json_slice, from_yaml_slice, to_canonical_json_bytes, to_yaml_string};
