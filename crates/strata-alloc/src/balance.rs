use serde::{Deserialize, Serialize};
use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::{Arm, Subject};

use crate::allocate::AllocationResult;
use crate::config::CovariateSpec;
use crate::encoder::{encode_covariates, EncodedCovariates};

/// Arm counts of one stratum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratumBalance {
    /// Stratum id (processing position).
    pub stratum: usize,
    /// Number of members.
    pub size: usize,
    /// Members in arm 0.
    pub control: usize,
    /// Members in arm 1.
    pub treatment: usize,
}

/// Per-arm summary of one encoded covariate column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovariateBalance {
    /// Column label, e.g. `sex=female`.
    pub column: String,
    /// Mean in arm 0, if the arm is non-empty.
    pub control_mean: Option<f64>,
    /// Mean in arm 1, if the arm is non-empty.
    pub treatment_mean: Option<f64>,
    /// Mean difference over the pooled standard deviation; `0` when both
    /// arms are constant, `None` when either arm is empty.
    pub standardized_difference: Option<f64>,
}

/// Post-allocation balance diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    /// Counts per stratum, in stratum id order.
    pub strata: Vec<StratumBalance>,
    /// Cohort members in arm 0.
    pub control: usize,
    /// Cohort members in arm 1.
    pub treatment: usize,
    /// Signed difference `treatment - control`.
    pub imbalance: i64,
    /// Covariate balance per encoded column.
    pub covariates: Vec<CovariateBalance>,
}

impl BalanceReport {
    /// Builds the report from an already encoded cohort.
    pub fn compute(
        encoded: &EncodedCovariates,
        result: &AllocationResult,
    ) -> Result<Self, StrataError> {
        if encoded.matrix.rows() != result.len() {
            return Err(StrataError::Configuration(
                ErrorInfo::new(
                    "cohort-size-mismatch",
                    "encoded covariates and allocation cover different cohorts",
                )
                .with_context("rows", encoded.matrix.rows().to_string())
                .with_context("allocated", result.len().to_string()),
            ));
        }

        let strata = result
            .strata
            .iter()
            .enumerate()
            .map(|(stratum, members)| {
                let treatment = members
                    .iter()
                    .filter(|member| result.arms[**member] == Arm::Treatment)
                    .count();
                StratumBalance {
                    stratum,
                    size: members.len(),
                    control: members.len() - treatment,
                    treatment,
                }
            })
            .collect();

        let covariates = encoded
            .columns
            .iter()
            .enumerate()
            .map(|(col, descriptor)| {
                let values = encoded.matrix.column(col);
                let (control, treatment): (Vec<_>, Vec<_>) = values
                    .iter()
                    .zip(&result.arms)
                    .partition(|(_, arm)| **arm == Arm::Control);
                let control: Vec<f64> = control.into_iter().map(|(value, _)| *value).collect();
                let treatment: Vec<f64> =
                    treatment.into_iter().map(|(value, _)| *value).collect();
                covariate_balance(descriptor.label(), &control, &treatment)
            })
            .collect();

        let tally = result.tally();
        Ok(Self {
            strata,
            control: tally.control,
            treatment: tally.treatment,
            imbalance: tally.imbalance(),
            covariates,
        })
    }

    /// Encodes `subjects` with `spec` and builds the report for `result`.
    pub fn for_cohort<S: Subject>(
        subjects: &[S],
        spec: &CovariateSpec,
        result: &AllocationResult,
    ) -> Result<Self, StrataError> {
        let encoded = encode_covariates(subjects, spec)?;
        Self::compute(&encoded, result)
    }

    /// Largest arm-count gap found inside any single stratum.
    pub fn max_stratum_gap(&self) -> usize {
        self.strata
            .iter()
            .map(|stratum| stratum.control.abs_diff(stratum.treatment))
            .max()
            .unwrap_or(0)
    }
}

fn covariate_balance(column: String, control: &[f64], treatment: &[f64]) -> CovariateBalance {
    let control_stats = mean_and_variance(control);
    let treatment_stats = mean_and_variance(treatment);
    let standardized_difference = match (control_stats, treatment_stats) {
        (Some((mean_c, var_c)), Some((mean_t, var_t))) => {
            let pooled = ((var_c + var_t) / 2.0).sqrt();
            if pooled > 0.0 {
                Some((mean_t - mean_c) / pooled)
            } else {
                Some(0.0)
            }
        }
        _ => None,
    };
    CovariateBalance {
        column,
        control_mean: control_stats.map(|(mean, _)| mean),
        treatment_mean: treatment_stats.map(|(mean, _)| mean),
        standardized_difference,
    }
}

fn mean_and_variance(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance))
}
