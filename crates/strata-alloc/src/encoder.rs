//! Conversion of raw subject attributes into a numeric covariate matrix.
//!
//! Each covariate is classified once per call, in priority order:
//! declared ordinal → rank; declared cardinal or observed text → indicator
//! columns; anything else → cast to `f64`.
//!
//! Ordinal values are looked up by category key first and then by numeric
//! value, so `1.0` matches a declared `1` and vice versa.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::{AttributeValue, Subject};

use crate::config::{CovariateSpec, NominalEncoding};
use crate::matrix::CovariateMatrix;

/// How a covariate was turned into matrix columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CovariateKind {
    /// Zero-based rank within the declared category order.
    Ordinal,
    /// Indicator columns, one per category.
    Nominal,
    /// Direct numeric cast.
    Numeric,
}

/// Describes one encoded column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Source covariate name.
    pub covariate: String,
    /// Encoding applied to the covariate.
    pub kind: CovariateKind,
    /// Category indicated by the column (nominal covariates only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ColumnDescriptor {
    /// Human readable column name, e.g. `sex=female` or `education`.
    pub fn label(&self) -> String {
        match &self.category {
            Some(category) => format!("{}={}", self.covariate, category),
            None => self.covariate.clone(),
        }
    }
}

/// Encoded covariate matrix together with its column layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedCovariates {
    /// Numeric matrix, one row per subject.
    pub matrix: CovariateMatrix,
    /// Descriptor for every matrix column, in column order.
    pub columns: Vec<ColumnDescriptor>,
}

/// Encodes the covariates named in `spec` for every subject.
///
/// Fails before producing any matrix when a subject lacks a covariate, an
/// ordinal value is not among its declared categories, or a numeric
/// covariate holds a value that cannot be read as a finite number.
pub fn encode_covariates<S: Subject>(
    subjects: &[S],
    spec: &CovariateSpec,
) -> Result<EncodedCovariates, StrataError> {
    let mut columns = Vec::new();
    let mut descriptors = Vec::new();

    for name in &spec.var_names {
        let values = read_column(subjects, name)?;
        match classify(name, &values, spec) {
            CovariateKind::Ordinal => {
                let categories = spec.ordinal.get(name).map(Vec::as_slice).unwrap_or(&[]);
                columns.push(encode_ordinal(name, &values, categories)?);
                descriptors.push(ColumnDescriptor {
                    covariate: name.clone(),
                    kind: CovariateKind::Ordinal,
                    category: None,
                });
            }
            CovariateKind::Nominal => {
                for (category, column) in encode_nominal(&values, spec.nominal_encoding) {
                    columns.push(column);
                    descriptors.push(ColumnDescriptor {
                        covariate: name.clone(),
                        kind: CovariateKind::Nominal,
                        category: Some(category),
                    });
                }
            }
            CovariateKind::Numeric => {
                columns.push(encode_numeric(name, &values)?);
                descriptors.push(ColumnDescriptor {
                    covariate: name.clone(),
                    kind: CovariateKind::Numeric,
                    category: None,
                });
            }
        }
    }

    Ok(EncodedCovariates {
        matrix: CovariateMatrix::from_columns(subjects.len(), &columns),
        columns: descriptors,
    })
}

/// Decides how `name` is encoded given the configuration and the observed values.
pub fn classify(name: &str, values: &[AttributeValue], spec: &CovariateSpec) -> CovariateKind {
    if spec.ordinal.contains_key(name) {
        CovariateKind::Ordinal
    } else if spec.cardinal.contains(name) || values.iter().any(AttributeValue::is_text) {
        CovariateKind::Nominal
    } else {
        CovariateKind::Numeric
    }
}

fn read_column<S: Subject>(
    subjects: &[S],
    name: &str,
) -> Result<Vec<AttributeValue>, StrataError> {
    subjects
        .iter()
        .enumerate()
        .map(|(index, subject)| {
            subject.attribute(name).ok_or_else(|| {
                StrataError::Encoding(
                    ErrorInfo::new("missing-attribute", "subject has no value for covariate")
                        .with_context("covariate", name)
                        .with_context("subject", index.to_string()),
                )
            })
        })
        .collect()
}

fn encode_ordinal(
    name: &str,
    values: &[AttributeValue],
    categories: &[AttributeValue],
) -> Result<Vec<f64>, StrataError> {
    let keys: Vec<String> = categories.iter().map(AttributeValue::category_key).collect();
    let numbers: Vec<Option<f64>> = categories.iter().map(AttributeValue::as_number).collect();
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let key = value.category_key();
            keys.iter()
                .position(|candidate| *candidate == key)
                .or_else(|| {
                    let number = value.as_number()?;
                    numbers.iter().position(|candidate| *candidate == Some(number))
                })
                .map(|rank| rank as f64)
                .ok_or_else(|| {
                    StrataError::UnrecognizedCategory(
                        ErrorInfo::new(
                            "ordinal-category",
                            "value is not one of the declared ordinal categories",
                        )
                        .with_context("covariate", name)
                        .with_context("value", key)
                        .with_context("subject", index.to_string())
                        .with_hint(format!("declared categories: {}", keys.join(", "))),
                    )
                })
        })
        .collect()
}

fn encode_nominal(values: &[AttributeValue], layout: NominalEncoding) -> Vec<(String, Vec<f64>)> {
    let mut seen = HashSet::new();
    let mut categories: Vec<&AttributeValue> = values
        .iter()
        .filter(|value| seen.insert(value.category_key()))
        .collect();
    categories.sort_by(|a, b| a.category_cmp(b));
    if layout == NominalEncoding::FirstIndicator {
        categories.truncate(1);
    }

    categories
        .into_iter()
        .map(|category| {
            let key = category.category_key();
            let column = values
                .iter()
                .map(|value| if value.category_key() == key { 1.0 } else { 0.0 })
                .collect();
            (key, column)
        })
        .collect()
}

fn encode_numeric(name: &str, values: &[AttributeValue]) -> Result<Vec<f64>, StrataError> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            value.as_number().ok_or_else(|| {
                StrataError::Encoding(
                    ErrorInfo::new("non-numeric", "covariate value is not a finite number")
                        .with_context("covariate", name)
                        .with_context("value", value.category_key())
                        .with_context("subject", index.to_string()),
                )
            })
        })
        .collect()
}
