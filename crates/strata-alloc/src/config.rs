use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::AttributeValue;

use crate::serde::from_yaml_slice;

/// Number of treatment arms supported by the allocator.
pub const ARM_COUNT: usize = 2;

/// YAML-configurable description of the covariates used for stratification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CovariateSpec {
    /// Ordered covariate names; encoded columns follow this order.
    pub var_names: Vec<String>,
    /// Ordinal covariates mapped to their ordered category sequence.
    #[serde(default)]
    pub ordinal: BTreeMap<String, Vec<AttributeValue>>,
    /// Covariates forced to nominal (indicator) encoding.
    #[serde(default)]
    pub cardinal: BTreeSet<String>,
    /// Optional output labels for arm 0 and arm 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_labels: Option<Vec<String>>,
    /// Indicator layout used for nominal covariates.
    #[serde(default)]
    pub nominal_encoding: NominalEncoding,
}

/// Indicator layout for nominal covariates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NominalEncoding {
    /// One indicator column per distinct observed category.
    #[default]
    OneHot,
    /// Only the indicator of the first category in sorted order.
    ///
    /// Discards every other category; kept for reproducing allocations made
    /// by older deployments.
    FirstIndicator,
}

impl CovariateSpec {
    /// Creates a specification over the given covariates with default options.
    pub fn new<I, S>(var_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            var_names: var_names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Declares `name` as ordinal with the given category order.
    pub fn with_ordinal<I, V>(mut self, name: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<AttributeValue>,
    {
        self.ordinal.insert(
            name.into(),
            categories.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Forces `name` to nominal encoding.
    pub fn with_cardinal(mut self, name: impl Into<String>) -> Self {
        self.cardinal.insert(name.into());
        self
    }

    /// Sets the output labels. Exactly two are required; the count is checked
    /// by [`CovariateSpec::validate`].
    pub fn with_treatment_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.treatment_labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Selects the nominal indicator layout.
    pub fn with_nominal_encoding(mut self, encoding: NominalEncoding) -> Self {
        self.nominal_encoding = encoding;
        self
    }

    /// Loads a specification from YAML bytes.
    pub fn from_yaml(data: &[u8]) -> Result<Self, StrataError> {
        from_yaml_slice(data)
    }

    /// Checks the configuration before any subject data is touched.
    pub fn validate(&self) -> Result<(), StrataError> {
        if let Some(labels) = &self.treatment_labels {
            if labels.len() != ARM_COUNT {
                return Err(StrataError::Configuration(
                    ErrorInfo::new(
                        "treatment-label-count",
                        "number of treatment labels must equal the number of arms",
                    )
                    .with_context("expected", ARM_COUNT.to_string())
                    .with_context("actual", labels.len().to_string()),
                ));
            }
        }
        let mut seen = BTreeSet::new();
        for name in &self.var_names {
            if !seen.insert(name.as_str()) {
                return Err(StrataError::Configuration(
                    ErrorInfo::new("duplicate-covariate", "covariate listed more than once")
                        .with_context("covariate", name.clone()),
                ));
            }
        }
        for (name, categories) in &self.ordinal {
            if categories.is_empty() && seen.contains(name.as_str()) {
                return Err(StrataError::Configuration(
                    ErrorInfo::new("empty-ordinal", "ordinal covariate declares no categories")
                        .with_context("covariate", name.clone()),
                ));
            }
        }
        Ok(())
    }

    /// Returns the label pair, if configured.
    pub(crate) fn label_pair(&self) -> Option<(&str, &str)> {
        match self.treatment_labels.as_deref() {
            Some([control, treatment]) => Some((control.as_str(), treatment.as_str())),
            _ => None,
        }
    }
}
