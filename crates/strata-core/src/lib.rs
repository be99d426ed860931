#![deny(missing_docs)]
#![doc = "Core traits and data types shared by the stratified allocation crates."]

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod provenance;
pub mod rng;
mod types;

pub use errors::{ErrorInfo, StrataError};
pub use provenance::{AllocationProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
pub use types::{Arm, ArmLabel, AttributeValue};

/// Read access to the named covariates of an experiment subject.
///
/// Records are owned by the caller; the allocation engine only reads them
/// through this capability.
pub trait Subject {
    /// Returns the value recorded under `name`, or `None` if it was never captured.
    fn attribute(&self, name: &str) -> Option<AttributeValue>;
}

/// Writable stratum annotation on a caller-owned subject record.
pub trait StratumSlot {
    /// Stores the stratum identifier computed by an allocation.
    fn set_stratum(&mut self, stratum: usize);
}

impl<T: Subject + ?Sized> Subject for &T {
    fn attribute(&self, name: &str) -> Option<AttributeValue> {
        (**self).attribute(name)
    }
}

impl Subject for BTreeMap<String, AttributeValue> {
    fn attribute(&self, name: &str) -> Option<AttributeValue> {
        self.get(name).cloned()
    }
}

impl Subject for HashMap<String, AttributeValue> {
    fn attribute(&self, name: &str) -> Option<AttributeValue> {
        self.get(name).cloned()
    }
}

/// Identifier for a subject within a cohort.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubjectId(String);

impl SubjectId {
    /// Creates a new identifier from its textual representation.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the textual representation of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plain in-memory subject: an identifier, its attributes and a stratum slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRecord {
    /// Identifier of the subject within its cohort.
    pub id: SubjectId,
    /// Captured covariate values keyed by name.
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Stratum assigned by the most recent allocation, if any.
    #[serde(default)]
    pub stratum: Option<usize>,
}

impl SubjectRecord {
    /// Creates a record with no attributes and an empty stratum slot.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: SubjectId::new(id),
            attributes: BTreeMap::new(),
            stratum: None,
        }
    }

    /// Adds an attribute to the record.
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

impl Subject for SubjectRecord {
    fn attribute(&self, name: &str) -> Option<AttributeValue> {
        self.attributes.get(name).cloned()
    }
}

impl StratumSlot for SubjectRecord {
    fn set_stratum(&mut self, stratum: usize) {
        self.stratum = Some(stratum);
    }
}
