use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::matrix::BinaryMatrix;

/// Subjects sharing one binary covariate profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stratum {
    /// Binary profile shared by every member.
    pub profile: Vec<u8>,
    /// Subject indices in ascending order.
    pub members: Vec<usize>,
}

impl Stratum {
    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always `false` for strata produced by [`block`].
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Groups subject indices by identical binary row.
///
/// Strata are enumerated in order of first occurrence; every index lands in
/// exactly one stratum.
pub fn block(binary: &BinaryMatrix) -> Vec<Stratum> {
    let mut groups: IndexMap<&[u8], Vec<usize>> = IndexMap::new();
    for index in 0..binary.rows() {
        groups.entry(binary.row(index)).or_default().push(index);
    }
    groups
        .into_iter()
        .map(|(profile, members)| Stratum {
            profile: profile.to_vec(),
            members,
        })
        .collect()
}
