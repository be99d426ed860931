//! Balanced randomization within strata with cross-stratum drift correction.
//!
//! Strata are processed strictly in sequence. Each one sends `n / 2` members
//! to treatment; for odd `n` the leftover is resolved from the [`Tally`] of
//! all previously processed strata, which keeps the whole cohort within one
//! subject of an even split.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::{Arm, RngHandle};
use tracing::debug;

use crate::blocker::Stratum;

/// Resolution rule for the leftover member of an odd-sized stratum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LeftoverPolicy {
    /// Unbiased coin flip (`random`).
    CoinFlip,
    /// Send the leftover to arm 0 (`favor-arm-0`).
    FavorControl,
    /// Send the leftover to arm 1 (`favor-arm-1`).
    FavorTreatment,
}

impl LeftoverPolicy {
    /// Stable token naming the policy.
    pub const fn token(self) -> &'static str {
        match self {
            LeftoverPolicy::CoinFlip => "random",
            LeftoverPolicy::FavorControl => "favor-arm-0",
            LeftoverPolicy::FavorTreatment => "favor-arm-1",
        }
    }
}

impl fmt::Display for LeftoverPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for LeftoverPolicy {
    type Err = StrataError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "random" => Ok(LeftoverPolicy::CoinFlip),
            "favor-arm-0" => Ok(LeftoverPolicy::FavorControl),
            "favor-arm-1" => Ok(LeftoverPolicy::FavorTreatment),
            other => Err(StrataError::InvalidTallyPolicy(
                ErrorInfo::new("unknown-leftover-policy", "unsupported leftover policy token")
                    .with_context("token", other)
                    .with_hint("expected one of: random, favor-arm-0, favor-arm-1"),
            )),
        }
    }
}

impl TryFrom<String> for LeftoverPolicy {
    type Error = StrataError;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        token.parse()
    }
}

impl From<LeftoverPolicy> for String {
    fn from(policy: LeftoverPolicy) -> Self {
        policy.token().to_string()
    }
}

/// Running arm counts over the strata processed so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tally {
    /// Subjects committed to arm 0.
    pub control: usize,
    /// Subjects committed to arm 1.
    pub treatment: usize,
}

impl Tally {
    /// Policy for the next odd stratum: flip a coin when even, otherwise
    /// push the leftover towards the lagging arm.
    pub fn leftover_policy(&self) -> LeftoverPolicy {
        match self.control.cmp(&self.treatment) {
            std::cmp::Ordering::Equal => LeftoverPolicy::CoinFlip,
            std::cmp::Ordering::Greater => LeftoverPolicy::FavorTreatment,
            std::cmp::Ordering::Less => LeftoverPolicy::FavorControl,
        }
    }

    /// Signed difference `treatment - control`.
    pub fn imbalance(&self) -> i64 {
        self.treatment as i64 - self.control as i64
    }

    /// Returns the tally after committing `allocation`.
    pub fn record(self, allocation: &StratumAllocation) -> Self {
        let treatment = allocation.treatment_count();
        Self {
            control: self.control + allocation.arms.len() - treatment,
            treatment: self.treatment + treatment,
        }
    }
}

/// Arms drawn for the members of one stratum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratumAllocation {
    /// Subject indices, parallel to `arms`.
    pub members: Vec<usize>,
    /// Arm of each member.
    pub arms: Vec<Arm>,
    /// Leftover policy in force when the stratum was drawn.
    pub policy: LeftoverPolicy,
}

impl StratumAllocation {
    /// Number of members sent to arm 1.
    pub fn treatment_count(&self) -> usize {
        self.arms.iter().filter(|arm| **arm == Arm::Treatment).count()
    }

    /// Number of members sent to arm 0.
    pub fn control_count(&self) -> usize {
        self.arms.len() - self.treatment_count()
    }
}

/// Randomizes one stratum.
///
/// Draws `n / 2` members uniformly without replacement for arm 1, one index
/// at a time from the still-unassigned positions. When `n` is odd the
/// leftover is settled by `policy`: [`LeftoverPolicy::CoinFlip`] consumes
/// one more draw, and whenever the leftover goes to arm 1 it is picked by a
/// further index draw among the remaining members.
pub fn randomize_stratum(
    members: &[usize],
    policy: LeftoverPolicy,
    rng: &mut RngHandle,
) -> StratumAllocation {
    let size = members.len();
    let mut arms = vec![Arm::Control; size];
    let mut unassigned: Vec<usize> = (0..size).collect();

    for _ in 0..size / 2 {
        draw_treatment(&mut unassigned, &mut arms, rng);
    }

    if size % 2 == 1 {
        let leftover_to_treatment = match policy {
            LeftoverPolicy::CoinFlip => rng.gen_bool(0.5),
            LeftoverPolicy::FavorTreatment => true,
            LeftoverPolicy::FavorControl => false,
        };
        if leftover_to_treatment {
            draw_treatment(&mut unassigned, &mut arms, rng);
        }
    }

    StratumAllocation {
        members: members.to_vec(),
        arms,
        policy,
    }
}

fn draw_treatment(unassigned: &mut Vec<usize>, arms: &mut [Arm], rng: &mut RngHandle) {
    let pick = rng.gen_range(0..unassigned.len());
    let position = unassigned.remove(pick);
    arms[position] = Arm::Treatment;
}

/// Randomizes strata in the given processing order, threading the tally
/// from one stratum to the next.
pub fn randomize_strata(
    strata: &[Stratum],
    rng: &mut RngHandle,
) -> (Vec<StratumAllocation>, Tally) {
    strata.iter().enumerate().fold(
        (Vec::with_capacity(strata.len()), Tally::default()),
        |(mut allocations, tally), (position, stratum)| {
            let allocation = randomize_stratum(&stratum.members, tally.leftover_policy(), rng);
            let tally = tally.record(&allocation);
            debug!(
                stratum = position,
                size = stratum.len(),
                treatment = allocation.treatment_count(),
                policy = %allocation.policy,
                running_imbalance = tally.imbalance(),
                "stratum randomized"
            );
            allocations.push(allocation);
            (allocations, tally)
        },
    )
}
