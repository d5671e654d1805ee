//! Multiplicity matching and ranking
//!
//! This module decides whether a supplied (value) multiplicity is acceptable where a
//! declared (target) multiplicity is expected, and ranks matches so overload and
//! override resolution can pick the best candidate:
//! - Covariant matching requires the target to subsume the value, contravariant
//!   matching the reverse
//! - Parameterized operands and missing values are governed by [`MatchPolicies`]
//! - [`MultiplicityMatch`] is totally ordered, lowest ranks best

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::{
    Bounds, MatchOperand, Multiplicity, MultiplicityError, MultiplicityKind, MultiplicityResult,
};

/// How a matcher treats an operand it cannot compare numerically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchPolicy {
    /// Accept unconditionally
    MatchAnything,
    /// Accept only when the match holds for every possible binding
    MatchCautiously,
    /// Fail the match attempt with an error
    Error,
}

/// Policies applied by a [`MultiplicityMatcher`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchPolicies {
    /// Applied when no value multiplicity is supplied
    pub null: MatchPolicy,
    /// Applied when the target is a parameter
    pub target_parameter: MatchPolicy,
    /// Applied when the value is a parameter
    pub value_parameter: MatchPolicy,
}

impl MatchPolicies {
    /// Create a policy set
    pub const fn new(
        null: MatchPolicy,
        target_parameter: MatchPolicy,
        value_parameter: MatchPolicy,
    ) -> Self {
        Self {
            null,
            target_parameter,
            value_parameter,
        }
    }

    /// Accept missing values and parameters unconditionally
    pub const fn lenient() -> Self {
        Self::new(
            MatchPolicy::MatchAnything,
            MatchPolicy::MatchAnything,
            MatchPolicy::MatchAnything,
        )
    }

    /// Reject missing values and parameters with an error
    pub const fn strict() -> Self {
        Self::new(MatchPolicy::Error, MatchPolicy::Error, MatchPolicy::Error)
    }

    /// Set the policy for missing values
    pub fn with_null(mut self, policy: MatchPolicy) -> Self {
        self.null = policy;
        self
    }

    /// Set the policy for parameterized targets
    pub fn with_target_parameter(mut self, policy: MatchPolicy) -> Self {
        self.target_parameter = policy;
        self
    }

    /// Set the policy for parameterized values
    pub fn with_value_parameter(mut self, policy: MatchPolicy) -> Self {
        self.value_parameter = policy;
        self
    }
}

impl Default for MatchPolicies {
    fn default() -> Self {
        Self::new(
            MatchPolicy::Error,
            MatchPolicy::MatchCautiously,
            MatchPolicy::MatchCautiously,
        )
    }
}

/// Check if `value` is acceptable where `target` is expected
///
/// Both concrete: covariant matching requires `target` to subsume `value`,
/// contravariant matching requires `value` to subsume `target`. Missing values and
/// parameters are resolved by the given policies.
pub fn matches(
    target: &Multiplicity,
    value: Option<&Multiplicity>,
    covariant: bool,
    null_policy: MatchPolicy,
    target_parameter_policy: MatchPolicy,
    value_parameter_policy: MatchPolicy,
) -> MultiplicityResult<bool> {
    let Some(value) = value else {
        return match null_policy {
            MatchPolicy::MatchAnything => Ok(true),
            MatchPolicy::MatchCautiously => Ok(false),
            MatchPolicy::Error => Err(MultiplicityError::MissingValue {
                target: target.print(true),
            }),
        };
    };

    let ambiguous = |operand: MatchOperand, parameter: &str| MultiplicityError::AmbiguousMatch {
        operand,
        parameter: parameter.to_string(),
        target: target.print(true),
        value: value.print(true),
    };

    match (target.kind(), value.kind()) {
        (MultiplicityKind::Concrete(target_bounds), MultiplicityKind::Concrete(value_bounds)) => {
            Ok(if covariant {
                target_bounds.subsumes(value_bounds)
            } else {
                value_bounds.subsumes(target_bounds)
            })
        }
        (
            MultiplicityKind::Parameterized { name: target_name },
            MultiplicityKind::Parameterized { name: value_name },
        ) => {
            if target_parameter_policy == MatchPolicy::Error {
                return Err(ambiguous(MatchOperand::Target, target_name.as_str()));
            }
            if value_parameter_policy == MatchPolicy::Error {
                return Err(ambiguous(MatchOperand::Value, value_name.as_str()));
            }
            log::debug!(
                "matching parameter {} against parameter {} as unconstrained",
                value_name,
                target_name
            );
            Ok(true)
        }
        (MultiplicityKind::Parameterized { name }, MultiplicityKind::Concrete(value_bounds)) => {
            match target_parameter_policy {
                MatchPolicy::MatchAnything => Ok(true),
                MatchPolicy::Error => Err(ambiguous(MatchOperand::Target, name.as_str())),
                // The parameter can always be bound to the value itself; in argument
                // position only [*] is safe for every binding.
                MatchPolicy::MatchCautiously => Ok(covariant || value_bounds.is_zero_many()),
            }
        }
        (MultiplicityKind::Concrete(target_bounds), MultiplicityKind::Parameterized { name }) => {
            match value_parameter_policy {
                MatchPolicy::MatchAnything => Ok(true),
                MatchPolicy::Error => Err(ambiguous(MatchOperand::Value, name.as_str())),
                MatchPolicy::MatchCautiously => Ok(covariant && target_bounds.is_zero_many()),
            }
        }
    }
}

/// Tier of a [`MatchRank`], ordered best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    /// Both operands concrete, or a parameterized target binding the value
    Bound,
    /// A parameterized value against a concrete target
    ParameterizedValue,
    /// No value supplied
    MissingValue,
}

/// Ordering key of a [`MultiplicityMatch`]; lower is better
///
/// Within the [`MatchTier::Bound`] tier the key measures how far the value departs
/// from the target: first whether exactly one side has an upper bound, then the
/// distance between lower bounds, then the distance between upper bounds (or the
/// span of the bounded side when the other is unbounded). An exact self-match is
/// all zeros whatever its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchRank {
    pub tier: MatchTier,
    pub upper_constrained: bool,
    pub lower_distance: u32,
    pub upper_distance: u32,
}

impl MatchRank {
    /// The rank of an exact match
    pub const EXACT: MatchRank = MatchRank {
        tier: MatchTier::Bound,
        upper_constrained: false,
        lower_distance: 0,
        upper_distance: 0,
    };

    const fn of_tier(tier: MatchTier) -> Self {
        Self {
            tier,
            ..Self::EXACT
        }
    }

    fn between(target: &Bounds, value: &Bounds) -> Self {
        let (upper_constrained, upper_distance) = match (target.upper(), value.upper()) {
            (None, None) => (false, 0),
            (Some(target_upper), Some(value_upper)) => (false, target_upper.abs_diff(value_upper)),
            (None, Some(value_upper)) => (true, value_upper - value.lower()),
            (Some(target_upper), None) => (true, target_upper - target.lower()),
        };
        Self {
            tier: MatchTier::Bound,
            upper_constrained,
            lower_distance: target.lower().abs_diff(value.lower()),
            upper_distance,
        }
    }

    fn compute(target: &Multiplicity, value: Option<&Multiplicity>) -> Self {
        let Some(value) = value else {
            return Self::of_tier(MatchTier::MissingValue);
        };
        match (target.kind(), value.kind()) {
            (MultiplicityKind::Parameterized { .. }, _) => Self::EXACT,
            (MultiplicityKind::Concrete(_), MultiplicityKind::Parameterized { .. }) => {
                Self::of_tier(MatchTier::ParameterizedValue)
            }
            (MultiplicityKind::Concrete(target), MultiplicityKind::Concrete(value)) => {
                Self::between(target, value)
            }
        }
    }
}

/// A captured match attempt, comparable for ranking
///
/// Creating a match does not decide it; call [`MultiplicityMatch::matches`]. Ordering
/// and equality compare ranks only, so two different matches of equal rank are
/// equal.
#[derive(Debug, Clone)]
pub struct MultiplicityMatch {
    target: Multiplicity,
    value: Option<Multiplicity>,
    covariant: bool,
    policies: MatchPolicies,
    rank: MatchRank,
}

impl MultiplicityMatch {
    /// Capture a match attempt
    pub fn new(
        target: &Multiplicity,
        value: Option<&Multiplicity>,
        covariant: bool,
        null_policy: MatchPolicy,
        target_parameter_policy: MatchPolicy,
        value_parameter_policy: MatchPolicy,
    ) -> Self {
        Self {
            rank: MatchRank::compute(target, value),
            target: target.clone(),
            value: value.cloned(),
            covariant,
            policies: MatchPolicies::new(null_policy, target_parameter_policy, value_parameter_policy),
        }
    }

    /// The declared multiplicity
    pub fn target(&self) -> &Multiplicity {
        &self.target
    }

    /// The supplied multiplicity
    pub fn value(&self) -> Option<&Multiplicity> {
        self.value.as_ref()
    }

    pub fn is_covariant(&self) -> bool {
        self.covariant
    }

    pub fn policies(&self) -> MatchPolicies {
        self.policies
    }

    /// The ordering key
    pub fn rank(&self) -> MatchRank {
        self.rank
    }

    /// Decide the match
    pub fn matches(&self) -> MultiplicityResult<bool> {
        matches(
            &self.target,
            self.value.as_ref(),
            self.covariant,
            self.policies.null,
            self.policies.target_parameter,
            self.policies.value_parameter,
        )
    }
}

impl PartialEq for MultiplicityMatch {
    fn eq(&self, other: &Self) -> bool {
        self.rank == other.rank
    }
}

impl Eq for MultiplicityMatch {}

impl PartialOrd for MultiplicityMatch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MultiplicityMatch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank.cmp(&other.rank)
    }
}

/// Outcome of choosing among candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSelection {
    /// No candidate matches in every position
    NoMatch,
    /// A single best candidate, by index
    Unique(usize),
    /// Several candidates share the best rank, by index in input order
    Ambiguous(Vec<usize>),
}

/// Matcher configured with a set of [`MatchPolicies`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MultiplicityMatcher {
    policies: MatchPolicies,
}

impl MultiplicityMatcher {
    /// Create a matcher with the default policies
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a matcher with the given policies
    pub fn with_policies(policies: MatchPolicies) -> Self {
        Self { policies }
    }

    pub fn policies(&self) -> MatchPolicies {
        self.policies
    }

    /// Check if `value` is acceptable where `target` is expected
    pub fn matches(
        &self,
        target: &Multiplicity,
        value: Option<&Multiplicity>,
        covariant: bool,
    ) -> MultiplicityResult<bool> {
        matches(
            target,
            value,
            covariant,
            self.policies.null,
            self.policies.target_parameter,
            self.policies.value_parameter,
        )
    }

    /// Capture a match attempt under this matcher's policies
    pub fn new_match(
        &self,
        target: &Multiplicity,
        value: Option<&Multiplicity>,
        covariant: bool,
    ) -> MultiplicityMatch {
        MultiplicityMatch::new(
            target,
            value,
            covariant,
            self.policies.null,
            self.policies.target_parameter,
            self.policies.value_parameter,
        )
    }

    /// Match a candidate's declared multiplicities position by position
    ///
    /// Returns `None` when the arities differ.
    pub fn match_all(
        &self,
        targets: &[Multiplicity],
        values: &[Option<Multiplicity>],
        covariant: bool,
    ) -> Option<Vec<MultiplicityMatch>> {
        if targets.len() != values.len() {
            return None;
        }
        Some(
            targets
                .iter()
                .zip(values)
                .map(|(target, value)| self.new_match(target, value.as_ref(), covariant))
                .collect(),
        )
    }

    /// Choose the best candidate
    ///
    /// Each candidate is the list of its per-position matches. Candidates failing
    /// any position are dropped; the rest are compared lexicographically by rank.
    pub fn best_candidate(
        &self,
        candidates: &[Vec<MultiplicityMatch>],
    ) -> MultiplicityResult<CandidateSelection> {
        let mut viable = Vec::new();
        for (index, candidate) in candidates.iter().enumerate() {
            let mut all_match = true;
            for m in candidate {
                if !m.matches()? {
                    all_match = false;
                    break;
                }
            }
            if all_match {
                viable.push((index, candidate));
            }
        }

        viable.sort_by(|(_, a), (_, b)| a.cmp(b));

        let Some((best_index, best)) = viable.first() else {
            return Ok(CandidateSelection::NoMatch);
        };
        let tied: Vec<usize> = viable
            .iter()
            .take_while(|(_, candidate)| candidate == best)
            .map(|(index, _)| *index)
            .collect();

        if tied.len() > 1 {
            Ok(CandidateSelection::Ambiguous(tied))
        } else {
            Ok(CandidateSelection::Unique(*best_index))
        }
    }
}
