// Copyright 2025 STARGA Inc.
// Licensed under the Apache License, Version 2.0 (the “License”);
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at:
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an “AS IS” BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Part of the MIND project (Machine Intelligence Native Design).

//! Rule shapes and what a lookup returns.
//!
//! A forward rule receives the call and one tangent per differential slot
//! (slot 0 is the callable itself) and returns the primal together with the
//! output tangent. A reverse rule receives the call and returns the primal
//! together with a [`Pullback`] mapping an output cotangent to one cotangent
//! per slot.

use std::fmt;
use std::sync::Arc;

use crate::callable::Call;
use crate::value::{Differential, Value};

/// Errors raised while applying a rule. Rule errors reach the caller as the
/// rule produced them.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// The rule's primal computation failed.
    #[error("primal evaluation of '{op}' failed: {message}")]
    Primal { op: &'static str, message: String },
    /// The caller supplied the wrong number of tangents.
    #[error("'{op}' expects {expected} tangents (callable + arguments), got {found}")]
    TangentArity {
        op: &'static str,
        expected: usize,
        found: usize,
    },
    /// A reverse rule returned a pullback sized for a different call.
    #[error("'{op}' returned a pullback with {found} slots, expected {expected} (callable + arguments)")]
    PullbackArity {
        op: &'static str,
        expected: usize,
        found: usize,
    },
    /// A pullback produced a cotangent count different from its slot count.
    #[error("pullback produced {found} cotangents for {expected} slots")]
    CotangentArity { expected: usize, found: usize },
    /// No unique most specific rule. A validated rule set never produces this.
    #[error("ambiguous rule resolution for '{op}'")]
    Ambiguous { op: &'static str },
    /// Any other failure raised by a rule.
    #[error(transparent)]
    Custom(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl RuleError {
    /// Convenience constructor for rule authors.
    pub fn primal(op: &'static str, message: impl Into<String>) -> Self {
        RuleError::Primal {
            op,
            message: message.into(),
        }
    }
}

/// Which table a rule lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Forward,
    Reverse,
}

impl Mode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::Forward => "forward",
            Mode::Reverse => "reverse",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a forward rule.
pub type ForwardFn =
    dyn Fn(&Call<'_>, &[Differential]) -> Result<(Value, Differential), RuleError> + Send + Sync;

/// Body of a reverse rule.
pub type ReverseFn = dyn Fn(&Call<'_>) -> Result<(Value, Pullback), RuleError> + Send + Sync;

/// A registered forward rule.
#[derive(Clone)]
pub struct ForwardRule(Arc<ForwardFn>);

impl ForwardRule {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Call<'_>, &[Differential]) -> Result<(Value, Differential), RuleError>
            + Send
            + Sync
            + 'static,
    {
        ForwardRule(Arc::new(f))
    }

    pub fn apply(
        &self,
        call: &Call<'_>,
        tangents: &[Differential],
    ) -> Result<(Value, Differential), RuleError> {
        (self.0)(call, tangents)
    }
}

impl fmt::Debug for ForwardRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ForwardRule(..)")
    }
}

/// A registered reverse rule.
#[derive(Clone)]
pub struct ReverseRule(Arc<ReverseFn>);

impl ReverseRule {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Call<'_>) -> Result<(Value, Pullback), RuleError> + Send + Sync + 'static,
    {
        ReverseRule(Arc::new(f))
    }

    pub fn apply(&self, call: &Call<'_>) -> Result<(Value, Pullback), RuleError> {
        (self.0)(call)
    }
}

impl fmt::Debug for ReverseRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReverseRule(..)")
    }
}

type PullbackFn = dyn Fn(&Differential) -> Result<Vec<Differential>, RuleError> + Send + Sync;

/// Propagator returned by reverse dispatch.
///
/// Maps an output cotangent (a [`Differential::Composite`] for multi-output
/// operations) to `(self, arg1, ..., argN)` cotangents. It owns whatever state
/// the rule captured and outlives the call that produced it.
pub struct Pullback {
    slots: usize,
    f: Box<PullbackFn>,
}

impl Pullback {
    /// `slots` is the number of cotangents `f` returns: arguments + 1.
    pub fn new<F>(slots: usize, f: F) -> Self
    where
        F: Fn(&Differential) -> Result<Vec<Differential>, RuleError> + Send + Sync + 'static,
    {
        Self {
            slots,
            f: Box::new(f),
        }
    }

    /// A pullback returning `Zero` for every slot.
    pub fn zero(slots: usize) -> Self {
        Self::new(slots, move |_| Ok(Differential::zeros(slots)))
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn call(&self, cotangent: &Differential) -> Result<Vec<Differential>, RuleError> {
        let out = (self.f)(cotangent)?;
        if out.len() != self.slots {
            return Err(RuleError::CotangentArity {
                expected: self.slots,
                found: out.len(),
            });
        }
        Ok(out)
    }
}

impl fmt::Debug for Pullback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pullback")
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

/// Which named parameters a rule understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamedParamPolicy {
    /// Positional calls only. A call with named parameters skips the rule.
    #[default]
    Positional,
    /// Calls whose named parameters are all in the list.
    Only(&'static [&'static str]),
    /// Any named parameters.
    Any,
}

impl NamedParamPolicy {
    pub fn accepts<'n>(self, mut names: impl Iterator<Item = &'n str>) -> bool {
        match self {
            NamedParamPolicy::Positional => names.next().is_none(),
            NamedParamPolicy::Only(allowed) => names.all(|n| allowed.contains(&n)),
            NamedParamPolicy::Any => true,
        }
    }

    /// True when `self` accepts every named-parameter set that both `a` and
    /// `b` accept.
    pub fn covers(self, a: NamedParamPolicy, b: NamedParamPolicy) -> bool {
        let shared: Option<Vec<&str>> = match (a, b) {
            (NamedParamPolicy::Positional, _) | (_, NamedParamPolicy::Positional) => return true,
            (NamedParamPolicy::Any, NamedParamPolicy::Any) => None,
            (NamedParamPolicy::Any, NamedParamPolicy::Only(names))
            | (NamedParamPolicy::Only(names), NamedParamPolicy::Any) => Some(names.to_vec()),
            (NamedParamPolicy::Only(left), NamedParamPolicy::Only(right)) => Some(
                left.iter()
                    .copied()
                    .filter(|n| right.contains(n))
                    .collect(),
            ),
        };
        match (self, shared) {
            (NamedParamPolicy::Any, _) => true,
            (_, None) => false,
            (NamedParamPolicy::Positional, Some(names)) => names.is_empty(),
            (NamedParamPolicy::Only(allowed), Some(names)) => {
                names.iter().all(|n| allowed.contains(n))
            }
        }
    }
}

/// Result of a rule lookup: no rule, or a rule's primal and differential.
#[derive(Debug)]
pub enum RuleOutcome<D> {
    /// No rule applies at any tier. The caller differentiates the primal
    /// implementation itself.
    NoRule,
    Applied { primal: Value, differential: D },
}

/// Forward dispatch result: primal and output tangent.
pub type ForwardOutcome = RuleOutcome<Differential>;
/// Reverse dispatch result: primal and pullback.
pub type ReverseOutcome = RuleOutcome<Pullback>;

impl<D> RuleOutcome<D> {
    pub fn is_no_rule(&self) -> bool {
        matches!(self, RuleOutcome::NoRule)
    }

    pub fn primal(&self) -> Option<&Value> {
        match self {
            RuleOutcome::NoRule => None,
            RuleOutcome::Applied { primal, .. } => Some(primal),
        }
    }

    pub fn into_parts(self) -> Option<(Value, D)> {
        match self {
            RuleOutcome::NoRule => None,
            RuleOutcome::Applied {
                primal,
                differential,
            } => Some((primal, differential)),
        }
    }
}

impl<D> From<(Value, D)> for RuleOutcome<D> {
    fn from((primal, differential): (Value, D)) -> Self {
        RuleOutcome::Applied {
            primal,
            differential,
        }
    }
}

impl<D: PartialEq> PartialEq for RuleOutcome<D> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RuleOutcome::NoRule, RuleOutcome::NoRule) => true,
            (
                RuleOutcome::Applied {
                    primal: p1,
                    differential: d1,
                },
                RuleOutcome::Applied {
                    primal: p2,
                    differential: d2,
                },
            ) => p1 == p2 && d1 == d2,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_policy_filters_names() {
        let only = NamedParamPolicy::Only(&["dims", "keepdims"]);
        assert!(only.accepts(["dims"].into_iter()));
        assert!(!only.accepts(["dims", "axis"].into_iter()));
        assert!(NamedParamPolicy::Positional.accepts(std::iter::empty()));
        assert!(!NamedParamPolicy::Positional.accepts(["dims"].into_iter()));
        assert!(NamedParamPolicy::Any.accepts(["anything"].into_iter()));
    }

    #[test]
    fn named_policy_coverage() {
        use NamedParamPolicy::{Any, Only, Positional};

        assert!(Positional.covers(Positional, Any));
        assert!(Positional.covers(Only(&["dims"]), Only(&["axis"])));
        assert!(!Positional.covers(Any, Any));
        assert!(Any.covers(Any, Any));
        assert!(!Only(&["dims"]).covers(Any, Any));
        assert!(Only(&["dims", "axis"]).covers(Any, Only(&["dims"])));
        assert!(!Only(&["axis"]).covers(Only(&["dims", "axis"]), Only(&["dims"])));
    }

    #[test]
    fn miscounted_pullback_is_an_error() {
        let pb = Pullback::new(3, |_| Ok(Differential::zeros(1)));
        let err = pb.call(&Differential::from(1.0)).unwrap_err();
        assert!(matches!(err, RuleError::CotangentArity { expected: 3, found: 1 }));
    }

    #[test]
    fn zero_pullback_fills_every_slot() {
        let pb = Pullback::zero(3);
        let out = pb.call(&Differential::from(1.0)).expect("zero pullback");
        assert_eq!(out, Differential::zeros(3));
        assert_eq!(pb.slots(), 3);
    }

    #[test]
    fn outcome_accessors() {
        let hit: ForwardOutcome = (Value::Real(6.0), Differential::from(2.0)).into();
        assert!(!hit.is_no_rule());
        assert_eq!(hit.primal(), Some(&Value::Real(6.0)));
        let miss = ForwardOutcome::NoRule;
        assert!(miss.is_no_rule());
        assert_eq!(miss.into_parts(), None);
    }

    #[test]
    fn rule_errors_render() {
        let err = RuleError::primal("log", "domain error");
        assert_eq!(err.to_string(), "primal evaluation of 'log' failed: domain error");
    }
}
