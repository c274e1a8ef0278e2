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

//! Forward and reverse rule dispatch.
//!
//! Engines call [`RuleSet::forward_rule`] or [`RuleSet::reverse_rule`] before
//! differentiating through an operation. [`RuleOutcome::NoRule`] means "no
//! analytic shortcut", never an error. Errors raised by a rule are returned
//! as the rule produced them.
//!
//! Calls with named parameters go through [`RuleSet::forward_rule_kw`] and
//! [`RuleSet::reverse_rule_kw`], which attach the parameters to the call and
//! reuse the positional resolution.

use crate::callable::{Call, Callable, NamedParams};
use crate::capability::Capability;
use crate::registry::RuleSet;
use crate::resolve::{resolve, Resolution, Tier};
use crate::rules::{ForwardOutcome, Mode, ReverseOutcome, RuleError, RuleOutcome};
use crate::value::{Differential, Value};

impl RuleSet {
    /// Forward-mode lookup.
    ///
    /// `tangents` holds one entry per differential slot: the callable's own
    /// tangent first, then one per argument.
    pub fn forward_rule(
        &self,
        capability: Option<&Capability>,
        tangents: &[Differential],
        f: &Callable,
        args: &[Value],
    ) -> Result<ForwardOutcome, RuleError> {
        self.forward_call(capability, tangents, &Call::new(f, args))
    }

    /// Reverse-mode lookup. The capability only selects the rule; the
    /// returned pullback does not see it.
    pub fn reverse_rule(
        &self,
        capability: Option<&Capability>,
        f: &Callable,
        args: &[Value],
    ) -> Result<ReverseOutcome, RuleError> {
        self.reverse_call(capability, &Call::new(f, args))
    }

    /// [`RuleSet::forward_rule`] for a call with named parameters. Only rules
    /// whose named-parameter policy accepts every supplied name apply.
    pub fn forward_rule_kw(
        &self,
        named: &NamedParams,
        capability: Option<&Capability>,
        tangents: &[Differential],
        f: &Callable,
        args: &[Value],
    ) -> Result<ForwardOutcome, RuleError> {
        self.forward_call(capability, tangents, &Call::new(f, args).with_named(named))
    }

    /// [`RuleSet::reverse_rule`] for a call with named parameters.
    pub fn reverse_rule_kw(
        &self,
        named: &NamedParams,
        capability: Option<&Capability>,
        f: &Callable,
        args: &[Value],
    ) -> Result<ReverseOutcome, RuleError> {
        self.reverse_call(capability, &Call::new(f, args).with_named(named))
    }

    /// Forward lookup for a prepared call description.
    pub fn forward_call(
        &self,
        capability: Option<&Capability>,
        tangents: &[Differential],
        call: &Call<'_>,
    ) -> Result<ForwardOutcome, RuleError> {
        let resolution = resolve(&self.forward, capability, call)?;
        self.trace(Mode::Forward, capability, call, &resolution);
        let Resolution::Rule { rule, .. } = resolution else {
            return Ok(RuleOutcome::NoRule);
        };
        if self.config.validate_tangent_arity && tangents.len() != call.arity() + 1 {
            return Err(RuleError::TangentArity {
                op: call.id().name(),
                expected: call.arity() + 1,
                found: tangents.len(),
            });
        }
        rule.apply(call, tangents).map(RuleOutcome::from)
    }

    /// Reverse lookup for a prepared call description.
    pub fn reverse_call(
        &self,
        capability: Option<&Capability>,
        call: &Call<'_>,
    ) -> Result<ReverseOutcome, RuleError> {
        let resolution = resolve(&self.reverse, capability, call)?;
        self.trace(Mode::Reverse, capability, call, &resolution);
        let Resolution::Rule { rule, .. } = resolution else {
            return Ok(RuleOutcome::NoRule);
        };
        let (primal, pullback) = rule.apply(call)?;
        if self.config.validate_tangent_arity && pullback.slots() != call.arity() + 1 {
            return Err(RuleError::PullbackArity {
                op: call.id().name(),
                expected: call.arity() + 1,
                found: pullback.slots(),
            });
        }
        Ok(RuleOutcome::from((primal, pullback)))
    }

    fn trace<R>(
        &self,
        mode: Mode,
        capability: Option<&Capability>,
        call: &Call<'_>,
        resolution: &Resolution<'_, R>,
    ) {
        if !self.config.trace_resolution {
            return;
        }
        let requested = capability.map_or("none", Capability::name);
        let (outcome, tier) = match resolution {
            Resolution::Rule { tier, .. } => ("rule", Some(*tier)),
            Resolution::OptedOut { tier } => ("opted_out", Some(*tier)),
            Resolution::NoRule => ("no_rule", None),
        };
        let tier = match tier {
            Some(Tier::Capability(name)) => name,
            Some(Tier::Free) => "free",
            None => "default",
        };
        tracing::trace!(
            mode = mode.as_str(),
            op = call.id().name(),
            arity = call.arity(),
            named = call.named().map_or(0, NamedParams::len),
            capability = requested,
            tier,
            outcome,
            "resolved rule"
        );
    }
}
