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

//! Rule registration and the frozen rule set.
//!
//! Rules are collected by a [`RuleSetBuilder`] during initialization and
//! validated once by [`RuleSetBuilder::build`]. The resulting [`RuleSet`] is
//! immutable, so any number of threads may query it without locking.

use std::collections::HashMap;
use std::sync::Arc;

use crate::callable::{Call, FnId};
use crate::capability::{CapId, Capability};
use crate::config::{RedefinitionPolicy, RegistryConfig};
use crate::rules::{ForwardRule, Mode, NamedParamPolicy, Pullback, ReverseRule, RuleError};
use crate::signature::Signature;
use crate::value::{Differential, Value};

/// Errors raised while registering rules or installing a rule set.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("{mode} rule for '{op}' with signature {signature} already registered for {}", .capability.unwrap_or(UNSCOPED))]
    Redefinition {
        mode: Mode,
        op: FnId,
        capability: Option<&'static str>,
        signature: Signature,
    },
    #[error("ambiguous {mode} rules for '{op}' under {}: {left} and {right} overlap and neither is more specific; register a rule for {meet}", .capability.unwrap_or(UNSCOPED))]
    Ambiguous {
        mode: Mode,
        op: FnId,
        capability: Option<&'static str>,
        left: Signature,
        right: Signature,
        meet: Signature,
    },
    #[error("{mode} rules for '{op}' under {}: {left} and {right} overlap but the {meet} rule does not accept every named parameter both accept", .capability.unwrap_or(UNSCOPED))]
    NamedParamGap {
        mode: Mode,
        op: FnId,
        capability: Option<&'static str>,
        left: Signature,
        right: Signature,
        meet: Signature,
    },
    #[error("a process-wide rule set is already installed")]
    AlreadyInstalled,
}

const UNSCOPED: &str = "no capability";

fn scope_name(capability: Option<&'static str>) -> &'static str {
    capability.unwrap_or(UNSCOPED)
}

/// Where a rule applies: function, signature, optional capability and the
/// named parameters it understands.
#[derive(Debug, Clone)]
pub struct RuleKey {
    op: FnId,
    signature: Signature,
    capability: Option<&'static Capability>,
    named: NamedParamPolicy,
}

impl RuleKey {
    pub fn new(op: FnId, signature: Signature) -> Self {
        Self {
            op,
            signature,
            capability: None,
            named: NamedParamPolicy::Positional,
        }
    }

    /// Restrict the rule to engines with `capability` (or a refinement).
    pub fn with_capability(mut self, capability: &'static Capability) -> Self {
        self.capability = Some(capability);
        self
    }

    pub fn with_named(mut self, named: NamedParamPolicy) -> Self {
        self.named = named;
        self
    }

    pub fn op(&self) -> FnId {
        self.op
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn capability(&self) -> Option<&'static Capability> {
        self.capability
    }
}

/// One registered rule, or an opt-out when `rule` is `None`.
#[derive(Debug)]
pub(crate) struct Entry<R> {
    pub(crate) signature: Signature,
    pub(crate) named: NamedParamPolicy,
    pub(crate) rule: Option<R>,
    order: usize,
}

impl<R> Entry<R> {
    pub(crate) fn applies(&self, call: &Call<'_>) -> bool {
        if !self.signature.matches(call.args()) {
            return false;
        }
        match call.named() {
            None => true,
            Some(named) => self.named.accepts(named.names()),
        }
    }
}

/// Rules registered for one capability descriptor.
#[derive(Debug)]
pub(crate) struct Scoped<R> {
    pub(crate) capability: &'static Capability,
    pub(crate) entries: Vec<Entry<R>>,
}

/// Rules for one function, split by capability.
#[derive(Debug)]
pub(crate) struct FnRules<R> {
    pub(crate) scoped: HashMap<CapId, Scoped<R>>,
    pub(crate) free: Vec<Entry<R>>,
}

impl<R> Default for FnRules<R> {
    fn default() -> Self {
        Self {
            scoped: HashMap::new(),
            free: Vec::new(),
        }
    }
}

impl<R> FnRules<R> {
    fn bucket_mut(&mut self, capability: Option<&'static Capability>) -> &mut Vec<Entry<R>> {
        match capability {
            Some(cap) => {
                &mut self
                    .scoped
                    .entry(cap.id())
                    .or_insert_with(|| Scoped {
                        capability: cap,
                        entries: Vec::new(),
                    })
                    .entries
            }
            None => &mut self.free,
        }
    }

    fn buckets(&self) -> impl Iterator<Item = (Option<&'static Capability>, &[Entry<R>])> {
        self.scoped
            .values()
            .map(|scoped| (Some(scoped.capability), scoped.entries.as_slice()))
            .chain(std::iter::once((None, self.free.as_slice())))
    }
}

/// One dispatch table (forward or reverse).
#[derive(Debug)]
pub(crate) struct RuleTable<R> {
    pub(crate) mode: Mode,
    pub(crate) by_fn: HashMap<FnId, FnRules<R>>,
}

impl<R> RuleTable<R> {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            by_fn: HashMap::new(),
        }
    }

    fn insert(
        &mut self,
        key: &RuleKey,
        rule: Option<R>,
        order: usize,
        policy: RedefinitionPolicy,
    ) -> Result<(), RegistrationError> {
        let capability = key.capability.map(Capability::name);
        let bucket = self.by_fn.entry(key.op).or_default().bucket_mut(key.capability);
        let entry = Entry {
            signature: key.signature.clone(),
            named: key.named,
            rule,
            order,
        };

        if let Some(existing) = bucket
            .iter_mut()
            .find(|e| e.signature.equivalent(&key.signature))
        {
            return match policy {
                RedefinitionPolicy::Error => Err(RegistrationError::Redefinition {
                    mode: self.mode,
                    op: key.op,
                    capability,
                    signature: key.signature.clone(),
                }),
                RedefinitionPolicy::Replace => {
                    tracing::warn!(
                        mode = self.mode.as_str(),
                        op = key.op.name(),
                        capability = scope_name(capability),
                        signature = %key.signature,
                        "replacing previously registered rule"
                    );
                    *existing = entry;
                    Ok(())
                }
            };
        }
        bucket.push(entry);
        Ok(())
    }

    /// Overlapping signatures in one bucket must be ordered by specificity, or
    /// their intersection must be registered in the same bucket and accept
    /// every named parameter set both crossing rules accept.
    fn check_ambiguity(&self) -> Result<(), RegistrationError> {
        let mut ops: Vec<_> = self.by_fn.keys().copied().collect();
        ops.sort();
        for op in ops {
            let rules = &self.by_fn[&op];
            let mut buckets: Vec<_> = rules.buckets().collect();
            buckets.sort_by_key(|(cap, _)| (cap.map(Capability::name), cap.map(Capability::id)));
            for (capability, bucket) in buckets {
                let capability = capability.map(Capability::name);
                for (idx, left) in bucket.iter().enumerate() {
                    for right in &bucket[idx + 1..] {
                        let Some(meet) = left.signature.intersect(&right.signature) else {
                            continue;
                        };
                        if left.signature.within(&right.signature)
                            || right.signature.within(&left.signature)
                        {
                            continue;
                        }
                        match bucket.iter().find(|e| e.signature.equivalent(&meet)) {
                            Some(m) if m.named.covers(left.named, right.named) => continue,
                            Some(_) => {
                                return Err(RegistrationError::NamedParamGap {
                                    mode: self.mode,
                                    op,
                                    capability,
                                    left: left.signature.clone(),
                                    right: right.signature.clone(),
                                    meet,
                                })
                            }
                            None => {}
                        }
                        return Err(RegistrationError::Ambiguous {
                            mode: self.mode,
                            op,
                            capability,
                            left: left.signature.clone(),
                            right: right.signature.clone(),
                            meet,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.by_fn
            .values()
            .flat_map(|rules| rules.buckets())
            .map(|(_, bucket)| bucket.len())
            .sum()
    }

    fn summaries(&self, op: FnId) -> Vec<RuleSummary> {
        let Some(rules) = self.by_fn.get(&op) else {
            return Vec::new();
        };
        let mut out: Vec<(usize, RuleSummary)> = rules
            .buckets()
            .flat_map(|(capability, bucket)| {
                bucket.iter().map(move |e| {
                    (
                        e.order,
                        RuleSummary {
                            capability: capability.map(Capability::name),
                            signature: e.signature.clone(),
                            named: e.named,
                            opt_out: e.rule.is_none(),
                        },
                    )
                })
            })
            .collect();
        out.sort_by_key(|(order, _)| *order);
        out.into_iter().map(|(_, summary)| summary).collect()
    }
}

/// Description of one registered rule, for engines that cache lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSummary {
    pub capability: Option<&'static str>,
    pub signature: Signature,
    pub named: NamedParamPolicy,
    pub opt_out: bool,
}

/// Collects rules before they are frozen into a [`RuleSet`].
#[derive(Debug)]
pub struct RuleSetBuilder {
    config: RegistryConfig,
    forward: RuleTable<ForwardRule>,
    reverse: RuleTable<ReverseRule>,
    next_order: usize,
}

impl Default for RuleSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSetBuilder {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            forward: RuleTable::new(Mode::Forward),
            reverse: RuleTable::new(Mode::Reverse),
            next_order: 0,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a forward rule. `rule` receives the call and one tangent per
    /// slot (callable first) and returns the primal and output tangent.
    pub fn register_forward<F>(&mut self, key: RuleKey, rule: F) -> Result<&mut Self, RegistrationError>
    where
        F: Fn(&Call<'_>, &[Differential]) -> Result<(Value, Differential), RuleError>
            + Send
            + Sync
            + 'static,
    {
        self.insert(Mode::Forward, &key, Some(ForwardRule::new(rule)), None)
    }

    /// Register a reverse rule. `rule` returns the primal and a pullback.
    pub fn register_reverse<F>(&mut self, key: RuleKey, rule: F) -> Result<&mut Self, RegistrationError>
    where
        F: Fn(&Call<'_>) -> Result<(Value, Pullback), RuleError> + Send + Sync + 'static,
    {
        self.insert(Mode::Reverse, &key, None, Some(ReverseRule::new(rule)))
    }

    /// Declare that no rule applies for `key` in `mode`, shadowing less
    /// specific rules of the same tier.
    pub fn opt_out(&mut self, mode: Mode, key: RuleKey) -> Result<&mut Self, RegistrationError> {
        self.insert(mode, &key, None, None)
    }

    /// Register forward and reverse rules for an operation whose output does
    /// not depend differentiably on its inputs. `primal` computes the result;
    /// every differential is `Zero`.
    pub fn register_non_differentiable<P>(
        &mut self,
        key: RuleKey,
        primal: P,
    ) -> Result<&mut Self, RegistrationError>
    where
        P: Fn(&[Value]) -> Result<Value, RuleError> + Send + Sync + 'static,
    {
        let primal = Arc::new(primal);
        let fwd = Arc::clone(&primal);
        self.register_forward(key.clone(), move |call, _| {
            Ok((fwd(call.args())?, Differential::Zero))
        })?;
        self.register_reverse(key, move |call| {
            let y = primal(call.args())?;
            Ok((y, Pullback::zero(call.arity() + 1)))
        })
    }

    fn insert(
        &mut self,
        mode: Mode,
        key: &RuleKey,
        forward: Option<ForwardRule>,
        reverse: Option<ReverseRule>,
    ) -> Result<&mut Self, RegistrationError> {
        let order = self.next_order;
        self.next_order += 1;
        let policy = self.config.redefinition;
        match mode {
            Mode::Forward => self.forward.insert(key, forward, order, policy)?,
            Mode::Reverse => self.reverse.insert(key, reverse, order, policy)?,
        }
        tracing::debug!(
            mode = mode.as_str(),
            op = key.op.name(),
            capability = scope_name(key.capability.map(Capability::name)),
            signature = %key.signature,
            "registered rule"
        );
        Ok(self)
    }

    /// Validate and freeze the collected rules.
    pub fn build(self) -> Result<RuleSet, RegistrationError> {
        self.forward.check_ambiguity()?;
        self.reverse.check_ambiguity()?;
        tracing::debug!(
            forward_rules = self.forward.len(),
            reverse_rules = self.reverse.len(),
            "rule set frozen"
        );
        Ok(RuleSet {
            config: self.config,
            forward: self.forward,
            reverse: self.reverse,
        })
    }
}

/// An immutable, validated set of forward and reverse rules.
///
/// Dispatch entry points live in [`crate::dispatch`].
#[derive(Debug)]
pub struct RuleSet {
    pub(crate) config: RegistryConfig,
    pub(crate) forward: RuleTable<ForwardRule>,
    pub(crate) reverse: RuleTable<ReverseRule>,
}

impl RuleSet {
    /// A rule set with no rules: every lookup yields `NoRule`.
    pub fn empty() -> Self {
        Self {
            config: RegistryConfig::default(),
            forward: RuleTable::new(Mode::Forward),
            reverse: RuleTable::new(Mode::Reverse),
        }
    }

    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::new()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Total number of registered entries, opt-outs included.
    pub fn len(&self) -> usize {
        self.forward.len() + self.reverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rules registered for `op` in `mode`, in registration order.
    pub fn registered(&self, mode: Mode, op: FnId) -> Vec<RuleSummary> {
        match mode {
            Mode::Forward => self.forward.summaries(op),
            Mode::Reverse => self.reverse.summaries(op),
        }
    }

    /// True when any rule (or opt-out) exists for `op` in `mode`.
    pub fn has_rules(&self, mode: Mode, op: FnId) -> bool {
        match mode {
            Mode::Forward => self.forward.by_fn.contains_key(&op),
            Mode::Reverse => self.reverse.by_fn.contains_key(&op),
        }
    }
}
