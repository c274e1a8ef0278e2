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

//! Process-wide rule set.
//!
//! Installing freezes one [`RuleSet`] for the life of the process. The free
//! functions here dispatch against it; before installation they return
//! `NoRule` for every query.

use std::sync::OnceLock;

use crate::callable::{Callable, NamedParams};
use crate::capability::Capability;
use crate::registry::{RegistrationError, RuleSet};
use crate::rules::{ForwardOutcome, ReverseOutcome, RuleError};
use crate::value::{Differential, Value};

static INSTALLED: OnceLock<RuleSet> = OnceLock::new();
static EMPTY: OnceLock<RuleSet> = OnceLock::new();

/// Install `rules` as the process-wide rule set. Succeeds once.
pub fn install(rules: RuleSet) -> Result<&'static RuleSet, RegistrationError> {
    let mut rules = Some(rules);
    let installed = INSTALLED.get_or_init(|| rules.take().unwrap_or_else(RuleSet::empty));
    if rules.is_some() {
        return Err(RegistrationError::AlreadyInstalled);
    }
    tracing::debug!(rules = installed.len(), "installed process-wide rule set");
    Ok(installed)
}

/// The installed rule set, if any.
pub fn installed() -> Option<&'static RuleSet> {
    INSTALLED.get()
}

fn current() -> &'static RuleSet {
    INSTALLED
        .get()
        .unwrap_or_else(|| EMPTY.get_or_init(RuleSet::empty))
}

/// [`RuleSet::forward_rule`] against the installed rule set.
pub fn forward_rule(
    capability: Option<&Capability>,
    tangents: &[Differential],
    f: &Callable,
    args: &[Value],
) -> Result<ForwardOutcome, RuleError> {
    current().forward_rule(capability, tangents, f, args)
}

/// [`RuleSet::reverse_rule`] against the installed rule set.
pub fn reverse_rule(
    capability: Option<&Capability>,
    f: &Callable,
    args: &[Value],
) -> Result<ReverseOutcome, RuleError> {
    current().reverse_rule(capability, f, args)
}

/// [`RuleSet::forward_rule_kw`] against the installed rule set.
pub fn forward_rule_kw(
    named: &NamedParams,
    capability: Option<&Capability>,
    tangents: &[Differential],
    f: &Callable,
    args: &[Value],
) -> Result<ForwardOutcome, RuleError> {
    current().forward_rule_kw(named, capability, tangents, f, args)
}

/// [`RuleSet::reverse_rule_kw`] against the installed rule set.
pub fn reverse_rule_kw(
    named: &NamedParams,
    capability: Option<&Capability>,
    f: &Callable,
    args: &[Value],
) -> Result<ReverseOutcome, RuleError> {
    current().reverse_rule_kw(named, capability, f, args)
}
