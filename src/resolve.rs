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

//! Capability-aware rule resolution shared by both dispatch tables.
//!
//! Tiers, in order:
//! 1. rules registered for the supplied capability, then for each of its
//!    supertypes, nearest first;
//! 2. rules registered without a capability;
//! 3. the universal default, `NoRule`.
//!
//! Within a tier the most specific matching signature wins. The first tier
//! with a match decides the outcome, including an opt-out.

use crate::callable::Call;
use crate::capability::Capability;
use crate::registry::{Entry, RuleTable};
use crate::rules::RuleError;

/// Outcome of resolving one call against one table.
#[derive(Debug)]
pub(crate) enum Resolution<'t, R> {
    Rule { rule: &'t R, tier: Tier },
    OptedOut { tier: Tier },
    NoRule,
}

/// Tier that produced a resolution, for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tier {
    Capability(&'static str),
    Free,
}

pub(crate) fn resolve<'t, R>(
    table: &'t RuleTable<R>,
    capability: Option<&Capability>,
    call: &Call<'_>,
) -> Result<Resolution<'t, R>, RuleError> {
    let Some(rules) = table.by_fn.get(&call.id()) else {
        return Ok(Resolution::NoRule);
    };

    if let Some(capability) = capability {
        if !rules.scoped.is_empty() {
            for cap in capability.lineage() {
                let Some(scoped) = rules.scoped.get(&cap.id()) else {
                    continue;
                };
                if let Some(entry) = most_specific(&scoped.entries, call)? {
                    return Ok(into_resolution(entry, Tier::Capability(cap.name())));
                }
            }
        }
    }

    match most_specific(&rules.free, call)? {
        Some(entry) => Ok(into_resolution(entry, Tier::Free)),
        None => Ok(Resolution::NoRule),
    }
}

fn into_resolution<R>(entry: &Entry<R>, tier: Tier) -> Resolution<'_, R> {
    match &entry.rule {
        Some(rule) => Resolution::Rule { rule, tier },
        None => Resolution::OptedOut { tier },
    }
}

/// The applicable entry whose signature lies within every other applicable
/// signature. Validated buckets always have one when anything applies.
fn most_specific<'t, R>(
    bucket: &'t [Entry<R>],
    call: &Call<'_>,
) -> Result<Option<&'t Entry<R>>, RuleError> {
    let mut best: Option<&Entry<R>> = None;
    for entry in bucket.iter().filter(|e| e.applies(call)) {
        best = match best {
            Some(b) if !entry.signature.within(&b.signature) => Some(b),
            _ => Some(entry),
        };
    }
    let Some(best) = best else {
        return Ok(None);
    };
    let unique = bucket
        .iter()
        .filter(|e| e.applies(call))
        .all(|e| best.signature.within(&e.signature));
    if unique {
        Ok(Some(best))
    } else {
        Err(RuleError::Ambiguous {
            op: call.id().name(),
        })
    }
}
