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

//! Capability descriptors.
//!
//! A capability tells rule resolution which engine features a rule may rely
//! on. Descriptors form a single-parent hierarchy declared as `static` items:
//!
//! ```
//! use diffrules::capability::{Capability, REVERSE_MODE};
//!
//! static TAPE_ENGINE: Capability = Capability::refine("tape_engine", &REVERSE_MODE);
//!
//! assert!(TAPE_ENGINE.is_a(&REVERSE_MODE));
//! assert!(!REVERSE_MODE.is_a(&TAPE_ENGINE));
//! ```
//!
//! A rule registered for a descriptor is reachable from that descriptor and
//! all of its refinements. Identity is the descriptor's address: two
//! descriptors declared with the same name are still unrelated, and the name
//! only appears in logs and error messages.

use std::fmt;

/// An engine capability tag.
#[derive(Debug)]
pub struct Capability {
    name: &'static str,
    parent: Option<&'static Capability>,
}

/// The engine can differentiate in forward mode.
pub static FORWARD_MODE: Capability = Capability::root("forward_mode");
/// The engine can differentiate in reverse mode.
pub static REVERSE_MODE: Capability = Capability::root("reverse_mode");
/// The engine can nest reverse-mode passes.
pub static HIGHER_ORDER: Capability = Capability::refine("higher_order", &REVERSE_MODE);
/// The engine propagates complex-valued differentials.
pub static COMPLEX_DIFFERENTIALS: Capability = Capability::root("complex_differentials");

impl Capability {
    /// A descriptor with no supertype.
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// A descriptor that narrows `parent`.
    pub const fn refine(name: &'static str, parent: &'static Capability) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<&'static Capability> {
        self.parent
    }

    /// `self` followed by each supertype, nearest first.
    pub fn lineage(&self) -> Lineage<'_> {
        Lineage { next: Some(self) }
    }

    /// Number of supertypes above `self`.
    pub fn depth(&self) -> usize {
        self.lineage().count() - 1
    }

    /// True when `self` is `other` or one of its refinements.
    pub fn is_a(&self, other: &Capability) -> bool {
        self.lineage().any(|c| c == other)
    }

    pub(crate) fn id(&self) -> CapId {
        CapId(self as *const Capability as usize)
    }
}

impl PartialEq for Capability {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for Capability {}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Iterator over a descriptor and its supertypes.
#[derive(Debug, Clone)]
pub struct Lineage<'a> {
    next: Option<&'a Capability>,
}

impl<'a> Iterator for Lineage<'a> {
    type Item = &'a Capability;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent.map(|p| p as &'a Capability);
        Some(current)
    }
}

/// Address of a descriptor, the key of capability-scoped rule buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct CapId(usize);
