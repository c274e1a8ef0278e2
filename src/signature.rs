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

//! Argument signatures and their specificity order.
//!
//! A [`Signature`] is a list of per-position [`ArgPattern`]s with an optional
//! variadic tail. Signatures denote sets of argument lists, and "more
//! specific" means "subset of". Resolution picks the unique most specific
//! matching signature; two overlapping signatures where neither contains the
//! other are ambiguous unless their intersection is registered as well.

use std::fmt;

use crate::value::{Value, ValueKind};

/// Pattern for one argument position.
///
/// Patterns form a small lattice: `Kind(k)` ⊂ `Number` for numeric kinds,
/// and everything ⊂ `Any`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgPattern {
    Any,
    Number,
    Kind(ValueKind),
}

impl ArgPattern {
    pub const REAL: ArgPattern = ArgPattern::Kind(ValueKind::Real);
    pub const INT: ArgPattern = ArgPattern::Kind(ValueKind::Int);
    pub const COMPLEX: ArgPattern = ArgPattern::Kind(ValueKind::Complex);
    pub const VECTOR: ArgPattern = ArgPattern::Kind(ValueKind::Vector);
    pub const TUPLE: ArgPattern = ArgPattern::Kind(ValueKind::Tuple);

    pub fn matches(self, kind: ValueKind) -> bool {
        match self {
            ArgPattern::Any => true,
            ArgPattern::Number => kind.is_number(),
            ArgPattern::Kind(k) => k == kind,
        }
    }

    /// True when every kind matched by `self` is matched by `other`.
    pub fn within(self, other: ArgPattern) -> bool {
        match (self, other) {
            (_, ArgPattern::Any) => true,
            (ArgPattern::Any, _) => false,
            (ArgPattern::Number, ArgPattern::Number) => true,
            (ArgPattern::Number, ArgPattern::Kind(_)) => false,
            (ArgPattern::Kind(k), ArgPattern::Number) => k.is_number(),
            (ArgPattern::Kind(a), ArgPattern::Kind(b)) => a == b,
        }
    }

    /// Greatest pattern within both, or `None` when they are disjoint.
    pub fn intersect(self, other: ArgPattern) -> Option<ArgPattern> {
        if self.within(other) {
            Some(self)
        } else if other.within(self) {
            Some(other)
        } else {
            None
        }
    }
}

impl fmt::Display for ArgPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgPattern::Any => f.write_str("Any"),
            ArgPattern::Number => f.write_str("Number"),
            ArgPattern::Kind(k) => write!(f, "{k}"),
        }
    }
}

impl From<ValueKind> for ArgPattern {
    fn from(kind: ValueKind) -> Self {
        ArgPattern::Kind(kind)
    }
}

/// Argument signature a rule is registered for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    params: Vec<ArgPattern>,
    rest: Option<ArgPattern>,
}

impl Signature {
    /// Fixed-arity signature.
    pub fn new(params: impl IntoIterator<Item = ArgPattern>) -> Self {
        Self {
            params: params.into_iter().collect(),
            rest: None,
        }
    }

    /// Signature accepting `params` followed by any number of `rest` arguments.
    pub fn variadic(params: impl IntoIterator<Item = ArgPattern>, rest: ArgPattern) -> Self {
        Self {
            params: params.into_iter().collect(),
            rest: Some(rest),
        }
    }

    /// `n` arguments of any kind.
    pub fn any(n: usize) -> Self {
        Self::new(std::iter::repeat(ArgPattern::Any).take(n))
    }

    /// One real scalar.
    pub fn unary_real() -> Self {
        Self::new([ArgPattern::REAL])
    }

    /// Two real scalars.
    pub fn binary_real() -> Self {
        Self::new([ArgPattern::REAL, ArgPattern::REAL])
    }

    /// Exact signature of an argument list.
    pub fn of(args: &[Value]) -> Self {
        Self::new(args.iter().map(|v| ArgPattern::Kind(v.kind())))
    }

    pub fn params(&self) -> &[ArgPattern] {
        &self.params
    }

    pub fn rest(&self) -> Option<ArgPattern> {
        self.rest
    }

    pub fn is_variadic(&self) -> bool {
        self.rest.is_some()
    }

    fn at(&self, idx: usize) -> Option<ArgPattern> {
        self.params.get(idx).copied().or(self.rest)
    }

    fn accepts_arity(&self, n: usize) -> bool {
        if self.rest.is_some() {
            n >= self.params.len()
        } else {
            n == self.params.len()
        }
    }

    /// True when `args` belongs to the set this signature denotes.
    pub fn matches(&self, args: &[Value]) -> bool {
        if !self.accepts_arity(args.len()) {
            return false;
        }
        args.iter()
            .enumerate()
            .all(|(idx, arg)| self.at(idx).is_some_and(|p| p.matches(arg.kind())))
    }

    /// True when every argument list matched by `self` is matched by `other`.
    pub fn within(&self, other: &Signature) -> bool {
        let arities_ok = match (self.rest, other.rest) {
            (None, _) => other.accepts_arity(self.params.len()),
            (Some(_), None) => false,
            (Some(_), Some(_)) => other.params.len() <= self.params.len(),
        };
        if !arities_ok {
            return false;
        }
        // Positions past both fixed prefixes compare the tails.
        let span = self.params.len().max(other.params.len()) + 1;
        (0..span).all(|idx| match (self.at(idx), other.at(idx)) {
            (Some(a), Some(b)) => a.within(b),
            (Some(_), None) => false,
            (None, _) => true,
        })
    }

    /// Strictly more specific than `other`.
    pub fn more_specific_than(&self, other: &Signature) -> bool {
        self.within(other) && !other.within(self)
    }

    /// The signature matching exactly the argument lists matched by both, or
    /// `None` when no argument list matches both.
    pub fn intersect(&self, other: &Signature) -> Option<Signature> {
        let hi = self.params.len().max(other.params.len());
        let fixed_len = match (self.rest, other.rest) {
            (None, None) if self.params.len() != other.params.len() => return None,
            (None, None) => hi,
            (None, Some(_)) if self.params.len() < other.params.len() => return None,
            (None, Some(_)) => self.params.len(),
            (Some(_), None) if other.params.len() < self.params.len() => return None,
            (Some(_), None) => other.params.len(),
            (Some(_), Some(_)) => hi,
        };
        let mut params = Vec::with_capacity(fixed_len);
        for idx in 0..fixed_len {
            let a = self.at(idx)?;
            let b = other.at(idx)?;
            params.push(a.intersect(b)?);
        }
        // Disjoint tails still share the lists of exactly `fixed_len` arguments.
        let rest = match (self.rest, other.rest) {
            (Some(a), Some(b)) => a.intersect(b),
            _ => None,
        };
        Some(Signature { params, rest })
    }

    /// True when some argument list matches both signatures.
    pub fn overlaps(&self, other: &Signature) -> bool {
        self.intersect(other).is_some()
    }

    /// Same set of argument lists.
    pub fn equivalent(&self, other: &Signature) -> bool {
        self.within(other) && other.within(self)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (idx, p) in self.params.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        if let Some(rest) = self.rest {
            if !self.params.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "{rest}...")?;
        }
        write!(f, ")")
    }
}
