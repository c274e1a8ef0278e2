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

//! Callables and the borrowed description of one call.

use std::collections::BTreeMap;
use std::fmt;

use crate::intern::{intern_name, InternError};
use crate::value::Value;

/// Identity of a differentiable function: an interned name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FnId(&'static str);

impl FnId {
    /// Identity for a name known at compile time. Does not touch the interner.
    pub const fn from_static(name: &'static str) -> Self {
        FnId(name)
    }

    /// Identity for a runtime name, interning it. Fails when the interner
    /// is full instead of reusing another function's identity.
    pub fn new(name: &str) -> Result<Self, InternError> {
        intern_name(name).map(FnId)
    }

    pub fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A function value. Plain functions have no captures; closures carry the
/// state they close over, which occupies differential slot zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Callable {
    id: FnId,
    captures: Vec<Value>,
}

impl Callable {
    pub fn function(id: FnId) -> Self {
        Self {
            id,
            captures: Vec::new(),
        }
    }

    pub fn closure(id: FnId, captures: Vec<Value>) -> Self {
        Self { id, captures }
    }

    pub fn id(&self) -> FnId {
        self.id
    }

    pub fn captures(&self) -> &[Value] {
        &self.captures
    }

    pub fn capture(&self, idx: usize) -> Option<&Value> {
        self.captures.get(idx)
    }

    pub fn is_closure(&self) -> bool {
        !self.captures.is_empty()
    }
}

impl From<FnId> for Callable {
    fn from(id: FnId) -> Self {
        Callable::function(id)
    }
}

/// Named (keyword-style) parameters of a call, ordered by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedParams {
    entries: BTreeMap<String, Value>,
}

impl NamedParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for NamedParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = NamedParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// One operation call as seen by a rule. Borrowed from the caller and
/// immutable for the duration of a dispatch.
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    callable: &'a Callable,
    args: &'a [Value],
    named: Option<&'a NamedParams>,
}

impl<'a> Call<'a> {
    pub fn new(callable: &'a Callable, args: &'a [Value]) -> Self {
        Self {
            callable,
            args,
            named: None,
        }
    }

    /// Attach named parameters. An empty mapping is dropped so that the call
    /// is indistinguishable from a positional one.
    pub fn with_named(mut self, named: &'a NamedParams) -> Self {
        self.named = if named.is_empty() { None } else { Some(named) };
        self
    }

    pub fn callable(&self) -> &'a Callable {
        self.callable
    }

    pub fn id(&self) -> FnId {
        self.callable.id
    }

    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    pub fn arg(&self, idx: usize) -> Option<&'a Value> {
        self.args.get(idx)
    }

    /// Argument `idx` as a real scalar.
    pub fn real_arg(&self, idx: usize) -> Option<f64> {
        self.arg(idx).and_then(Value::as_real)
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn named(&self) -> Option<&'a NamedParams> {
        self.named
    }

    pub fn named_param(&self, name: &str) -> Option<&'a Value> {
        self.named.and_then(|n| n.get(name))
    }
}
