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

//! Thread-safe interning for function identities.
//!
//! Rule tables are keyed by function name. Interning turns dynamic names into
//! `&'static str` so that [`FnId`](crate::FnId) stays `Copy` and cheap to
//! hash. Interned names are never freed; each unique name is stored once.
//! Once [`MAX_INTERNED_NAMES`] is reached new names are refused rather than
//! mapped onto a shared placeholder.
//!
//! ```
//! use diffrules::intern::intern_name;
//!
//! let a = intern_name(&format!("scale_by_{}", 3)).expect("interned");
//! let b = intern_name("scale_by_3").expect("interned");
//! assert!(std::ptr::eq(a, b));
//! ```

use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

static INTERNER: OnceLock<Mutex<NameInterner>> = OnceLock::new();

/// Upper bound on distinct interned names.
pub const MAX_INTERNED_NAMES: usize = 100_000;

/// The interner refused a new name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot intern '{name}': function-name interner holds its maximum of {capacity} names")]
pub struct InternError {
    pub name: String,
    pub capacity: usize,
}

struct NameInterner {
    names: HashSet<&'static str>,
    capacity: usize,
}

impl NameInterner {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            names: HashSet::new(),
            capacity,
        }
    }

    fn intern(&mut self, name: &str) -> Result<&'static str, InternError> {
        if let Some(&existing) = self.names.get(name) {
            return Ok(existing);
        }
        if self.names.len() >= self.capacity {
            tracing::error!(capacity = self.capacity, name, "function-name interner at capacity");
            return Err(InternError {
                name: name.to_string(),
                capacity: self.capacity,
            });
        }
        let leaked: &'static str = Box::leak(name.to_string().into_boxed_str());
        self.names.insert(leaked);
        Ok(leaked)
    }
}

fn with_interner<T>(f: impl FnOnce(&mut NameInterner) -> T) -> T {
    let interner =
        INTERNER.get_or_init(|| Mutex::new(NameInterner::with_capacity(MAX_INTERNED_NAMES)));
    // A panic while holding the lock cannot leave the set half-updated.
    let mut guard = match interner.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    f(&mut guard)
}

/// Intern `name`. Fails once [`MAX_INTERNED_NAMES`] distinct names exist;
/// names interned earlier keep resolving.
pub fn intern_name(name: &str) -> Result<&'static str, InternError> {
    with_interner(|interner| interner.intern(name))
}

/// Number of interned names and their total byte length.
pub fn interner_stats() -> (usize, usize) {
    with_interner(|interner| {
        let count = interner.names.len();
        let bytes = interner.names.iter().map(|s| s.len()).sum();
        (count, bytes)
    })
}
