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

//! Differentiation-rule dispatch for MIND.
//!
//! Rule authors register forward rules (primal + output tangent) and reverse
//! rules (primal + pullback) for an operation, keyed by function identity,
//! argument signature and an optional engine [`Capability`]. Engines ask
//! [`RuleSet::forward_rule`] / [`RuleSet::reverse_rule`] whether a rule exists
//! before differentiating through the operation themselves; the answer is
//! either [`RuleOutcome::NoRule`] or the rule's result.
//!
//! ```
//! use diffrules::{Callable, Differential, FnId, RuleKey, RuleOutcome, RuleSet, Signature, Value};
//!
//! const DOUBLE: FnId = FnId::from_static("double");
//!
//! let mut builder = RuleSet::builder();
//! builder
//!     .register_forward(RuleKey::new(DOUBLE, Signature::unary_real()), |call, dx| {
//!         let x = call.real_arg(0).unwrap_or_default();
//!         Ok((Value::Real(2.0 * x), dx[1].scale(2.0)))
//!     })
//!     .expect("register");
//! let rules = builder.build().expect("valid rule set");
//!
//! let out = rules
//!     .forward_rule(None, &[Differential::Zero, 1.0.into()], &Callable::from(DOUBLE), &[Value::Real(3.0)])
//!     .expect("dispatch");
//! assert_eq!(out, RuleOutcome::from((Value::Real(6.0), Differential::from(2.0))));
//! ```

pub mod callable;
pub mod capability;
pub mod config;
pub mod dispatch;
pub mod global;
pub mod intern;
pub mod registry;
mod resolve;
pub mod rules;
pub mod signature;
pub mod value;

pub use callable::{Call, Callable, FnId, NamedParams};
pub use capability::Capability;
pub use config::{ConfigError, RedefinitionPolicy, RegistryConfig};
pub use intern::InternError;
pub use registry::{RegistrationError, RuleKey, RuleSet, RuleSetBuilder, RuleSummary};
pub use rules::{
    ForwardOutcome, Mode, NamedParamPolicy, Pullback, ReverseOutcome, RuleError, RuleOutcome,
};
pub use signature::{ArgPattern, Signature};
pub use value::{Differential, Value, ValueKind};
