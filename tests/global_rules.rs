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

// The process-wide rule set can be installed once per process, so this
// binary holds a single test.

mod common;

use common::*;
use diffrules::capability::REVERSE_MODE;
use diffrules::{global, Differential, NamedParams, RegistrationError, RuleSet};

#[test]
fn install_once_then_dispatch_globally() {
    assert!(global::installed().is_none());
    let before = global::forward_rule(None, &zero_tangents(1), &callable(DOUBLE), &[real(3.0)])
        .expect("dispatch before install");
    assert!(before.is_no_rule(), "nothing installed means no rules");
    assert!(global::reverse_rule(None, &callable(SQUARE), &[real(3.0)])
        .expect("dispatch before install")
        .is_no_rule());

    let mut builder = RuleSet::builder();
    register_double(&mut builder);
    register_square(&mut builder);
    let installed = global::install(builder.build().expect("rule set")).expect("first install");
    assert_eq!(installed.len(), 2);
    assert!(global::installed().is_some());

    let (y, dy) = global::forward_rule(
        None,
        &[Differential::Zero, tangent(1.0)],
        &callable(DOUBLE),
        &[real(3.0)],
    )
    .expect("dispatch")
    .into_parts()
    .expect("double installed");
    assert_eq!(y, real(6.0));
    assert_eq!(dy, tangent(2.0));

    let (y, pullback) = global::reverse_rule_kw(
        &NamedParams::new(),
        Some(&REVERSE_MODE),
        &callable(SQUARE),
        &[real(5.0)],
    )
    .expect("dispatch")
    .into_parts()
    .expect("square installed");
    assert_eq!(y, real(25.0));
    assert_eq!(
        pullback.call(&tangent(1.0)).expect("pullback"),
        vec![Differential::Zero, tangent(10.0)]
    );

    let named = NamedParams::new().with("dims", 1_i64);
    assert!(global::forward_rule_kw(
        &named,
        None,
        &zero_tangents(1),
        &callable(DOUBLE),
        &[real(3.0)]
    )
    .expect("dispatch")
    .is_no_rule());

    let err = global::install(RuleSet::empty()).unwrap_err();
    assert!(matches!(err, RegistrationError::AlreadyInstalled));
    assert_eq!(global::installed().map(RuleSet::len), Some(2));
}
