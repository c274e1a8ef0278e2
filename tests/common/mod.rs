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

#![allow(dead_code)]

use diffrules::{
    Call, Callable, Differential, FnId, Pullback, RuleError, RuleKey, RuleSetBuilder, Signature,
    Value,
};

pub const DOUBLE: FnId = FnId::from_static("double");
pub const TRIPLE: FnId = FnId::from_static("triple");
pub const SQUARE: FnId = FnId::from_static("square");

pub fn real(x: f64) -> Value {
    Value::Real(x)
}

pub fn tangent(x: f64) -> Differential {
    Differential::from(x)
}

pub fn callable(id: FnId) -> Callable {
    Callable::from(id)
}

pub fn arg_real(call: &Call<'_>, idx: usize) -> Result<f64, RuleError> {
    call.real_arg(idx)
        .ok_or_else(|| RuleError::primal(call.id().name(), format!("argument {idx} is not real")))
}

/// `double(x) = 2x`, forward rule `(_, dx) -> 2 dx`.
pub fn register_double(builder: &mut RuleSetBuilder) {
    builder
        .register_forward(RuleKey::new(DOUBLE, Signature::unary_real()), |call, dx| {
            let x = arg_real(call, 0)?;
            Ok((Value::Real(2.0 * x), dx[1].scale(2.0)))
        })
        .expect("register double");
}

/// `square(x) = x * x`, pullback `dy -> (Zero, 2 x dy)`.
pub fn register_square(builder: &mut RuleSetBuilder) {
    builder
        .register_reverse(RuleKey::new(SQUARE, Signature::unary_real()), |call| {
            let x = arg_real(call, 0)?;
            let pullback = Pullback::new(2, move |dy| Ok(vec![Differential::Zero, dy.scale(2.0 * x)]));
            Ok((Value::Real(x * x), pullback))
        })
        .expect("register square");
}

/// Forward rule that reports which registration answered through its primal.
pub fn tagged_forward(
    tag: f64,
) -> impl Fn(&Call<'_>, &[Differential]) -> Result<(Value, Differential), RuleError> + Send + Sync + 'static
{
    move |_, _| Ok((Value::Real(tag), Differential::Zero))
}

/// Reverse counterpart of [`tagged_forward`].
pub fn tagged_reverse(
    tag: f64,
) -> impl Fn(&Call<'_>) -> Result<(Value, Pullback), RuleError> + Send + Sync + 'static {
    move |call| Ok((Value::Real(tag), Pullback::zero(call.arity() + 1)))
}

pub fn zero_tangents(args: usize) -> Vec<Differential> {
    Differential::zeros(args + 1)
}
