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

//! Primal values and differentials seen by the dispatch protocol.
//!
//! The value model is deliberately small: it only has to carry arguments into
//! rules and classify them for signature matching. Differential arithmetic
//! belongs to the engines; the protocol itself only recognizes
//! [`Differential::Zero`] and passes it through.

use std::fmt;

/// A primal value passed to or returned from a rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Real(f64),
    Int(i64),
    Complex { re: f64, im: f64 },
    Vector(Vec<f64>),
    /// Compound result of a multi-output operation.
    Tuple(Vec<Value>),
}

/// Coarse type of a [`Value`], the unit of signature matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    Real,
    Int,
    Complex,
    Vector,
    Tuple,
}

impl ValueKind {
    /// True for scalar numeric kinds.
    pub const fn is_number(self) -> bool {
        matches!(self, ValueKind::Real | ValueKind::Int | ValueKind::Complex)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ValueKind::Real => "Real",
            ValueKind::Int => "Int",
            ValueKind::Complex => "Complex",
            ValueKind::Vector => "Vector",
            ValueKind::Tuple => "Tuple",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Real(_) => ValueKind::Real,
            Value::Int(_) => ValueKind::Int,
            Value::Complex { .. } => ValueKind::Complex,
            Value::Vector(_) => ValueKind::Vector,
            Value::Tuple(_) => ValueKind::Tuple,
        }
    }

    /// Real view of a scalar; integers widen.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(x) => Some(*x),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Multiply every numeric component by `k`. Tuples scale elementwise.
    pub fn scale(&self, k: f64) -> Value {
        match self {
            Value::Real(x) => Value::Real(x * k),
            Value::Int(i) => Value::Real(*i as f64 * k),
            Value::Complex { re, im } => Value::Complex {
                re: re * k,
                im: im * k,
            },
            Value::Vector(xs) => Value::Vector(xs.iter().map(|x| x * k).collect()),
            Value::Tuple(items) => Value::Tuple(items.iter().map(|v| v.scale(k)).collect()),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Real(x)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<Vec<f64>> for Value {
    fn from(xs: Vec<f64>) -> Self {
        Value::Vector(xs)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Real(x) => write!(f, "{x}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Complex { re, im } => write!(f, "{re}{im:+}i"),
            Value::Vector(xs) => write!(f, "{xs:?}"),
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

static ZERO: Differential = Differential::Zero;

/// A tangent (forward mode) or cotangent (reverse mode).
#[derive(Debug, Clone, PartialEq)]
pub enum Differential {
    /// Exactly no contribution. Distinct from a numeric zero so propagation
    /// can stop without computing anything.
    Zero,
    /// A materialized differential.
    Value(Value),
    /// Aggregate differential for a [`Value::Tuple`] primal, one entry per
    /// component.
    Composite(Vec<Differential>),
}

impl Differential {
    pub fn is_zero(&self) -> bool {
        matches!(self, Differential::Zero)
    }

    /// The materialized value, or `None` for `Zero` and composites.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Differential::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        self.value().and_then(Value::as_real)
    }

    /// Component `idx` of a composite. `Zero` has only `Zero` components.
    pub fn component(&self, idx: usize) -> Option<&Differential> {
        match self {
            Differential::Zero => Some(&ZERO),
            Differential::Composite(parts) => parts.get(idx),
            Differential::Value(_) => None,
        }
    }

    /// Scale by `k`, keeping `Zero` as `Zero`.
    pub fn scale(&self, k: f64) -> Differential {
        match self {
            Differential::Zero => Differential::Zero,
            Differential::Value(v) => Differential::Value(v.scale(k)),
            Differential::Composite(parts) => {
                Differential::Composite(parts.iter().map(|d| d.scale(k)).collect())
            }
        }
    }

    /// `n` zero sentinels, the cotangent of a call with `n - 1` arguments
    /// that contributes nothing.
    pub fn zeros(n: usize) -> Vec<Differential> {
        vec![Differential::Zero; n]
    }
}

impl From<Value> for Differential {
    fn from(v: Value) -> Self {
        Differential::Value(v)
    }
}

impl From<f64> for Differential {
    fn from(x: f64) -> Self {
        Differential::Value(Value::Real(x))
    }
}

impl fmt::Display for Differential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Differential::Zero => f.write_str("Zero"),
            Differential::Value(v) => write!(f, "{v}"),
            Differential::Composite(parts) => {
                write!(f, "Composite(")?;
                for (idx, part) in parts.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{part}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sentinel_is_not_numeric_zero() {
        assert_ne!(Differential::Zero, Differential::from(0.0));
        assert!(Differential::Zero.is_zero());
        assert!(!Differential::from(0.0).is_zero());
    }

    #[test]
    fn scale_keeps_zero_and_recurses_into_composites() {
        assert_eq!(Differential::Zero.scale(3.0), Differential::Zero);
        let composite = Differential::Composite(vec![Differential::from(2.0), Differential::Zero]);
        assert_eq!(
            composite.scale(0.5),
            Differential::Composite(vec![Differential::from(1.0), Differential::Zero])
        );
    }

    #[test]
    fn zero_has_zero_components() {
        assert_eq!(Differential::Zero.component(4), Some(&Differential::Zero));
        assert_eq!(Differential::from(1.0).component(0), None);
    }

    #[test]
    fn kinds_classify_values() {
        assert_eq!(Value::from(1.5).kind(), ValueKind::Real);
        assert_eq!(Value::from(3_i64).kind(), ValueKind::Int);
        assert_eq!(Value::Tuple(vec![]).kind(), ValueKind::Tuple);
        assert!(ValueKind::Complex.is_number());
        assert!(!ValueKind::Vector.is_number());
        assert_eq!(Value::Int(3).as_real(), Some(3.0));
    }
}
