//! Base values: a sum type over the closed enumeration of base types (C1),
//! parameterized by tag rather than represented as a host-wide `Datum` word
//! (see DESIGN NOTES in spec.md §9).

use std::cmp::Ordering;
use std::fmt;

use crate::point::Point2;
use crate::types::BaseType;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Point(Point2),
}

impl Value {
    pub fn base_type(&self) -> BaseType {
        match self {
            Value::Bool(_) => BaseType::Bool,
            Value::Int(_) => BaseType::Int,
            Value::Float(_) => BaseType::Float,
            Value::Text(_) => BaseType::Text,
            Value::Point(_) => BaseType::Geom2,
        }
    }

    /// Numeric value as `f64`, for the segment-arithmetic and tiling code
    /// that treats int/float uniformly. `None` for non-numeric values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<Point2> {
        match self {
            Value::Point(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_continuous(&self) -> bool {
        self.base_type().is_continuous_basetype()
    }

    /// Order comparison, where defined (numbers and text; points and bools
    /// only support equality per spec §3 "spatial types admit only distance
    /// and equality").
    pub fn partial_cmp_value(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Text(a), Value::Text(b)) => a.partial_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
            _ => None,
        }
    }

    pub fn add(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(Value::Int(a + b)),
            (Value::Float(a), Value::Float(b)) => Some(Value::Float(a + b)),
            (Value::Int(a), Value::Float(b)) => Some(Value::Float(*a as f64 + b)),
            (Value::Float(a), Value::Int(b)) => Some(Value::Float(a + *b as f64)),
            _ => None,
        }
    }

    pub fn sub(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(Value::Int(a - b)),
            (Value::Float(a), Value::Float(b)) => Some(Value::Float(a - b)),
            (Value::Int(a), Value::Float(b)) => Some(Value::Float(*a as f64 - b)),
            (Value::Float(a), Value::Int(b)) => Some(Value::Float(a - *b as f64)),
            _ => None,
        }
    }

    pub fn mul(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(Value::Int(a * b)),
            (Value::Float(a), Value::Float(b)) => Some(Value::Float(a * b)),
            (Value::Int(a), Value::Float(b)) => Some(Value::Float(*a as f64 * b)),
            (Value::Float(a), Value::Int(b)) => Some(Value::Float(a * *b as f64)),
            _ => None,
        }
    }

    /// Distance between two values: numeric absolute difference, point
    /// Euclidean distance. `None` for base types with no distance
    /// primitive (text, bool).
    pub fn distance(&self, other: &Self) -> Option<f64> {
        match (self, other) {
            (Value::Point(a), Value::Point(b)) => Some(a.distance(*b)),
            _ => {
                let (a, b) = (self.as_f64()?, other.as_f64()?);
                Some((a - b).abs())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v}"),
            Value::Point(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_numeric_arithmetic_promotes_to_float() {
        let a = Value::Int(2);
        let b = Value::Float(0.5);
        assert_eq!(a.add(&b), Some(Value::Float(2.5)));
    }

    #[test]
    fn non_numeric_arithmetic_is_none() {
        let a = Value::Text("a".into());
        let b = Value::Text("b".into());
        assert_eq!(a.add(&b), None);
    }

    #[test]
    fn point_distance() {
        let a = Value::Point(Point2::new(0.0, 0.0));
        let b = Value::Point(Point2::new(3.0, 4.0));
        assert_eq!(a.distance(&b), Some(5.0));
    }
}
