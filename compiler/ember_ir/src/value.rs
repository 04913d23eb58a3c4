//! Call-site argument values.

use crate::ValueType;

/// An actual argument supplied to a compiled function.
///
/// Numbers are carried as `f64` regardless of the declared type; the
/// declared type decides how they are checked and passed.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    Array(Vec<f64>),
}

impl Value {
    /// Check this value against a declared type.
    ///
    /// `Int32` requires an integral number in `i32` range; `Float64` any
    /// finite number. Array kinds apply the same check element-wise.
    pub fn is_of_type(&self, ty: ValueType) -> bool {
        match (self, ty) {
            (Value::Number(n), ValueType::Int32) => is_int32(*n),
            (Value::Number(n), ValueType::Float64) => n.is_finite(),
            (Value::Boolean(_), ValueType::Boolean) => true,
            (Value::Array(items), ValueType::Int32Array) => items.iter().all(|n| is_int32(*n)),
            (Value::Array(items), ValueType::Float64Array) => items.iter().all(|n| n.is_finite()),
            _ => false,
        }
    }

    pub fn as_array(&self) -> Option<&[f64]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Array(_) => "array",
        }
    }
}

fn is_int32(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX)
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Vec<i32>> for Value {
    fn from(items: Vec<i32>) -> Self {
        Value::Array(items.into_iter().map(f64::from).collect())
    }
}

impl From<Vec<f64>> for Value {
    fn from(items: Vec<f64>) -> Self {
        Value::Array(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int32_requires_integral_in_range() {
        assert!(Value::from(7).is_of_type(ValueType::Int32));
        assert!(!Value::from(7.5).is_of_type(ValueType::Int32));
        assert!(!Value::from(f64::from(i32::MAX) + 1.0).is_of_type(ValueType::Int32));
        assert!(!Value::from(f64::NAN).is_of_type(ValueType::Int32));
    }

    #[test]
    fn float64_requires_finite() {
        assert!(Value::from(7).is_of_type(ValueType::Float64));
        assert!(Value::from(-0.25).is_of_type(ValueType::Float64));
        assert!(!Value::from(f64::INFINITY).is_of_type(ValueType::Float64));
    }

    #[test]
    fn boolean_is_strict() {
        assert!(Value::from(true).is_of_type(ValueType::Boolean));
        assert!(!Value::from(1).is_of_type(ValueType::Boolean));
        assert!(!Value::from(false).is_of_type(ValueType::Int32));
    }

    #[test]
    fn arrays_check_every_element() {
        assert!(Value::from(vec![1, 2, 3]).is_of_type(ValueType::Int32Array));
        assert!(!Value::from(vec![1.0, 2.5]).is_of_type(ValueType::Int32Array));
        assert!(Value::from(vec![1.0, 2.5]).is_of_type(ValueType::Float64Array));
        assert!(Value::Array(Vec::new()).is_of_type(ValueType::Int32Array));
        assert!(!Value::from(vec![1]).is_of_type(ValueType::Int32));
    }
}
