//! The value type lattice.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kinds of value a compiled function can take, produce or store.
///
/// The serialized names (`INT_32`, `FLOAT_64`, ...) are the wire vocabulary
/// used by signature tables.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum ValueType {
    #[serde(rename = "INT_32")]
    Int32,
    #[serde(rename = "FLOAT_64")]
    Float64,
    #[serde(rename = "BOOLEAN")]
    Boolean,
    #[serde(rename = "INT_32_ARRAY")]
    Int32Array,
    #[serde(rename = "FLOAT_64_ARRAY")]
    Float64Array,
}

/// Two types with no common type.
#[derive(Copy, Clone, Eq, PartialEq, Debug, thiserror::Error)]
#[error("incompatible types {left} and {right}")]
pub struct IncompatibleTypes {
    pub left: ValueType,
    pub right: ValueType,
}

impl ValueType {
    pub const ALL: [ValueType; 5] = [
        ValueType::Int32,
        ValueType::Float64,
        ValueType::Boolean,
        ValueType::Int32Array,
        ValueType::Float64Array,
    ];

    /// Promote two operand types to the type a binary operation works in.
    ///
    /// `Int32` widens to `Float64`. Booleans never combine with anything and
    /// arrays only with the same array kind.
    pub fn common_type(self, other: ValueType) -> Result<ValueType, IncompatibleTypes> {
        use ValueType::{Float64, Float64Array, Int32, Int32Array};
        match (self, other) {
            (Int32, Int32) => Ok(Int32),
            (Int32 | Float64, Int32 | Float64) => Ok(Float64),
            (Int32Array, Int32Array) => Ok(Int32Array),
            (Float64Array, Float64Array) => Ok(Float64Array),
            _ => Err(IncompatibleTypes {
                left: self,
                right: other,
            }),
        }
    }

    pub const fn is_numeric(self) -> bool {
        matches!(self, ValueType::Int32 | ValueType::Float64)
    }

    pub const fn is_array(self) -> bool {
        matches!(self, ValueType::Int32Array | ValueType::Float64Array)
    }

    /// Element type of an array kind.
    pub const fn element_type(self) -> Option<ValueType> {
        match self {
            ValueType::Int32Array => Some(ValueType::Int32),
            ValueType::Float64Array => Some(ValueType::Float64),
            _ => None,
        }
    }

    /// Array kind holding elements of this type.
    pub const fn array_of(self) -> Option<ValueType> {
        match self {
            ValueType::Int32 => Some(ValueType::Int32Array),
            ValueType::Float64 => Some(ValueType::Float64Array),
            _ => None,
        }
    }

    /// Bytes per element in linear memory for array kinds.
    pub const fn element_stride(self) -> Option<u32> {
        match self {
            ValueType::Int32Array => Some(4),
            ValueType::Float64Array => Some(8),
            _ => None,
        }
    }

    /// Whether a value of `self` may be stored where `target` is expected.
    ///
    /// Equal types are assignable; `Int32` is implicitly widened to `Float64`.
    pub fn is_assignable_to(self, target: ValueType) -> bool {
        self == target || (self == ValueType::Int32 && target == ValueType::Float64)
    }

    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            ValueType::Int32 => "INT_32",
            ValueType::Float64 => "FLOAT_64",
            ValueType::Boolean => "BOOLEAN",
            ValueType::Int32Array => "INT_32_ARRAY",
            ValueType::Float64Array => "FLOAT_64_ARRAY",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized type name.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
#[error("unknown value type `{0}`")]
pub struct UnknownValueType(pub String);

impl FromStr for ValueType {
    type Err = UnknownValueType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| UnknownValueType(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_type() -> impl Strategy<Value = ValueType> {
        proptest::sample::select(ValueType::ALL.to_vec())
    }

    #[test]
    fn int_and_float_promote_to_float() {
        assert_eq!(
            ValueType::Int32.common_type(ValueType::Float64),
            Ok(ValueType::Float64)
        );
        assert_eq!(
            ValueType::Int32.common_type(ValueType::Int32),
            Ok(ValueType::Int32)
        );
        assert_eq!(
            ValueType::Float64.common_type(ValueType::Float64),
            Ok(ValueType::Float64)
        );
    }

    #[test]
    fn booleans_never_combine() {
        for ty in ValueType::ALL {
            assert!(ValueType::Boolean.common_type(ty).is_err());
            assert!(ty.common_type(ValueType::Boolean).is_err());
        }
    }

    #[test]
    fn arrays_do_not_mix() {
        assert!(ValueType::Int32Array
            .common_type(ValueType::Float64Array)
            .is_err());
        assert!(ValueType::Int32Array.common_type(ValueType::Int32).is_err());
        assert!(ValueType::Float64.common_type(ValueType::Float64Array).is_err());
    }

    #[test]
    fn wire_names_round_trip_through_from_str() {
        for ty in ValueType::ALL {
            assert_eq!(ty.to_string().parse::<ValueType>(), Ok(ty));
        }
        assert!("INT32".parse::<ValueType>().is_err());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&ValueType::Float64Array).unwrap();
        assert_eq!(json, "\"FLOAT_64_ARRAY\"");
        let ty: ValueType = serde_json::from_str("\"BOOLEAN\"").unwrap();
        assert_eq!(ty, ValueType::Boolean);
    }

    #[test]
    fn strides() {
        assert_eq!(ValueType::Int32Array.element_stride(), Some(4));
        assert_eq!(ValueType::Float64Array.element_stride(), Some(8));
        assert_eq!(ValueType::Int32.element_stride(), None);
    }

    proptest! {
        #[test]
        fn common_type_is_commutative(a in any_type(), b in any_type()) {
            prop_assert_eq!(a.common_type(b).ok(), b.common_type(a).ok());
        }

        #[test]
        fn common_type_is_one_of_its_operands(a in any_type(), b in any_type()) {
            if let Ok(common) = a.common_type(b) {
                prop_assert!(common == a || common == b);
                prop_assert!(a.is_assignable_to(common));
                prop_assert!(b.is_assignable_to(common));
            }
        }
    }
}
