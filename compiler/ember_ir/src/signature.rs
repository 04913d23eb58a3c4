//! Declared function signatures.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::ValueType;

/// Ordered parameter types plus a return type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub parameters: Vec<ValueType>,
    pub returns: ValueType,
}

impl Signature {
    pub fn new(parameters: impl Into<Vec<ValueType>>, returns: ValueType) -> Self {
        Signature {
            parameters: parameters.into(),
            returns,
        }
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Whether any parameter is an array kind.
    pub fn has_array_parameter(&self) -> bool {
        self.parameters.iter().any(|ty| ty.is_array())
    }
}

/// Failure loading a signature table.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid signature table: {0}")]
    Json(#[from] serde_json::Error),
}

/// Function name to signature.
///
/// Built once before compilation and shared, read-only, by the compiler and
/// every call made through the resulting entry points.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureTable {
    signatures: FxHashMap<String, Signature>,
}

impl SignatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the JSON form:
    /// `{"add": {"parameters": ["INT_32", "INT_32"], "returns": "INT_32"}}`.
    pub fn from_json(json: &str) -> Result<Self, SignatureError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SignatureError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Add or replace a signature.
    pub fn insert(&mut self, name: impl Into<String>, signature: Signature) {
        self.signatures.insert(name.into(), signature);
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, signature: Signature) -> Self {
        self.insert(name, signature);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Signature> {
        self.signatures.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.signatures.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Names in sorted order, so module layout does not depend on hashing.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.signatures.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Signature)> {
        self.signatures.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<S: Into<String>> FromIterator<(S, Signature)> for SignatureTable {
    fn from_iter<I: IntoIterator<Item = (S, Signature)>>(iter: I) -> Self {
        SignatureTable {
            signatures: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
