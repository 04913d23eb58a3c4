//! Error codes for all compiler diagnostics.

use std::fmt;

/// Error codes, `E####`, where the first digit names the phase:
/// - E1xxx: syntax
/// - E2xxx: bindings and types
/// - E3xxx: code generation
/// - E9xxx: internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Unexpected or malformed syntax
    E1001,

    /// Function has no name
    E2001,
    /// Binding is not a simple identifier
    E2002,
    /// Unknown identifier
    E2003,
    /// Unsupported member access
    E2004,
    /// Type cannot be inferred or is inconsistent
    E2005,
    /// Function has no declared signature
    E2006,
    /// Wrong number of call arguments
    E2007,
    /// Call to a function not defined in the source
    E2008,

    /// Operator not supported for these operands
    E3001,

    /// Generated module failed validation
    E9001,
    /// Codegen reached an inconsistent state
    E9002,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 12] = [
        ErrorCode::E1001,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        ErrorCode::E3001,
        ErrorCode::E9001,
        ErrorCode::E9002,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    pub fn is_syntax_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    pub fn is_type_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    pub fn is_codegen_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }

    /// Internal errors indicate a compiler defect, not bad input.
    pub fn is_internal_error(&self) -> bool {
        self.as_str().starts_with("E9")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;

    #[test]
    fn every_code_belongs_to_exactly_one_phase() {
        for code in ErrorCode::ALL {
            let phases = [
                code.is_syntax_error(),
                code.is_type_error(),
                code.is_codegen_error(),
                code.is_internal_error(),
            ];
            assert_eq!(phases.iter().filter(|p| **p).count(), 1, "{code}");
        }
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(ErrorCode::E2005.to_string(), "E2005");
    }
}
