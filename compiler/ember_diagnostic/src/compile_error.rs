//! The error type every compiler phase returns.

use ember_ir::Span;

use crate::{Diagnostic, ErrorCode};

/// A fatal compilation failure, located in the source.
///
/// Compilation stops at the first error; nothing is retried.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("syntax error: {message}")]
    Syntax { message: String, span: Span },

    #[error("function has no name")]
    UnnamedFunction { span: Span },

    #[error("only simple identifiers can be bound")]
    NonIdentifierBinding { span: Span },

    #[error("unknown identifier `{name}`")]
    UnknownIdentifier { name: String, span: Span },

    #[error("unsupported member access `.{property}`")]
    UnsupportedMember { property: String, span: Span },

    #[error("type inference failed: {message}")]
    TypeInferenceFailure { message: String, span: Span },

    #[error("unhandled operator `{operator}`: {reason}")]
    UnhandledOperator {
        operator: String,
        reason: String,
        span: Span,
    },

    #[error("malformed syntax tree: {message}")]
    MalformedAst { message: String, span: Span },

    #[error("generated module is invalid: {message}")]
    InvalidModule { message: String },

    #[error("no signature declared for function `{name}`")]
    MissingSignature { name: String, span: Span },

    #[error("call to undefined function `{name}`")]
    UnknownFunction { name: String, span: Span },

    #[error("`{name}` expects {expected} argument(s), found {found}")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },
}

impl CompileError {
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        CompileError::Syntax {
            message: message.into(),
            span,
        }
    }

    pub fn type_failure(message: impl Into<String>, span: Span) -> Self {
        CompileError::TypeInferenceFailure {
            message: message.into(),
            span,
        }
    }

    pub fn unknown_identifier(name: impl Into<String>, span: Span) -> Self {
        CompileError::UnknownIdentifier {
            name: name.into(),
            span,
        }
    }

    pub fn unhandled_operator(
        operator: impl Into<String>,
        reason: impl Into<String>,
        span: Span,
    ) -> Self {
        CompileError::UnhandledOperator {
            operator: operator.into(),
            reason: reason.into(),
            span,
        }
    }

    pub fn malformed(message: impl Into<String>, span: Span) -> Self {
        CompileError::MalformedAst {
            message: message.into(),
            span,
        }
    }

    /// Location of the error; [`Span::DUMMY`] for module-level failures.
    pub fn span(&self) -> Span {
        match self {
            CompileError::Syntax { span, .. }
            | CompileError::UnnamedFunction { span }
            | CompileError::NonIdentifierBinding { span }
            | CompileError::UnknownIdentifier { span, .. }
            | CompileError::UnsupportedMember { span, .. }
            | CompileError::TypeInferenceFailure { span, .. }
            | CompileError::UnhandledOperator { span, .. }
            | CompileError::MalformedAst { span, .. }
            | CompileError::MissingSignature { span, .. }
            | CompileError::UnknownFunction { span, .. }
            | CompileError::ArgumentCountMismatch { span, .. } => *span,
            CompileError::InvalidModule { .. } => Span::DUMMY,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CompileError::Syntax { .. } => ErrorCode::E1001,
            CompileError::UnnamedFunction { .. } => ErrorCode::E2001,
            CompileError::NonIdentifierBinding { .. } => ErrorCode::E2002,
            CompileError::UnknownIdentifier { .. } => ErrorCode::E2003,
            CompileError::UnsupportedMember { .. } => ErrorCode::E2004,
            CompileError::TypeInferenceFailure { .. } => ErrorCode::E2005,
            CompileError::MissingSignature { .. } => ErrorCode::E2006,
            CompileError::ArgumentCountMismatch { .. } => ErrorCode::E2007,
            CompileError::UnknownFunction { .. } => ErrorCode::E2008,
            CompileError::UnhandledOperator { .. } => ErrorCode::E3001,
            CompileError::InvalidModule { .. } => ErrorCode::E9001,
            CompileError::MalformedAst { .. } => ErrorCode::E9002,
        }
    }

    /// Whether this error reflects a compiler defect rather than bad input.
    pub fn is_internal(&self) -> bool {
        self.code().is_internal_error()
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code()).with_message(self.to_string());
        match self {
            CompileError::Syntax { span, .. } => diag.with_label(*span, "unexpected here"),
            CompileError::UnnamedFunction { span } => diag
                .with_label(*span, "anonymous function")
                .with_note("every compiled function is exported by name"),
            CompileError::NonIdentifierBinding { span } => diag
                .with_label(*span, "destructuring is not supported")
                .with_note("bind each value to its own name"),
            CompileError::UnknownIdentifier { span, .. } => {
                diag.with_label(*span, "not a parameter or declared variable")
            }
            CompileError::UnsupportedMember { span, .. } => diag
                .with_label(*span, "unsupported property")
                .with_note("arrays support indexing and `.length` only"),
            CompileError::TypeInferenceFailure { span, .. } => {
                diag.with_label(*span, "type cannot be determined here")
            }
            CompileError::UnhandledOperator { span, operator, .. } => {
                diag.with_label(*span, format!("`{operator}` used here"))
            }
            CompileError::MalformedAst { span, .. } => diag
                .with_label(*span, "while generating this")
                .with_note("this is a compiler bug"),
            CompileError::InvalidModule { .. } => diag.with_note("this is a compiler bug"),
            CompileError::MissingSignature { span, name } => diag
                .with_label(*span, "defined here")
                .with_note(format!("add a signature for `{name}` to the signature table")),
            CompileError::UnknownFunction { span, .. } => {
                diag.with_label(*span, "not defined in this source")
            }
            CompileError::ArgumentCountMismatch { span, expected, .. } => {
                diag.with_label(*span, format!("expected {expected} argument(s)"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn diagnostic_carries_code_message_and_span() {
        let err = CompileError::unknown_identifier("y", Span::new(5, 6));
        let diag = err.to_diagnostic();
        assert_eq!(diag.code, ErrorCode::E2003);
        assert_eq!(diag.message, "unknown identifier `y`");
        assert_eq!(diag.primary_span(), Some(Span::new(5, 6)));
    }

    #[test]
    fn invalid_module_is_internal_and_unlocated() {
        let err = CompileError::InvalidModule {
            message: "type mismatch".into(),
        };
        assert!(err.is_internal());
        assert_eq!(err.span(), Span::DUMMY);
        assert!(err.to_diagnostic().labels.is_empty());
    }

    #[test]
    fn user_errors_are_not_internal() {
        let err = CompileError::unhandled_operator("%", "float operands", Span::new(0, 1));
        assert!(!err.is_internal());
        assert_eq!(err.code(), ErrorCode::E3001);
        assert_eq!(
            err.to_string(),
            "unhandled operator `%`: float operands"
        );
    }
}
