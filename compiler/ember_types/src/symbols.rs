//! Slot assignment for parameters and locals.

use ember_diagnostic::CompileError;
use ember_ir::ast::{Binding, Declarator, Function};
use ember_ir::visitor::{self, Visitor};
use rustc_hash::FxHashMap;

/// Variable name to slot index for one function.
///
/// Parameters occupy slots `0..param_count` in order; locals follow in the
/// order of their first declaration. Redeclaring a name reuses its slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolTable {
    slots: FxHashMap<String, u32>,
    /// Name per slot; duplicated parameter names appear more than once.
    names: Vec<String>,
    param_count: u32,
}

impl SymbolTable {
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(function = function.name.as_ref().map_or("<anonymous>", |n| n.name.as_str()))
    )]
    pub fn build(function: &Function) -> Result<SymbolTable, CompileError> {
        let mut builder = Builder {
            table: SymbolTable::default(),
            error: None,
        };
        builder.visit_function(function);
        if let Some(err) = builder.error {
            return Err(err);
        }
        tracing::trace!(
            params = builder.table.param_count,
            slots = builder.table.len(),
            "symbols built"
        );
        Ok(builder.table)
    }

    pub fn slot(&self, name: &str) -> Option<u32> {
        self.slots.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Total number of slots, parameters included.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn param_count(&self) -> u32 {
        self.param_count
    }

    /// Names of the non-parameter slots, in slot order.
    pub fn locals(&self) -> &[String] {
        &self.names[self.param_count as usize..]
    }

    /// Name bound to `slot`.
    pub fn name(&self, slot: u32) -> Option<&str> {
        self.names.get(slot as usize).map(String::as_str)
    }

    fn push(&mut self, name: &str) -> u32 {
        let slot = u32::try_from(self.names.len()).unwrap_or(u32::MAX);
        self.names.push(name.to_owned());
        self.slots.entry(name.to_owned()).or_insert(slot);
        slot
    }
}

struct Builder {
    table: SymbolTable,
    error: Option<CompileError>,
}

impl Builder {
    fn fail(&mut self, err: CompileError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

impl<'ast> Visitor<'ast> for Builder {
    fn visit_param(&mut self, param: &'ast Binding) {
        match param {
            Binding::Ident(ident) => {
                self.table.push(&ident.name);
                self.table.param_count += 1;
            }
            Binding::Pattern(span) => self.fail(CompileError::NonIdentifierBinding { span: *span }),
        }
    }

    fn visit_declarator(&mut self, declarator: &'ast Declarator) {
        match &declarator.binding {
            Binding::Ident(ident) => {
                if !self.table.contains(&ident.name) {
                    self.table.push(&ident.name);
                }
            }
            Binding::Pattern(span) => self.fail(CompileError::NonIdentifierBinding { span: *span }),
        }
        visitor::walk_declarator(self, declarator);
    }
}

#[cfg(test)]
mod tests {
    use ember_diagnostic::CompileError;
    use pretty_assertions::assert_eq;

    use super::SymbolTable;

    fn build(source: &str) -> Result<SymbolTable, CompileError> {
        let program = ember_parse::parse(source).unwrap();
        SymbolTable::build(&program.functions[0])
    }

    #[test]
    fn params_then_locals_in_declaration_order() {
        let table = build(
            "function f(a, b) {
                var x = 1;
                if (a) { var y = 2; } else { let z = 3; }
                for (var i = 0; i < b; i++) {}
            }",
        )
        .unwrap();
        assert_eq!(table.param_count(), 2);
        assert_eq!(table.slot("a"), Some(0));
        assert_eq!(table.slot("b"), Some(1));
        assert_eq!(table.locals(), ["x", "y", "z", "i"]);
        assert_eq!(table.slot("i"), Some(5));
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn redeclaration_keeps_first_slot() {
        let table = build("function f(a) { var x = 20; var x; var a = 3; var x = 10; }").unwrap();
        assert_eq!(table.slot("x"), Some(1));
        assert_eq!(table.slot("a"), Some(0));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn destructuring_is_rejected() {
        let err = build("function f([a]) {}").unwrap_err();
        assert!(matches!(err, CompileError::NonIdentifierBinding { .. }));
        let err = build("function f() { var {a} = b; }").unwrap_err();
        assert!(matches!(err, CompileError::NonIdentifierBinding { .. }));
    }

    #[test]
    fn assignments_do_not_declare() {
        let table = build("function f() { y = 1; }").unwrap();
        assert!(!table.contains("y"));
        assert!(table.is_empty());
    }
}
