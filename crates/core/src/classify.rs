//! Severity classification of a parsed unit.
//!
//! A unit is *unrecoverable* when its committed structure cannot be trusted:
//! either the lexer hit fatal corruption (an unterminated string can swallow
//! arbitrary amounts of real code), or recovery failed to commit a single
//! class while still reporting errors. Everything else is recoverable and
//! downstream tooling may use the partial AST.

use crate::ast::Module;
use crate::diag::Diagnostics;

/// Pure function of one parse call's results; calling it twice on the same
/// inputs gives the same answer.
pub fn classify(diags: &Diagnostics, module: &Module) -> bool {
    if diags.hard_fail() {
        return true;
    }
    if diags.is_empty() {
        return false;
    }
    // Errors plus an empty skeleton: only the synthesized script class with
    // nothing in it counts as "no structure committed".
    module.classes.iter().all(|c| {
        c.script && c.fields.is_empty() && c.methods.iter().all(|m| m.body.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_module() -> Module {
        Module {
            unit: "X.vsp".to_owned(),
            package: None,
            imports: Vec::new(),
            classes: Vec::new(),
        }
    }

    #[test]
    fn clean_unit_is_recoverable() {
        let diags = Diagnostics::new("X.vsp");
        assert!(!classify(&diags, &empty_module()));
    }

    #[test]
    fn hard_fail_is_unrecoverable_even_with_classes() {
        let mut module = empty_module();
        module.classes.push(crate::ast::ClassDecl::new(
            "X".to_owned(),
            crate::ast::TypeKind::Class,
            1,
        ));
        let mut diags = Diagnostics::new("X.vsp");
        diags.mark_hard_fail();
        assert!(classify(&diags, &module));
    }

    #[test]
    fn errors_without_committed_classes_are_unrecoverable() {
        let mut diags = Diagnostics::new("X.vsp");
        diags.error_at(1, 1, 1, "unexpected token: !");
        assert!(classify(&diags, &empty_module()));
    }

    #[test]
    fn errors_with_a_declared_class_stay_recoverable() {
        let mut module = empty_module();
        module.classes.push(crate::ast::ClassDecl::new(
            "X".to_owned(),
            crate::ast::TypeKind::Class,
            1,
        ));
        let mut diags = Diagnostics::new("X.vsp");
        diags.error_at(1, 1, 1, "unexpected token: do");
        assert!(!classify(&diags, &module));
    }
}
