//! Accumulates parse results into a [`Module`] and applies the synthesis
//! rules: generated no-arg constructors, the script class for units with
//! top-level code, and the defaults substituted for malformed clauses.

use crate::ast::{
    Annotation, ClassDecl, ImportDecl, MethodDecl, Module, PackageDecl, Stmt, TypeKind,
    OBJECT_TYPE, SCRIPT_BASE,
};

pub struct ModuleBuilder {
    unit: String,
    stem: String,
    package: Option<PackageDecl>,
    imports: Vec<ImportDecl>,
    classes: Vec<ClassDecl>,
    top_stmts: Vec<Stmt>,
}

impl ModuleBuilder {
    pub fn new(unit: &str, stem: &str) -> Self {
        ModuleBuilder {
            unit: unit.to_owned(),
            stem: stem.to_owned(),
            package: None,
            imports: Vec::new(),
            classes: Vec::new(),
            top_stmts: Vec::new(),
        }
    }

    pub fn set_package(&mut self, pkg: PackageDecl) {
        self.package = Some(pkg);
    }

    /// Fallback for a clause that could not be parsed. The unit still gets a
    /// usable package so downstream consumers see a complete skeleton.
    pub fn set_default_package(&mut self, line: u32) {
        self.package = Some(PackageDecl {
            name: "java.lang".to_owned(),
            synthetic: true,
            line,
        });
    }

    pub fn add_import(&mut self, import: ImportDecl) {
        self.imports.push(import);
    }

    pub fn add_default_import(&mut self, line: u32) {
        self.imports.push(ImportDecl {
            path: "java.lang.Object".to_owned(),
            star: false,
            statik: false,
            synthetic: true,
            line,
        });
    }

    pub fn add_class(&mut self, class: ClassDecl) {
        self.classes.push(class);
    }

    pub fn push_stmt(&mut self, stmt: Stmt) {
        self.top_stmts.push(stmt);
    }

    pub fn finish(mut self) -> Module {
        let synthesize_script = self.classes.is_empty() || !self.top_stmts.is_empty();
        for class in &mut self.classes {
            ensure_ctor(class);
        }
        if synthesize_script {
            let script = self.script_class();
            self.classes.insert(0, script);
        }
        Module {
            unit: self.unit,
            package: self.package,
            imports: self.imports,
            classes: self.classes,
        }
    }

    /// The implicit class wrapping a unit's top-level statements: named after
    /// the unit stem, extending the script base, with the statements moved
    /// into a generated `run` method.
    fn script_class(&mut self) -> ClassDecl {
        let mut class = ClassDecl::new(self.stem.clone(), TypeKind::Class, 1);
        class.script = true;
        class.modifiers.push("public".to_owned());
        class.superclass = Some(SCRIPT_BASE.to_owned());
        class.methods.push(MethodDecl {
            name: "run".to_owned(),
            return_type: OBJECT_TYPE.to_owned(),
            modifiers: vec!["public".to_owned()],
            annotations: vec![Annotation {
                name: "Override".to_owned(),
                args: Vec::new(),
                line: 1,
                col: 1,
            }],
            params: Vec::new(),
            body: std::mem::take(&mut self.top_stmts),
            generated: true,
            line: 1,
        });
        ensure_ctor(&mut class);
        class
    }
}

fn ensure_ctor(class: &mut ClassDecl) {
    if class.kind != TypeKind::Class || !class.ctors.is_empty() {
        return;
    }
    class.ctors.push(MethodDecl {
        name: class.name.clone(),
        return_type: String::new(),
        modifiers: vec!["public".to_owned()],
        annotations: Vec::new(),
        params: Vec::new(),
        body: Vec::new(),
        generated: true,
        line: class.line,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;

    #[test]
    fn empty_unit_synthesizes_script_class() {
        let module = ModuleBuilder::new("Run.vsp", "Run").finish();
        assert_eq!(module.classes.len(), 1);
        let script = &module.classes[0];
        assert!(script.script);
        assert_eq!(script.name, "Run");
        assert_eq!(script.superclass.as_deref(), Some(SCRIPT_BASE));
        assert_eq!(script.ctors.len(), 1);
        assert!(script.ctors[0].generated);
        let run = script.method("run").unwrap();
        assert!(run.generated);
        assert_eq!(run.return_type, OBJECT_TYPE);
    }

    #[test]
    fn class_only_unit_gets_no_script_class() {
        let mut b = ModuleBuilder::new("Foo.vsp", "Foo");
        b.add_class(ClassDecl::new("Foo".to_owned(), TypeKind::Class, 1));
        let module = b.finish();
        assert_eq!(module.classes.len(), 1);
        assert!(!module.classes[0].script);
    }

    #[test]
    fn mixed_unit_puts_script_class_first() {
        let mut b = ModuleBuilder::new("Run.vsp", "Run");
        b.add_class(ClassDecl::new("Helper".to_owned(), TypeKind::Class, 3));
        b.push_stmt(Stmt::Expr(Expr::Var("x".to_owned())));
        let module = b.finish();
        assert_eq!(module.classes[0].name, "Run");
        assert!(module.classes[0].script);
        assert_eq!(module.classes[1].name, "Helper");
    }

    #[test]
    fn explicit_ctor_suppresses_generated_one() {
        let mut class = ClassDecl::new("Foo".to_owned(), TypeKind::Class, 1);
        class.ctors.push(MethodDecl {
            name: "Foo".to_owned(),
            return_type: String::new(),
            modifiers: Vec::new(),
            annotations: Vec::new(),
            params: Vec::new(),
            body: Vec::new(),
            generated: false,
            line: 2,
        });
        let mut b = ModuleBuilder::new("Foo.vsp", "Foo");
        b.add_class(class);
        let module = b.finish();
        assert_eq!(module.classes[0].ctors.len(), 1);
        assert!(!module.classes[0].ctors[0].generated);
    }

    #[test]
    fn interfaces_get_no_generated_ctor() {
        let mut b = ModuleBuilder::new("I.vsp", "I");
        b.add_class(ClassDecl::new("I".to_owned(), TypeKind::Interface, 1));
        assert!(b.finish().classes[0].ctors.is_empty());
    }
}
